//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Parse and validate a capture resolution (WIDTHxHEIGHT format)
fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let (width, height) = s.split_once('x').ok_or_else(|| {
        format!(
            "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 640x480)",
            s
        )
    })?;
    let width: u32 = width
        .parse()
        .map_err(|_| format!("Invalid width '{}' in resolution", width))?;
    let height: u32 = height
        .parse()
        .map_err(|_| format!("Invalid height '{}' in resolution", height))?;
    if width == 0 || height == 0 {
        return Err("Resolution width and height must be greater than 0".to_string());
    }
    Ok((width, height))
}

/// Streams the dominant facial emotion from a webcam to one TCP peer
#[derive(Parser, Debug)]
#[command(name = "emotion-bridge")]
#[command(version, about = "Webcam emotion detector that streams labels over TCP", long_about = None)]
#[command(after_help = "The peer receives messages like 'happy:73.2', one per frame with a face.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Host to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// TCP port to listen on
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Camera device index (from list-cameras)
    #[arg(long)]
    pub camera: Option<u32>,

    /// Capture resolution, e.g. 640x480
    #[arg(long, short = 'r', value_parser = parse_resolution)]
    pub resolution: Option<(u32, u32)>,

    /// Mirror camera horizontally
    #[arg(long)]
    pub mirror: bool,

    /// Run without the preview window (stop with Ctrl+C)
    #[arg(long)]
    pub no_display: bool,

    /// Give up if no peer connects within this many seconds
    #[arg(long, value_name = "SECS")]
    pub accept_timeout: Option<u64>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(long, short)]
    pub verbose: bool,
}

impl Args {
    /// Overlay command-line flags on a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secs) = self.accept_timeout {
            config.server.accept_timeout_secs = Some(secs);
        }
        if let Some(device) = self.camera {
            config.camera.device = device;
        }
        if let Some((width, height)) = self.resolution {
            config.camera.width = width;
            config.camera.height = height;
        }
        if self.mirror {
            config.camera.mirror = true;
        }
        if self.no_display {
            config.display.enabled = false;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["emotion-bridge"]);
        assert!(args.command.is_none());
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(args.camera.is_none());
        assert!(args.resolution.is_none());
        assert!(!args.mirror);
        assert!(!args.no_display);
        assert!(args.accept_timeout.is_none());
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = Args::parse_from(["emotion-bridge"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "emotion-bridge",
            "--host",
            "127.0.0.2",
            "-p",
            "9090",
            "--camera",
            "2",
            "-r",
            "1280x720",
            "--mirror",
            "--no-display",
            "--accept-timeout",
            "30",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.server.address(), "127.0.0.2:9090");
        assert!(config.validate().is_ok());
        assert_eq!(config.server.accept_timeout_secs, Some(30));
        assert_eq!(config.camera.device, 2);
        assert_eq!((config.camera.width, config.camera.height), (1280, 720));
        assert!(config.camera.mirror);
        assert!(!config.display.enabled);
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("640x480").unwrap(), (640, 480));
        assert!(parse_resolution("640").is_err());
        assert!(parse_resolution("0x480").is_err());
        assert!(parse_resolution("wide x tall").is_err());
    }

    #[test]
    fn test_args_bad_port_rejected() {
        assert!(Args::try_parse_from(["emotion-bridge", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_args_config_option() {
        let args = Args::parse_from(["emotion-bridge", "--config", "/tmp/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/config.toml")));

        let args = Args::parse_from(["emotion-bridge", "-c", "/tmp/test.toml", "-v"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_list_cameras_subcommand() {
        let args = Args::parse_from(["emotion-bridge", "list-cameras"]);
        assert!(matches!(args.command, Some(Command::ListCameras)));
    }

    #[test]
    fn test_args_config_subcommands() {
        let args = Args::parse_from(["emotion-bridge", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        let args = Args::parse_from(["emotion-bridge", "config", "init"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }
}
