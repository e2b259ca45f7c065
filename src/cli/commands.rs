//! Subcommand handlers for list-cameras and config actions.

use std::path::Path;

use super::args::ConfigAction;
use crate::config::{self, Config, ConfigError};
use crate::error::StartupError;

/// List available cameras and print them to stdout.
#[cfg(feature = "vision")]
pub fn list_cameras() -> Result<(), StartupError> {
    let devices = crate::camera::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your camera is connected and permissions are granted.");
    } else {
        println!("Available cameras:");
        for device in devices {
            println!("  {}", device);
        }
        println!();
        println!("Use --camera <index> to select a camera.");
    }
    Ok(())
}

#[cfg(not(feature = "vision"))]
pub fn list_cameras() -> Result<(), StartupError> {
    Err(StartupError::VisionDisabled)
}

/// Handle config subcommand actions against the file at `config_path`.
pub fn handle_config_action(
    action: ConfigAction,
    config: &Config,
    config_path: &Path,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Show => {
            println!("{}", describe_config_file(config_path));
            println!();
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init => {
            config::write_default(config_path)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

fn describe_config_file(path: &Path) -> String {
    if path.exists() {
        format!("Config file: {} (exists)", path.display())
    } else {
        format!("Config file: {} (not found, using defaults)", path.display())
    }
}
