//! Configuration file handling for emotion-bridge.
//!
//! Loads configuration from `~/.config/emotion-bridge/config.toml` or a custom
//! path. Every value has a built-in default, so running without a file gives
//! the stock behaviour: `127.0.0.1:8080`, camera 0, window "Emotion Detector",
//! quit on `q`.

use serde::{Deserialize, Serialize};
use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{CameraSettings, Resolution};

/// Configuration file structure for emotion-bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub camera: CameraConfig,
    pub model: ModelConfig,
    pub display: DisplayConfig,
}

/// Where the single peer connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Give up waiting for the peer after this many seconds (unset: wait forever)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            accept_timeout_secs: None,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn accept_timeout(&self) -> Option<Duration> {
        self.accept_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let settings = CameraSettings::default();
        Self {
            device: settings.device_index,
            width: settings.resolution.width,
            height: settings.resolution.height,
            fps: settings.fps,
            mirror: settings.mirror,
        }
    }
}

impl CameraConfig {
    pub fn settings(&self) -> CameraSettings {
        CameraSettings {
            device_index: self.device,
            resolution: Resolution {
                width: self.width,
                height: self.height,
            },
            fps: self.fps,
            mirror: self.mirror,
        }
    }
}

/// Model files for the face detector and emotion classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenCV Haar cascade for frontal faces
    pub cascade: PathBuf,
    /// ONNX emotion classifier (48x48 grayscale in, 7 classes out)
    pub emotion: PathBuf,
    /// Smallest face edge, in pixels, the detector reports
    pub min_face_size: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cascade: PathBuf::from("assets/models/haarcascade_frontalface_default.xml"),
            emotion: PathBuf::from("assets/models/emotion.onnx"),
            min_face_size: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    pub title: String,
    pub quit_key: char,
    /// How long each key poll waits, in milliseconds (minimum 1)
    pub poll_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Emotion Detector".to_string(),
            quit_key: 'q',
            poll_ms: 1,
        }
    }
}

/// Commented config written by `config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# emotion-bridge configuration

[server]
# Address the single peer connects to
host = "127.0.0.1"
port = 8080
# Stop waiting for the peer after this many seconds (default: wait forever)
# accept_timeout_secs = 30

[camera]
# Camera device index (see `emotion-bridge list-cameras`)
device = 0
# Requested capture size and rate (the driver may pick the closest match)
width = 640
height = 480
fps = 30
# Mirror horizontally (selfie mode)
mirror = false

[model]
# OpenCV Haar cascade used to find faces
cascade = "assets/models/haarcascade_frontalface_default.xml"
# ONNX emotion classifier: [1, 1, 48, 48] grayscale in, 7 classes out
emotion = "assets/models/emotion.onnx"
# Ignore faces smaller than this many pixels
min_face_size = 40

[display]
# Show the annotated preview window
enabled = true
title = "Emotion Detector"
# Key that stops the bridge while the window has focus
quit_key = "q"
# Key poll wait per frame, in milliseconds
poll_ms = 1
"#;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            config.validate()?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Reject values the bridge cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".to_string()));
        }
        // The peer is a local consumer; never listen beyond this machine.
        let resolved: Vec<_> = (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "server.host {:?} does not resolve: {}",
                    self.server.host, e
                ))
            })?
            .collect();
        if resolved.is_empty() || !resolved.iter().all(|addr| addr.ip().is_loopback()) {
            return Err(ConfigError::Invalid(format!(
                "server.host must be a loopback address, got {:?}",
                self.server.host
            )));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Invalid(
                "camera.width and camera.height must be greater than 0".to_string(),
            ));
        }
        if self.camera.fps == 0 {
            return Err(ConfigError::Invalid("camera.fps must be greater than 0".to_string()));
        }
        if self.model.min_face_size == 0 {
            return Err(ConfigError::Invalid(
                "model.min_face_size must be greater than 0".to_string(),
            ));
        }
        if !self.display.quit_key.is_ascii_graphic() {
            return Err(ConfigError::Invalid(format!(
                "display.quit_key must be a printable ASCII character, got {:?}",
                self.display.quit_key
            )));
        }
        if self.display.poll_ms == 0 {
            // highgui treats a zero wait as "block until a key is pressed"
            return Err(ConfigError::Invalid("display.poll_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    AlreadyExists(PathBuf),
    SerializeError(toml::ser::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::WriteError { path, source } => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::AlreadyExists(path) => {
                write!(f, "Config file already exists: {}", path.display())
            }
            ConfigError::SerializeError(source) => {
                write!(f, "Failed to render config: {}", source)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError(source) => Some(source),
            ConfigError::AlreadyExists(_) | ConfigError::Invalid(_) => None,
        }
    }
}

/// Write [`DEFAULT_CONFIG_TEMPLATE`] to `path`, creating parent directories.
/// Never overwrites an existing file.
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_error)
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("emotion-bridge").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/emotion-bridge/config.toml")
        })
}
