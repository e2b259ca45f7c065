//! Error types shared across the bridge.
//!
//! Startup failures are fatal and propagate out of [`crate::bridge::serve`].
//! Everything that can go wrong once frames are flowing is a [`StreamError`]
//! and only ever ends the loop.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::camera::CameraError;
use crate::config::ConfigError;

/// Failures that abort the process before streaming starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Camera unavailable: {0}")]
    Camera(#[from] CameraError),

    #[error("Emotion model unavailable: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Display unavailable: {0}")]
    Display(#[from] DisplayError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to accept connection on {addr}: {source}")]
    Accept {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("No peer connected to {addr} within {timeout:?}")]
    AcceptTimeout { addr: SocketAddr, timeout: Duration },

    #[error("Failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("This build has no capture support; rebuild with the `vision` feature")]
    VisionDisabled,
}

/// Failures raised by the emotion classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Face detection failed: {0}")]
    FaceDetection(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Frame is malformed: {0}")]
    InvalidFrame(String),
}

/// Failures from the local preview window.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Failed to open window '{title}': {message}")]
    Open { title: String, message: String },

    #[error("Failed to render frame: {0}")]
    Render(String),

    #[error("Failed to poll keyboard: {0}")]
    Poll(String),
}

/// Outcome of a failed send on the peer connection.
#[derive(Debug, Error)]
pub enum SendError {
    /// The peer went away (broken pipe, reset, aborted).
    #[error("Peer disconnected: {0}")]
    PeerDisconnected(#[source] io::Error),

    #[error("Send failed: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for SendError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof => SendError::PeerDisconnected(err),
            _ => SendError::Io(err),
        }
    }
}

/// Unclassified runtime failures that end the streaming loop.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Send(SendError),
}
