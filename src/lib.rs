//! emotion-bridge library crate.
//!
//! Captures webcam frames, classifies the dominant facial emotion and streams
//! `label:percentage` messages to a single TCP peer. The binary in `main.rs`
//! is a thin CLI over [`bridge::serve`]; the modules are public for
//! integration testing.

pub mod bridge;
pub mod camera;
pub mod cli;
pub mod config;
pub mod display;
pub mod emotion;
pub mod error;
pub mod logging;
pub mod signal;
pub mod transport;
