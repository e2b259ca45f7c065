//! The capture, classify, send loop.
//!
//! Startup acquires the camera, the classifier, the preview and the listener,
//! then blocks on the single accept. [`Streamer`] runs the streaming state
//! until one [`StreamEnd`] is reached. Shutdown is plain drop order: camera,
//! classifier, display, then the connection and finally the listener.

use std::fmt;
use std::io::Write;
use std::ops::ControlFlow;
use std::time::Duration;

use crate::camera::FrameSource;
use crate::config::Config;
use crate::display::DisplaySurface;
use crate::emotion::{report_for, EmotionDetector};
use crate::error::{SendError, StartupError, StreamError};
use crate::transport::{send_all, Listener};

/// Why the streaming loop stopped.
#[derive(Debug)]
pub enum StreamEnd {
    /// The camera stopped producing frames.
    EndOfStream,
    /// The peer closed its end of the connection.
    PeerDisconnected,
    /// The quit key was pressed in the preview window.
    QuitRequested,
    /// Ctrl+C.
    Interrupted,
    /// An unclassified runtime error.
    Failed(StreamError),
}

impl StreamEnd {
    /// Everything except `Failed` counts as a clean shutdown.
    pub fn is_clean(&self) -> bool {
        !matches!(self, StreamEnd::Failed(_))
    }
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEnd::EndOfStream => write!(f, "camera stream ended"),
            StreamEnd::PeerDisconnected => write!(f, "peer disconnected"),
            StreamEnd::QuitRequested => write!(f, "quit requested"),
            StreamEnd::Interrupted => write!(f, "interrupted"),
            StreamEnd::Failed(e) => write!(f, "stream failed: {}", e),
        }
    }
}

/// Counters for one streaming session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub frames: u64,
    pub frames_with_faces: u64,
    pub reports_sent: u64,
}

/// The streaming state: owns the per-frame collaborators and the peer sink.
///
/// Fields drop in declaration order once the loop ends.
pub struct Streamer<'a, S, D, V, W> {
    source: S,
    detector: D,
    display: V,
    sink: W,
    should_stop: &'a dyn Fn() -> bool,
    stats: StreamStats,
}

impl<'a, S, D, V, W> Streamer<'a, S, D, V, W>
where
    S: FrameSource,
    D: EmotionDetector,
    V: DisplaySurface,
    W: Write,
{
    pub fn new(source: S, detector: D, display: V, sink: W, should_stop: &'a dyn Fn() -> bool) -> Self {
        Self {
            source,
            detector,
            display,
            sink,
            should_stop,
            stats: StreamStats::default(),
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// One iteration: frame, classify, send, render, poll.
    pub fn step(&mut self) -> ControlFlow<StreamEnd> {
        if (self.should_stop)() {
            return ControlFlow::Break(StreamEnd::Interrupted);
        }

        let frame = match self.source.next_frame() {
            Some(frame) => frame,
            None => return ControlFlow::Break(StreamEnd::EndOfStream),
        };
        self.stats.frames += 1;

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => return ControlFlow::Break(StreamEnd::Failed(e.into())),
        };

        let report = report_for(&detections);
        if let Some(report) = &report {
            self.stats.frames_with_faces += 1;
            log::info!(
                "Detected emotion: {}, score: {:.1}%",
                report.label,
                report.percentage
            );

            match send_all(&mut self.sink, report.to_message().as_bytes()) {
                Ok(()) => self.stats.reports_sent += 1,
                Err(SendError::PeerDisconnected(e)) => {
                    log::debug!("Send failed after peer left: {}", e);
                    return ControlFlow::Break(StreamEnd::PeerDisconnected);
                }
                Err(e) => return ControlFlow::Break(StreamEnd::Failed(StreamError::Send(e))),
            }
        } else {
            log::trace!("No face in frame {}", self.stats.frames);
        }

        if let Err(e) = self.display.show(&frame, &detections, report.as_ref()) {
            return ControlFlow::Break(StreamEnd::Failed(e.into()));
        }

        match self.display.quit_requested() {
            Ok(true) => ControlFlow::Break(StreamEnd::QuitRequested),
            Ok(false) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(StreamEnd::Failed(e.into())),
        }
    }

    /// Step until the loop ends, then release everything this streamer owns.
    pub fn run(mut self) -> (StreamEnd, StreamStats) {
        let end = loop {
            if let ControlFlow::Break(end) = self.step() {
                break end;
            }
        };

        match &end {
            StreamEnd::Failed(e) => log::error!("Streaming stopped: {}", e),
            other => log::info!("Streaming stopped: {}", other),
        }
        (end, self.stats)
    }
}

/// Accept the one peer on `listener` and stream to it until the loop ends.
///
/// `Ok(StreamEnd::Interrupted)` is returned when Ctrl+C arrives before a
/// peer connects.
///
/// # Errors
/// Only startup failures: accept errors and an expired `accept_timeout`.
pub fn stream_to_peer<S, D, V>(
    source: S,
    detector: D,
    display: V,
    listener: Listener,
    accept_timeout: Option<Duration>,
    should_stop: &dyn Fn() -> bool,
) -> Result<StreamEnd, StartupError>
where
    S: FrameSource,
    D: EmotionDetector,
    V: DisplaySurface,
{
    log::info!("Waiting for peer to connect on {}...", listener.local_addr());
    let mut session = match listener.accept_one(accept_timeout, should_stop)? {
        Some(session) => session,
        None => {
            log::info!("Interrupted before a peer connected");
            return Ok(StreamEnd::Interrupted);
        }
    };
    log::info!("Peer connected: {}", session.peer_addr());

    let streamer = Streamer::new(source, detector, display, session.connection(), should_stop);
    let (end, stats) = streamer.run();
    log::info!(
        "Processed {} frames, {} with faces, {} reports sent",
        stats.frames,
        stats.frames_with_faces,
        stats.reports_sent
    );

    drop(session);
    Ok(end)
}

/// Acquire every resource described by `config` and run the bridge.
///
/// # Errors
/// Any fatal startup failure. Runtime failures come back as
/// `Ok(StreamEnd::Failed(_))`.
#[cfg(feature = "vision")]
pub fn serve(config: &Config) -> Result<StreamEnd, StartupError> {
    use crate::camera::CameraCapture;
    use crate::display::{Headless, HighguiWindow};
    use crate::emotion::FerDetector;

    let camera = CameraCapture::open(config.camera.settings())?;
    let detector = FerDetector::load(
        &config.model.cascade,
        &config.model.emotion,
        config.model.min_face_size,
    )?;
    let display: Box<dyn DisplaySurface> = if config.display.enabled {
        Box::new(HighguiWindow::open(
            &config.display.title,
            config.display.quit_key,
            config.display.poll_ms,
        )?)
    } else {
        log::info!("Preview disabled, press Ctrl+C to stop");
        Box::new(Headless)
    };
    let listener = Listener::bind(&config.server.address())?;

    stream_to_peer(
        camera,
        detector,
        display,
        listener,
        config.server.accept_timeout(),
        &crate::signal::interrupted,
    )
}

/// Without the `vision` feature there is no camera or model to serve from.
#[cfg(not(feature = "vision"))]
pub fn serve(_config: &Config) -> Result<StreamEnd, StartupError> {
    Err(StartupError::VisionDisabled)
}
