//! In-memory stand-ins for the camera, classifier, display and peer socket.
//!
//! Every fake records its own drop in a shared [`DropLog`] so tests can check
//! that each resource is released exactly once and in which order.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use emotion_bridge::camera::{Frame, FrameSource};
use emotion_bridge::display::DisplaySurface;
use emotion_bridge::emotion::{
    Emotion, EmotionDetector, EmotionReport, EmotionScores, FaceBox, FaceDetection,
};
use emotion_bridge::error::{ClassifierError, DisplayError};

pub type DropLog = Rc<RefCell<Vec<&'static str>>>;

pub fn drop_log() -> DropLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn tiny_frame() -> Frame {
    Frame::rgb(vec![0; 4 * 4 * 3], 4, 4)
}

pub fn face(emotion: Emotion, confidence: f32) -> FaceDetection {
    FaceDetection::new(
        FaceBox {
            x: 0,
            y: 0,
            width: 4,
            height: 4,
        },
        EmotionScores::default().with(emotion, confidence),
    )
}

/// Yields `remaining` frames, then end-of-stream.
pub struct FakeCamera {
    pub remaining: usize,
    pub log: DropLog,
}

impl FrameSource for FakeCamera {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(tiny_frame())
    }
}

impl Drop for FakeCamera {
    fn drop(&mut self) {
        self.log.borrow_mut().push("camera");
    }
}

/// Plays back scripted results; an exhausted script keeps returning `fallback`.
pub struct FakeDetector {
    pub script: VecDeque<Result<Vec<FaceDetection>, ClassifierError>>,
    pub fallback: Vec<FaceDetection>,
    pub delay: Option<Duration>,
    pub calls: Rc<Cell<usize>>,
    pub log: DropLog,
}

impl FakeDetector {
    pub fn always(faces: Vec<FaceDetection>, log: &DropLog) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: faces,
            delay: None,
            calls: Rc::new(Cell::new(0)),
            log: log.clone(),
        }
    }

    pub fn scripted(
        script: Vec<Result<Vec<FaceDetection>, ClassifierError>>,
        log: &DropLog,
    ) -> Self {
        Self {
            script: script.into(),
            fallback: Vec::new(),
            delay: None,
            calls: Rc::new(Cell::new(0)),
            log: log.clone(),
        }
    }
}

impl EmotionDetector for FakeDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceDetection>, ClassifierError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.script.pop_front() {
            Some(result) => result,
            None => Ok(self.fallback.clone()),
        }
    }
}

impl Drop for FakeDetector {
    fn drop(&mut self) {
        self.log.borrow_mut().push("classifier");
    }
}

/// Counts rendered frames and presses the quit key after `quit_after` polls.
pub struct FakeDisplay {
    pub shown: Rc<RefCell<Vec<Option<EmotionReport>>>>,
    pub quit_after: Option<usize>,
    pub polls: usize,
    pub log: DropLog,
}

impl FakeDisplay {
    pub fn new(log: &DropLog) -> Self {
        Self {
            shown: Rc::new(RefCell::new(Vec::new())),
            quit_after: None,
            polls: 0,
            log: log.clone(),
        }
    }
}

impl DisplaySurface for FakeDisplay {
    fn show(
        &mut self,
        _frame: &Frame,
        _detections: &[FaceDetection],
        report: Option<&EmotionReport>,
    ) -> Result<(), DisplayError> {
        self.shown.borrow_mut().push(report.copied());
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, DisplayError> {
        self.polls += 1;
        Ok(self.quit_after.is_some_and(|n| self.polls >= n))
    }
}

impl Drop for FakeDisplay {
    fn drop(&mut self) {
        self.log.borrow_mut().push("display");
    }
}

/// Records each write as one message, or fails every write with `fail_with`.
pub struct FakePeer {
    pub received: Rc<RefCell<Vec<String>>>,
    pub attempts: Rc<Cell<usize>>,
    pub fail_with: Option<io::ErrorKind>,
    pub log: DropLog,
}

impl FakePeer {
    pub fn new(log: &DropLog) -> Self {
        Self {
            received: Rc::new(RefCell::new(Vec::new())),
            attempts: Rc::new(Cell::new(0)),
            fail_with: None,
            log: log.clone(),
        }
    }
}

impl Write for FakePeer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.attempts.set(self.attempts.get() + 1);
        if let Some(kind) = self.fail_with {
            return Err(io::Error::from(kind));
        }
        self.received
            .borrow_mut()
            .push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FakePeer {
    fn drop(&mut self) {
        self.log.borrow_mut().push("connection");
    }
}
