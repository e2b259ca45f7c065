//! Accept-then-stream over a real loopback socket.

mod common;

use std::io::Read;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use common::{drop_log, face, DropLog, FakeCamera, FakeDetector, FakeDisplay};
use emotion_bridge::bridge::{stream_to_peer, StreamEnd};
use emotion_bridge::emotion::Emotion;
use emotion_bridge::error::StartupError;
use emotion_bridge::transport::Listener;

fn never() -> bool {
    false
}

fn camera(frames: usize, log: &DropLog) -> FakeCamera {
    FakeCamera {
        remaining: frames,
        log: log.clone(),
    }
}

#[test]
fn test_peer_receives_reports_then_eof() {
    let log = drop_log();
    let listener = Listener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr();

    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        let mut received = String::new();
        stream.read_to_string(&mut received).unwrap();
        received
    });

    let end = stream_to_peer(
        camera(2, &log),
        FakeDetector::always(vec![face(Emotion::Happy, 0.732)], &log),
        FakeDisplay::new(&log),
        listener,
        Some(Duration::from_secs(5)),
        &never,
    )
    .unwrap();

    assert!(matches!(end, StreamEnd::EndOfStream));
    // read_to_string only returns once the bridge closed the connection
    assert_eq!(client.join().unwrap(), "happy:73.2happy:73.2");
    assert_eq!(*log.borrow(), vec!["camera", "classifier", "display"]);
    // ...and the listener is gone too
    assert!(Listener::bind(&addr.to_string()).is_ok());
}

#[test]
fn test_peer_hang_up_ends_stream_cleanly() {
    let log = drop_log();
    let listener = Listener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr();
    let client = thread::spawn(move || drop(TcpStream::connect(addr).unwrap()));

    let mut detector = FakeDetector::always(vec![face(Emotion::Sad, 0.25)], &log);
    detector.delay = Some(Duration::from_millis(2));
    let calls = detector.calls.clone();

    let end = stream_to_peer(
        camera(5_000, &log),
        detector,
        FakeDisplay::new(&log),
        listener,
        Some(Duration::from_secs(5)),
        &never,
    )
    .unwrap();
    client.join().unwrap();

    assert!(matches!(end, StreamEnd::PeerDisconnected), "got {:?}", end);
    assert!(calls.get() < 5_000);
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn test_interrupt_before_peer_connects() {
    let log = drop_log();
    let listener = Listener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr();

    let end = stream_to_peer(
        camera(1, &log),
        FakeDetector::always(vec![], &log),
        FakeDisplay::new(&log),
        listener,
        None,
        &|| true,
    )
    .unwrap();

    assert!(matches!(end, StreamEnd::Interrupted));
    assert_eq!(log.borrow().len(), 3);
    assert!(Listener::bind(&addr.to_string()).is_ok());
}

#[test]
fn test_accept_timeout_is_startup_error() {
    let log = drop_log();
    let listener = Listener::bind("127.0.0.1:0").unwrap();

    let result = stream_to_peer(
        camera(1, &log),
        FakeDetector::always(vec![], &log),
        FakeDisplay::new(&log),
        listener,
        Some(Duration::from_millis(100)),
        &never,
    );

    match result {
        Err(StartupError::AcceptTimeout { timeout, .. }) => {
            assert_eq!(timeout, Duration::from_millis(100))
        }
        other => panic!("Expected AcceptTimeout, got {:?}", other),
    }
    assert_eq!(log.borrow().len(), 3);
}
