//! Tests requiring an attached detector.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export TEST_PORT=/dev/tty.usbserial-1410   # optional, discovery otherwise
//! cargo test --features hardware-tests -- --ignored
//! ```

use radmon_agent::port::{PortConfiguration, SerialPortAdapter, SyncSerialPort};
use radmon_agent::protocol::request_cpm;
use radmon_agent::{exchange, PortLocator, ReadingStore, Status};
use std::env;

/// Resolve the detector path from `TEST_PORT` or discovery.
fn detector_path() -> Option<String> {
    env::var("TEST_PORT").ok().or_else(|| {
        PortLocator::default()
            .locate()
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    })
}

#[test]
#[ignore]
fn test_detector_answers_getcpm() {
    let Some(path) = detector_path() else {
        eprintln!("Skipping: no detector found (set TEST_PORT)");
        return;
    };

    let mut port = SyncSerialPort::open(&path, PortConfiguration::default())
        .expect("Failed to open detector port");
    assert_eq!(port.name(), path);

    let store = ReadingStore::new();
    let cpm = exchange(&mut port, &store).expect("GETCPM exchange failed");

    let reading = store.snapshot();
    assert_eq!(reading.value(), cpm);
    assert_eq!(reading.status(), Status::from_cpm(cpm));
    println!("Detector at {} reports {} CPM ({})", path, cpm, reading.status());
}

#[test]
#[ignore]
fn test_consecutive_exchanges_on_one_connection() {
    let Some(path) = detector_path() else {
        eprintln!("Skipping: no detector found (set TEST_PORT)");
        return;
    };

    let mut port = SyncSerialPort::open(&path, PortConfiguration::default())
        .expect("Failed to open detector port");

    for _ in 0..3 {
        let cpm = request_cpm(&mut port).expect("GETCPM exchange failed");
        assert!(cpm < 1_000_000, "implausible CPM {cpm}");
    }
}
