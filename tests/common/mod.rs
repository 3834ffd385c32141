//! Shared test utilities for the radmon_agent integration tests.
//!
//! Provides:
//! - Millisecond-scale supervisor settings
//! - A harness wiring a supervisor to a mock opener and a fresh store
//! - Polling helpers for asserting on background progress
//! - JSON assertion helpers

#![allow(dead_code)]

use radmon_agent::port::{MockPortOpener, PortConfiguration};
use radmon_agent::{PollSettings, PollSupervisor, PortSource, ReadingStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const POLL_INTERVAL: Duration = Duration::from_millis(20);
pub const NO_PORT_BACKOFF: Duration = Duration::from_millis(60);
pub const PINNED_BACKOFF: Duration = Duration::from_millis(50);
pub const DISCOVERED_BACKOFF: Duration = Duration::from_millis(30);

/// Upper bound for anything the tests wait on.
pub const DEADLINE: Duration = Duration::from_secs(5);

/// Supervisor settings shrunk to milliseconds.
pub fn fast_settings() -> PollSettings {
    PollSettings {
        poll_interval: POLL_INTERVAL,
        no_port_backoff: NO_PORT_BACKOFF,
        pinned_backoff: PINNED_BACKOFF,
        discovered_backoff: DISCOVERED_BACKOFF,
        port: PortConfiguration::default(),
    }
}

/// A running supervisor plus the handles tests inspect.
pub struct Harness {
    pub opener: MockPortOpener,
    pub store: ReadingStore,
    pub cancel: CancellationToken,
    pub task: JoinHandle<()>,
}

impl Harness {
    /// Spawn a supervisor over `opener` reading from `source`.
    pub fn start(source: PortSource, opener: MockPortOpener) -> Self {
        let store = ReadingStore::new();
        let cancel = CancellationToken::new();
        let task = PollSupervisor::new(
            source,
            Arc::new(opener.clone()),
            store.clone(),
            fast_settings(),
        )
        .spawn(cancel.clone());

        Self {
            opener,
            store,
            cancel,
            task,
        }
    }

    /// Cancel the supervisor and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        tokio::time::timeout(Duration::from_secs(3), self.task)
            .await
            .expect("supervisor did not stop after cancellation")
            .expect("supervisor task panicked");
    }
}

/// Poll `condition` until it holds or `DEADLINE` passes.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let started = tokio::time::Instant::now();
    while !condition() {
        if started.elapsed() > DEADLINE {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Assert that a JSON value contains specific fields with expected values.
pub fn assert_json_contains(actual: &Value, expected: &Value) {
    match (actual, expected) {
        (Value::Object(actual_map), Value::Object(expected_map)) => {
            for (key, expected_value) in expected_map {
                let actual_value = actual_map
                    .get(key)
                    .unwrap_or_else(|| panic!("Expected key '{}' not found in actual JSON", key));
                assert_json_contains(actual_value, expected_value);
            }
        }
        _ => {
            assert_eq!(
                actual, expected,
                "JSON values differ: expected {:?}, got {:?}",
                expected, actual
            );
        }
    }
}
