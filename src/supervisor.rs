//! Poll supervisor: owns the detector connection for the life of the process.
//!
//! ```text
//!            NoPortAvailable / backoff
//!          ┌──────────┐
//!          ▼          │
//!        Idle ────────┘
//!          │ path
//!          ▼
//!     Connecting ── OpenError / backoff ──► Idle
//!          │ port
//!          ▼
//!       Polling ◄─── interval ───┐
//!          │ exchange ok ────────┘
//!          │ ProtocolError
//!          ▼
//!       Closing ── drop port / backoff ──► Idle
//! ```
//!
//! There is no terminal state. The loop only ends when its
//! [`CancellationToken`] fires, which every wait point observes.

use crate::error::PollError;
use crate::locator::PortLocator;
use crate::port::{PortConfiguration, PortOpener, SerialPortAdapter};
use crate::protocol;
use crate::store::{ReadingStore, Status};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_NO_PORT_BACKOFF: Duration = Duration::from_secs(3);
pub const DEFAULT_PINNED_BACKOFF: Duration = Duration::from_secs(3);
pub const DEFAULT_DISCOVERED_BACKOFF: Duration = Duration::from_secs(1);

/// Timing and link parameters for the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between exchanges on a healthy connection.
    pub poll_interval: Duration,
    /// Wait after discovery found nothing.
    pub no_port_backoff: Duration,
    /// Wait before reconnecting to a pinned path.
    pub pinned_backoff: Duration,
    /// Wait before rediscovering after a discovered port failed.
    pub discovered_backoff: Duration,
    /// Link parameters used for every open.
    pub port: PortConfiguration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            no_port_backoff: DEFAULT_NO_PORT_BACKOFF,
            pinned_backoff: DEFAULT_PINNED_BACKOFF,
            discovered_backoff: DEFAULT_DISCOVERED_BACKOFF,
            port: PortConfiguration::default(),
        }
    }
}

/// Where the device path comes from.
#[derive(Debug, Clone)]
pub enum PortSource {
    /// Always use this path; discovery is bypassed.
    Pinned(String),
    /// Ask the locator on every Idle pass.
    Discover(PortLocator),
}

type Port = Box<dyn SerialPortAdapter>;

enum State {
    Idle,
    Connecting { path: String },
    Polling { port: Port },
    Closing { port: Option<Port>, reason: PollError },
}

/// Runs the connect/poll/reconnect cycle and publishes readings to the store.
#[derive(Debug)]
pub struct PollSupervisor {
    source: PortSource,
    opener: Arc<dyn PortOpener>,
    store: ReadingStore,
    settings: PollSettings,
}

impl PollSupervisor {
    pub fn new(
        source: PortSource,
        opener: Arc<dyn PortOpener>,
        store: ReadingStore,
        settings: PollSettings,
    ) -> Self {
        Self {
            source,
            opener,
            store,
            settings,
        }
    }

    /// Run on a new task until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    pub async fn run(self, cancel: CancellationToken) {
        info!(
            source = ?self.source,
            interval_ms = self.settings.poll_interval.as_millis() as u64,
            "Poll supervisor started"
        );

        let mut state = State::Idle;
        while !cancel.is_cancelled() {
            state = match state {
                State::Idle => match self.resolve_path() {
                    Ok(path) => State::Connecting { path },
                    Err(e) => {
                        warn!(error = %e, "Serial port not found");
                        if !pause(&cancel, self.settings.no_port_backoff).await {
                            break;
                        }
                        State::Idle
                    }
                },
                State::Connecting { path } => match self.connect(path).await {
                    Ok(port) => {
                        info!(port = port.name(), "Serial port connected");
                        State::Polling { port }
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not open port");
                        if !pause(&cancel, self.reconnect_backoff()).await {
                            break;
                        }
                        State::Idle
                    }
                },
                State::Polling { port } => match self.poll_once(port).await {
                    Ok(port) => {
                        if !pause(&cancel, self.settings.poll_interval).await {
                            break;
                        }
                        State::Polling { port }
                    }
                    Err((port, reason)) => State::Closing { port, reason },
                },
                State::Closing { port, reason } => {
                    let name = port.as_ref().map(|p| p.name().to_string());
                    warn!(port = ?name, error = %reason, "Exchange failed, closing connection");
                    drop(port);
                    if !pause(&cancel, self.reconnect_backoff()).await {
                        break;
                    }
                    State::Idle
                }
            };
        }

        info!("Poll supervisor stopped");
    }

    fn resolve_path(&self) -> Result<String, PollError> {
        match &self.source {
            PortSource::Pinned(path) => Ok(path.clone()),
            PortSource::Discover(locator) => {
                let path = locator
                    .locate()
                    .map_err(|_| PollError::NoPortAvailable {
                        pattern: locator.pattern().to_string(),
                    })?;
                let path = path.to_string_lossy().into_owned();
                info!(port = %path, "Serial port found");
                Ok(path)
            }
        }
    }

    async fn connect(&self, path: String) -> Result<Port, PollError> {
        debug!(port = %path, baud = self.settings.port.baud_rate, "Connecting");
        let opener = Arc::clone(&self.opener);
        let config = self.settings.port;

        let opened = tokio::task::spawn_blocking(move || {
            let result = opener.open(&path, &config);
            (path, result)
        })
        .await
        .map_err(|e| PollError::TaskAborted(e.to_string()))?;

        match opened {
            (_, Ok(port)) => Ok(port),
            (path, Err(source)) => Err(PollError::Open { path, source }),
        }
    }

    /// One exchange on the blocking pool. The port is handed back on success
    /// and on protocol failure; it is lost only if the task itself died.
    async fn poll_once(&self, mut port: Port) -> Result<Port, (Option<Port>, PollError)> {
        let store = self.store.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let result = protocol::exchange(&mut *port, &store);
            (port, result)
        })
        .await;

        match joined {
            Ok((port, Ok(cpm))) => {
                info!(port = port.name(), cpm, status = %Status::from_cpm(cpm), "Reading updated");
                Ok(port)
            }
            Ok((port, Err(e))) => Err((Some(port), e.into())),
            Err(e) => Err((None, PollError::TaskAborted(e.to_string()))),
        }
    }

    fn reconnect_backoff(&self) -> Duration {
        match self.source {
            PortSource::Pinned(_) => self.settings.pinned_backoff,
            PortSource::Discover(_) => self.settings.discovered_backoff,
        }
    }
}

/// Sleep for `delay` unless cancelled first. Returns `false` on cancellation.
async fn pause(cancel: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
