//! Mock serial port implementation for testing.
//!
//! `MockSerialPort` simulates a detector without hardware: replies are queued
//! up front, writes are logged, and an empty queue behaves like the link's
//! read timeout elapsing. `MockPortOpener` hands out scripted ports and
//! records every open attempt.

use super::error::PortError;
use super::traits::{PortConfiguration, PortOpener, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes returned by subsequent reads.
    read_queue: VecDeque<u8>,
    /// Every buffer passed to `write_bytes`.
    write_log: Vec<Vec<u8>>,
    /// Fail the next write with a broken pipe.
    fail_next_write: bool,
    /// Accept only this many bytes on the next write.
    short_write: Option<usize>,
    timeout: Duration,
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test can keep one handle while the code under
/// test owns another.
///
/// # Example
/// ```
/// use radmon_agent::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(&[0x00, 0x00, 0x00, 0x2D]);
///
/// port.write_bytes(b"<GETCPM>>").unwrap();
/// let mut buffer = [0u8; 4];
/// assert_eq!(port.read_bytes(&mut buffer).unwrap(), 4);
/// assert_eq!(port.get_write_log(), vec![b"<GETCPM>>".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_secs(1),
                ..Default::default()
            })),
        }
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Enqueue one big-endian CPM reply.
    pub fn enqueue_cpm(&mut self, cpm: u32) {
        self.enqueue_read(&cpm.to_be_bytes());
    }

    /// Make the next write fail as if the device had been unplugged.
    pub fn fail_next_write(&mut self) {
        self.state.lock().fail_next_write = true;
    }

    /// Make the next write accept only `accepted` bytes.
    pub fn short_next_write(&mut self, accepted: usize) {
        self.state.lock().short_write = Some(accepted);
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Get the number of bytes still queued for reading.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// True once every clone other than this one has been dropped, i.e. the
    /// code under test released its handle.
    pub fn is_released(&self) -> bool {
        Arc::strong_count(&self.state) == 1
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device disconnected",
            )));
        }

        state.write_log.push(data.to_vec());
        match state.short_write.take() {
            Some(accepted) => Ok(accepted.min(data.len())),
            None => Ok(data.len()),
        }
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            Err(PortError::timeout(state.timeout))
        } else {
            Ok(bytes_read)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

/// One recorded call to [`MockPortOpener::open`].
#[derive(Debug, Clone)]
pub struct OpenAttempt {
    pub path: String,
    pub config: PortConfiguration,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct OpenerState {
    script: VecDeque<Option<MockSerialPort>>,
    attempts: Vec<OpenAttempt>,
}

/// Hands out scripted mock ports.
///
/// Each `open` consumes the next script entry: `Some(port)` succeeds with a
/// clone of that port, `None` fails. Once the script is exhausted every open
/// fails with [`PortError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct MockPortOpener {
    state: Arc<Mutex<OpenerState>>,
}

impl MockPortOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the next open succeed with `port`.
    pub fn push_port(&self, port: MockSerialPort) {
        self.state.lock().script.push_back(Some(port));
    }

    /// Let the next open fail.
    pub fn push_failure(&self) {
        self.state.lock().script.push_back(None);
    }

    /// All open attempts so far.
    pub fn attempts(&self) -> Vec<OpenAttempt> {
        self.state.lock().attempts.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.state.lock().attempts.len()
    }
}

impl PortOpener for MockPortOpener {
    fn open(
        &self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        let mut state = self.state.lock();
        state.attempts.push(OpenAttempt {
            path: path.to_string(),
            config: *config,
            at: Instant::now(),
        });

        match state.script.pop_front() {
            Some(Some(port)) => {
                port.state.lock().timeout = config.timeout;
                Ok(Box::new(port))
            }
            Some(None) | None => Err(PortError::not_found(path)),
        }
    }
}
