//! GMC `<GETCPM>>` request/response exchange.
//!
//! The device answers the 9-byte ASCII query with exactly four bytes: the
//! current counts per minute as a big-endian `u32`. There is no envelope,
//! checksum, or terminator, and only one request is ever in flight.

use crate::port::{PortError, SerialPortAdapter};
use crate::store::ReadingStore;
use thiserror::Error;
use tracing::debug;

/// Query frame sent to the detector.
pub const GETCPM_COMMAND: &[u8; 9] = b"<GETCPM>>";

/// Size of the detector's reply.
pub const CPM_REPLY_LEN: usize = 4;

/// Failure of a single exchange. Any of these ends the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("could not write query: {0}")]
    Write(#[source] PortError),

    #[error("query truncated: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("could not read reply: {0}")]
    Read(#[source] PortError),

    #[error("wrong response: got {got} of {expected} bytes")]
    ShortRead { got: usize, expected: usize },
}

/// Decode a reply frame into CPM.
pub fn decode_cpm(reply: [u8; CPM_REPLY_LEN]) -> u32 {
    u32::from_be_bytes(reply)
}

/// Run one query/reply cycle and publish the result.
///
/// The store is only touched after a full reply has been decoded.
pub fn exchange(
    port: &mut dyn SerialPortAdapter,
    store: &ReadingStore,
) -> Result<u32, ProtocolError> {
    let cpm = request_cpm(port)?;
    store.update(cpm);
    Ok(cpm)
}

/// Query the detector without touching any shared state.
pub fn request_cpm(port: &mut dyn SerialPortAdapter) -> Result<u32, ProtocolError> {
    let written = port
        .write_bytes(GETCPM_COMMAND)
        .map_err(ProtocolError::Write)?;
    if written != GETCPM_COMMAND.len() {
        return Err(ProtocolError::ShortWrite {
            written,
            expected: GETCPM_COMMAND.len(),
        });
    }

    let mut reply = [0u8; CPM_REPLY_LEN];
    let got = port.read_bytes(&mut reply).map_err(ProtocolError::Read)?;
    if got != CPM_REPLY_LEN {
        return Err(ProtocolError::ShortRead {
            got,
            expected: CPM_REPLY_LEN,
        });
    }

    let cpm = decode_cpm(reply);
    debug!(port = port.name(), cpm, "CPM reply decoded");
    Ok(cpm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;
    use crate::store::{Reading, Status};

    #[test]
    fn test_exchange_updates_store() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(&[0x00, 0x00, 0x00, 0x2D]);
        let store = ReadingStore::new();

        let cpm = exchange(&mut port, &store).unwrap();

        assert_eq!(cpm, 45);
        assert_eq!(store.snapshot(), Reading::new(45));
        assert_eq!(store.snapshot().status(), Status::Ok);
        assert_eq!(port.get_write_log(), vec![b"<GETCPM>>".to_vec()]);
    }

    #[test]
    fn test_decode_is_big_endian() {
        assert_eq!(decode_cpm([0x00, 0x00, 0x01, 0x00]), 256);
        assert_eq!(decode_cpm([0x01, 0x02, 0x03, 0x04]), 0x0102_0304);
    }

    #[test]
    fn test_short_read_is_not_decoded() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(&[0x00, 0x00, 0x2D]);
        let store = ReadingStore::new();
        store.update(12);

        let err = exchange(&mut port, &store).unwrap_err();

        assert!(matches!(err, ProtocolError::ShortRead { got: 3, expected: 4 }));
        assert_eq!(store.snapshot(), Reading::new(12));
    }

    #[test]
    fn test_silent_device_is_read_error() {
        let mut port = MockSerialPort::new("MOCK0");
        let store = ReadingStore::new();
        store.update(45);

        let err = exchange(&mut port, &store).unwrap_err();

        assert!(matches!(err, ProtocolError::Read(PortError::Timeout(_))));
        assert_eq!(store.snapshot(), Reading::new(45));
    }

    #[test]
    fn test_write_failure_skips_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.fail_next_write();
        port.enqueue_cpm(99);
        let store = ReadingStore::new();

        let err = exchange(&mut port, &store).unwrap_err();

        assert!(matches!(err, ProtocolError::Write(_)));
        assert_eq!(port.available_bytes(), 4);
        assert_eq!(store.snapshot(), Reading::default());
    }

    #[test]
    fn test_short_write_is_rejected() {
        let mut port = MockSerialPort::new("MOCK0");
        port.short_next_write(5);
        port.enqueue_cpm(10);
        let store = ReadingStore::new();

        let err = exchange(&mut port, &store).unwrap_err();

        assert!(matches!(
            err,
            ProtocolError::ShortWrite { written: 5, expected: 9 }
        ));
        assert_eq!(store.snapshot(), Reading::default());
    }

    #[test]
    fn test_extra_bytes_stay_for_next_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_cpm(7);
        port.enqueue_cpm(8);
        let store = ReadingStore::new();

        assert_eq!(exchange(&mut port, &store).unwrap(), 7);
        assert_eq!(exchange(&mut port, &store).unwrap(), 8);
        assert_eq!(store.snapshot().value(), 8);
    }
}
