//! 5-byte address-event record layout
//!
//! Each record is packed big-endian, MSB first:
//!
//! ```text
//! byte0                          x         (0-255)
//! byte1                          y         (0-255)
//! byte2 bit7                     channel   (0-1)
//! byte2[6:0] ++ byte3 ++ byte4   timestamp (23-bit, microseconds)
//! ```
//!
//! A spike file is a plain concatenation of records with no header.

use crate::error::{EventError, Result};

/// Size of one encoded record in bytes
pub const RECORD_SIZE: usize = 5;

/// Largest timestamp the 23-bit field can carry
pub const MAX_TIMESTAMP: u32 = (1 << 23) - 1;

/// Largest channel the single channel bit can carry
pub const MAX_CHANNEL: u8 = 1;

const CHANNEL_BIT: u8 = 0x80;
const TIMESTAMP_HIGH_MASK: u8 = 0x7F;

/// One decoded spike: sensor position, channel and raw timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressEvent {
    /// Column on the sensor
    pub x: u8,
    /// Row on the sensor
    pub y: u8,
    /// Polarity channel (0 or 1)
    pub channel: u8,
    /// Timestamp in raw time units (microseconds)
    pub timestamp: u32,
}

impl AddressEvent {
    /// Create a new event
    pub const fn new(x: u8, y: u8, channel: u8, timestamp: u32) -> Self {
        Self {
            x,
            y,
            channel,
            timestamp,
        }
    }
}

/// Decode a single record.
///
/// Fails with [`EventError::MalformedRecord`] unless `bytes` is exactly
/// [`RECORD_SIZE`] long.
pub fn decode_record(bytes: &[u8]) -> Result<AddressEvent> {
    let raw: &[u8; RECORD_SIZE] = bytes
        .try_into()
        .map_err(|_| EventError::malformed(bytes.len()))?;
    Ok(decode_raw(raw))
}

#[inline]
fn decode_raw(raw: &[u8; RECORD_SIZE]) -> AddressEvent {
    let timestamp = (u32::from(raw[2] & TIMESTAMP_HIGH_MASK) << 16)
        | (u32::from(raw[3]) << 8)
        | u32::from(raw[4]);

    AddressEvent {
        x: raw[0],
        y: raw[1],
        channel: (raw[2] & CHANNEL_BIT) >> 7,
        timestamp,
    }
}

/// Encode a single event into its record bytes
pub fn encode_record(event: &AddressEvent) -> Result<[u8; RECORD_SIZE]> {
    if event.channel > MAX_CHANNEL {
        return Err(EventError::field_out_of_range(
            "channel",
            u64::from(event.channel),
            u64::from(MAX_CHANNEL),
        ));
    }
    if event.timestamp > MAX_TIMESTAMP {
        return Err(EventError::field_out_of_range(
            "timestamp",
            u64::from(event.timestamp),
            u64::from(MAX_TIMESTAMP),
        ));
    }

    let ts = event.timestamp;
    Ok([
        event.x,
        event.y,
        (event.channel << 7) | ((ts >> 16) as u8 & TIMESTAMP_HIGH_MASK),
        (ts >> 8) as u8,
        ts as u8,
    ])
}

/// Iterator over the records of a contiguous buffer.
///
/// Yields a [`EventError::MalformedRecord`] for a trailing partial record and
/// stops afterwards.
pub struct RecordIter<'a> {
    chunks: std::slice::ChunksExact<'a, u8>,
    done: bool,
}

impl<'a> RecordIter<'a> {
    /// Iterate over the records in `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            chunks: bytes.chunks_exact(RECORD_SIZE),
            done: false,
        }
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<AddressEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(chunk) = self.chunks.next() {
            return Some(decode_record(chunk));
        }
        self.done = true;
        let rest = self.chunks.remainder();
        if rest.is_empty() {
            None
        } else {
            Some(Err(EventError::malformed(rest.len())))
        }
    }
}

/// Decode every record of a contiguous buffer, preserving order
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<AddressEvent>> {
    let mut events = Vec::with_capacity(bytes.len() / RECORD_SIZE);
    for event in RecordIter::new(bytes) {
        events.push(event?);
    }
    Ok(events)
}

/// Encode events back to back into one buffer
pub fn encode_stream(events: &[AddressEvent]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(events.len() * RECORD_SIZE);
    for event in events {
        bytes.extend_from_slice(&encode_record(event)?);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_known_record() {
        let event = decode_record(&[0x12, 0x10, 0x80, 0x03, 0x7d]).unwrap();
        assert_eq!(event, AddressEvent::new(18, 16, 1, 893));
    }

    #[test]
    fn test_decode_channel_zero_and_max_timestamp() {
        let event = decode_record(&[0xff, 0x00, 0x7f, 0xff, 0xff]).unwrap();
        assert_eq!(event.x, 255);
        assert_eq!(event.y, 0);
        assert_eq!(event.channel, 0);
        assert_eq!(event.timestamp, MAX_TIMESTAMP);
    }

    #[test]
    fn test_decode_wrong_length() {
        for len in [0usize, 1, 4, 6, 10] {
            let bytes = vec![0u8; len];
            let err = decode_record(&bytes).unwrap_err();
            assert!(
                matches!(err, EventError::MalformedRecord { expected: 5, found } if found == len),
                "length {} should be rejected",
                len
            );
        }
    }

    #[test]
    fn test_encode_known_record() {
        let bytes = encode_record(&AddressEvent::new(18, 16, 1, 893)).unwrap();
        assert_eq!(bytes, [0x12, 0x10, 0x80, 0x03, 0x7d]);
    }

    #[test]
    fn test_encode_rejects_unrepresentable_fields() {
        let err = encode_record(&AddressEvent::new(0, 0, 2, 0)).unwrap_err();
        assert!(matches!(err, EventError::FieldOutOfRange { field: "channel", .. }));

        let err = encode_record(&AddressEvent::new(0, 0, 0, MAX_TIMESTAMP + 1)).unwrap_err();
        assert!(matches!(err, EventError::FieldOutOfRange { field: "timestamp", .. }));
    }

    #[test]
    fn test_decode_stream_preserves_order() {
        let bytes = [
            0x12, 0x10, 0x80, 0x03, 0x7d, // (18, 16, 1, 893)
            0x00, 0x01, 0x00, 0x00, 0x05, // (0, 1, 0, 5)
            0x02, 0x02, 0x80, 0x00, 0x01, // (2, 2, 1, 1)
        ];
        let events = decode_stream(&bytes).unwrap();
        assert_eq!(
            events,
            vec![
                AddressEvent::new(18, 16, 1, 893),
                AddressEvent::new(0, 1, 0, 5),
                AddressEvent::new(2, 2, 1, 1),
            ]
        );
    }

    #[test]
    fn test_decode_stream_trailing_bytes() {
        let bytes = [0x12, 0x10, 0x80, 0x03, 0x7d, 0x00, 0x01];
        let err = decode_stream(&bytes).unwrap_err();
        assert!(matches!(err, EventError::MalformedRecord { found: 2, .. }));

        let mut iter = RecordIter::new(&bytes);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_empty_stream() {
        assert!(decode_stream(&[]).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn decode_is_total_and_deterministic(bytes in proptest::array::uniform5(any::<u8>())) {
            let a = decode_record(&bytes).unwrap();
            let b = decode_record(&bytes).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a.channel <= MAX_CHANNEL);
            prop_assert!(a.timestamp <= MAX_TIMESTAMP);
            prop_assert_eq!(encode_record(&a).unwrap(), bytes);
        }
    }
}
