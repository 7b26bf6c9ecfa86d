use super::error::{RecordError, RecordResult};
use crate::file::PageId;

/// Slot identifier within a page
pub type SlotId = usize;

/// Maximum payload length in bytes
pub const PAYLOAD_SIZE: usize = 60;

/// Encoded record width: 4-byte key + fixed-width payload
pub const RECORD_SIZE: usize = 4 + PAYLOAD_SIZE;

/// Physical location of a record (page + slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot_id: SlotId,
}

impl RecordId {
    pub fn new(page_id: PageId, slot_id: SlotId) -> Self {
        Self { page_id, slot_id }
    }
}

/// A fixed-width record: an `i32` key plus a short UTF-8 payload.
///
/// On disk the key is little-endian and the payload is padded with NUL bytes
/// to `PAYLOAD_SIZE`, so every record occupies exactly `RECORD_SIZE` bytes
/// and slots are addressable by index. NUL terminates the payload on decode,
/// so payloads must not contain one; `new` enforces this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: i32,
    payload: String,
}

impl Record {
    /// Create a record; fails if the payload exceeds `PAYLOAD_SIZE` bytes or
    /// contains a NUL byte.
    pub fn new(key: i32, payload: impl Into<String>) -> RecordResult<Self> {
        let payload = payload.into();
        if payload.len() > PAYLOAD_SIZE {
            return Err(RecordError::PayloadTooLong {
                len: payload.len(),
                max: PAYLOAD_SIZE,
            });
        }
        if payload.contains('\0') {
            return Err(RecordError::InvalidPayload(
                "payload must not contain NUL bytes".to_string(),
            ));
        }
        Ok(Self { key, payload })
    }

    pub fn key(&self) -> i32 {
        self.key
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Encode to the fixed `RECORD_SIZE` byte layout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut result = [0u8; RECORD_SIZE];
        result[..4].copy_from_slice(&self.key.to_le_bytes());
        result[4..4 + self.payload.len()].copy_from_slice(self.payload.as_bytes());
        result
    }

    /// Decode from a `RECORD_SIZE` byte slice. The payload ends at the first
    /// NUL byte.
    pub fn from_bytes(data: &[u8]) -> RecordResult<Self> {
        if data.len() != RECORD_SIZE {
            return Err(RecordError::Deserialization(format!(
                "Expected {} bytes for record, got {}",
                RECORD_SIZE,
                data.len()
            )));
        }

        let key = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let payload_bytes = &data[4..];
        let end = payload_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(payload_bytes.len());
        let payload = String::from_utf8(payload_bytes[..end].to_vec())
            .map_err(|e| RecordError::Deserialization(format!("Invalid UTF-8: {}", e)))?;

        Ok(Self { key, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let record = Record::new(42, "hello").unwrap();
        let bytes = record.to_bytes();
        assert_eq!(bytes.len(), RECORD_SIZE);

        let restored = Record::from_bytes(&bytes).unwrap();
        assert_eq!(record, restored);
        assert_eq!(restored.key(), 42);
        assert_eq!(restored.payload(), "hello");
    }

    #[test]
    fn test_negative_key() {
        let record = Record::new(-17, "neg").unwrap();
        let restored = Record::from_bytes(&record.to_bytes()).unwrap();
        assert_eq!(restored.key(), -17);
    }

    #[test]
    fn test_payload_padded_with_nuls() {
        let record = Record::new(1, "ab").unwrap();
        let bytes = record.to_bytes();
        assert_eq!(&bytes[4..6], b"ab");
        assert!(bytes[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_full_width_payload() {
        let payload = "x".repeat(PAYLOAD_SIZE);
        let record = Record::new(7, payload.clone()).unwrap();
        let restored = Record::from_bytes(&record.to_bytes()).unwrap();
        assert_eq!(restored.payload(), payload);
    }

    #[test]
    fn test_payload_too_long() {
        let result = Record::new(1, "x".repeat(PAYLOAD_SIZE + 1));
        assert!(matches!(result, Err(RecordError::PayloadTooLong { .. })));
    }

    #[test]
    fn test_payload_with_nul_rejected() {
        // NUL terminates the payload on decode, so it cannot round-trip.
        let result = Record::new(1, "ab\0cd");
        assert!(matches!(result, Err(RecordError::InvalidPayload(_))));
    }

    #[test]
    fn test_wrong_length_decode() {
        let result = Record::from_bytes(&[0u8; RECORD_SIZE - 1]);
        assert!(matches!(result, Err(RecordError::Deserialization(_))));
    }
}
