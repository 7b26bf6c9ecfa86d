use super::error::{RecordError, RecordResult};
use super::record::{Record, SlotId, RECORD_SIZE};
use crate::file::PAGE_SIZE;

/// Number of record slots per page
pub const SLOT_COUNT: usize = 16;

/// Slot bitmap width in bytes
const BITMAP_SIZE: usize = SLOT_COUNT.div_ceil(8);

// The bitmap plus all slots must fit in one page.
const _: () = assert!(BITMAP_SIZE + SLOT_COUNT * RECORD_SIZE <= PAGE_SIZE);

/// Zero-copy slotted-page view over a raw `PAGE_SIZE` buffer.
///
/// Layout: a slot bitmap of `BITMAP_SIZE` bytes followed by `SLOT_COUNT`
/// fixed-width record slots. The layout is a build constant, so an all-zero
/// buffer is a valid empty page and decoding never fails beyond a length
/// check. Bytes of unused slots are left as-is; only the bitmap decides
/// which slots hold records.
pub struct Page<'a> {
    buffer: &'a mut [u8],
}

impl<'a> Page<'a> {
    /// Format `buffer` as an empty page (all slots free).
    pub fn init(buffer: &'a mut [u8]) -> RecordResult<Self> {
        if buffer.len() != PAGE_SIZE {
            return Err(RecordError::Deserialization(format!(
                "Buffer must be PAGE_SIZE ({}) bytes, got {}",
                PAGE_SIZE,
                buffer.len()
            )));
        }
        buffer.fill(0);
        Ok(Self { buffer })
    }

    /// Wrap an existing page buffer without copying it.
    pub fn from_buffer(buffer: &'a mut [u8]) -> RecordResult<Self> {
        if buffer.len() != PAGE_SIZE {
            return Err(RecordError::Deserialization(format!(
                "Invalid page size: {} bytes",
                buffer.len()
            )));
        }
        Ok(Self { buffer })
    }

    /// Check if a slot holds a record. Out-of-range slots read as unused.
    pub fn is_slot_used(&self, slot_id: SlotId) -> bool {
        if slot_id >= SLOT_COUNT {
            return false;
        }
        let byte_idx = slot_id / 8;
        let bit_idx = slot_id % 8;
        (self.buffer[byte_idx] & (1 << bit_idx)) != 0
    }

    /// Find the lowest free slot, or None if the page is full.
    pub fn find_free_slot(&self) -> Option<SlotId> {
        (0..SLOT_COUNT).find(|&slot_id| !self.is_slot_used(slot_id))
    }

    /// Count of free slots in this page.
    pub fn free_slot_count(&self) -> usize {
        (0..SLOT_COUNT).filter(|&slot_id| !self.is_slot_used(slot_id)).count()
    }

    /// Store a record in a free slot and mark it used.
    pub fn insert_record(&mut self, slot_id: SlotId, record: &Record) -> RecordResult<()> {
        if slot_id >= SLOT_COUNT {
            return Err(RecordError::InvalidSlot(slot_id));
        }
        if self.is_slot_used(slot_id) {
            return Err(RecordError::SlotInUse(slot_id));
        }

        let start = BITMAP_SIZE + slot_id * RECORD_SIZE;
        self.buffer[start..start + RECORD_SIZE].copy_from_slice(&record.to_bytes());
        self.buffer[slot_id / 8] |= 1 << (slot_id % 8);
        Ok(())
    }

    /// Mark a used slot as free. The record bytes are left in place.
    pub fn delete_record(&mut self, slot_id: SlotId) -> RecordResult<()> {
        if slot_id >= SLOT_COUNT {
            return Err(RecordError::InvalidSlot(slot_id));
        }
        if !self.is_slot_used(slot_id) {
            return Err(RecordError::SlotEmpty(slot_id));
        }

        self.buffer[slot_id / 8] &= !(1 << (slot_id % 8));
        Ok(())
    }

    /// Decode the record stored in a used slot.
    pub fn get_record(&self, slot_id: SlotId) -> RecordResult<Record> {
        if slot_id >= SLOT_COUNT {
            return Err(RecordError::InvalidSlot(slot_id));
        }
        if !self.is_slot_used(slot_id) {
            return Err(RecordError::SlotEmpty(slot_id));
        }

        let start = BITMAP_SIZE + slot_id * RECORD_SIZE;
        Record::from_bytes(&self.buffer[start..start + RECORD_SIZE])
    }
}
