use crate::file::FileError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid slot: slot_id={0}")]
    InvalidSlot(usize),

    #[error("Slot already in use: slot_id={0}")]
    SlotInUse(usize),

    #[error("Slot is empty: slot_id={0}")]
    SlotEmpty(usize),

    #[error("Payload too long: {len} bytes exceeds maximum {max}")]
    PayloadTooLong { len: usize, max: usize },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(i32),

    #[error("Unknown page offset in directory: {0}")]
    UnknownPageOffset(u64),

    #[error("Page full: page_id={0}")]
    PageFull(usize),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

pub type RecordResult<T> = Result<T, RecordError>;
