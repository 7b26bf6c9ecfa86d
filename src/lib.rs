pub mod file;
pub mod record;

pub use file::{
    create_policy, BufferManager, ClockPolicy, DiskManager, FileError, FileResult, LruPolicy,
    MruPolicy, PageId, ReplacementPolicy, PAGE_SIZE,
};
pub use record::{
    HeapFile, PageDirectory, PageInfo, Record, RecordError, RecordId, RecordResult, SlotId,
    SLOT_COUNT,
};
