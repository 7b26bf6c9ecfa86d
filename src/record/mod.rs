mod directory;
mod error;
mod heap_file;
mod page;
mod record;

pub use directory::{PageDirectory, PageInfo};
pub use error::{RecordError, RecordResult};
pub use heap_file::HeapFile;
pub use page::{Page, SLOT_COUNT};
pub use record::{Record, RecordId, SlotId, PAYLOAD_SIZE, RECORD_SIZE};
