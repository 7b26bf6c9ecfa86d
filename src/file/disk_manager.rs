use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use super::error::{FileError, FileResult};
use super::PAGE_SIZE;

/// Page-granular I/O on the data file.
///
/// Holds only the file path: every operation opens the file, transfers a
/// single page, and closes it again, so no handle outlives one call.
pub struct DiskManager {
    path: PathBuf,
}

impl DiskManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the page at `offset` from disk.
    ///
    /// The page must exist in full; a short read is an I/O error.
    pub fn read_page(&self, offset: u64) -> FileResult<Vec<u8>> {
        debug_assert_eq!(offset % PAGE_SIZE as u64, 0);

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; PAGE_SIZE];
        file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Write a full page at `offset`, creating the file on first write.
    pub fn write_page(&self, offset: u64, buffer: &[u8]) -> FileResult<()> {
        if buffer.len() != PAGE_SIZE {
            return Err(FileError::InvalidPageSize {
                expected: PAGE_SIZE,
                actual: buffer.len(),
            });
        }
        debug_assert_eq!(offset % PAGE_SIZE as u64, 0);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buffer)?;

        Ok(())
    }
}
