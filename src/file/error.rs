use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid page size: expected {expected}, got {actual}")]
    InvalidPageSize { expected: usize, actual: usize },

    #[error("Page not resident in buffer pool: offset={0}")]
    PageNotResident(u64),

    #[error("{0} policy has no page to evict")]
    NoEvictionCandidate(&'static str),
}

pub type FileResult<T> = Result<T, FileError>;
