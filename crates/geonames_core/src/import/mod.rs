//! Streaming, idempotent bulk import.
//!
//! # Responsibility
//! - Define the source-reader contract and a file-backed GeoNames reader.
//! - Load a source into a store in bounded batches.
//!
//! # Invariants
//! - At most one batch of entities is resident at a time.
//! - The destination is truncated only when a re-import is needed.
//! - Source cleanup runs exactly once, on every exit path.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod orchestrator;
pub mod source;
pub mod tsv;

pub use orchestrator::{ImportBatches, ImportOrchestrator, ImportRun, DEFAULT_BATCH_SIZE};
pub use source::{EntityStream, SourceError, SourceReader, SourceResult};
pub use tsv::TsvSource;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug)]
pub enum ImportError {
    /// Source reported zero records; nothing was mutated.
    EmptyDataset,
    InvalidBatchSize(usize),
    Source(SourceError),
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataset => write!(f, "source has no records to import"),
            Self::InvalidBatchSize(size) => write!(f, "batch size must be at least 1, got {size}"),
            Self::Source(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyDataset | Self::InvalidBatchSize(_) => None,
            Self::Source(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SourceError> for ImportError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
