//! Source-reader contract.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type SourceResult<T> = Result<T, SourceError>;

/// Lazy, finite, single-pass sequence of parsed entities.
pub type EntityStream<E> = Box<dyn Iterator<Item = SourceResult<E>>>;

#[derive(Debug)]
pub enum SourceError {
    /// Data could not be located or validated.
    Unavailable { path: PathBuf, message: String },
    Io(std::io::Error),
    /// A record could not be parsed. `line` is 1-based.
    Parse { line: usize, message: String },
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { path, message } => {
                write!(f, "source `{}` is unavailable: {message}", path.display())
            }
            Self::Io(err) => write!(f, "{err}"),
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Unavailable { .. } | Self::Parse { .. } => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for SourceError {
    fn from(value: csv::Error) -> Self {
        let line = value
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(0);
        let message = value.to_string();
        match value.into_kind() {
            csv::ErrorKind::Io(err) => Self::Io(err),
            _ => Self::Parse { line, message },
        }
    }
}

/// Provider of entities for one import run.
pub trait SourceReader<E> {
    /// Makes the data locally available; must be idempotent.
    fn ensure_data_is_available(&mut self) -> SourceResult<()>;
    /// Number of records `load_entities` will yield.
    fn count_total_records(&mut self) -> SourceResult<u64>;
    fn load_entities(&mut self) -> SourceResult<EntityStream<E>>;
    /// Releases whatever `ensure_data_is_available` acquired.
    fn cleanup(&mut self) -> SourceResult<()>;
}
