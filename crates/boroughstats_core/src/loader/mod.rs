//! Record sources consumed by the repository at load time.
//!
//! # Responsibility
//! - Turn a raw tabular source into an ordered `Vec<Record>`.
//! - Normalize missing numeric fields to unknown before the engine sees them.
//!
//! # Invariants
//! - Source row order is preserved.
//! - Unreadable or structurally malformed input is an error, never a partial load.

use crate::model::record::Record;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod csv;

pub use self::csv::{parse_csv, CsvFileSource, DATE_FORMAT};

pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while reading a record source.
#[derive(Debug)]
pub enum LoadError {
    /// Source could not be read at all.
    Io(std::io::Error),
    /// Source has no header row.
    MissingHeader,
    /// A required column is absent from the header.
    MissingColumn(&'static str),
    /// A data row could not be parsed. `line` is 1-based and counts the header.
    Malformed { line: usize, message: String },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read record source: {err}"),
            Self::MissingHeader => write!(f, "record source has no header row"),
            Self::MissingColumn(name) => write!(f, "record source is missing column `{name}`"),
            Self::Malformed { line, message } => write!(f, "malformed row at line {line}: {message}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::MissingHeader | Self::MissingColumn(_) | Self::Malformed { .. } => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Loader contract: produce every record of a source, in source order.
pub trait RecordSource {
    /// Short human-readable label for logs.
    fn describe(&self) -> String;
    /// Reads and parses the whole source.
    fn read_records(&self) -> LoadResult<Vec<Record>>;
}

/// Source over records that were already parsed elsewhere.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    records: Vec<Record>,
}

impl VecSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for VecSource {
    fn describe(&self) -> String {
        format!("memory rows={}", self.records.len())
    }

    fn read_records(&self) -> LoadResult<Vec<Record>> {
        Ok(self.records.clone())
    }
}
