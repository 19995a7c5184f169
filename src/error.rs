use std::path::PathBuf;

use thiserror::Error;

use crate::data::registry::MAX_DIMENSIONS;

/// Everything the cut core can report back to its caller.
///
/// None of these are fatal: a rejected operation leaves the registry as it
/// was before the call.
#[derive(Error, Debug)]
pub enum CutError {
    /// The input is not a usable table.
    #[error("invalid table: {message}")]
    Schema { message: String },

    /// A column does not have the row count of the primary axes.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    Shape {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' is not in the table")]
    UnknownColumn(String),

    #[error("all {} cut slots are in use", MAX_DIMENSIONS)]
    Capacity,

    #[error("no dimension '{0}' is registered")]
    NotFound(String),

    #[error("dimension '{0}' is already registered")]
    Duplicate(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bounds file could be read but not understood.
    #[error("malformed bounds file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl CutError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CutError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CutError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CutError>;
