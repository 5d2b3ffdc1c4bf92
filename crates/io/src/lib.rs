// File I/O operations

pub mod csv;
pub mod format;
pub mod json;
pub mod xlsx;

use std::path::PathBuf;

use thiserror::Error;

pub use format::{infer_format, load, InputFormat};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("{}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input: {0}")]
    Stream(#[source] std::io::Error),

    #[error("line {line}: {message}")]
    Csv { line: u64, message: String },

    #[error("{0}")]
    Excel(String),

    #[error("input has no header row")]
    Empty,
}

impl IoError {
    /// Parse failures (bad CSV, unreadable workbook, no header) as opposed to
    /// the filesystem or stream refusing to cooperate.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Csv { .. } | Self::Excel(_) | Self::Empty)
    }
}
