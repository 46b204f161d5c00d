//! Error types for workbook parsing

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort a parse. No partial metadata is returned.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0}. Expected .twb or .twbx")]
    UnsupportedFileType(String),

    #[error("No .twb document found in archive: {}", .0.display())]
    NoDocumentInArchive(PathBuf),

    #[error("Malformed XML at position {position}: {message}")]
    MalformedXml { position: u64, message: String },

    #[error("Failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub(crate) fn malformed(position: u64, message: impl Into<String>) -> Self {
        ParseError::MalformedXml {
            position,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
