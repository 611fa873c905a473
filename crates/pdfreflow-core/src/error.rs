use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReflowError {
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid clip specification: {0}")]
    InvalidClip(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReflowError {
    /// True for the "input file is missing" tier of failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReflowError::FileNotFound(_))
    }
}
