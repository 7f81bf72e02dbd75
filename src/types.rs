//! Error type and result alias shared by all modules.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageCompressionError {
    /// Malformed or truncated PGM data. `offset` is the byte position
    /// (or sample position for in-memory images) where parsing failed.
    #[error("Malformed PGM data at offset {offset}: {reason}")]
    FormatError { offset: usize, reason: String },
    #[error("SVD computation failed: {0}")]
    NumericalError(String),
    #[error("Invalid rank {rank}, require 1 <= rank <= {max_rank}")]
    InvalidRankError { rank: usize, max_rank: usize },
    #[error("I/O error")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImageCompressionError>;

impl ImageCompressionError {
    pub(crate) fn format(offset: usize, reason: impl Into<String>) -> Self {
        ImageCompressionError::FormatError {
            offset,
            reason: reason.into(),
        }
    }
}
