//! Error types for png-crc-fix

use std::io;

/// Result type for png-crc-fix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while checking or repairing a PNG file
///
/// Truncated or corrupted chunk records are deliberately absent: the decoder
/// stops at the first short read and returns what it has.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (open, seek, write or flush)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The first 8 bytes are not the PNG signature
    #[error("Not a PNG")]
    NotPng,
}
