//! Detect and repair corrupted CRC32 trailers in PNG files.
//!
//! A PNG file is an 8-byte signature followed by length-prefixed chunks,
//! each ending in a CRC-32 over the chunk's type code and payload. This crate
//! walks that chunk sequence, recomputes every CRC and overwrites the ones
//! that do not match, in place. No other byte of the file is touched and the
//! file length never changes.
//!
//! # Design Principles
//!
//! - **Tolerant decoding**: a truncated or corrupt record ends decoding; the
//!   chunks read before it are still checked and repaired
//! - **Minimal writes**: only wrong CRC fields are written, so repairing a
//!   clean file performs no writes at all
//! - **Seekable sources**: works on any `Read + Seek` (files, buffers)
//!
//! # Quick Start
//!
//! ```no_run
//! use png_crc_fix::PngIO;
//!
//! # fn main() -> png_crc_fix::Result<()> {
//! let (chunks, report) = PngIO::new().fix_file("image.png", false)?;
//! for chunk in &chunks {
//!     println!("{}", chunk);
//! }
//! println!("{} CRCs corrected", report.corrected().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Stream API
//!
//! ```no_run
//! use png_crc_fix::PngIO;
//! use std::fs::OpenOptions;
//!
//! # fn main() -> png_crc_fix::Result<()> {
//! let mut file = OpenOptions::new().read(true).write(true).open("image.png")?;
//! if !PngIO::is_png(&mut file) {
//!     return Err(png_crc_fix::Error::NotPng);
//! }
//!
//! let handler = PngIO::new();
//! let chunks = handler.read_chunks(&mut file)?;
//! let report = handler.repair(&chunks, &mut file)?;
//! assert_eq!(report.chunks_checked(), chunks.len());
//! # Ok(())
//! # }
//! ```

mod chunk;
mod error;
mod png_io;
mod structure;

pub use chunk::{calculate_crc, Chunk, CHUNK_CRC_SIZE, CHUNK_HEADER_SIZE, IEND};
pub use error::{Error, Result};
pub use png_io::{ChunkRepair, PngIO, RepairReport, CHUNK_START_OFFSET, PNG_SIGNATURE};
pub use structure::ChunkSequence;

// Test utilities - only compiled for tests or when explicitly enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
