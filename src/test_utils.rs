//! Test utilities for building PNG chunk streams.
//!
//! Fixtures are synthesized in memory so tests can place corrupt CRCs,
//! truncated records and trailing garbage exactly where they need them.
//!
//! # Usage
//!
//! ```no_run
//! use png_crc_fix::test_utils::*;
//!
//! // IHDR + IDAT + IEND, with IDAT's CRC deliberately wrong
//! let png = PngBuilder::new()
//!     .chunk(b"IHDR", &IHDR_1X1_RGB)
//!     .chunk_with_crc(b"IDAT", &IDAT_1X1_RGB, 0)
//!     .chunk(b"IEND", &[]);
//! let bytes = png.build();
//! let idat_crc_at = png.crc_offsets()[1];
//! ```

use std::{fs, io::Cursor, path::Path};

use crate::{chunk::calculate_crc, png_io::PNG_SIGNATURE, Result};

/// IHDR payload of a 1x1, 8-bit RGB image
pub const IHDR_1X1_RGB: [u8; 13] = [
    0x00, 0x00, 0x00, 0x01, // Width: 1
    0x00, 0x00, 0x00, 0x01, // Height: 1
    0x08, // Bit depth: 8
    0x02, // Color type: RGB
    0x00, // Compression: deflate
    0x00, // Filter: adaptive
    0x00, // Interlace: none
];

/// zlib-compressed scanline of a single red pixel
pub const IDAT_1X1_RGB: [u8; 12] = [
    0x78, 0x9C, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00,
];

/// Encode one chunk record with an explicit CRC
pub fn chunk_bytes(chunk_type: &[u8; 4], data: &[u8], crc: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(12 + data.len());
    bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    bytes.extend_from_slice(chunk_type);
    bytes.extend_from_slice(data);
    bytes.extend_from_slice(&crc.to_be_bytes());
    bytes
}

/// Encode one chunk record with its correct CRC
pub fn valid_chunk_bytes(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    chunk_bytes(chunk_type, data, calculate_crc(chunk_type, data))
}

/// Builder for PNG byte streams
///
/// Starts with the PNG signature and records the CRC offset of every chunk
/// added through [`chunk`](Self::chunk) or [`chunk_with_crc`](Self::chunk_with_crc).
#[derive(Debug, Clone)]
pub struct PngBuilder {
    bytes: Vec<u8>,
    crc_offsets: Vec<u64>,
}

impl Default for PngBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PngBuilder {
    /// Start a stream with the PNG signature
    pub fn new() -> Self {
        Self {
            bytes: PNG_SIGNATURE.to_vec(),
            crc_offsets: Vec::new(),
        }
    }

    /// Start a stream with an arbitrary 8-byte header instead of the signature
    pub fn with_header(header: [u8; 8]) -> Self {
        Self {
            bytes: header.to_vec(),
            crc_offsets: Vec::new(),
        }
    }

    /// Append a chunk with its correct CRC
    pub fn chunk(self, chunk_type: &[u8; 4], data: &[u8]) -> Self {
        let crc = calculate_crc(chunk_type, data);
        self.chunk_with_crc(chunk_type, data, crc)
    }

    /// Append a chunk with the given (possibly wrong) CRC
    pub fn chunk_with_crc(mut self, chunk_type: &[u8; 4], data: &[u8], crc: u32) -> Self {
        let crc_offset = self.bytes.len() as u64 + 8 + data.len() as u64;
        self.crc_offsets.push(crc_offset);
        self.bytes.extend_from_slice(&chunk_bytes(chunk_type, data, crc));
        self
    }

    /// Append raw bytes (truncated records, garbage)
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// CRC offsets of the chunks added so far, in order
    pub fn crc_offsets(&self) -> &[u64] {
        &self.crc_offsets
    }

    /// The encoded stream
    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// The encoded stream as a seekable in-memory source
    pub fn stream(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }

    /// Write the encoded stream to `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// A complete, valid 1x1 RGB PNG (IHDR, IDAT, IEND)
pub fn minimal_png() -> Vec<u8> {
    PngBuilder::new()
        .chunk(b"IHDR", &IHDR_1X1_RGB)
        .chunk(b"IDAT", &IDAT_1X1_RGB)
        .chunk(b"IEND", &[])
        .build()
}

/// Flip every bit of the 4-byte CRC at `crc_offset`
pub fn corrupt_crc(bytes: &mut [u8], crc_offset: u64) {
    let start = crc_offset as usize;
    for byte in &mut bytes[start..start + 4] {
        *byte = !*byte;
    }
}

/// Byte positions covered by the given CRC fields
pub fn crc_field_positions(crc_offsets: &[u64]) -> Vec<usize> {
    crc_offsets
        .iter()
        .flat_map(|&offset| offset as usize..offset as usize + 4)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_png_bytes() {
        // Well-known 1x1 red pixel PNG
        let expected: &[u8] = &[
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00,
            0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x78,
            0x9C, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00, 0xC9, 0xFE, 0x92,
            0xEF, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ];
        assert_eq!(minimal_png(), expected);
    }

    #[test]
    fn test_builder_crc_offsets() {
        let png = PngBuilder::new()
            .chunk(b"IHDR", &IHDR_1X1_RGB)
            .chunk(b"IEND", &[]);
        assert_eq!(png.crc_offsets(), &[29, 41]);
        assert_eq!(png.build().len(), 45);
    }

    #[test]
    fn test_corrupt_crc() {
        let mut bytes = minimal_png();
        corrupt_crc(&mut bytes, 29);
        assert_eq!(&bytes[29..33], &[0x6F, 0x88, 0xAC, 0x21]);
    }
}
