//! PNG chunk records as read from a file

use std::{borrow::Cow, fmt};

/// Size of the length and type fields preceding a chunk's payload
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// Size of the CRC trailer following a chunk's payload
pub const CHUNK_CRC_SIZE: u64 = 4;

/// Terminal chunk type
pub const IEND: &[u8; 4] = b"IEND";

/// One PNG chunk record
///
/// Layout on disk: `[length:4][type:4][data:length][crc:4]`, all integers
/// big-endian. Instances are only produced by the decoder, so `data.len()`
/// always equals `length`.
///
/// The stored `crc` is never refreshed after a repair writes a new value to
/// the file; a chunk describes the bytes as they were when decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Absolute file offset of the length field
    pub offset: u64,

    /// Declared payload size
    pub length: u32,

    /// Chunk type code, e.g. `IHDR`
    pub chunk_type: [u8; 4],

    /// Payload, exactly `length` bytes
    pub data: Vec<u8>,

    /// CRC stored in the file
    pub crc: u32,
}

impl Chunk {
    /// Bytes covered by the chunk's CRC: the type code followed by the payload
    pub fn bytes_for_crc(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.data.len());
        bytes.extend_from_slice(&self.chunk_type);
        bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Compute the IEEE CRC-32 over type and payload
    ///
    /// The length field and the stored CRC never take part.
    pub fn calculate_crc(&self) -> u32 {
        calculate_crc(&self.chunk_type, &self.data)
    }

    /// Whether the stored CRC matches the computed one
    pub fn crc_is_valid(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Absolute file offset of the CRC trailer
    pub fn crc_offset(&self) -> u64 {
        self.offset + CHUNK_HEADER_SIZE + self.length as u64
    }

    /// Total size of the record on disk
    pub fn total_size(&self) -> u64 {
        CHUNK_HEADER_SIZE + self.length as u64 + CHUNK_CRC_SIZE
    }

    /// Whether this is the terminal `IEND` chunk
    pub fn is_terminal(&self) -> bool {
        &self.chunk_type == IEND
    }

    /// Type code as text (non-ASCII bytes are replaced)
    pub fn type_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.chunk_type)
    }
}

impl fmt::Display for Chunk {
    /// `TYPE@OFFSET_HEX - CRC_HEX - Valid CRC? BOOL`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{:x} - {:X} - Valid CRC? {}",
            self.type_str(),
            self.offset,
            self.crc,
            self.crc_is_valid()
        )
    }
}

/// Calculate the CRC-32 of a PNG chunk from its type code and payload
pub fn calculate_crc(chunk_type: &[u8], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}
