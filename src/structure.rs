//! Decoded chunk layout of a PNG file

use crate::chunk::Chunk;

/// Ordered chunks of a PNG file, in file order
///
/// Chunks are only ever appended, by the decoder. Repairs change the backing
/// file, never this sequence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkSequence {
    chunks: Vec<Chunk>,
}

impl ChunkSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded chunk
    pub(crate) fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// All chunks in file order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Iterate over chunks in file order
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    /// Number of decoded chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk was decoded
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether decoding reached the terminal `IEND` chunk
    ///
    /// `false` means the stream was truncated or a length field was corrupt.
    pub fn is_complete(&self) -> bool {
        self.chunks.last().is_some_and(Chunk::is_terminal)
    }

    /// Indices of chunks whose stored CRC is wrong
    pub fn invalid_indices(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| !chunk.crc_is_valid())
            .map(|(index, _)| index)
            .collect()
    }

    /// Offset just past the last decoded chunk
    pub fn end_offset(&self) -> u64 {
        self.chunks
            .last()
            .map_or(crate::png_io::CHUNK_START_OFFSET, |c| {
                c.offset + c.total_size()
            })
    }
}

impl<'a> IntoIterator for &'a ChunkSequence {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(offset: u64, chunk_type: &[u8; 4], data: &[u8], crc: u32) -> Chunk {
        Chunk {
            offset,
            length: data.len() as u32,
            chunk_type: *chunk_type,
            data: data.to_vec(),
            crc,
        }
    }

    #[test]
    fn test_empty_sequence() {
        let seq = ChunkSequence::new();
        assert!(seq.is_empty());
        assert!(!seq.is_complete());
        assert_eq!(seq.end_offset(), 8);
        assert!(seq.invalid_indices().is_empty());
    }

    #[test]
    fn test_order_and_completion() {
        let mut seq = ChunkSequence::new();
        seq.push(chunk(8, b"tEXt", b"a", 0));
        seq.push(chunk(21, b"IEND", &[], 0xAE426082));

        assert_eq!(seq.len(), 2);
        let types: Vec<_> = seq.iter().map(|c| c.chunk_type).collect();
        assert_eq!(types, vec![*b"tEXt", *b"IEND"]);
        assert!(seq.is_complete());
        assert_eq!(seq.invalid_indices(), vec![0]);
        assert_eq!(seq.end_offset(), 33);
    }
}
