//! PNG chunk decoding and in-place CRC repair

use crate::{
    chunk::Chunk,
    error::{Error, Result},
    structure::ChunkSequence,
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::{
    fs::OpenOptions,
    io::{self, Read, Seek, SeekFrom, Write},
    path::Path,
};
use tracing::{debug, info};

/// PNG signature: 89 50 4E 47 0D 0A 1A 0A
pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\r\n\x1a\n";

/// Offset of the first chunk, right after the signature
pub const CHUNK_START_OFFSET: u64 = PNG_SIGNATURE.len() as u64;

/// A CRC that was found to be wrong, and the value that replaces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRepair {
    /// Position of the chunk in its sequence
    pub index: usize,

    /// Chunk type code
    pub chunk_type: [u8; 4],

    /// Absolute file offset of the chunk's length field
    pub offset: u64,

    /// Absolute file offset of the CRC trailer
    pub crc_offset: u64,

    /// CRC found in the file
    pub stored: u32,

    /// CRC computed over type and payload
    pub computed: u32,
}

impl ChunkRepair {
    fn new(index: usize, chunk: &Chunk, computed: u32) -> Self {
        Self {
            index,
            chunk_type: chunk.chunk_type,
            offset: chunk.offset,
            crc_offset: chunk.crc_offset(),
            stored: chunk.crc,
            computed,
        }
    }
}

/// Outcome of a repair (or verify) pass over a chunk sequence
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepairReport {
    chunks_checked: usize,
    repairs: Vec<ChunkRepair>,
}

impl RepairReport {
    /// Number of chunks examined
    pub fn chunks_checked(&self) -> usize {
        self.chunks_checked
    }

    /// Chunks whose CRC was wrong, in sequence order
    pub fn corrected(&self) -> &[ChunkRepair] {
        &self.repairs
    }

    /// Whether every examined CRC was already correct
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }

    /// Repair entry for the chunk at `index`, if its CRC was wrong
    pub fn get(&self, index: usize) -> Option<&ChunkRepair> {
        self.repairs
            .binary_search_by_key(&index, |r| r.index)
            .ok()
            .map(|i| &self.repairs[i])
    }
}

/// PNG chunk reader and CRC fixer
#[derive(Debug, Default, Clone, Copy)]
pub struct PngIO;

impl PngIO {
    /// Create a new PNG handler
    pub fn new() -> Self {
        Self
    }

    /// Detect a PNG signature in an in-memory header
    pub fn detect(header: &[u8]) -> bool {
        header.len() >= PNG_SIGNATURE.len() && header[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
    }

    /// Read 8 bytes from `source` and compare them with the PNG signature
    ///
    /// A short read or read error means "not a PNG", never an error. The
    /// cursor is left wherever the read stopped.
    pub fn is_png<R: Read>(source: &mut R) -> bool {
        let mut sig = [0u8; 8];
        source.read_exact(&mut sig).is_ok() && sig == PNG_SIGNATURE
    }

    /// Decode every chunk from offset 8 up to and including `IEND`
    ///
    /// Decoding stops quietly at the first short read or read error and the
    /// chunks decoded so far are returned. Only a failure to seek to the first
    /// chunk is reported as an error.
    pub fn read_chunks<R: Read + Seek>(&self, source: &mut R) -> Result<ChunkSequence> {
        let mut sequence = ChunkSequence::new();
        let mut offset = source.seek(SeekFrom::Start(CHUNK_START_OFFSET))?;

        loop {
            let chunk = match Self::read_chunk(source, offset) {
                Ok(chunk) => chunk,
                Err(e) => {
                    debug!(offset, error = %e, "Chunk decoding stopped");
                    break;
                }
            };

            debug!(
                offset,
                chunk_type = %chunk.type_str(),
                length = chunk.length,
                "Decoded chunk"
            );

            offset += chunk.total_size();
            let terminal = chunk.is_terminal();
            sequence.push(chunk);

            if terminal {
                break;
            }
        }

        Ok(sequence)
    }

    /// Read one chunk record starting at the current position (`offset`)
    fn read_chunk<R: Read>(source: &mut R, offset: u64) -> io::Result<Chunk> {
        let length = source.read_u32::<BigEndian>()?;

        let mut chunk_type = [0u8; 4];
        source.read_exact(&mut chunk_type)?;

        // Grow with the bytes actually present rather than trusting `length`
        let mut data = Vec::new();
        source.by_ref().take(length as u64).read_to_end(&mut data)?;
        if data.len() as u64 != length as u64 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "chunk payload truncated: expected {} bytes, found {}",
                    length,
                    data.len()
                ),
            ));
        }

        let crc = source.read_u32::<BigEndian>()?;

        Ok(Chunk {
            offset,
            length,
            chunk_type,
            data,
            crc,
        })
    }

    /// Report wrong CRCs without writing anything
    pub fn verify(&self, sequence: &ChunkSequence) -> RepairReport {
        let repairs = sequence
            .iter()
            .enumerate()
            .filter_map(|(index, chunk)| {
                let computed = chunk.calculate_crc();
                (chunk.crc != computed).then(|| ChunkRepair::new(index, chunk, computed))
            })
            .collect();

        RepairReport {
            chunks_checked: sequence.len(),
            repairs,
        }
    }

    /// Overwrite the CRC of one chunk in place if it is wrong
    ///
    /// Returns `None` without touching `writer` when the stored CRC is
    /// already correct. The chunk itself keeps its old `crc` value.
    pub fn repair_chunk<W: Write + Seek>(
        &self,
        index: usize,
        chunk: &Chunk,
        writer: &mut W,
    ) -> Result<Option<ChunkRepair>> {
        let computed = chunk.calculate_crc();
        if chunk.crc == computed {
            return Ok(None);
        }

        // [length:4][type:4][data:N][crc:4]
        writer.seek(SeekFrom::Start(chunk.crc_offset()))?;
        writer.write_u32::<BigEndian>(computed)?;

        info!(
            chunk_type = %chunk.type_str(),
            offset = chunk.offset,
            stored = %format!("{:08X}", chunk.crc),
            computed = %format!("{:08X}", computed),
            "Corrected CRC"
        );

        Ok(Some(ChunkRepair::new(index, chunk, computed)))
    }

    /// Rewrite every wrong CRC in `sequence`, in file order
    ///
    /// Chunks with a correct CRC are never written, so repairing a clean
    /// file leaves it untouched. The first seek, write or flush failure
    /// aborts the pass; chunks after it are left as they were.
    pub fn repair<W: Write + Seek>(
        &self,
        sequence: &ChunkSequence,
        writer: &mut W,
    ) -> Result<RepairReport> {
        let mut report = RepairReport {
            chunks_checked: sequence.len(),
            repairs: Vec::new(),
        };

        for (index, chunk) in sequence.iter().enumerate() {
            if let Some(repair) = self.repair_chunk(index, chunk, writer)? {
                report.repairs.push(repair);
            }
        }

        if !report.is_clean() {
            writer.flush()?;
        }

        Ok(report)
    }

    /// Check and repair a PNG file on disk
    ///
    /// With `dry_run` the file is opened read-only and only verified.
    /// Fails with [`Error::NotPng`] before decoding anything if the
    /// signature does not match.
    pub fn fix_file<P: AsRef<Path>>(
        &self,
        path: P,
        dry_run: bool,
    ) -> Result<(ChunkSequence, RepairReport)> {
        let path = path.as_ref();
        let mut file = OpenOptions::new().read(true).write(!dry_run).open(path)?;

        if !Self::is_png(&mut file) {
            return Err(Error::NotPng);
        }

        let sequence = self.read_chunks(&mut file)?;
        debug!(
            path = %path.display(),
            chunks = sequence.len(),
            complete = sequence.is_complete(),
            "Read chunk sequence"
        );

        let report = if dry_run {
            self.verify(&sequence)
        } else {
            self.repair(&sequence, &mut file)?
        };

        Ok((sequence, report))
    }
}
