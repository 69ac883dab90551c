// Integration tests against real files, using the test_utils builders

use png_crc_fix::{test_utils::*, ChunkSequence, Error, PngIO, RepairReport};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("Failed to write fixture");
    path
}

fn fix(path: &Path) -> (ChunkSequence, RepairReport) {
    PngIO::new().fix_file(path, false).expect("Failed to fix file")
}

/// IHDR valid, IDAT payload corrupted after its CRC was computed, IEND valid
fn corrupted_idat() -> (Vec<u8>, u64) {
    let png = PngBuilder::new()
        .chunk(b"IHDR", &IHDR_1X1_RGB)
        .chunk(b"IDAT", &IDAT_1X1_RGB)
        .chunk(b"IEND", &[]);
    let mut bytes = png.build();
    // Flip a bit inside the IDAT payload
    bytes[45] ^= 0x01;
    (bytes, png.crc_offsets()[1])
}

#[test]
fn test_end_to_end_scenario() {
    let dir = TempDir::new().unwrap();
    let (original, idat_crc_offset) = corrupted_idat();
    let path = write_fixture(&dir, "idat.png", &original);

    let (chunks, report) = fix(&path);

    assert_eq!(chunks.len(), 3);
    let validity: Vec<bool> = chunks.iter().map(|c| c.crc_is_valid()).collect();
    assert_eq!(validity, vec![true, false, true]);

    assert_eq!(report.corrected().len(), 1);
    assert_eq!(report.corrected()[0].index, 1);
    assert_eq!(report.corrected()[0].crc_offset, idat_crc_offset);

    let repaired = fs::read(&path).unwrap();
    assert_eq!(repaired.len(), original.len());

    let at = idat_crc_offset as usize;
    let expected_crc = chunks.chunks()[1].calculate_crc();
    assert_eq!(&repaired[at..at + 4], &expected_crc.to_be_bytes());

    // Everything outside the IDAT CRC field is unchanged
    for (i, (a, b)) in original.iter().zip(&repaired).enumerate() {
        if !(at..at + 4).contains(&i) {
            assert_eq!(a, b, "byte {} changed", i);
        }
    }

    // Second run performs no writes
    let (chunks, report) = fix(&path);
    assert!(report.is_clean());
    assert!(chunks.iter().all(|c| c.crc_is_valid()));
    assert_eq!(fs::read(&path).unwrap(), repaired);
}

#[test]
fn test_non_destructive_multiple_repairs() {
    let dir = TempDir::new().unwrap();
    let png = PngBuilder::new()
        .chunk(b"IHDR", &IHDR_1X1_RGB)
        .chunk(b"tEXt", b"Comment\0corrupt me")
        .chunk(b"IDAT", &IDAT_1X1_RGB)
        .chunk(b"tIME", &[0x07, 0xE6, 0x01, 0x02, 0x03, 0x04, 0x05])
        .chunk(b"IEND", &[]);
    let clean = png.build();

    let broken_offsets = [png.crc_offsets()[0], png.crc_offsets()[2], png.crc_offsets()[4]];
    let mut original = clean.clone();
    for &offset in &broken_offsets {
        corrupt_crc(&mut original, offset);
    }
    let path = write_fixture(&dir, "multi.png", &original);

    let (chunks, report) = fix(&path);
    assert_eq!(chunks.len(), 5);
    let fixed: Vec<usize> = report.corrected().iter().map(|r| r.index).collect();
    assert_eq!(fixed, vec![0, 2, 4]);

    let repaired = fs::read(&path).unwrap();
    assert_eq!(repaired, clean);

    let touched = crc_field_positions(&broken_offsets);
    for (i, (a, b)) in original.iter().zip(&repaired).enumerate() {
        if !touched.contains(&i) {
            assert_eq!(a, b, "byte {} changed", i);
        }
    }
}

#[test]
fn test_signature_gate() {
    let dir = TempDir::new().unwrap();

    // Valid chunks, wrong header, CRCs broken so any write would show
    let mut bytes = PngBuilder::with_header(*b"\x89PNG\r\n\x1a\x00")
        .chunk_with_crc(b"IHDR", &IHDR_1X1_RGB, 0)
        .chunk_with_crc(b"IEND", &[], 0)
        .build();
    bytes.extend_from_slice(b"trailing");
    let path = write_fixture(&dir, "fake.png", &bytes);

    let result = PngIO::new().fix_file(&path, false);
    assert!(matches!(result, Err(Error::NotPng)));
    assert_eq!(fs::read(&path).unwrap(), bytes);

    // Shorter than a signature
    let path = write_fixture(&dir, "short.png", b"\x89PNG");
    assert!(matches!(
        PngIO::new().fix_file(&path, false),
        Err(Error::NotPng)
    ));
}

#[test]
fn test_truncation_tolerance() {
    let dir = TempDir::new().unwrap();
    let bytes = PngBuilder::new()
        .chunk_with_crc(b"IHDR", &IHDR_1X1_RGB, 0xBAD)
        .raw(&[0x00, 0x00, 0x00])
        .build();
    let path = write_fixture(&dir, "truncated.png", &bytes);

    let (chunks, report) = fix(&path);
    assert_eq!(chunks.len(), 1);
    assert!(!chunks.is_complete());
    assert_eq!(report.corrected().len(), 1);

    let repaired = fs::read(&path).unwrap();
    assert_eq!(repaired.len(), bytes.len());
    assert_eq!(&repaired[29..33], &0x907753DE_u32.to_be_bytes());
}

#[test]
fn test_terminal_chunk_stop() {
    let dir = TempDir::new().unwrap();
    let mut bytes = minimal_png();
    let garbage = chunk_bytes(b"tEXt", b"not a chunk", 0);
    bytes.extend_from_slice(&garbage);
    let path = write_fixture(&dir, "trailing.png", &bytes);

    let (chunks, report) = fix(&path);
    assert_eq!(chunks.len(), 3);
    assert!(chunks.chunks()[2].is_terminal());
    assert!(report.is_clean());
    assert_eq!(fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_dry_run_never_writes() {
    let dir = TempDir::new().unwrap();
    let (original, _) = corrupted_idat();
    let path = write_fixture(&dir, "check.png", &original);

    let (chunks, report) = PngIO::new().fix_file(&path, true).unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(report.corrected().len(), 1);
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = PngIO::new().fix_file(dir.path().join("missing.png"), false);
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_clean_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clean.png");
    PngBuilder::new()
        .chunk(b"IHDR", &IHDR_1X1_RGB)
        .chunk(b"IDAT", &IDAT_1X1_RGB)
        .chunk(b"IEND", &[])
        .write_to(&path)
        .unwrap();

    let (_, report) = fix(&path);
    assert!(report.is_clean());
    assert_eq!(report.chunks_checked(), 3);
    assert_eq!(fs::read(&path).unwrap(), minimal_png());
}
