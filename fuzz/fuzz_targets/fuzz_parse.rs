#![no_main]

use libfuzzer_sys::fuzz_target;
use png_crc_fix::PngIO;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must never panic, only stop early
    let mut cursor = Cursor::new(data);
    if !PngIO::is_png(&mut cursor) {
        return;
    }

    if let Ok(chunks) = PngIO::new().read_chunks(&mut cursor) {
        let mut end = 8u64;
        for chunk in &chunks {
            assert_eq!(chunk.offset, end);
            assert_eq!(chunk.data.len(), chunk.length as usize);
            end = chunk.offset + chunk.total_size();
            let _ = chunk.to_string();
        }
        assert!(end <= data.len() as u64);
    }
});
