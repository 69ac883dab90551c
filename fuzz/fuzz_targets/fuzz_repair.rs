#![no_main]

use libfuzzer_sys::fuzz_target;
use png_crc_fix::PngIO;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Repair must keep the length, and a second pass must find nothing
    let mut cursor = Cursor::new(data.to_vec());
    if !PngIO::is_png(&mut cursor) {
        return;
    }

    let handler = PngIO::new();
    let Ok(chunks) = handler.read_chunks(&mut cursor) else {
        return;
    };
    if handler.repair(&chunks, &mut cursor).is_err() {
        return;
    }
    assert_eq!(cursor.get_ref().len(), data.len());

    let chunks = handler.read_chunks(&mut cursor).unwrap();
    assert!(handler.verify(&chunks).is_clean());
});
