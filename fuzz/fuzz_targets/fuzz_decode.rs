#![no_main]
use std::io::Cursor;

use bmpscan::{DecodeRequest, Limits, ScanlineSink, SinkSetup};
use libfuzzer_sys::fuzz_target;

struct Discard {
    row_bytes: usize,
}

impl ScanlineSink for Discard {
    type Error = String;

    fn begin(&mut self, setup: &SinkSetup<'_>) -> Result<(), String> {
        self.row_bytes = setup.row_bytes();
        Ok(())
    }

    fn write_row(&mut self, _row: u32, scanline: &[u8]) -> Result<(), String> {
        assert_eq!(scanline.len(), self.row_bytes);
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(1 << 26),
        ..Limits::default()
    };
    let request = DecodeRequest::new().with_limits(&limits);

    // Streaming and collecting decodes must never panic
    let mut sink = Discard { row_bytes: 0 };
    let _ = request.decode_into(&mut Cursor::new(data), &mut sink, enough::Unstoppable);
    if let Ok(decoded) = request.decode(&mut Cursor::new(data), enough::Unstoppable) {
        let expected =
            decoded.width as usize * decoded.height as usize * decoded.layout.bytes_per_pixel();
        assert_eq!(decoded.pixels().len(), expected);
    }
});
