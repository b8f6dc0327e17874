#![no_main]
use bmpscan::bmp::{RleMode, decompress};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let [mode, w, h, payload @ ..] = data else {
        return;
    };
    let mode = if mode & 1 == 0 { RleMode::Rle8 } else { RleMode::Rle4 };
    let width = usize::from(*w);
    let mut out = vec![0u8; width * usize::from(*h)];

    let summary = decompress(mode, payload, &mut out, width);
    assert!(summary.consumed <= payload.len());
    assert!(summary.written <= out.len());
    if mode == RleMode::Rle4 {
        assert!(out.iter().all(|&v| v < 16));
    }
});
