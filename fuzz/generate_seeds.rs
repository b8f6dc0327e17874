#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn header(size: u32, width: i32, height: i32, bpp: u16, compression: u32, colors: u32) -> Vec<u8> {
    let offset = 14 + size + colors * 4;
    let mut bmp = vec![0u8; offset as usize];
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[10..14].copy_from_slice(&offset.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&size.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&width.to_le_bytes());
    bmp[22..26].copy_from_slice(&height.to_le_bytes());
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&bpp.to_le_bytes());
    bmp[30..34].copy_from_slice(&compression.to_le_bytes());
    bmp[46..50].copy_from_slice(&colors.to_le_bytes()); // colors used
    bmp
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // 1x1 24-bit
    let mut bmp = header(40, 1, 1, 24, 0, 0);
    bmp.extend_from_slice(&[0xff, 0x00, 0x00, 0x00]); // BGR + padding
    fs::write(format!("{dir}/bmp_1x1.bmp"), bmp).unwrap();

    // 2x2 8-bit, two palette entries, top-down
    let mut bmp = header(40, 2, -2, 8, 0, 2);
    bmp[54..62].copy_from_slice(&[0, 0, 0, 0, 255, 255, 255, 0]);
    bmp.extend_from_slice(&[1, 0, 0, 0, 0, 1, 0, 0]);
    fs::write(format!("{dir}/pal8_2x2.bmp"), bmp).unwrap();

    // 4x2 RLE8 with delta and absolute run
    let mut bmp = header(40, 4, 2, 8, 1, 4);
    bmp.extend_from_slice(&[4, 1, 0, 0, 0, 3, 1, 2, 3, 0, 0, 2, 1, 0, 0, 1]);
    fs::write(format!("{dir}/rle8_4x2.bmp"), bmp).unwrap();

    // 4x1 RLE4
    let mut bmp = header(40, 4, 1, 4, 2, 16);
    bmp.extend_from_slice(&[4, 0x12, 0, 1]);
    fs::write(format!("{dir}/rle4_4x1.bmp"), bmp).unwrap();

    // OS/2 1.x 1-bit, 3-byte palette entries
    let mut bmp = vec![0u8; 32];
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[10..14].copy_from_slice(&32u32.to_le_bytes());
    bmp[14..18].copy_from_slice(&12u32.to_le_bytes());
    bmp[18..20].copy_from_slice(&8i16.to_le_bytes());
    bmp[20..22].copy_from_slice(&1i16.to_le_bytes());
    bmp[22..24].copy_from_slice(&1u16.to_le_bytes());
    bmp[24..26].copy_from_slice(&1u16.to_le_bytes());
    bmp[29..32].copy_from_slice(&[255, 255, 255]);
    bmp.extend_from_slice(&[0b1010_0101, 0, 0, 0]);
    fs::write(format!("{dir}/os2_pal1.bmp"), bmp).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/header_only.bin"), header(40, 16, 16, 24, 0, 0)).unwrap();

    println!("Generated seed corpus in {dir}/");
}
