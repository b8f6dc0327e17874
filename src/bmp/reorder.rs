//! In-place BGR(A) to RGB channel reordering.

/// Reorder the first `width` pixels of a decoded scanline in place.
///
/// Returns the byte length of the reordered scanline: `width * 3` for 24-
/// and 32-bit input (32-bit pixels are compacted, the fourth byte is
/// dropped), `width * 2` for 16-bit input which is passed through
/// untouched, and `width` for palette depths.
pub fn reorder_scanline(buf: &mut [u8], width: usize, bits_per_pixel: u16) -> usize {
    match bits_per_pixel {
        24 => {
            for px in buf.chunks_exact_mut(3).take(width) {
                px.swap(0, 2);
            }
            width * 3
        }
        32 => {
            let pixels = width.min(buf.len() / 4);
            for p in 0..pixels {
                let src = p * 4;
                let (b, g, r) = (buf[src], buf[src + 1], buf[src + 2]);
                let dst = p * 3;
                buf[dst] = r;
                buf[dst + 1] = g;
                buf[dst + 2] = b;
            }
            width * 3
        }
        // 5-5-5 vs 5-6-5 channel layout is not known for certain.
        16 => width * 2,
        _ => width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgr_to_rgb_is_an_involution() {
        let original: Vec<u8> = (0..30).collect();
        let mut row = original.clone();
        // Stride padding after 9 pixels stays untouched.
        assert_eq!(reorder_scanline(&mut row, 9, 24), 27);
        assert_eq!(&row[..3], &[2, 1, 0]);
        assert_eq!(&row[27..], &original[27..]);
        reorder_scanline(&mut row, 9, 24);
        assert_eq!(row, original);
    }

    #[test]
    fn bgra_compacts_to_rgb() {
        let mut row = vec![1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 255];
        let len = reorder_scanline(&mut row, 3, 32);
        assert_eq!(len, 9);
        assert_eq!(&row[..len], &[3, 2, 1, 6, 5, 4, 9, 8, 7]);
    }

    #[test]
    fn sixteen_bit_and_palette_pass_through() {
        let mut row = vec![0x1f, 0x7c, 0xe0, 0x03];
        assert_eq!(reorder_scanline(&mut row, 2, 16), 4);
        assert_eq!(row, [0x1f, 0x7c, 0xe0, 0x03]);

        let mut idx = vec![3, 1, 2];
        assert_eq!(reorder_scanline(&mut idx, 3, 8), 3);
        assert_eq!(idx, [3, 1, 2]);
    }
}
