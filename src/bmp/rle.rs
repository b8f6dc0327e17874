//! RLE4 / RLE8 decompression into one index byte per pixel.
//!
//! Both modes share the token grammar: a nonzero byte starts an encoded
//! run, a zero byte starts an escape (`0` end of line, `1` end of bitmap,
//! `2` delta, `3..=255` absolute run). Output is written in file order; the
//! caller reads rows back bottom-up.

/// Which run-length flavour the payload uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RleMode {
    Rle8,
    Rle4,
}

/// Why the state machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RleTermination {
    /// An explicit `00 01` token.
    EndOfBitmap,
    /// The output buffer was filled or a delta jumped past it.
    OutputFull,
    /// The payload ran out between tokens.
    InputExhausted,
    /// The payload ended inside a token.
    Truncated,
}

/// Outcome of one decompression pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleSummary {
    /// Input bytes consumed, never more than the payload length.
    pub consumed: usize,
    /// Output cursor at exit, never more than the output length.
    pub written: usize,
    pub termination: RleTermination,
}

#[inline]
fn nibble(byte: u8, k: usize) -> u8 {
    if k & 1 == 0 { byte >> 4 } else { byte & 0x0f }
}

/// Decode `input` into `out`, a zeroed `width * height` index buffer.
///
/// Never reads past `input` or writes past `out`, whatever the payload
/// contains; malformed streams leave the rest of `out` untouched.
pub fn decompress(mode: RleMode, input: &[u8], out: &mut [u8], width: usize) -> RleSummary {
    let mut i = 0usize;
    let mut j = 0usize;

    let termination = loop {
        if j >= out.len() {
            break RleTermination::OutputFull;
        }
        if i >= input.len() {
            break RleTermination::InputExhausted;
        }

        let count = usize::from(input[i]);
        i += 1;

        if count != 0 {
            // Encoded run.
            let Some(&value) = input.get(i) else {
                break RleTermination::Truncated;
            };
            let n = count.min(out.len() - j);
            match mode {
                RleMode::Rle8 => out[j..j + n].fill(value),
                RleMode::Rle4 => {
                    for (k, px) in out[j..j + n].iter_mut().enumerate() {
                        *px = nibble(value, k);
                    }
                }
            }
            j += n;
            i += 1;
            continue;
        }

        let Some(&escape) = input.get(i) else {
            break RleTermination::Truncated;
        };
        i += 1;

        match escape {
            // End of line: the cursor is not realigned to a row boundary.
            0 => {}
            1 => break RleTermination::EndOfBitmap,
            2 => {
                if i + 1 >= input.len() {
                    i = input.len();
                    break RleTermination::Truncated;
                }
                let dx = usize::from(input[i]);
                let dy = usize::from(input[i + 1]);
                i += 2;
                j = j.saturating_add(dx.saturating_add(dy.saturating_mul(width)));
                if j > out.len() {
                    j = out.len();
                }
            }
            literal => {
                let literal = usize::from(literal);
                let span = match mode {
                    RleMode::Rle8 => literal,
                    RleMode::Rle4 => literal.div_ceil(2),
                };
                let available = span.min(input.len() - i);
                let src = &input[i..i + available];

                match mode {
                    RleMode::Rle8 => {
                        let n = literal.min(available).min(out.len() - j);
                        out[j..j + n].copy_from_slice(&src[..n]);
                        j += n;
                    }
                    RleMode::Rle4 => {
                        let n = literal.min(available * 2).min(out.len() - j);
                        for (k, px) in out[j..j + n].iter_mut().enumerate() {
                            *px = nibble(src[k / 2], k);
                        }
                        j += n;
                    }
                }

                // Literal runs are padded to a 16-bit boundary.
                let padded = span + (span & 1);
                if padded > input.len() - i {
                    i = input.len();
                    if available < span {
                        break RleTermination::Truncated;
                    }
                } else {
                    i += padded;
                }
            }
        }
    };

    RleSummary {
        consumed: i.min(input.len()),
        written: j.min(out.len()),
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(mode: RleMode, input: &[u8], width: usize, height: usize) -> (Vec<u8>, RleSummary) {
        let mut out = vec![0u8; width * height];
        let summary = decompress(mode, input, &mut out, width);
        (out, summary)
    }

    #[test]
    fn empty_payload_end_of_bitmap() {
        let (out, s) = run(RleMode::Rle8, &[0, 1], 4, 4);
        assert!(out.iter().all(|&b| b == 0));
        assert_eq!(s.termination, RleTermination::EndOfBitmap);
        assert_eq!(s.written, 0);
        assert_eq!(s.consumed, 2);
    }

    #[test]
    fn rle8_encoded_runs() {
        let (out, s) = run(RleMode::Rle8, &[3, 7, 1, 9, 0, 1], 4, 1);
        assert_eq!(out, [7, 7, 7, 9]);
        assert_eq!(s.termination, RleTermination::OutputFull);
    }

    #[test]
    fn rle8_odd_literal_skips_pad_byte() {
        // Absolute run of 3, one pad byte (0xEE), then a run of 2 x 5.
        let (out, s) = run(RleMode::Rle8, &[0, 3, 1, 2, 3, 0xEE, 2, 5, 0, 1], 5, 1);
        assert_eq!(out, [1, 2, 3, 5, 5]);
        assert_eq!(s.consumed, 8);
    }

    #[test]
    fn rle8_even_literal_has_no_pad() {
        let (out, s) = run(RleMode::Rle8, &[0, 4, 1, 2, 3, 4, 0, 1], 8, 1);
        assert_eq!(&out[..4], &[1, 2, 3, 4]);
        assert_eq!(s.termination, RleTermination::EndOfBitmap);
    }

    #[test]
    fn rle4_runs_alternate_high_then_low() {
        let (out, _) = run(RleMode::Rle4, &[5, 0x12, 0, 1], 6, 1);
        assert_eq!(out, [1, 2, 1, 2, 1, 0]);
    }

    #[test]
    fn rle4_literal_padding_by_byte_count() {
        // 3 nibbles = 2 bytes, no pad.
        let (out, s) = run(RleMode::Rle4, &[0, 3, 0xAB, 0xC0, 1, 0x77, 0, 1], 4, 1);
        assert_eq!(out, [0xA, 0xB, 0xC, 7]);
        assert_eq!(s.consumed, 6);

        // 5 nibbles = 3 bytes, one pad byte.
        let (out, _) = run(
            RleMode::Rle4,
            &[0, 5, 0x12, 0x34, 0x50, 0xEE, 1, 0x99, 0, 1],
            6,
            1,
        );
        assert_eq!(out, [1, 2, 3, 4, 5, 9]);
    }

    #[test]
    fn end_of_line_does_not_move_cursor() {
        let (out, _) = run(RleMode::Rle8, &[1, 4, 0, 0, 1, 6, 0, 1], 3, 2);
        assert_eq!(out, [4, 6, 0, 0, 0, 0]);
    }

    #[test]
    fn delta_moves_by_rows_and_columns() {
        let (out, _) = run(RleMode::Rle8, &[0, 2, 1, 1, 1, 8, 0, 1], 3, 3);
        assert_eq!(out, [0, 0, 0, 0, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn delta_past_end_fills_output() {
        let (_, s) = run(RleMode::Rle8, &[0, 2, 255, 255, 1, 1], 2, 2);
        assert_eq!(s.termination, RleTermination::OutputFull);
        assert_eq!(s.written, 4);
    }

    #[test]
    fn truncated_tokens_stop_cleanly() {
        for input in [
            &[5u8][..],
            &[0][..],
            &[0, 2, 1][..],
            &[0, 9, 1, 2][..],
            &[0, 3, 1, 2, 3][..],
        ] {
            for mode in [RleMode::Rle8, RleMode::Rle4] {
                let (_, s) = run(mode, input, 4, 4);
                assert!(s.consumed <= input.len());
                assert!(s.written <= 16);
            }
        }
    }

    #[test]
    fn runs_clamp_to_output() {
        let (out, s) = run(RleMode::Rle8, &[255, 3, 255, 4], 2, 2);
        assert_eq!(out, [3, 3, 3, 3]);
        assert_eq!(s.termination, RleTermination::OutputFull);
        assert_eq!(s.consumed, 2);
    }

    #[test]
    fn cursors_stay_in_bounds_for_arbitrary_input() {
        let mut state: u32 = 0x1234_5678;
        for len in 0..200usize {
            let input: Vec<u8> = (0..len)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    // Bias towards escapes.
                    if state % 3 == 0 { 0 } else { state as u8 }
                })
                .collect();
            for mode in [RleMode::Rle8, RleMode::Rle4] {
                let (out, s) = run(mode, &input, 5, 3);
                assert!(s.consumed <= input.len());
                assert!(s.written <= 15);
                if mode == RleMode::Rle4 {
                    assert!(out.iter().all(|&v| v < 16));
                }
            }
        }
    }
}
