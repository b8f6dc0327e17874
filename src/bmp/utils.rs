//! Byte-level helpers shared by the BMP stages.

use std::io::{self, Read};

pub(crate) fn read_u16_le<R: Read + ?Sized>(reader: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_i16_le<R: Read + ?Sized>(reader: &mut R) -> io::Result<i16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

pub(crate) fn read_u32_le<R: Read + ?Sized>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_i32_le<R: Read + ?Sized>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Fill as much of `buf` as the reader can supply.
///
/// Returns the number of bytes read together with the error that stopped
/// the read early, if any. Hitting end of input is not an error here; the
/// caller compares the count against `buf.len()`.
pub(crate) fn read_up_to<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> (usize, Option<io::Error>) {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (filled, Some(e)),
        }
    }
    (filled, None)
}

/// Expand packed 1- or 4-bit palette indices to one index per byte.
///
/// Pixels are taken most significant bits first. `out.len()` decides how
/// many pixels are produced; trailing row padding in `input` is ignored.
pub(crate) fn expand_bits_to_byte(depth: usize, input: &[u8], out: &mut [u8]) {
    if depth == 1 {
        let mut in_iter = input.iter();
        let mut out_iter = out.chunks_exact_mut(8);

        (&mut out_iter)
            .zip(&mut in_iter)
            .for_each(|(out_vals, in_val)| {
                for (bit, v) in out_vals.iter_mut().enumerate() {
                    *v = (in_val >> (7 - bit)) & 0x01;
                }
            });

        if let Some(in_val) = in_iter.next() {
            let remainder_iter = out_iter.into_remainder().iter_mut();
            remainder_iter.enumerate().for_each(|(pos, out_val)| {
                *out_val = (in_val >> (7 - pos)) & 0x01;
            });
        }
    } else if depth == 4 {
        let mut in_iter = input.iter();
        let mut out_iter = out.chunks_exact_mut(2);

        (&mut out_iter)
            .zip(&mut in_iter)
            .for_each(|(out_vals, in_val)| {
                out_vals[0] = (in_val >> 4) & 0x0f;
                out_vals[1] = in_val & 0x0f;
            });

        if let Some(in_val) = in_iter.next() {
            if let Some(out_val) = out_iter.into_remainder().first_mut() {
                *out_val = (in_val >> 4) & 0x0f;
            }
        }
    }
}
