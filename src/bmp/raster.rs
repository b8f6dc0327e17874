//! Uncompressed scanline extraction.
//!
//! Rows are fetched on demand with one seek and one read each, so the
//! whole image is never held in memory.

use std::io::{Read, Seek, SeekFrom};

use super::header::BmpHeaders;
use super::utils::read_up_to;
use crate::error::{BmpError, RowError};

/// Stored byte length of one row: `ceil(width * bpp / 32) * 4`.
pub fn row_stride(width: u32, bits_per_pixel: u16) -> Result<usize, BmpError> {
    let bits = u64::from(width) * u64::from(bits_per_pixel);
    let stride = bits.div_ceil(32) * 4;
    usize::try_from(stride).map_err(|_| BmpError::DimensionsTooLarge { width, height: 0 })
}

/// File row holding output row `row`, counting output rows from the top.
pub fn source_row(row: u32, height: u32, top_down: bool) -> u32 {
    if top_down { row } else { height - row - 1 }
}

/// A row that could not be read in full.
///
/// `bytes` still holds whatever was read; the unread tail is zeroed.
#[derive(Debug)]
pub struct PartialRow<'a> {
    pub bytes: &'a mut [u8],
    pub error: RowError,
}

/// Reads stored rows of an uncompressed bitmap by output row index.
pub(crate) struct RowReader<'r, R> {
    reader: &'r mut R,
    pixel_offset: u64,
    stride: usize,
    height: u32,
    top_down: bool,
    scratch: Vec<u8>,
}

impl<'r, R: Read + Seek> RowReader<'r, R> {
    pub(crate) fn new(reader: &'r mut R, headers: &BmpHeaders, stride: usize) -> Self {
        Self {
            reader,
            pixel_offset: u64::from(headers.file.pixel_offset),
            stride,
            height: headers.height(),
            top_down: headers.is_top_down(),
            scratch: vec![0u8; stride],
        }
    }

    /// Read the stored bytes of output row `row`.
    pub(crate) fn read_row(&mut self, row: u32) -> Result<&mut [u8], PartialRow<'_>> {
        let src = source_row(row, self.height, self.top_down);
        let offset = self.pixel_offset + u64::from(src) * self.stride as u64;

        if let Err(source) = self.reader.seek(SeekFrom::Start(offset)) {
            self.scratch.fill(0);
            return Err(PartialRow {
                bytes: self.scratch.as_mut_slice(),
                error: RowError::Seek { row, source },
            });
        }

        let (actual, err) = read_up_to(self.reader, &mut self.scratch);
        if actual == self.stride {
            return Ok(self.scratch.as_mut_slice());
        }

        self.scratch[actual..].fill(0);
        let error = match err {
            Some(source) => RowError::Read { row, source },
            None => RowError::ShortRead {
                row,
                expected: self.stride,
                actual,
            },
        };
        Err(PartialRow {
            bytes: self.scratch.as_mut_slice(),
            error,
        })
    }
}
