//! BMP decoding pipeline.
//!
//! Header → color map (palette depths only) → raster (uncompressed rows or
//! RLE) → channel reorder → [`ScanlineSink`], one row at a time, top row
//! first. Use [`crate::DecodeRequest`] or [`crate::decode_bmp`] rather than
//! the stage functions directly; they are public for tooling and fuzzing.

mod header;
mod palette;
mod raster;
mod reorder;
mod rle;
mod utils;

use std::io::{Read, Seek, SeekFrom};

use enough::Stop;
use log::{debug, warn};

pub use header::{
    BmpHeaders, CieXyz, ColorSpace, Compression, ExtendedFields, FILE_HEADER_SIZE, FileHeader,
    InfoHeader, Variant,
};
pub use palette::{ColorMap, scale_to_u16};
pub use raster::{PartialRow, row_stride, source_row};
pub use reorder::reorder_scanline;
pub use rle::{RleMode, RleSummary, RleTermination, decompress};

use crate::error::{BmpError, RowError};
use crate::limits::Limits;
use crate::sink::{ScanlineSink, SinkSetup};
use raster::RowReader;
use utils::{expand_bits_to_byte, read_up_to};

// ── Permissiveness ──────────────────────────────────────────────────

/// Controls how strictly the decoder treats non-conforming input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BmpPermissiveness {
    /// Reject planes != 1, RLE with a top-down height and an RLE flavour
    /// that does not match the bit depth, and abort on the first row that
    /// cannot be read in full.
    Strict,

    /// Default behavior. Record non-conformance and per-row I/O failures
    /// as warnings and keep decoding.
    #[default]
    Standard,
}

// ── Report ──────────────────────────────────────────────────────────

/// A non-fatal problem met while decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeWarning {
    /// A row was emitted incomplete, or the sink refused it.
    #[error(transparent)]
    Row(RowError),

    #[error("planes field is {0}, expected 1")]
    PlanesNotOne(u16),

    /// The RLE payload ended without an end-of-bitmap marker.
    #[error("RLE stream stopped early: {0:?}")]
    RleTerminated(RleTermination),

    /// The declared RLE flavour does not belong to the bit depth; the
    /// payload is decoded with the flavour the depth implies.
    #[error("{compression:?} declared for a {bits_per_pixel}-bit image")]
    RleDepthMismatch {
        compression: Compression,
        bits_per_pixel: u16,
    },

    /// 16-bit pixels are handed on unconverted.
    #[error("{0}-bit pixels passed through without channel conversion")]
    PassthroughDepth(u16),
}

/// Diagnostics gathered during a decode that still completed.
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub warnings: Vec<DecodeWarning>,
}

impl DecodeReport {
    /// No warnings were recorded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Per-row failures, in row order.
    pub fn row_errors(&self) -> impl Iterator<Item = &RowError> {
        self.warnings.iter().filter_map(|w| match w {
            DecodeWarning::Row(e) => Some(e),
            _ => None,
        })
    }

    fn push(&mut self, warning: DecodeWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

// ── Pipeline ────────────────────────────────────────────────────────

/// Parse headers only.
pub(crate) fn probe<R: Read + Seek>(reader: &mut R) -> Result<BmpHeaders, BmpError> {
    header::read_headers(reader)
}

/// Decode a whole bitmap into `sink`.
pub(crate) fn decode_into<R, S>(
    reader: &mut R,
    sink: &mut S,
    limits: Option<&Limits>,
    permissiveness: BmpPermissiveness,
    stop: &dyn Stop,
) -> Result<DecodeReport, BmpError>
where
    R: Read + Seek,
    S: ScanlineSink + ?Sized,
{
    let headers = header::read_headers(reader)?;
    let strict = permissiveness == BmpPermissiveness::Strict;
    let mut report = DecodeReport::default();

    if let Some(limits) = limits {
        limits.check(headers.width(), headers.height())?;
    }

    let planes = headers.info.planes;
    if planes != 1 {
        if strict {
            return Err(BmpError::InvalidHeader(format!(
                "planes must be 1, found {planes}"
            )));
        }
        report.push(DecodeWarning::PlanesNotOne(planes));
    }
    if strict && headers.compression().is_rle() && headers.is_top_down() {
        return Err(BmpError::InvalidHeader(
            "RLE compression with top-down row order".into(),
        ));
    }
    if !headers.rle_depth_matches() {
        if strict {
            return Err(BmpError::UnsupportedCompression {
                raw: headers.compression().raw(),
                bits_per_pixel: headers.bits_per_pixel(),
            });
        }
        report.push(DecodeWarning::RleDepthMismatch {
            compression: headers.compression(),
            bits_per_pixel: headers.bits_per_pixel(),
        });
    }
    if headers.bits_per_pixel() == 16 {
        report.push(DecodeWarning::PassthroughDepth(16));
    }

    let color_map = if headers.is_palette() {
        Some(palette::read_color_map(reader, &headers)?)
    } else {
        None
    };

    let layout = headers.layout();
    let setup = SinkSetup {
        width: headers.width(),
        height: headers.height(),
        layout,
        samples_per_pixel: layout.samples_per_pixel(),
        bits_per_sample: layout.bits_per_sample(),
        color_map: color_map.as_ref(),
    };

    stop.check()?;
    sink.begin(&setup).map_err(|e| BmpError::Sink(e.to_string()))?;

    if headers.compression().is_rle() {
        decode_rle(reader, sink, &headers, limits, stop, &mut report)?;
    } else {
        decode_rows(reader, sink, &headers, limits, strict, stop, &mut report)?;
    }

    sink.finish().map_err(|e| BmpError::Sink(e.to_string()))?;
    debug!(
        "decoded {}x{} {:?}, {} warning(s)",
        headers.width(),
        headers.height(),
        layout,
        report.warnings.len()
    );
    Ok(report)
}

/// Hand one scanline to the sink; a refusal becomes a row warning.
fn emit<S: ScanlineSink + ?Sized>(
    sink: &mut S,
    row: u32,
    scanline: &[u8],
    report: &mut DecodeReport,
) {
    if let Err(e) = sink.write_row(row, scanline) {
        report.push(DecodeWarning::Row(RowError::Write {
            row,
            message: e.to_string(),
        }));
    }
}

fn decode_rows<R, S>(
    reader: &mut R,
    sink: &mut S,
    headers: &BmpHeaders,
    limits: Option<&Limits>,
    strict: bool,
    stop: &dyn Stop,
    report: &mut DecodeReport,
) -> Result<(), BmpError>
where
    R: Read + Seek,
    S: ScanlineSink + ?Sized,
{
    let width = headers.width() as usize;
    let bpp = headers.bits_per_pixel();
    let stride = headers.row_stride()?;
    if let Some(limits) = limits {
        limits.check_memory(stride)?;
    }

    let mut unpacked = match bpp {
        1 | 4 => vec![0u8; width],
        _ => Vec::new(),
    };
    let mut rows = RowReader::new(reader, headers, stride);

    for row in 0..headers.height() {
        if row % 16 == 0 {
            stop.check()?;
        }

        let bytes = match rows.read_row(row) {
            Ok(bytes) => bytes,
            Err(PartialRow { bytes, error }) => {
                if strict {
                    return Err(error.into());
                }
                report.push(DecodeWarning::Row(error));
                bytes
            }
        };

        let scanline: &[u8] = match bpp {
            1 | 4 => {
                expand_bits_to_byte(usize::from(bpp), bytes, &mut unpacked);
                unpacked.as_slice()
            }
            _ => {
                let len = reorder_scanline(bytes, width, bpp);
                &bytes[..len]
            }
        };
        emit(sink, row, scanline, report);
    }
    Ok(())
}

fn decode_rle<R, S>(
    reader: &mut R,
    sink: &mut S,
    headers: &BmpHeaders,
    limits: Option<&Limits>,
    stop: &dyn Stop,
    report: &mut DecodeReport,
) -> Result<(), BmpError>
where
    R: Read + Seek,
    S: ScanlineSink + ?Sized,
{
    let width = headers.width() as usize;
    let height = headers.height() as usize;
    let pixels = width
        .checked_mul(height)
        .ok_or(BmpError::DimensionsTooLarge {
            width: headers.width(),
            height: headers.height(),
        })?;
    let payload_len = usize::try_from(headers.payload_len()).map_err(|_| {
        BmpError::LimitExceeded(format!(
            "RLE payload of {} bytes does not fit in memory",
            headers.payload_len()
        ))
    })?;
    if let Some(limits) = limits {
        limits.check_memory(payload_len)?;
        limits.check_memory(pixels)?;
    }

    reader.seek(SeekFrom::Start(u64::from(headers.file.pixel_offset)))?;
    let mut payload = vec![0u8; payload_len];
    let (read, err) = read_up_to(reader, &mut payload);
    if let Some(e) = err {
        return Err(e.into());
    }
    payload.truncate(read);

    stop.check()?;

    let mode = match headers.bits_per_pixel() {
        8 => RleMode::Rle8,
        _ => RleMode::Rle4,
    };
    let mut indices = vec![0u8; pixels];
    let summary = decompress(mode, &payload, &mut indices, width);
    drop(payload);

    // 1-bit images decoded as RLE4 carry nibbles wider than the palette.
    if headers.bits_per_pixel() < 4 {
        let mask = (1u8 << headers.bits_per_pixel()) - 1;
        indices.iter_mut().for_each(|v| *v &= mask);
    }

    debug!(
        "{mode:?}: consumed {} of {read} bytes, wrote {} of {pixels} pixels, {:?}",
        summary.consumed, summary.written, summary.termination
    );
    match summary.termination {
        RleTermination::EndOfBitmap | RleTermination::OutputFull => {}
        other => report.push(DecodeWarning::RleTerminated(other)),
    }

    // The buffer is filled in stored order, bottom row first.
    for row in 0..headers.height() {
        if row % 16 == 0 {
            stop.check()?;
        }
        let start = (height - row as usize - 1) * width;
        emit(sink, row, &indices[start..start + width], report);
    }
    Ok(())
}
