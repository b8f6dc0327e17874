//! The boundary between the decoder and whatever stores its output.

use std::fmt::Display;

use crate::bmp::ColorMap;
use crate::pixel::PixelLayout;

/// Image description handed to a sink before the first row.
#[derive(Debug, Clone, Copy)]
pub struct SinkSetup<'a> {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub samples_per_pixel: u16,
    pub bits_per_sample: u16,
    /// Present only for palette images.
    pub color_map: Option<&'a ColorMap>,
}

impl SinkSetup<'_> {
    /// Byte length of every scanline passed to [`ScanlineSink::write_row`].
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.layout.bytes_per_pixel()
    }
}

/// Consumer of decoded scanlines, e.g. a TIFF or PNG writer.
///
/// Rows arrive exactly once each, top to bottom.
pub trait ScanlineSink {
    type Error: Display;

    /// Configure the destination. An error aborts the decode.
    fn begin(&mut self, setup: &SinkSetup<'_>) -> Result<(), Self::Error>;

    /// Store one scanline. An error is recorded as a row warning and the
    /// decode moves on to the next row.
    fn write_row(&mut self, row: u32, scanline: &[u8]) -> Result<(), Self::Error>;

    /// Called after the last row. An error aborts the decode.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S: ScanlineSink + ?Sized> ScanlineSink for &mut S {
    type Error = S::Error;

    fn begin(&mut self, setup: &SinkSetup<'_>) -> Result<(), Self::Error> {
        (**self).begin(setup)
    }

    fn write_row(&mut self, row: u32, scanline: &[u8]) -> Result<(), Self::Error> {
        (**self).write_row(row, scanline)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        (**self).finish()
    }
}

/// Sink that gathers every row into one contiguous buffer.
#[derive(Debug, Default)]
pub(crate) struct CollectSink {
    pub(crate) pixels: Vec<u8>,
    pub(crate) row_bytes: usize,
    pub(crate) color_map: Option<ColorMap>,
}

impl ScanlineSink for CollectSink {
    type Error = std::convert::Infallible;

    fn begin(&mut self, setup: &SinkSetup<'_>) -> Result<(), Self::Error> {
        self.row_bytes = setup.row_bytes();
        self.pixels = vec![0u8; self.row_bytes * setup.height as usize];
        self.color_map = setup.color_map.cloned();
        Ok(())
    }

    fn write_row(&mut self, row: u32, scanline: &[u8]) -> Result<(), Self::Error> {
        let start = row as usize * self.row_bytes;
        if let Some(dst) = self.pixels.get_mut(start..start + self.row_bytes) {
            dst.copy_from_slice(&scanline[..self.row_bytes]);
        }
        Ok(())
    }
}
