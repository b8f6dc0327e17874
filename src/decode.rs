use std::io::{Read, Seek};

use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::bmp::{self, BmpPermissiveness, ColorMap, DecodeReport, scale_to_u16};
use crate::error::BmpError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;
use crate::sink::{CollectSink, ScanlineSink};

/// Decode configuration, threaded explicitly through every entry point.
///
/// ```no_run
/// use bmpscan::{BmpPermissiveness, DecodeRequest, Limits, Unstoppable};
///
/// let limits = Limits { max_pixels: Some(64 << 20), ..Limits::default() };
/// let mut file = std::fs::File::open("in.bmp")?;
/// let decoded = DecodeRequest::new()
///     .with_limits(&limits)
///     .with_permissiveness(BmpPermissiveness::Strict)
///     .decode(&mut file, Unstoppable)?;
/// println!("{}x{} {:?}", decoded.width, decoded.height, decoded.layout);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeRequest<'a> {
    limits: Option<&'a Limits>,
    permissiveness: BmpPermissiveness,
}

impl<'a> DecodeRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject images and allocations beyond `limits`.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_permissiveness(mut self, permissiveness: BmpPermissiveness) -> Self {
        self.permissiveness = permissiveness;
        self
    }

    /// Stream every scanline into `sink`, top row first.
    pub fn decode_into<R, S>(
        &self,
        reader: &mut R,
        sink: &mut S,
        stop: impl Stop,
    ) -> Result<DecodeReport, BmpError>
    where
        R: Read + Seek,
        S: ScanlineSink + ?Sized,
    {
        bmp::decode_into(reader, sink, self.limits, self.permissiveness, &stop)
    }

    /// Decode into one contiguous in-memory buffer.
    pub fn decode<R: Read + Seek>(
        &self,
        reader: &mut R,
        stop: impl Stop,
    ) -> Result<DecodeOutput, BmpError> {
        let headers = bmp::probe(reader)?;
        let (width, height) = (headers.width(), headers.height());
        let layout = headers.layout();
        let out_bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(layout.bytes_per_pixel()))
            .ok_or(BmpError::DimensionsTooLarge { width, height })?;
        if let Some(limits) = self.limits {
            limits.check(width, height)?;
            limits.check_memory(out_bytes)?;
        }

        let mut sink = CollectSink::default();
        let report = bmp::decode_into(reader, &mut sink, self.limits, self.permissiveness, &stop)?;

        Ok(DecodeOutput {
            pixels: sink.pixels,
            width,
            height,
            layout,
            color_map: sink.color_map,
            report,
        })
    }
}

/// A fully decoded image, rows top to bottom with no padding.
#[derive(Debug)]
pub struct DecodeOutput {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    color_map: Option<ColorMap>,
    report: DecodeReport,
}

impl DecodeOutput {
    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Color map of a palette image.
    pub fn color_map(&self) -> Option<&ColorMap> {
        self.color_map.as_ref()
    }

    /// Warnings recorded while decoding.
    pub fn report(&self) -> &DecodeReport {
        &self.report
    }

    /// 16-bit RGB of the pixel at `(x, y)`, counted from the top left.
    ///
    /// Palette indices resolve through the color map. Returns `None` out of
    /// bounds and for [`PixelLayout::Rgb16Packed`], whose channel layout is
    /// not known.
    pub fn rgb16_at(&self, x: u32, y: u32) -> Option<[u16; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.layout.bytes_per_pixel();
        let at = (y as usize * self.width as usize + x as usize) * bpp;
        match self.layout {
            PixelLayout::Indexed8 => self.color_map.as_ref()?.rgb16(*self.pixels.get(at)?),
            PixelLayout::Rgb8 => {
                let px = self.pixels.get(at..at + 3)?;
                Some([scale_to_u16(px[0]), scale_to_u16(px[1]), scale_to_u16(px[2])])
            }
            PixelLayout::Rgb16Packed => None,
        }
    }

    /// Reinterpret 24/32-bit output as RGB pixels.
    ///
    /// Returns [`BmpError::LayoutMismatch`] for any other layout.
    #[cfg(feature = "rgb")]
    pub fn as_rgb8(&self) -> Result<&[rgb::RGB8], BmpError> {
        if self.layout != PixelLayout::Rgb8 {
            return Err(BmpError::LayoutMismatch {
                expected: PixelLayout::Rgb8,
                actual: self.layout,
            });
        }
        Ok(self.pixels().as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of RGB pixels.
    ///
    /// Returns [`BmpError::LayoutMismatch`] unless the layout is
    /// [`PixelLayout::Rgb8`].
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> Result<imgref::ImgRef<'_, rgb::RGB8>, BmpError> {
        let pixels = self.as_rgb8()?;
        Ok(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Zero-copy view of palette indices.
    #[cfg(feature = "imgref")]
    pub fn as_indexed_imgref(&self) -> Result<imgref::ImgRef<'_, u8>, BmpError> {
        if self.layout != PixelLayout::Indexed8 {
            return Err(BmpError::LayoutMismatch {
                expected: PixelLayout::Indexed8,
                actual: self.layout,
            });
        }
        Ok(imgref::ImgRef::new(
            self.pixels.as_slice(),
            self.width as usize,
            self.height as usize,
        ))
    }
}
