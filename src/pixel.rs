/// Memory layout of the scanlines handed to a sink.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// One palette index per byte; resolve through the color map.
    Indexed8,
    /// 3 channels, 8-bit RGB.
    Rgb8,
    /// Raw 16-bit BMP pixels, two bytes each, channel layout unverified.
    Rgb16Packed,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Indexed8 => 1,
            Self::Rgb16Packed => 2,
            Self::Rgb8 => 3,
        }
    }

    /// Samples per pixel as a raster container would record them.
    pub fn samples_per_pixel(&self) -> u16 {
        match self {
            Self::Indexed8 => 1,
            Self::Rgb8 | Self::Rgb16Packed => 3,
        }
    }

    /// Bits per sample as a raster container would record them.
    pub fn bits_per_sample(&self) -> u16 {
        match self {
            Self::Indexed8 | Self::Rgb8 => 8,
            Self::Rgb16Packed => 5,
        }
    }

    /// Output layout for a source bit depth, if the depth is supported.
    pub fn for_bit_depth(bits_per_pixel: u16) -> Option<Self> {
        match bits_per_pixel {
            1 | 4 | 8 => Some(Self::Indexed8),
            16 => Some(Self::Rgb16Packed),
            24 | 32 => Some(Self::Rgb8),
            _ => None,
        }
    }
}
