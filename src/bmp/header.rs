//! File header and info header parsing.
//!
//! Every BMP sub-format funnels into one [`InfoHeader`] record. The
//! [`Variant`] chosen from the declared info-header size fixes how wide the
//! dimension fields and color-table entries are.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, trace};

use super::utils::{read_i16_le, read_i32_le, read_u16_le, read_u32_le};
use crate::error::BmpError;
use crate::pixel::PixelLayout;

/// Size of the fixed file header that precedes the info header.
pub const FILE_HEADER_SIZE: u64 = 14;

const PIXEL_OFFSET_POS: u64 = 10;

const WINDOWS_V1_SIZE: u32 = 40;
const OS2_V1_SIZE: u32 = 12;
const OS2_V2_SIZE: u32 = 64;
const OS2_V2_SHORT_SIZE: u32 = 16;

// Offsets of the optional extended fields, measured from the start of the
// info header.
const RGB_MASKS_END: u32 = 52;
const ALPHA_MASK_END: u32 = 56;
const COLOR_SPACE_END: u32 = 108;

// ── Variant ─────────────────────────────────────────────────────────

/// BMP sub-format, derived from the info-header size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// 40-byte `BITMAPINFOHEADER` (Windows 3.0 / NT 3.51 / 95).
    WindowsV1,
    /// Any longer or unrecognized header (Windows NT 4.0 and later).
    WindowsV2,
    /// 12-byte OS/2 1.x `BITMAPCOREHEADER` with 16-bit dimensions.
    Os2V1,
    /// 64-byte OS/2 2.x header, and the 16-byte short form.
    Os2V2,
}

impl Variant {
    /// Select the variant for a declared info-header size.
    ///
    /// Unrecognized sizes fall back to [`Variant::WindowsV2`].
    pub fn from_header_size(size: u32) -> Self {
        match size {
            WINDOWS_V1_SIZE => Self::WindowsV1,
            OS2_V1_SIZE => Self::Os2V1,
            OS2_V2_SIZE | OS2_V2_SHORT_SIZE => Self::Os2V2,
            _ => Self::WindowsV2,
        }
    }

    /// Byte width of the width/height/planes/bpp fields.
    pub const fn dimension_field_width(self) -> usize {
        match self {
            Self::Os2V1 => 2,
            Self::WindowsV1 | Self::WindowsV2 | Self::Os2V2 => 4,
        }
    }

    /// Bytes per color-table entry.
    pub const fn color_entry_width(self) -> usize {
        match self {
            Self::WindowsV1 | Self::WindowsV2 => 4,
            Self::Os2V1 | Self::Os2V2 => 3,
        }
    }
}

// ── Compression ─────────────────────────────────────────────────────

/// Compression methods a BMP header can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Rle8,
    Rle4,
    Bitfields,
    Jpeg,
    Png,
}

impl Compression {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Rle8),
            2 => Some(Self::Rle4),
            3 => Some(Self::Bitfields),
            4 => Some(Self::Jpeg),
            5 => Some(Self::Png),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Rle8 => 1,
            Self::Rle4 => 2,
            Self::Bitfields => 3,
            Self::Jpeg => 4,
            Self::Png => 5,
        }
    }

    pub fn is_rle(self) -> bool {
        matches!(self, Self::Rle8 | Self::Rle4)
    }
}

// ── Header records ──────────────────────────────────────────────────

/// The 14-byte file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 2],
    /// File size as declared in the header. Unreliable in the wild; never
    /// used for bounds.
    pub declared_size: u32,
    /// Offset from the start of the file to the raster data.
    pub pixel_offset: u32,
    /// Length of the byte source, measured by seeking to its end.
    pub stream_len: u64,
}

/// CIE XYZ coordinates of one calibration endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CieXyz {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Color-space block of the newer Windows headers. Parsed, never applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorSpace {
    pub cs_type: u32,
    pub red: CieXyz,
    pub green: CieXyz,
    pub blue: CieXyz,
    pub gamma_red: u32,
    pub gamma_green: u32,
    pub gamma_blue: u32,
}

/// Fields that only exist past the 40-byte Windows header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedFields {
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    pub alpha_mask: Option<u32>,
    pub color_space: Option<ColorSpace>,
}

/// Variant-independent info header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Positive means bottom-up storage, negative top-down.
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    pub image_size: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
    pub extended: Option<ExtendedFields>,
}

/// Everything the header stage produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeaders {
    pub file: FileHeader,
    pub info: InfoHeader,
    pub variant: Variant,
}

impl BmpHeaders {
    pub fn width(&self) -> u32 {
        self.info.width.unsigned_abs()
    }

    pub fn height(&self) -> u32 {
        self.info.height.unsigned_abs()
    }

    /// Rows are stored top row first.
    pub fn is_top_down(&self) -> bool {
        self.info.height < 0
    }

    pub fn compression(&self) -> Compression {
        self.info.compression
    }

    pub fn bits_per_pixel(&self) -> u16 {
        self.info.bits_per_pixel
    }

    pub fn is_palette(&self) -> bool {
        matches!(self.info.bits_per_pixel, 1 | 4 | 8)
    }

    /// Layout of the scanlines this image produces.
    pub fn layout(&self) -> PixelLayout {
        // Depth was validated while parsing.
        PixelLayout::for_bit_depth(self.info.bits_per_pixel).unwrap_or(PixelLayout::Rgb8)
    }

    /// Stored byte length of one uncompressed row.
    pub fn row_stride(&self) -> Result<usize, BmpError> {
        super::raster::row_stride(self.width(), self.info.bits_per_pixel)
    }

    /// The declared RLE flavour is the one defined for this bit depth
    /// (RLE8 for 8 bpp, RLE4 for 4 bpp). Always true when uncompressed.
    pub fn rle_depth_matches(&self) -> bool {
        match self.info.compression {
            Compression::Rle8 => self.info.bits_per_pixel == 8,
            Compression::Rle4 => self.info.bits_per_pixel == 4,
            _ => true,
        }
    }

    /// Byte offset of the color table.
    pub fn color_table_offset(&self) -> u64 {
        FILE_HEADER_SIZE + u64::from(self.info.header_size)
    }

    /// Number of stored color-table entries for palette images, else 0.
    pub fn color_table_len(&self) -> usize {
        if !self.is_palette() {
            return 0;
        }
        let max = 1usize << self.info.bits_per_pixel;
        match self.info.colors_used {
            0 => max,
            used => max.min(used as usize),
        }
    }

    /// Byte length of the compressed payload, from the pixel offset to the
    /// end of the stream.
    pub fn payload_len(&self) -> u64 {
        self.file
            .stream_len
            .saturating_sub(u64::from(self.file.pixel_offset))
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

/// Read and validate the file header and info header.
pub(crate) fn read_headers<R: Read + Seek>(reader: &mut R) -> Result<BmpHeaders, BmpError> {
    reader.seek(SeekFrom::Start(0))?;
    let mut signature = [0u8; 2];
    reader.read_exact(&mut signature)?;
    if &signature != b"BM" {
        return Err(BmpError::NotABitmap { found: signature });
    }
    let declared_size = read_u32_le(reader)?;

    reader.seek(SeekFrom::Start(PIXEL_OFFSET_POS))?;
    let pixel_offset = read_u32_le(reader)?;
    let stream_len = reader.seek(SeekFrom::End(0))?;

    let file = FileHeader {
        signature,
        declared_size,
        pixel_offset,
        stream_len,
    };

    reader.seek(SeekFrom::Start(FILE_HEADER_SIZE))?;
    let header_size = read_u32_le(reader)?;
    let variant = Variant::from_header_size(header_size);

    let info = match variant.dimension_field_width() {
        2 => read_core_fields(reader, header_size)?,
        _ => read_info_fields(reader, header_size, variant)?,
    };

    let bpp = info.bits_per_pixel;
    if PixelLayout::for_bit_depth(bpp).is_none() {
        return Err(BmpError::UnsupportedBitDepth(bpp));
    }

    let supported = match info.compression {
        Compression::None => true,
        // Run-length data is only defined for palette depths; which flavour
        // is decoded follows the depth, see `BmpHeaders::rle_depth_matches`.
        Compression::Rle8 | Compression::Rle4 => matches!(bpp, 1 | 4 | 8),
        Compression::Bitfields | Compression::Jpeg | Compression::Png => false,
    };
    if !supported {
        return Err(BmpError::UnsupportedCompression {
            raw: info.compression.raw(),
            bits_per_pixel: bpp,
        });
    }

    trace!("Variant: {variant:?} (info header {header_size} bytes)");
    trace!("Width: {}", info.width);
    trace!("Height: {}", info.height);
    trace!("Bit depth: {bpp}");
    trace!("Compression: {:?}", info.compression);
    trace!("Pixel offset: {pixel_offset}, stream length: {stream_len}");

    Ok(BmpHeaders {
        file,
        info,
        variant,
    })
}

/// OS/2 1.x: four 16-bit fields, no compression.
fn read_core_fields<R: Read>(reader: &mut R, header_size: u32) -> Result<InfoHeader, BmpError> {
    let width = i32::from(read_i16_le(reader)?);
    let height = i32::from(read_i16_le(reader)?);
    let planes = read_u16_le(reader)?;
    let bits_per_pixel = read_u16_le(reader)?;

    Ok(InfoHeader {
        header_size,
        width,
        height,
        planes,
        bits_per_pixel,
        compression: Compression::None,
        image_size: 0,
        x_pels_per_meter: 0,
        y_pels_per_meter: 0,
        colors_used: 0,
        colors_important: 0,
        extended: None,
    })
}

/// Windows and OS/2 2.x: the full 32-bit field set.
fn read_info_fields<R: Read>(
    reader: &mut R,
    header_size: u32,
    variant: Variant,
) -> Result<InfoHeader, BmpError> {
    let width = read_i32_le(reader)?;
    let height = read_i32_le(reader)?;
    let planes = read_u16_le(reader)?;
    let bits_per_pixel = read_u16_le(reader)?;

    // The 16-byte OS/2 short form stops after the bit depth.
    if header_size < WINDOWS_V1_SIZE {
        return Ok(InfoHeader {
            header_size,
            width,
            height,
            planes,
            bits_per_pixel,
            compression: Compression::None,
            image_size: 0,
            x_pels_per_meter: 0,
            y_pels_per_meter: 0,
            colors_used: 0,
            colors_important: 0,
            extended: None,
        });
    }

    let raw_compression = read_u32_le(reader)?;
    let image_size = read_u32_le(reader)?;
    let x_pels_per_meter = read_i32_le(reader)?;
    let y_pels_per_meter = read_i32_le(reader)?;
    let colors_used = read_u32_le(reader)?;
    let colors_important = read_u32_le(reader)?;

    let compression =
        Compression::from_raw(raw_compression).ok_or(BmpError::UnsupportedCompression {
            raw: raw_compression,
            bits_per_pixel,
        })?;

    let extended = if variant == Variant::WindowsV2 && header_size >= RGB_MASKS_END {
        match read_extended_fields(reader, header_size) {
            Ok(fields) => Some(fields),
            Err(e) => {
                debug!("extended header fields unreadable, ignoring: {e}");
                None
            }
        }
    } else {
        None
    };

    Ok(InfoHeader {
        header_size,
        width,
        height,
        planes,
        bits_per_pixel,
        compression,
        image_size,
        x_pels_per_meter,
        y_pels_per_meter,
        colors_used,
        colors_important,
        extended,
    })
}

fn read_extended_fields<R: Read>(
    reader: &mut R,
    header_size: u32,
) -> std::io::Result<ExtendedFields> {
    let mut fields = ExtendedFields {
        red_mask: read_u32_le(reader)?,
        green_mask: read_u32_le(reader)?,
        blue_mask: read_u32_le(reader)?,
        ..ExtendedFields::default()
    };

    if header_size >= ALPHA_MASK_END {
        fields.alpha_mask = Some(read_u32_le(reader)?);
    }

    if header_size >= COLOR_SPACE_END {
        let cs_type = read_u32_le(reader)?;
        let mut xyz = || -> std::io::Result<CieXyz> {
            Ok(CieXyz {
                x: read_i32_le(reader)?,
                y: read_i32_le(reader)?,
                z: read_i32_le(reader)?,
            })
        };
        let red = xyz()?;
        let green = xyz()?;
        let blue = xyz()?;
        fields.color_space = Some(ColorSpace {
            cs_type,
            red,
            green,
            blue,
            gamma_red: read_u32_le(reader)?,
            gamma_green: read_u32_le(reader)?,
            gamma_blue: read_u32_le(reader)?,
        });
    }

    Ok(fields)
}
