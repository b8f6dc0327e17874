//! Color table to 16-bit lookup tables.

use std::io::{Read, Seek, SeekFrom};

use log::debug;

use super::header::BmpHeaders;
use super::utils::read_up_to;
use crate::error::BmpError;

/// Scale an 8-bit channel value to 16 bits by byte replication.
#[inline]
pub const fn scale_to_u16(v: u8) -> u16 {
    v as u16 * 257
}

/// Red, green and blue lookup tables for a palette image.
///
/// Each table holds `2^bpp` slots. Only the first [`ColorMap::populated`]
/// slots come from the file; the rest are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    red: Vec<u16>,
    green: Vec<u16>,
    blue: Vec<u16>,
    populated: usize,
}

impl ColorMap {
    pub fn red(&self) -> &[u16] {
        &self.red
    }

    pub fn green(&self) -> &[u16] {
        &self.green
    }

    pub fn blue(&self) -> &[u16] {
        &self.blue
    }

    /// Table length, `2^bpp`.
    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }

    /// Number of entries read from the file.
    pub fn populated(&self) -> usize {
        self.populated
    }

    /// 16-bit RGB for a palette index.
    pub fn rgb16(&self, index: u8) -> Option<[u16; 3]> {
        let i = usize::from(index);
        Some([
            *self.red.get(i)?,
            *self.green.get(i)?,
            *self.blue.get(i)?,
        ])
    }

    /// Build tables from raw `(blue, green, red[, reserved])` entries.
    pub(crate) fn from_entries(raw: &[u8], entry_width: usize, bits_per_pixel: u16) -> Self {
        let slots = 1usize << bits_per_pixel;
        let mut red = vec![0u16; slots];
        let mut green = vec![0u16; slots];
        let mut blue = vec![0u16; slots];

        let mut populated = 0;
        for (i, entry) in raw.chunks_exact(entry_width).take(slots).enumerate() {
            blue[i] = scale_to_u16(entry[0]);
            green[i] = scale_to_u16(entry[1]);
            red[i] = scale_to_u16(entry[2]);
            populated += 1;
        }

        Self {
            red,
            green,
            blue,
            populated,
        }
    }
}

/// Read the color table that follows the info header.
pub(crate) fn read_color_map<R: Read + Seek>(
    reader: &mut R,
    headers: &BmpHeaders,
) -> Result<ColorMap, BmpError> {
    let entries = headers.color_table_len();
    let entry_width = headers.variant.color_entry_width();
    let expected = entries * entry_width;

    let mut raw = vec![0u8; expected];
    reader.seek(SeekFrom::Start(headers.color_table_offset()))?;
    let (actual, err) = read_up_to(reader, &mut raw);
    if let Some(e) = err {
        debug!("color table read failed after {actual} bytes: {e}");
    }
    if actual < expected {
        return Err(BmpError::TruncatedColorTable { expected, actual });
    }

    let map = ColorMap::from_entries(&raw, entry_width, headers.bits_per_pixel());
    debug!(
        "color map: {} of {} entries, {entry_width} bytes each",
        map.populated(),
        map.len()
    );
    Ok(map)
}
