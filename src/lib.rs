//! # bmpscan
//!
//! Streaming Windows/OS2 BMP decoder. Scanlines are normalized (palette
//! indices unpacked, BGR reordered to RGB) and handed one at a time, top row
//! first, to a caller-supplied [`ScanlineSink`].
//!
//! ## Supported Input
//!
//! - Windows 3.x `BITMAPINFOHEADER` and the longer NT 4.0+ headers
//! - OS/2 1.x (12-byte) and 2.x (64- and 16-byte) headers
//! - 1, 4 and 8-bit palette images, uncompressed or RLE4/RLE8
//! - 24 and 32-bit BGR(A), reordered to 8-bit RGB (alpha dropped)
//! - 16-bit pixels, passed through unconverted
//!
//! ## Non-Goals
//!
//! - Encoding, or writing any output container
//! - BITFIELDS and embedded JPEG/PNG payloads
//! - Color management (calibration fields are parsed, never applied)
//!
//! ## Usage
//!
//! ```no_run
//! use bmpscan::{DecodeRequest, PixelLayout, ScanlineSink, SinkSetup, Unstoppable};
//!
//! struct Count(usize);
//!
//! impl ScanlineSink for Count {
//!     type Error = std::io::Error;
//!
//!     fn begin(&mut self, setup: &SinkSetup<'_>) -> std::io::Result<()> {
//!         println!("{}x{} {:?}", setup.width, setup.height, setup.layout);
//!         Ok(())
//!     }
//!
//!     fn write_row(&mut self, _row: u32, scanline: &[u8]) -> std::io::Result<()> {
//!         self.0 += scanline.len();
//!         Ok(())
//!     }
//! }
//!
//! let mut file = std::fs::File::open("in.bmp")?;
//! let mut sink = Count(0);
//! let report = DecodeRequest::new().decode_into(&mut file, &mut sink, Unstoppable)?;
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//!
//! // Or collect everything in memory.
//! let decoded = bmpscan::decode_bmp(&mut std::fs::File::open("in.bmp")?, Unstoppable)?;
//! if decoded.layout == PixelLayout::Indexed8 {
//!     println!("top-left: {:?}", decoded.rgb16_at(0, 0));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod error;
mod limits;
mod pixel;
mod sink;

pub mod bmp;

mod decode;

use std::io::{Read, Seek};

// Re-exports
pub use bmp::{BmpHeaders, BmpPermissiveness, ColorMap, DecodeReport, DecodeWarning};
pub use decode::{DecodeOutput, DecodeRequest};
pub use enough::{Stop, Unstoppable};
pub use error::{BmpError, RowError};
pub use limits::Limits;
pub use pixel::PixelLayout;
pub use sink::{ScanlineSink, SinkSetup};

/// Decode a BMP stream into memory with default settings.
pub fn decode_bmp<R: Read + Seek>(
    reader: &mut R,
    stop: impl Stop,
) -> Result<DecodeOutput, BmpError> {
    DecodeRequest::new().decode(reader, stop)
}

/// Parse the headers without touching pixel data.
pub fn probe_bmp<R: Read + Seek>(reader: &mut R) -> Result<BmpHeaders, BmpError> {
    bmp::probe(reader)
}
