use std::io;

use enough::StopReason;

/// Errors that abort a BMP decode.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BmpError {
    /// The signature at offset 0 is not `BM`. The input is simply not a
    /// bitmap; callers usually skip it rather than fail.
    #[error("not a BMP file (signature {found:02X?})")]
    NotABitmap { found: [u8; 2] },

    #[error("unsupported BMP bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("unsupported BMP compression method {raw} for {bits_per_pixel}-bit image")]
    UnsupportedCompression { raw: u32, bits_per_pixel: u16 },

    #[error("truncated color table: expected {expected} bytes, got {actual}")]
    TruncatedColorTable { expected: usize, actual: usize },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("pixel layout mismatch: expected {expected:?}, got {actual:?}")]
    LayoutMismatch {
        expected: crate::PixelLayout,
        actual: crate::PixelLayout,
    },

    #[error("scanline sink failed: {0}")]
    Sink(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl BmpError {
    /// True when the input was rejected only because it is not a bitmap.
    pub fn is_not_a_bitmap(&self) -> bool {
        matches!(self, BmpError::NotABitmap { .. })
    }
}

impl From<StopReason> for BmpError {
    fn from(r: StopReason) -> Self {
        BmpError::Cancelled(r)
    }
}

impl From<io::Error> for BmpError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            BmpError::UnexpectedEof
        } else {
            BmpError::Io(e)
        }
    }
}

/// A failure confined to one output row. The row is still emitted.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RowError {
    #[error("scanline {row}: seek error: {source}")]
    Seek {
        row: u32,
        #[source]
        source: io::Error,
    },

    #[error("scanline {row}: read error: {source}")]
    Read {
        row: u32,
        #[source]
        source: io::Error,
    },

    #[error("scanline {row}: short read, expected {expected} bytes, got {actual}")]
    ShortRead {
        row: u32,
        expected: usize,
        actual: usize,
    },

    #[error("scanline {row}: write error: {message}")]
    Write { row: u32, message: String },
}

impl RowError {
    /// Output row the failure belongs to.
    pub fn row(&self) -> u32 {
        match self {
            RowError::Seek { row, .. }
            | RowError::Read { row, .. }
            | RowError::ShortRead { row, .. }
            | RowError::Write { row, .. } => *row,
        }
    }
}

impl From<RowError> for BmpError {
    fn from(e: RowError) -> Self {
        match e {
            RowError::Seek { source, .. } | RowError::Read { source, .. } => source.into(),
            RowError::ShortRead { .. } => BmpError::UnexpectedEof,
            RowError::Write { message, .. } => BmpError::Sink(message),
        }
    }
}
