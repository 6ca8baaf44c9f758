//! Raster container written to scratch storage for embedded images.
//!
//! The cache persists image pixels as a small self-describing file so a
//! file-reading backend can reconstruct width/height/format without a side
//! channel: a 16-byte header (magic, dimensions, format tag) followed by
//! the raw pixel rows. The layout is internal to this workspace and carries
//! no compatibility promise.

use std::fmt;
use thiserror::Error;

/// Magic bytes opening every raster scratch file.
pub const RASTER_MAGIC: [u8; 4] = *b"PLRI";

/// Header length in bytes (magic + width + height + format tag + padding).
pub const RASTER_HEADER_LEN: usize = 16;

/// Pixel layout of a raster payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit grayscale, one byte per pixel.
    Gray8,
    /// 8-bit RGB, three bytes per pixel.
    Rgb24,
    /// 8-bit RGBA, four bytes per pixel.
    Rgba32,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb24 => 3,
            PixelFormat::Rgba32 => 4,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb24 => 2,
            PixelFormat::Rgba32 => 3,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(PixelFormat::Gray8),
            2 => Some(PixelFormat::Rgb24),
            3 => Some(PixelFormat::Rgba32),
            _ => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error type for raster container handling.
#[derive(Error, Debug, Clone)]
pub enum RasterError {
    #[error("Pixel buffer is {actual} bytes, expected {expected} for {width}x{height} {format}")]
    SizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    },

    #[error("Dimensions {width}x{height} {format} overflow the addressable buffer size")]
    Oversized {
        width: u32,
        height: u32,
        format: PixelFormat,
    },

    #[error("Not a raster container: {0}")]
    BadContainer(String),
}

/// A borrowed view of caller-owned pixels plus the metadata derived from
/// them. This is the "bitmap-like" input to the cache façade; it never
/// owns the pixel bytes.
#[derive(Debug, Clone, Copy)]
pub struct RasterView<'a> {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: &'a [u8],
}

impl<'a> RasterView<'a> {
    /// Builds a view, validating that the buffer length matches the
    /// dimensions and format exactly.
    pub fn new(
        pixels: &'a [u8],
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, RasterError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or(RasterError::Oversized {
                width,
                height,
                format,
            })?;
        if pixels.len() != expected {
            return Err(RasterError::SizeMismatch {
                actual: pixels.len(),
                expected,
                width,
                height,
                format,
            });
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }
}

/// Serializes a raster view into the container layout.
pub fn encode_raster(view: &RasterView<'_>) -> Vec<u8> {
    let mut out = Vec::with_capacity(RASTER_HEADER_LEN + view.pixels.len());
    out.extend_from_slice(&RASTER_MAGIC);
    out.extend_from_slice(&view.width.to_le_bytes());
    out.extend_from_slice(&view.height.to_le_bytes());
    out.push(view.format.tag());
    out.extend_from_slice(&[0u8; 3]);
    out.extend_from_slice(view.pixels);
    out
}

/// Parses a container, returning a view borrowing the payload in `bytes`.
pub fn decode_raster(bytes: &[u8]) -> Result<RasterView<'_>, RasterError> {
    if bytes.len() < RASTER_HEADER_LEN {
        return Err(RasterError::BadContainer(format!(
            "{} bytes is shorter than the header",
            bytes.len()
        )));
    }
    if bytes[..4] != RASTER_MAGIC {
        return Err(RasterError::BadContainer("bad magic".to_string()));
    }
    let width = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let height = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let format = PixelFormat::from_tag(bytes[12])
        .ok_or_else(|| RasterError::BadContainer(format!("unknown format tag {}", bytes[12])))?;
    RasterView::new(&bytes[RASTER_HEADER_LEN..], width, height, format)
}
