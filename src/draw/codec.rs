//! Byte encodings of surface pixels.
//!
//! The raw encoding is what history snapshots and raw imports use:
//!
//! ```text
//! magic  "DPRW"        4 bytes
//! version              1 byte
//! width, height        u32 little-endian each
//! pixels               width * height * 4 bytes, RGBA8, row-major
//! ```
//!
//! It is deterministic: identical pixels always produce identical bytes.
//! PNG is the exchange format for saved drawings.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat};
use std::sync::Arc;

pub const RAW_MAGIC: &[u8; 4] = b"DPRW";
pub const RAW_VERSION: u8 = 1;
pub const RAW_HEADER_LEN: usize = 4 + 1 + 4 + 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("payload too short: {len} bytes")]
    Truncated { len: usize },
    #[error("missing raw pixel header")]
    BadMagic,
    #[error("unsupported raw pixel encoding version {0}")]
    UnsupportedVersion(u8),
    #[error("pixel payload is {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("encoded image is {found_width}x{found_height}, surface is {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("imported image is {found_width}x{found_height}, canvas is {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },
    #[error("raw import is not decodable: {0}")]
    Raw(#[from] DecodeError),
    #[error("png import is not decodable: {0}")]
    Png(#[from] image::ImageError),
}

/// Immutable encoded copy of surface content. Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(Arc<[u8]>);

impl Snapshot {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decoded raw payload: dimensions plus a borrowed view of the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawImage<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

pub fn encode_raw(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(RAW_HEADER_LEN + pixels.len());
    out.extend_from_slice(RAW_MAGIC);
    out.push(RAW_VERSION);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(pixels);
    out
}

pub fn decode_raw(bytes: &[u8]) -> Result<RawImage<'_>, DecodeError> {
    if bytes.len() < RAW_HEADER_LEN {
        return Err(DecodeError::Truncated { len: bytes.len() });
    }
    if &bytes[..4] != RAW_MAGIC {
        return Err(DecodeError::BadMagic);
    }
    if bytes[4] != RAW_VERSION {
        return Err(DecodeError::UnsupportedVersion(bytes[4]));
    }
    let width = read_u32_le(&bytes[5..9]);
    let height = read_u32_le(&bytes[9..13]);
    let pixels = &bytes[RAW_HEADER_LEN..];
    let expected = rgba_len(width, height).ok_or(DecodeError::LengthMismatch {
        expected: usize::MAX,
        actual: pixels.len(),
    })?;
    if pixels.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(RawImage {
        width,
        height,
        pixels,
    })
}

/// Decodes `bytes` and checks that they describe a `width` x `height` image.
pub fn decode_raw_sized(bytes: &[u8], width: u32, height: u32) -> Result<&[u8], DecodeError> {
    let raw = decode_raw(bytes)?;
    if raw.width != width || raw.height != height {
        return Err(DecodeError::DimensionMismatch {
            width,
            height,
            found_width: raw.width,
            found_height: raw.height,
        });
    }
    Ok(raw.pixels)
}

pub fn encode_png(width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(pixels, width, height, ColorType::Rgba8)?;
    Ok(out)
}

/// Decodes a PNG into RGBA8 pixels, returning `(width, height, pixels)`.
pub fn decode_png(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>), image::ImageError> {
    let rgba = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((width, height, rgba.into_raw()))
}

pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}
