//! IHDR payload model.

use crate::{CodecError, CodecResult};

/// Exact size of an IHDR payload.
pub const IHDR_PAYLOAD_BYTES: usize = 13;

/// PNG color type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColorType {
    /// Grayscale, no alpha.
    Grayscale = 0,
    /// Truecolor.
    Rgb = 2,
    /// Palette indices.
    Indexed = 3,
    /// Grayscale with alpha.
    GrayscaleAlpha = 4,
    /// Truecolor with alpha.
    Rgba = 6,
}

impl TryFrom<u8> for ColorType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Grayscale),
            2 => Ok(Self::Rgb),
            3 => Ok(Self::Indexed),
            4 => Ok(Self::GrayscaleAlpha),
            6 => Ok(Self::Rgba),
            other => Err(CodecError::InvalidHeader {
                field: "color type",
                value: u32::from(other),
            }),
        }
    }
}

impl From<ColorType> for u8 {
    fn from(value: ColorType) -> Self {
        value as Self
    }
}

/// Decoded IHDR fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ihdr {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bits per sample.
    pub bit_depth: u8,
    /// Pixel layout.
    pub color_type: ColorType,
    /// Compression method (always 0).
    pub compression: u8,
    /// Filter method (always 0).
    pub filter: u8,
    /// Interlace method (0 = none).
    pub interlace: u8,
}

impl Ihdr {
    /// Decode the 13-byte payload, validating each field.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidHeader`] for a wrong payload size, zero
    /// dimensions, or an out-of-range bit depth / color type.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        if payload.len() != IHDR_PAYLOAD_BYTES {
            return Err(CodecError::InvalidHeader {
                field: "payload length",
                value: u32::try_from(payload.len()).unwrap_or(u32::MAX),
            });
        }

        let width = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let height = u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]);
        if width == 0 {
            return Err(CodecError::InvalidHeader {
                field: "width",
                value: width,
            });
        }
        if height == 0 {
            return Err(CodecError::InvalidHeader {
                field: "height",
                value: height,
            });
        }

        let bit_depth = payload[8];
        if !matches!(bit_depth, 1 | 2 | 4 | 8 | 16) {
            return Err(CodecError::InvalidHeader {
                field: "bit depth",
                value: u32::from(bit_depth),
            });
        }

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type: ColorType::try_from(payload[9])?,
            compression: payload[10],
            filter: payload[11],
            interlace: payload[12],
        })
    }

    /// Encode the payload with width/height big-endian.
    #[must_use]
    pub fn encode(&self) -> [u8; IHDR_PAYLOAD_BYTES] {
        let mut out = [0u8; IHDR_PAYLOAD_BYTES];
        out[0..4].copy_from_slice(&self.width.to_be_bytes());
        out[4..8].copy_from_slice(&self.height.to_be_bytes());
        out[8] = self.bit_depth;
        out[9] = self.color_type.into();
        out[10] = self.compression;
        out[11] = self.filter;
        out[12] = self.interlace;
        out
    }
}
