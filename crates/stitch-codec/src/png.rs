//! The three-chunk PNG document.
//!
//! The strip server emits PNGs with exactly IHDR, IDAT, IEND in that order
//! and a single zlib stream in the IDAT. [`StripPng`] models that document:
//! parsing is strict about chunk order and count, lenient about CRC
//! mismatches (the first one is recorded, the data is kept).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bytes::Bytes;
use flate2::Compression;

use crate::{
    is_png, zutil, ChunkType, CodecError, CodecResult, ColorType, Ihdr, RawChunk, PNG_SIGNATURE,
};

/// A recorded CRC mismatch from parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcWarning {
    /// Chunk the mismatch occurred in.
    pub chunk_type: ChunkType,
    /// CRC stored on the wire.
    pub expected: u32,
    /// CRC computed over the chunk contents.
    pub computed: u32,
}

/// A parsed strip PNG: IHDR fields plus the compressed IDAT payload.
#[derive(Debug, Clone)]
pub struct StripPng {
    /// Decoded image header.
    pub ihdr: Ihdr,
    /// IDAT payload, still zlib-compressed.
    pub idat: Bytes,
    /// First CRC mismatch seen while parsing, if any.
    pub crc_warning: Option<CrcWarning>,
}

impl StripPng {
    /// Build an empty PNG with the given header geometry.
    ///
    /// Compression, filter, and interlace are 0; the IDAT starts empty and
    /// is filled via [`StripPng::set_raster`].
    #[must_use]
    pub fn new(width: u32, height: u32, bit_depth: u8, color_type: ColorType) -> Self {
        Self {
            ihdr: Ihdr {
                width,
                height,
                bit_depth,
                color_type,
                compression: 0,
                filter: 0,
                interlace: 0,
            },
            idat: Bytes::new(),
            crc_warning: None,
        }
    }

    /// Parse signature plus exactly IHDR, IDAT, IEND.
    ///
    /// A CRC mismatch is not fatal: the chunk's data is still used and the
    /// first mismatch is recorded on the returned value.
    ///
    /// # Errors
    ///
    /// [`CodecError::NotAPng`] on a bad signature, [`CodecError::WrongChunk`]
    /// on order/type violations, [`CodecError::TrailingData`] when bytes
    /// follow IEND, [`CodecError::Truncated`] when a chunk overruns the
    /// buffer, [`CodecError::InvalidHeader`] on bad IHDR fields.
    pub fn parse(bytes: Bytes) -> CodecResult<Self> {
        if !is_png(&bytes) {
            return Err(CodecError::NotAPng);
        }

        let mut offset = PNG_SIGNATURE.len();
        let mut crc_warning = None;

        let ihdr_raw = Self::expect_chunk(&bytes, &mut offset, ChunkType::IHDR, &mut crc_warning)?;
        let ihdr = Ihdr::parse(&ihdr_raw.data)?;
        let idat_raw = Self::expect_chunk(&bytes, &mut offset, ChunkType::IDAT, &mut crc_warning)?;
        Self::expect_chunk(&bytes, &mut offset, ChunkType::IEND, &mut crc_warning)?;

        if offset != bytes.len() {
            return Err(CodecError::TrailingData(bytes.len() - offset));
        }

        Ok(Self {
            ihdr,
            idat: idat_raw.data,
            crc_warning,
        })
    }

    fn expect_chunk(
        bytes: &Bytes,
        offset: &mut usize,
        expected: ChunkType,
        crc_warning: &mut Option<CrcWarning>,
    ) -> CodecResult<RawChunk> {
        let (chunk, next) = RawChunk::read(bytes, *offset)?;
        if chunk.chunk_type != expected {
            return Err(CodecError::WrongChunk {
                expected,
                found: chunk.chunk_type,
            });
        }
        if crc_warning.is_none() {
            if let Err(CodecError::CrcMismatch {
                expected: stored,
                computed,
            }) = chunk.verify_crc()
            {
                *crc_warning = Some(CrcWarning {
                    chunk_type: chunk.chunk_type,
                    expected: stored,
                    computed,
                });
            }
        }
        *offset = next;
        Ok(chunk)
    }

    /// Inflate the IDAT payload into raw filtered scanlines.
    ///
    /// # Errors
    ///
    /// [`CodecError::Compression`] when the zlib stream is invalid.
    pub fn inflate_idat(&self) -> CodecResult<Vec<u8>> {
        zutil::inflate(&self.idat)
    }

    /// Deflate `raster` and install it as the IDAT payload.
    ///
    /// The header is left untouched.
    ///
    /// # Errors
    ///
    /// [`CodecError::Compression`] when the encoder fails.
    pub fn set_raster(&mut self, raster: &[u8], level: Compression) -> CodecResult<()> {
        self.idat = Bytes::from(zutil::deflate(raster, level)?);
        Ok(())
    }

    /// Serialize signature plus the three chunks, each with a freshly
    /// computed CRC.
    ///
    /// # Errors
    ///
    /// Propagates sink I/O failures.
    pub fn write_to(&self, sink: &mut impl Write) -> CodecResult<()> {
        sink.write_all(&PNG_SIGNATURE)?;
        RawChunk::new(
            ChunkType::IHDR,
            Bytes::copy_from_slice(&self.ihdr.encode()),
        )
        .write_to(sink)?;
        RawChunk::new(ChunkType::IDAT, self.idat.clone()).write_to(sink)?;
        RawChunk::new(ChunkType::IEND, Bytes::new()).write_to(sink)?;
        Ok(())
    }

    /// Serialize to an owned buffer.
    ///
    /// # Errors
    ///
    /// See [`StripPng::write_to`].
    pub fn to_bytes(&self) -> CodecResult<Vec<u8>> {
        let mut out = Vec::with_capacity(
            PNG_SIGNATURE.len() + 3 * 12 + crate::IHDR_PAYLOAD_BYTES + self.idat.len(),
        );
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the serialized PNG to `path`.
    ///
    /// # Errors
    ///
    /// [`CodecError::Io`] on create/write/flush failure.
    pub fn save(&self, path: impl AsRef<Path>) -> CodecResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Structural validity of the header fields.
    #[must_use]
    pub fn validate(&self) -> bool {
        Ihdr::parse(&self.ihdr.encode()).is_ok()
    }

    /// Image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.ihdr.width
    }

    /// Image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.ihdr.height
    }

    /// Bits per sample.
    #[must_use]
    pub const fn bit_depth(&self) -> u8 {
        self.ihdr.bit_depth
    }

    /// Pixel layout.
    #[must_use]
    pub const fn color_type(&self) -> ColorType {
        self.ihdr.color_type
    }
}
