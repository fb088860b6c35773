//! Raw PNG chunk framing.
//!
//! A chunk on the wire is `length (BE u32) ‖ type (4 ASCII bytes) ‖ payload
//! (length bytes) ‖ crc (BE u32)`, with the CRC computed over `type ‖
//! payload`.

use std::fmt;
use std::io::Write;

use bytes::Bytes;

use crate::{CodecError, CodecResult};

/// The 8-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Bytes occupied by the length field.
pub const CHUNK_LEN_BYTES: usize = 4;
/// Bytes occupied by the type field.
pub const CHUNK_TYPE_BYTES: usize = 4;
/// Bytes occupied by the CRC field.
pub const CHUNK_CRC_BYTES: usize = 4;

/// Returns `true` iff `bytes` starts with the PNG signature.
#[must_use]
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.len() >= PNG_SIGNATURE.len() && bytes[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// A four-byte chunk type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    /// Image header chunk.
    pub const IHDR: Self = Self(*b"IHDR");
    /// Image data chunk.
    pub const IDAT: Self = Self(*b"IDAT");
    /// Image trailer chunk.
    pub const IEND: Self = Self(*b"IEND");

    /// The raw type bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Big-endian u32 read; the caller has already bounds-checked `at + 4`.
fn read_be_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// A decoded chunk with its payload and stored CRC.
///
/// The payload is a zero-copy slice of the source buffer. The stored CRC is
/// kept verbatim; [`RawChunk::verify_crc`] checks it as a separate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Chunk type code.
    pub chunk_type: ChunkType,
    /// Chunk payload (empty for IEND).
    pub data: Bytes,
    /// CRC as stored on the wire.
    pub crc: u32,
}

impl RawChunk {
    /// Build a chunk with a freshly computed CRC.
    #[must_use]
    pub fn new(chunk_type: ChunkType, data: Bytes) -> Self {
        let crc = crc_over(chunk_type, &data);
        Self {
            chunk_type,
            data,
            crc,
        }
    }

    /// Decode the chunk starting at `offset`, returning it together with the
    /// offset of the byte just past its CRC.
    ///
    /// # Errors
    ///
    /// [`CodecError::Truncated`] when any field would read past the end of
    /// `buf`. The stored CRC is not checked here.
    pub fn read(buf: &Bytes, offset: usize) -> CodecResult<(Self, usize)> {
        let header_end = offset + CHUNK_LEN_BYTES + CHUNK_TYPE_BYTES;
        if header_end > buf.len() {
            return Err(CodecError::Truncated {
                needed: header_end,
                available: buf.len(),
            });
        }

        let length = read_be_u32(buf, offset) as usize;
        let chunk_type = ChunkType([
            buf[offset + 4],
            buf[offset + 5],
            buf[offset + 6],
            buf[offset + 7],
        ]);

        let data_end = header_end + length;
        let crc_end = data_end + CHUNK_CRC_BYTES;
        if crc_end > buf.len() {
            return Err(CodecError::Truncated {
                needed: crc_end,
                available: buf.len(),
            });
        }

        // Zero-length payloads (IEND) never allocate.
        let data = if length == 0 {
            Bytes::new()
        } else {
            buf.slice(header_end..data_end)
        };
        let crc = read_be_u32(buf, data_end);

        Ok((
            Self {
                chunk_type,
                data,
                crc,
            },
            crc_end,
        ))
    }

    /// CRC-32 over `type ‖ payload`.
    #[must_use]
    pub fn compute_crc(&self) -> u32 {
        crc_over(self.chunk_type, &self.data)
    }

    /// Check the stored CRC against the chunk contents.
    ///
    /// # Errors
    ///
    /// [`CodecError::CrcMismatch`] carrying both values.
    pub fn verify_crc(&self) -> CodecResult<()> {
        let computed = self.compute_crc();
        if computed == self.crc {
            Ok(())
        } else {
            Err(CodecError::CrcMismatch {
                expected: self.crc,
                computed,
            })
        }
    }

    /// Serialize `length ‖ type ‖ payload ‖ crc` with the stored CRC.
    ///
    /// # Errors
    ///
    /// Propagates sink I/O failures.
    pub fn write_to(&self, sink: &mut impl Write) -> CodecResult<()> {
        let length = u32::try_from(self.data.len()).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "chunk payload exceeds u32::MAX",
            )
        })?;
        sink.write_all(&length.to_be_bytes())?;
        sink.write_all(self.chunk_type.as_bytes())?;
        sink.write_all(&self.data)?;
        sink.write_all(&self.crc.to_be_bytes())?;
        Ok(())
    }
}

fn crc_over(chunk_type: ChunkType, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type.as_bytes());
    hasher.update(data);
    hasher.finalize()
}
