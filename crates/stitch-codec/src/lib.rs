//! Minimal PNG codec for strip images.
//!
//! This crate handles the restricted PNG dialect used by the strip server:
//! an 8-byte signature followed by exactly three chunks (IHDR, IDAT, IEND).
//!
//! - **Chunk framing**: `length ‖ type ‖ payload ‖ crc` decode/encode with
//!   CRC-32 verification
//! - **Document model**: [`StripPng`] parse/write with the IDAT payload kept
//!   as an opaque compressed byte sequence
//! - **Compression**: whole-buffer zlib inflate/deflate helpers

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod chunk;
mod ihdr;
mod png;
mod zutil;

pub use chunk::*;
pub use ihdr::*;
pub use png::*;
pub use zutil::*;

/// Compression level passed through to the zlib encoder.
pub use flate2::Compression;

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The buffer does not start with the PNG signature.
    #[error("not a PNG: signature mismatch")]
    NotAPng,

    /// A chunk of an unexpected type was encountered.
    #[error("unexpected chunk: expected {expected}, found {found}")]
    WrongChunk {
        /// Chunk type required at this position.
        expected: ChunkType,
        /// Chunk type actually present.
        found: ChunkType,
    },

    /// Bytes remain after the IEND chunk.
    #[error("trailing data after IEND: {0} bytes")]
    TrailingData(usize),

    /// A field would read past the end of the buffer.
    #[error("truncated input: needed {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to finish the read.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// Stored CRC does not match the CRC computed over `type ‖ payload`.
    #[error("CRC mismatch: stored {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// CRC stored in the chunk.
        expected: u32,
        /// CRC computed from the chunk contents.
        computed: u32,
    },

    /// An IHDR field is outside its legal range.
    #[error("invalid IHDR field {field}: {value}")]
    InvalidHeader {
        /// Name of the offending field.
        field: &'static str,
        /// Value found on the wire.
        value: u32,
    },

    /// zlib inflate or deflate failed.
    #[error("zlib error: {0}")]
    Compression(String),

    /// Underlying I/O failure while writing.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
