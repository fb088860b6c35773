//! Whole-buffer zlib helpers for IDAT payloads.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::{CodecError, CodecResult};

/// Inflate a complete zlib stream.
///
/// # Errors
///
/// [`CodecError::Compression`] when the stream is invalid or incomplete.
pub fn inflate(src: &[u8]) -> CodecResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(src);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    Ok(out)
}

/// Deflate `src` into a complete zlib stream at the given level.
///
/// # Errors
///
/// [`CodecError::Compression`] when the encoder fails.
pub fn deflate(src: &[u8], level: Compression) -> CodecResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(src.len() / 2 + 64), level);
    encoder
        .write_all(src)
        .and_then(|()| encoder.finish())
        .map_err(|e| CodecError::Compression(e.to_string()))
}
