//! Fragment fetching.
//!
//! The strip server exposes one horizontal strip of the target image per
//! request and announces the strip's sequence number in the
//! `X-Ece252-Fragment` response header. This crate provides the
//! [`FragmentFetcher`] seam the pipeline's producers work against and the
//! production [`HttpFetcher`] built on reqwest.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod http;

pub use http::*;

use async_trait::async_trait;
use bytes::Bytes;

/// Response header carrying the fragment's sequence number.
pub const FRAGMENT_HEADER: &str = "X-Ece252-Fragment";

/// Default strip server endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://ece252-1.uwaterloo.ca:2530/image";

/// Upper bound on a fragment body; the server's strips stay well below it.
pub const MAX_FRAGMENT_BYTES: usize = 10_000;

/// A fetched fragment: the server-announced sequence number plus the body.
#[derive(Debug, Clone)]
pub struct FetchedFragment {
    /// Sequence number announced by the server.
    pub sequence: u32,
    /// Fragment body (a complete strip PNG).
    pub body: Bytes,
}

/// Fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The transport failed (connect, read, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {code}")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// The sequence header was absent or not a decimal integer.
    #[error("missing or malformed X-Ece252-Fragment header")]
    MissingSequence,

    /// The body exceeds the fragment size bound.
    #[error("fragment body of {len} bytes exceeds limit of {max}")]
    BodyTooLarge {
        /// Received body length.
        len: usize,
        /// Allowed maximum.
        max: usize,
    },
}

/// Source of image fragments.
///
/// Implementations must be shareable across producer workers.
#[async_trait]
pub trait FragmentFetcher: Send + Sync {
    /// Fetch one fragment of `image`.
    ///
    /// `part` is the fragment the caller asked for; the returned
    /// [`FetchedFragment::sequence`] is what the server claims to have
    /// delivered. The two can disagree and the caller decides what to do.
    async fn fetch(&self, image: u8, part: u32) -> Result<FetchedFragment, FetchError>;
}
