//! Pipeline error types.

use stitch_codec::CodecError;

use crate::ConfigError;

/// Errors surfaced by a pipeline run.
///
/// Worker-local failures (bad fragment bodies, fetch errors) never appear
/// here; they are logged where they happen and the workers move on. The run
/// itself only fails on setup problems, on fragments that could not be
/// assembled at all, or while emitting the final PNG.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run terminated with fragments that were never assembled.
    #[error("{} fragments were never assembled: {missing:?}", .missing.len())]
    Incomplete {
        /// Sequence numbers missing from the raster.
        missing: Vec<u32>,
    },

    /// Final PNG assembly failed.
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),

    /// A worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}
