//! Test fixtures for the stitch pipeline.
//!
//! - [`strip_raster`] / [`strip_png`]: build valid strip PNGs filled with a
//!   solid color
//! - [`ScriptedFetcher`]: in-process fragment source with failure injection
//! - [`MockFragmentServer`]: wiremock-backed HTTP fragment server

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]

mod fixtures;
mod mock_server;
mod scripted;

pub use fixtures::*;
pub use mock_server::*;
pub use scripted::*;
