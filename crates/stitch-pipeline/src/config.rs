//! Pipeline configuration and validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Strip geometry of the target image.
///
/// Strips are RGBA-8; each inflated scanline carries a leading filter byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripGeometry {
    /// Pixels per scanline.
    pub width: u32,
    /// Scanlines per strip.
    pub height: u32,
    /// Strips per image.
    pub total: u32,
}

impl StripGeometry {
    /// Bytes per sample group (RGBA).
    pub const CHANNELS: u32 = 4;

    /// Bytes of one inflated scanline including its filter byte.
    #[must_use]
    pub const fn scanline_bytes(&self) -> usize {
        self.width as usize * Self::CHANNELS as usize + 1
    }

    /// Bytes of one inflated strip.
    #[must_use]
    pub const fn strip_bytes(&self) -> usize {
        self.height as usize * self.scanline_bytes()
    }

    /// Bytes of the assembled raster.
    #[must_use]
    pub const fn raster_bytes(&self) -> usize {
        self.strip_bytes() * self.total as usize
    }

    /// Height of the assembled image in pixels.
    #[must_use]
    pub const fn image_height(&self) -> u32 {
        self.height * self.total
    }
}

impl Default for StripGeometry {
    /// The server's geometry: 50 strips of 400×6 pixels.
    fn default() -> Self {
        Self {
            width: 400,
            height: 6,
            total: 50,
        }
    }
}

/// Configuration of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Queue capacity in fragments.
    pub buffer_size: usize,
    /// Producer worker count.
    pub num_producers: usize,
    /// Consumer worker count.
    pub num_consumers: usize,
    /// Per-fragment consumer sleep in milliseconds.
    pub consumer_delay_ms: u64,
    /// Image selector passed through to the fragment source.
    pub image_num: u8,
    /// Strip geometry.
    pub geometry: StripGeometry,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8,
            num_producers: 4,
            num_consumers: 4,
            consumer_delay_ms: 0,
            image_num: 1,
            geometry: StripGeometry::default(),
        }
    }
}

impl PipelineConfig {
    /// Check every field against its legal range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::OutOfRange`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        range("buffer size", self.buffer_size as u64, 1, 50)?;
        range("producer count", self.num_producers as u64, 1, 20)?;
        range("consumer count", self.num_consumers as u64, 1, 20)?;
        range("consumer delay", self.consumer_delay_ms, 0, 1000)?;
        range("image number", u64::from(self.image_num), 1, 3)?;
        range("strip count", u64::from(self.geometry.total), 1, u64::from(u32::MAX))?;
        Ok(())
    }

    /// The consumer sleep as a [`Duration`].
    #[must_use]
    pub const fn consumer_delay(&self) -> Duration {
        Duration::from_millis(self.consumer_delay_ms)
    }
}

fn range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field is outside its legal range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: u64,
        /// Inclusive lower bound.
        min: u64,
        /// Inclusive upper bound.
        max: u64,
    },
}
