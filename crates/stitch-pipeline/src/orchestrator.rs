//! Pipeline orchestration: spawn workers, join them, assemble the PNG.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stitch_codec::{ColorType, Compression, StripPng};
use stitch_fetch::FragmentFetcher;
use tokio::task::JoinHandle;
use tracing::info;

use crate::consumer::{run_consumer, ConsumerContext};
use crate::producer::{run_producer, ProducerContext};
use crate::{Coordinator, FragmentQueue, PipelineConfig, PipelineError, RasterBuffer};

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct StitchedImage {
    /// The assembled PNG, ready to serialize.
    pub png: StripPng,
    /// Wall time from first spawn to last join.
    pub elapsed: Duration,
    /// Sequences that were given up on (empty on a complete run).
    pub abandoned: Vec<u32>,
}

/// The fetch-decode-assemble pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Arc<dyn FragmentFetcher>,
}

impl Pipeline {
    /// Validate the configuration and bind it to a fragment source.
    ///
    /// # Errors
    ///
    /// [`crate::ConfigError`] when a field is out of range.
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn FragmentFetcher>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, fetcher })
    }

    /// Run to completion and assemble the output PNG.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Incomplete`] when any fragment was given up on,
    /// [`PipelineError::Worker`] when a worker task dies,
    /// [`PipelineError::Codec`] when the final deflate fails.
    pub async fn run(self) -> Result<StitchedImage, PipelineError> {
        let geometry = self.config.geometry;
        let queue = Arc::new(FragmentQueue::new(self.config.buffer_size));
        let coordinator = Arc::new(Coordinator::new(geometry.total));
        let raster = Arc::new(RasterBuffer::new(geometry));

        info!(
            producers = self.config.num_producers,
            consumers = self.config.num_consumers,
            buffer = self.config.buffer_size,
            image = self.config.image_num,
            strips = geometry.total,
            "starting pipeline"
        );
        let start = Instant::now();

        let producers: Vec<JoinHandle<()>> = (0..self.config.num_producers)
            .map(|id| {
                tokio::spawn(run_producer(ProducerContext {
                    id,
                    image: self.config.image_num,
                    coordinator: Arc::clone(&coordinator),
                    queue: Arc::clone(&queue),
                    fetcher: Arc::clone(&self.fetcher),
                }))
            })
            .collect();

        let consumers: Vec<JoinHandle<()>> = (0..self.config.num_consumers)
            .map(|id| {
                tokio::spawn(run_consumer(ConsumerContext {
                    id,
                    delay: self.config.consumer_delay(),
                    coordinator: Arc::clone(&coordinator),
                    queue: Arc::clone(&queue),
                    raster: Arc::clone(&raster),
                }))
            })
            .collect();

        for handle in producers {
            handle
                .await
                .map_err(|e| PipelineError::Worker(e.to_string()))?;
        }
        for handle in consumers {
            handle
                .await
                .map_err(|e| PipelineError::Worker(e.to_string()))?;
        }
        let elapsed = start.elapsed();

        let abandoned = coordinator.abandoned();
        if !abandoned.is_empty() {
            return Err(PipelineError::Incomplete { missing: abandoned });
        }

        info!(
            consumed = coordinator.consumed(),
            elapsed_ms = elapsed.as_millis() as u64,
            "all fragments assembled"
        );

        let mut png = StripPng::new(geometry.width, geometry.image_height(), 8, ColorType::Rgba);
        png.set_raster(&raster.take_bytes(), Compression::default())?;

        Ok(StitchedImage {
            png,
            elapsed,
            abandoned,
        })
    }
}
