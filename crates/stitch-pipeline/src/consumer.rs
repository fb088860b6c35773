//! Consumer worker: dequeue, decode, place into the raster.

use std::sync::Arc;
use std::time::Duration;

use stitch_codec::StripPng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{Coordinator, FragmentQueue, RasterBuffer};

pub(crate) struct ConsumerContext {
    pub id: usize,
    pub delay: Duration,
    pub coordinator: Arc<Coordinator>,
    pub queue: Arc<FragmentQueue>,
    pub raster: Arc<RasterBuffer>,
}

pub(crate) async fn run_consumer(ctx: ConsumerContext) {
    loop {
        if ctx.coordinator.is_done_consuming() {
            // Cascade the shutdown across idle peers.
            ctx.queue.wake_consumer();
            break;
        }

        // A None here is a shutdown wake-up that raced a late record; loop
        // back to the done check.
        let Some(record) = ctx.queue.get().await else {
            continue;
        };

        if !ctx.delay.is_zero() {
            sleep(ctx.delay).await;
        }

        let strip = match StripPng::parse(record.body.clone()) {
            Ok(strip) => strip,
            Err(error) => {
                warn!(
                    consumer = ctx.id,
                    sequence = record.sequence,
                    %error,
                    "dropping unparsable fragment"
                );
                ctx.coordinator.mark_abandoned(record.sequence);
                continue;
            }
        };
        if let Some(warning) = strip.crc_warning {
            debug!(
                consumer = ctx.id,
                sequence = record.sequence,
                chunk = %warning.chunk_type,
                stored = warning.expected,
                computed = warning.computed,
                "CRC mismatch, keeping chunk data"
            );
        }

        let inflated = match strip.inflate_idat() {
            Ok(inflated) => inflated,
            Err(error) => {
                warn!(
                    consumer = ctx.id,
                    sequence = record.sequence,
                    %error,
                    "dropping fragment with bad image data"
                );
                ctx.coordinator.mark_abandoned(record.sequence);
                continue;
            }
        };

        if let Err(error) = ctx.raster.place(record.sequence, &inflated) {
            warn!(
                consumer = ctx.id,
                sequence = record.sequence,
                %error,
                "dropping misplaced fragment"
            );
            ctx.coordinator.mark_abandoned(record.sequence);
            continue;
        }

        ctx.coordinator.mark_consumed();
    }
    debug!(consumer = ctx.id, "consumer exiting");
}
