//! Producer worker: claim a sequence, fetch it, enqueue the body.

use std::sync::Arc;
use std::time::Duration;

use stitch_fetch::FragmentFetcher;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{Claim, Coordinator, FailureDisposition, FragmentQueue, FragmentRecord};

/// How long a producer naps when claims are pending but none is claimable.
const CLAIM_POLL_INTERVAL: Duration = Duration::from_millis(5);

pub(crate) struct ProducerContext {
    pub id: usize,
    pub image: u8,
    pub coordinator: Arc<Coordinator>,
    pub queue: Arc<FragmentQueue>,
    pub fetcher: Arc<dyn FragmentFetcher>,
}

pub(crate) async fn run_producer(ctx: ProducerContext) {
    loop {
        if ctx.coordinator.is_done_producing() {
            break;
        }
        match ctx.coordinator.claim() {
            Claim::Done => break,
            Claim::Wait => sleep(CLAIM_POLL_INTERVAL).await,
            Claim::Fetch(sequence) => match ctx.fetcher.fetch(ctx.image, sequence).await {
                Ok(fragment) if fragment.sequence == sequence => {
                    ctx.queue
                        .put(FragmentRecord {
                            sequence,
                            body: fragment.body,
                        })
                        .await;
                    ctx.coordinator.mark_produced();
                }
                Ok(fragment) => {
                    warn!(
                        producer = ctx.id,
                        sequence,
                        announced = fragment.sequence,
                        "server announced a different fragment"
                    );
                    fail(&ctx, sequence);
                }
                Err(error) => {
                    warn!(producer = ctx.id, sequence, %error, "fetch failed");
                    fail(&ctx, sequence);
                }
            },
        }
    }
    debug!(producer = ctx.id, "producer exiting");
}

fn fail(ctx: &ProducerContext, sequence: u32) {
    if ctx.coordinator.report_failure(sequence) == FailureDisposition::Abandoned {
        warn!(sequence, "fragment abandoned, attempt budget spent");
        // Consumers blocked on the queue must re-check the shrunken goal.
        ctx.queue.wake_consumer();
    }
}
