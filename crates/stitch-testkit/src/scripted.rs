//! In-process fragment source with failure injection.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use stitch_fetch::{FetchError, FetchedFragment, FragmentFetcher};

/// A [`FragmentFetcher`] serving prebuilt bodies, with per-part failure
/// scripts and a request log.
///
/// Failures are consumed in order: `fail_times(2, 1)` makes the first fetch
/// of part 2 answer 503 and every later one succeed.
pub struct ScriptedFetcher {
    bodies: Vec<Bytes>,
    fail_budget: Mutex<HashMap<u32, u32>>,
    misdelivered: HashMap<u32, u32>,
    requests: Mutex<Vec<u32>>,
}

impl ScriptedFetcher {
    /// Serve `bodies[k]` for part `k`.
    #[must_use]
    pub fn new(bodies: Vec<Vec<u8>>) -> Self {
        Self {
            bodies: bodies.into_iter().map(Bytes::from).collect(),
            fail_budget: Mutex::new(HashMap::new()),
            misdelivered: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer the next `times` fetches of `part` with a 503.
    #[must_use]
    pub fn fail_times(self, part: u32, times: u32) -> Self {
        self.fail_budget.lock().insert(part, times);
        self
    }

    /// Announce `sequence` in every response for `part`, regardless of what
    /// was asked for.
    #[must_use]
    pub fn misdeliver(mut self, part: u32, sequence: u32) -> Self {
        self.misdelivered.insert(part, sequence);
        self
    }

    /// Parts requested so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl FragmentFetcher for ScriptedFetcher {
    async fn fetch(&self, _image: u8, part: u32) -> Result<FetchedFragment, FetchError> {
        self.requests.lock().push(part);

        {
            let mut budget = self.fail_budget.lock();
            if let Some(remaining) = budget.get_mut(&part) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Status { code: 503 });
                }
            }
        }

        let body = self
            .bodies
            .get(part as usize)
            .cloned()
            .ok_or(FetchError::Status { code: 404 })?;
        let sequence = self.misdelivered.get(&part).copied().unwrap_or(part);

        Ok(FetchedFragment { sequence, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failure_budget_is_consumed_then_succeeds() {
        let fetcher = ScriptedFetcher::new(vec![b"zero".to_vec()]).fail_times(0, 1);

        assert!(matches!(
            fetcher.fetch(1, 0).await.unwrap_err(),
            FetchError::Status { code: 503 }
        ));
        let fragment = fetcher.fetch(1, 0).await.unwrap();
        assert_eq!(fragment.sequence, 0);
        assert_eq!(&fragment.body[..], b"zero");
        assert_eq!(fetcher.requests(), vec![0, 0]);
    }

    #[tokio::test]
    async fn misdelivery_announces_the_scripted_sequence() {
        let fetcher = ScriptedFetcher::new(vec![b"a".to_vec(), b"b".to_vec()]).misdeliver(1, 9);
        assert_eq!(fetcher.fetch(1, 1).await.unwrap().sequence, 9);
    }

    #[tokio::test]
    async fn unknown_part_is_a_404() {
        let fetcher = ScriptedFetcher::new(vec![]);
        assert!(matches!(
            fetcher.fetch(1, 5).await.unwrap_err(),
            FetchError::Status { code: 404 }
        ));
    }
}
