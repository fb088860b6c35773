//! Bounded FIFO queue between producers and consumers.
//!
//! A classic ring buffer guarded by a mutex, with an empty/filled counting
//! semaphore pair providing the blocking behavior: `put` waits for a free
//! slot, `get` waits for a filled one. Shutdown is cooperative —
//! [`FragmentQueue::wake_consumer`] posts a filled permit without data so an
//! idle consumer can wake, observe that the work is done, and exit.

use bytes::Bytes;
use tokio::sync::{Mutex, Semaphore};

/// One fragment traversing the queue.
#[derive(Debug, Clone)]
pub struct FragmentRecord {
    /// The sequence number the producer claimed.
    pub sequence: u32,
    /// Fragment body (a complete strip PNG).
    pub body: Bytes,
}

struct Ring {
    slots: Vec<Option<FragmentRecord>>,
    head: usize,
    tail: usize,
    count: usize,
}

/// Bounded FIFO of fragment records.
pub struct FragmentQueue {
    ring: Mutex<Ring>,
    empty: Semaphore,
    filled: Semaphore,
}

impl FragmentQueue {
    /// Create a queue with room for `capacity` fragments.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring {
                slots: (0..capacity).map(|_| None).collect(),
                head: 0,
                tail: 0,
                count: 0,
            }),
            empty: Semaphore::new(capacity),
            filled: Semaphore::new(0),
        }
    }

    /// Enqueue a record, waiting while the queue is full.
    pub async fn put(&self, record: FragmentRecord) {
        // The semaphores live as long as the queue and are never closed, so
        // acquire only fails after an explicit close that never happens.
        let Ok(permit) = self.empty.acquire().await else {
            return;
        };
        permit.forget();

        let mut ring = self.ring.lock().await;
        let head = ring.head;
        ring.slots[head] = Some(record);
        ring.head = (head + 1) % ring.slots.len();
        ring.count += 1;
        drop(ring);

        self.filled.add_permits(1);
    }

    /// Dequeue the oldest record, waiting while the queue is empty.
    ///
    /// Returns `None` when woken by [`FragmentQueue::wake_consumer`] with
    /// nothing in the ring; the caller decides whether that means shutdown.
    pub async fn get(&self) -> Option<FragmentRecord> {
        let permit = self.filled.acquire().await.ok()?;
        permit.forget();

        let mut ring = self.ring.lock().await;
        let tail = ring.tail;
        let record = ring.slots[tail].take();
        if record.is_some() {
            ring.tail = (tail + 1) % ring.slots.len();
            ring.count -= 1;
            drop(ring);
            self.empty.add_permits(1);
        }
        record
    }

    /// Post a filled permit without data, waking one blocked consumer.
    pub fn wake_consumer(&self) {
        self.filled.add_permits(1);
    }

    /// Records currently queued.
    pub async fn len(&self) -> usize {
        self.ring.lock().await.count
    }

    /// Whether the ring is currently empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
