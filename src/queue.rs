use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::models::retry::{QueueItem, QueueStatus, RetryRecord};

/// In-memory holding area for failed sends awaiting redelivery.
///
/// The lock is never held across an await point, so a plain std mutex
/// is enough even when the dispatcher and the sweep task interleave.
#[derive(Debug, Default)]
pub struct RetryQueue {
    records: Mutex<Vec<RetryRecord>>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, record: RetryRecord) {
        debug!(
            recipient = %record.recipient,
            template = %record.template.kind(),
            attempt = record.attempt_count,
            "Retry record enqueued"
        );
        self.lock().push(record);
    }

    /// Removes and returns every record whose delay has elapsed at `now`.
    ///
    /// Records that are not yet due stay queued, keeping their relative order.
    pub fn drain_ready(&self, now: DateTime<Utc>, delay: TimeDelta) -> Vec<RetryRecord> {
        let mut records = self.lock();
        let (ready, pending): (Vec<_>, Vec<_>) = records
            .drain(..)
            .partition(|record| record.is_ready(now, delay));
        *records = pending;

        ready
    }

    pub fn status(&self) -> QueueStatus {
        let records = self.lock();

        QueueStatus {
            queue_length: records.len(),
            items: records
                .iter()
                .map(|record| QueueItem {
                    to: record.recipient.clone(),
                    template: record.template.kind().as_str().to_string(),
                    retry_count: record.attempt_count,
                    added_at: record.enqueued_at,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RetryRecord>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
