//! Task queue producer side

use crate::queue::error::{QueueError, QueueResult};
use crate::queue::message::{Message, ScanJob};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Hands scan jobs to whatever runs them
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Publish a scan job for `report_id`, returning its sequence number
    async fn enqueue(&self, report_id: &str) -> QueueResult<u64>;
}

/// Receiving end of a `LocalTaskQueue`
pub type JobReceiver = mpsc::UnboundedReceiver<Message>;

/// In-process queue backed by a tokio channel
#[derive(Debug)]
pub struct LocalTaskQueue {
    producer_id: String,
    sequence: AtomicU64,
    sender: mpsc::UnboundedSender<Message>,
}

impl LocalTaskQueue {
    pub fn new(producer_id: impl Into<String>) -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = Self {
            producer_id: producer_id.into(),
            sequence: AtomicU64::new(0),
            sender,
        };
        (queue, receiver)
    }

    /// Messages published so far
    pub fn published(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }
}

#[async_trait]
impl TaskQueue for LocalTaskQueue {
    async fn enqueue(&self, report_id: &str) -> QueueResult<u64> {
        let mut message = ScanJob::new(report_id).to_message(&self.producer_id)?;
        let sequence = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        message.header.sequence = sequence;

        self.sender.send(message).map_err(|_| QueueError::Closed)?;
        log::debug!("Enqueued scan job report_id={} sequence={}", report_id, sequence);
        Ok(sequence)
    }
}
