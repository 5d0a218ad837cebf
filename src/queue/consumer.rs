//! Job consumer
//!
//! Pulls messages off a `LocalTaskQueue`, decodes them into `ScanJob`s and
//! hands each one to an injected `JobHandler`. Malformed messages are logged
//! and dropped; handler errors are logged and do not stop the loop.

use crate::queue::message::{Message, ScanJob};
use crate::queue::task_queue::JobReceiver;
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Something that runs scan jobs
#[async_trait]
pub trait JobHandler: Send + Sync {
    type Error: Display + Send;

    async fn handle(&self, job: ScanJob) -> Result<(), Self::Error>;
}

pub struct JobConsumer<H: JobHandler> {
    receiver: JobReceiver,
    handler: Arc<H>,
    processed: u64,
}

impl<H: JobHandler> JobConsumer<H> {
    pub fn new(receiver: JobReceiver, handler: Arc<H>) -> Self {
        Self {
            receiver,
            handler,
            processed: 0,
        }
    }

    /// Jobs handed to the handler so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Wait for the next message and handle it
    ///
    /// Returns `false` when shutdown is signalled while idle, or once every
    /// producer is gone and the queue is drained. A job already being handled
    /// when shutdown arrives runs to completion.
    pub async fn process_next(&mut self, shutdown: &mut broadcast::Receiver<()>) -> bool {
        let message = tokio::select! {
            biased;
            _ = shutdown.recv() => {
                log::info!("Job consumer stopping on shutdown");
                return false;
            }
            message = self.receiver.recv() => message,
        };
        match message {
            Some(message) => {
                self.dispatch(message).await;
                true
            }
            None => false,
        }
    }

    /// Handle messages until the queue closes or shutdown is signalled
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> u64 {
        while self.process_next(&mut shutdown).await {}
        self.processed
    }

    async fn dispatch(&mut self, message: Message) {
        let job = match ScanJob::from_message(&message) {
            Ok(job) => job,
            Err(e) => {
                log::warn!("Dropping message {}: {}", message.header.sequence, e);
                return;
            }
        };

        self.processed += 1;
        log::debug!(
            "Dispatching report_id={} sequence={}",
            job.report_id,
            message.header.sequence
        );
        if let Err(e) = self.handler.handle(job).await {
            log::error!("Scan job {} failed: {}", message.header.sequence, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::task_queue::{LocalTaskQueue, TaskQueue};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JobHandler for Recorder {
        type Error = String;

        async fn handle(&self, job: ScanJob) -> Result<(), String> {
            self.seen.lock().unwrap().push(job.report_id.clone());
            if job.report_id == "bad" {
                return Err("boom".to_string());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_drains_until_closed() {
        let (queue, receiver) = LocalTaskQueue::new("test");
        let handler = Arc::new(Recorder::default());
        let consumer = JobConsumer::new(receiver, Arc::clone(&handler));

        queue.enqueue("r1").await.unwrap();
        queue.enqueue("bad").await.unwrap();
        queue.enqueue("r2").await.unwrap();
        drop(queue);

        let (_tx, shutdown) = broadcast::channel(1);
        assert_eq!(consumer.run(shutdown).await, 3);
        assert_eq!(*handler.seen.lock().unwrap(), vec!["r1", "bad", "r2"]);
    }

    #[tokio::test]
    async fn test_malformed_messages_are_skipped() {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        let handler = Arc::new(Recorder::default());
        let mut consumer = JobConsumer::new(receiver, Arc::clone(&handler));
        let (_tx, mut shutdown) = broadcast::channel(1);

        sender
            .send(Message::new("x".into(), "other".into(), "{}".into()))
            .unwrap();
        assert!(consumer.process_next(&mut shutdown).await);
        assert_eq!(consumer.processed(), 0);

        drop(sender);
        assert!(!consumer.process_next(&mut shutdown).await);
    }

    #[tokio::test]
    async fn test_shutdown_stops_idle_consumer() {
        let (_queue, receiver) = LocalTaskQueue::new("test");
        let consumer = JobConsumer::new(receiver, Arc::new(Recorder::default()));

        let (tx, shutdown) = broadcast::channel(1);
        tx.send(()).unwrap();
        let processed =
            tokio::time::timeout(std::time::Duration::from_secs(1), consumer.run(shutdown))
                .await
                .unwrap();
        assert_eq!(processed, 0);
    }
}
