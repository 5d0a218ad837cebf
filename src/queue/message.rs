//! Message Types for the Task Queue
//!
//! A `Message` is the transport envelope: a header stamped by the queue and a
//! JSON payload. `ScanJob` is the only payload this crate publishes.

use crate::queue::error::{QueueError, QueueResult};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Message type carried by scan jobs
pub const SCAN_JOB_TYPE: &str = "analyzer";

/// Header information for all messages in the queue
#[derive(Debug, Clone)]
pub struct MessageHeader {
    /// Monotonic sequence number assigned by the queue
    pub sequence: u64,
    /// Timestamp when the message was created
    pub timestamp: SystemTime,
    /// Identifier of the producer that created this message
    pub producer_id: String,
    /// Application-defined message type for routing
    pub message_type: String,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub header: MessageHeader,
    /// JSON payload
    pub data: String,
}

impl Message {
    pub fn new(producer_id: String, message_type: String, data: String) -> Self {
        Self {
            header: MessageHeader {
                sequence: 0, // Will be set by queue
                timestamp: SystemTime::now(),
                producer_id,
                message_type,
            },
            data,
        }
    }
}

/// Request to run the scan for one report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJob {
    pub report_id: String,
}

impl ScanJob {
    pub fn new(report_id: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
        }
    }

    pub fn to_message(&self, producer_id: &str) -> QueueResult<Message> {
        let data = serde_json::to_string(self).map_err(|e| QueueError::SerializationError {
            message: format!("Failed to serialize scan job: {}", e),
        })?;
        Ok(Message::new(
            producer_id.to_string(),
            SCAN_JOB_TYPE.to_string(),
            data,
        ))
    }

    pub fn from_message(message: &Message) -> QueueResult<Self> {
        if message.header.message_type != SCAN_JOB_TYPE {
            return Err(QueueError::UnexpectedType {
                expected: SCAN_JOB_TYPE.to_string(),
                actual: message.header.message_type.clone(),
            });
        }

        serde_json::from_str(&message.data).map_err(|e| {
            let data_preview: String = message.data.chars().take(100).collect();
            QueueError::DeserializationError {
                message: format!(
                    "Failed to deserialize scan job: {} | sequence: {}, producer: '{}' | data_preview: '{}'",
                    e, message.header.sequence, message.header.producer_id, data_preview
                ),
            }
        })
    }
}
