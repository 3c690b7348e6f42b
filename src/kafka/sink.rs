use async_trait::async_trait;
use rdkafka::error::KafkaError;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failure of a publish sink operation
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Producer not started")]
    NotStarted,

    #[error("Failed to resolve broker credentials: {0}")]
    Credentials(String),

    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Publish timed out after {0:?}")]
    Timeout(Duration),

    #[error("Producer task failed: {0}")]
    Task(String),
}

/// Destination for validated messages.
///
/// Implementations own the broker connection: `start` opens it, `stop`
/// releases it, and `send` must be safe to call concurrently from many tasks.
#[async_trait]
pub trait PublishSink: Send + Sync {
    /// Open the connection and wait until the broker is reachable
    async fn start(&self) -> Result<(), SinkError>;

    /// Publish one JSON payload to `topic`, waiting for the broker acknowledgment
    async fn send(&self, topic: &str, payload: &Value) -> Result<(), SinkError>;

    /// Release the connection. Calling it on a stopped sink is a no-op.
    async fn stop(&self) -> Result<(), SinkError>;

    /// Whether `start` succeeded and `stop` has not been called since
    async fn is_ready(&self) -> bool;
}

/// Canonical wire encoding of a payload: compact JSON, object keys sorted
pub fn encode_payload(payload: &Value) -> Result<Vec<u8>, SinkError> {
    Ok(serde_json::to_vec(payload)?)
}
