// Kafka module: publishing GPD messages to Event Hubs over the Kafka protocol.
//
// `PublishSink` is the seam the ingestion service depends on;
// `KafkaPublishSink` is the production implementation.

pub mod config;
pub mod credentials;
pub mod metrics;
pub mod producer;
pub mod sink;

// Re-export commonly used types
pub use credentials::{CredentialProvider, SecretFileCredentialProvider, StaticCredentialProvider};
pub use producer::KafkaPublishSink;
pub use sink::{PublishSink, SinkError};
