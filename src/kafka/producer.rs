use async_trait::async_trait;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::config::create_client_config;
use super::credentials::{provider_for, CredentialProvider};
use super::metrics;
use super::sink::{encode_payload, PublishSink, SinkError};
use crate::config::KafkaConfig;

/// How long `send` may wait for room in the local producer queue
const ENQUEUE_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for flushing in-flight messages on `stop`
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Kafka producer publishing JSON payloads to Event Hubs.
///
/// The underlying `FutureProducer` only exists between a successful `start`
/// and `stop`. Until then every `send` fails with `SinkError::NotStarted`.
pub struct KafkaPublishSink {
    config: KafkaConfig,
    credentials: Option<Box<dyn CredentialProvider>>,
    /// Topic whose metadata must be reachable for the sink to count as ready
    probe_topic: String,
    producer: RwLock<Option<Arc<FutureProducer>>>,
}

impl KafkaPublishSink {
    /// Create an unstarted sink using the credential source from `config`
    pub fn new(config: &KafkaConfig, probe_topic: impl Into<String>) -> Self {
        Self::with_credentials(config, provider_for(&config.credentials), probe_topic)
    }

    pub fn with_credentials(
        config: &KafkaConfig,
        credentials: Option<Box<dyn CredentialProvider>>,
        probe_topic: impl Into<String>,
    ) -> Self {
        Self {
            config: config.clone(),
            credentials,
            probe_topic: probe_topic.into(),
            producer: RwLock::new(None),
        }
    }

    async fn resolve_connection_string(&self) -> Result<Option<String>, SinkError> {
        if !self.config.security_protocol.uses_sasl() {
            return Ok(None);
        }

        let provider = self.credentials.as_ref().ok_or_else(|| {
            SinkError::Credentials(
                "no credential source configured (set EVENTHUB_CONNECTION_STRING or EVENTHUB_SECRET_FILE)"
                    .to_string(),
            )
        })?;

        provider
            .connection_string()
            .await
            .map(Some)
            .map_err(|e| SinkError::Credentials(format!("{:#}", e)))
    }

    /// Block until metadata for the probe topic is available
    async fn wait_until_ready(&self, producer: Arc<FutureProducer>) -> Result<(), SinkError> {
        let topic = self.probe_topic.clone();
        let timeout = self.config.ready_timeout;

        tokio::task::spawn_blocking(move || {
            let metadata = producer
                .client()
                .fetch_metadata(Some(&topic), Timeout::After(timeout))?;

            match metadata.topics().iter().find(|t| t.name() == topic) {
                Some(t) => match t.error() {
                    Some(err) => Err(KafkaError::MetadataFetch(RDKafkaErrorCode::from(err))),
                    None => Ok(()),
                },
                None => Err(KafkaError::MetadataFetch(
                    RDKafkaErrorCode::UnknownTopicOrPartition,
                )),
            }
        })
        .await
        .map_err(|e| SinkError::Task(e.to_string()))??;

        Ok(())
    }
}

#[async_trait]
impl PublishSink for KafkaPublishSink {
    async fn start(&self) -> Result<(), SinkError> {
        let mut slot = self.producer.write().await;
        if slot.is_some() {
            warn!("Kafka producer already started");
            return Ok(());
        }

        info!(
            bootstrap_servers = %self.config.bootstrap_servers,
            security_protocol = self.config.security_protocol.as_str(),
            "Initializing Kafka producer..."
        );

        let connection_string = self.resolve_connection_string().await?;
        let client_config = create_client_config(&self.config, connection_string.as_deref())
            .map_err(|e| SinkError::Credentials(e.to_string()))?;
        let producer: FutureProducer = client_config.create()?;
        let producer = Arc::new(producer);

        self.wait_until_ready(producer.clone()).await?;

        info!(topic = %self.probe_topic, "Kafka producer initialized successfully");
        *slot = Some(producer);
        metrics::KAFKA_PRODUCER_READY.set(1);
        Ok(())
    }

    async fn send(&self, topic: &str, payload: &Value) -> Result<(), SinkError> {
        let producer = self
            .producer
            .read()
            .await
            .clone()
            .ok_or(SinkError::NotStarted)?;

        let bytes = encode_payload(payload)?;
        let record = FutureRecord::<(), Vec<u8>>::to(topic).payload(&bytes);

        let start = Instant::now();
        match producer.send(record, Timeout::After(ENQUEUE_TIMEOUT)).await {
            Ok((partition, offset)) => {
                let latency = start.elapsed();
                metrics::KAFKA_PRODUCE_SUCCESS.with_label_values(&[topic]).inc();
                metrics::KAFKA_PRODUCE_LATENCY
                    .with_label_values(&[topic])
                    .observe(latency.as_secs_f64());

                tracing::debug!(
                    topic = %topic,
                    partition = partition,
                    offset = offset,
                    latency_ms = latency.as_millis(),
                    "Message persisted to Kafka"
                );
                Ok(())
            }
            Err((kafka_err, _)) => {
                metrics::KAFKA_PRODUCE_FAILURE.with_label_values(&[topic]).inc();

                error!(
                    error = %kafka_err,
                    topic = %topic,
                    latency_ms = start.elapsed().as_millis(),
                    "Failed to send message to Kafka"
                );
                Err(SinkError::Kafka(kafka_err))
            }
        }
    }

    async fn stop(&self) -> Result<(), SinkError> {
        let Some(producer) = self.producer.write().await.take() else {
            return Ok(());
        };
        metrics::KAFKA_PRODUCER_READY.set(0);

        info!("Flushing Kafka producer (timeout: {:?})", FLUSH_TIMEOUT);
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(FLUSH_TIMEOUT)))
            .await
            .map_err(|e| SinkError::Task(e.to_string()))??;

        info!("Kafka producer stopped");
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.producer.read().await.is_some()
    }
}
