#![allow(dead_code)]

use async_trait::async_trait;
use gpd_producer::{
    config::{Config, CredentialSource, KafkaConfig, LogFormat, LoggingConfig, SecurityProtocol},
    context::AppContext,
    kafka::{PublishSink, SinkError},
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const TEST_TOPIC: &str = "gpd-test-topic";

/// In-memory sink recording every published payload
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, Value)>>,
    pub ready: AtomicBool,
    pub fail: AtomicBool,
}

impl RecordingSink {
    pub async fn payloads(&self) -> Vec<Value> {
        self.sent.lock().await.iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl PublishSink for RecordingSink {
    async fn start(&self) -> Result<(), SinkError> {
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, topic: &str, payload: &Value) -> Result<(), SinkError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(SinkError::NotStarted);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Task("broker rejected message".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((topic.to_string(), payload.clone()));
        Ok(())
    }

    async fn stop(&self) -> Result<(), SinkError> {
        self.ready.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

pub struct TestApp {
    pub address: String,
    pub sink: Arc<RecordingSink>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        logging: LoggingConfig {
            rust_log: "info".to_string(),
            format: LogFormat::Text,
        },
        topic: TEST_TOPIC.to_string(),
        kafka: KafkaConfig {
            bootstrap_servers: "127.0.0.1:9092".to_string(),
            security_protocol: SecurityProtocol::Plaintext,
            ssl_ca_location: None,
            client_id: "gpd-producer-test".to_string(),
            credentials: CredentialSource::None,
            producer_acks: "all".to_string(),
            producer_linger_ms: 5,
            producer_message_timeout_ms: 1_000,
            ready_timeout: Duration::from_millis(500),
        },
        default_rate_limit: 100,
        publish_timeout: Duration::from_secs(5),
        max_upload_bytes: 1024 * 1024,
    }
}

/// Spawn the full router on an ephemeral port with a started recording sink
pub async fn spawn_app() -> TestApp {
    let sink = Arc::new(RecordingSink::default());
    sink.start().await.unwrap();
    spawn_app_with(sink).await
}

/// Spawn the router around `sink` without starting it
pub async fn spawn_app_with(sink: Arc<RecordingSink>) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let app_context = Arc::new(AppContext::new(Arc::new(test_config()), sink.clone()));
    tokio::spawn(gpd_producer::serve(
        listener,
        app_context,
        std::future::pending(),
    ));

    TestApp { address, sink }
}

pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder().build().unwrap()
}
