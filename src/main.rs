// ============================================================================
// GPD Producer
// ============================================================================
//
// HTTP ingestion service for GPD debt-position (RTP) messages:
// - POST /send/gpd/message - validate and publish one message
// - POST /send/gpd/file - publish an NDJSON upload under a rate limit
// - GET /health, /ready, /metrics
//
// Messages are published to Azure Event Hubs over the Kafka protocol.
// A broker that is unreachable at startup does not stop the process;
// /ready reports not-ready and publishing endpoints answer 503.
//
// ============================================================================

use anyhow::{Context, Result};
use gpd_producer::config::{Config, SERVICE_NAME};
use gpd_producer::context::AppContext;
use gpd_producer::kafka::{KafkaPublishSink, PublishSink};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::from_env()?);

    gpd_producer::init_tracing(&config.logging);

    info!("=== {} Starting ===", SERVICE_NAME);
    info!("Port: {}", config.port);
    info!("Topic: {}", config.topic);

    // Initialize Kafka sink
    let sink: Arc<dyn PublishSink> = Arc::new(KafkaPublishSink::new(&config.kafka, &config.topic));
    match sink.start().await {
        Ok(()) => info!("Connected to Kafka"),
        Err(e) => warn!(
            error = %e,
            "Kafka producer failed to start; serving in degraded mode"
        ),
    }

    let app_context = Arc::new(AppContext::new(config.clone(), sink.clone()));
    let served = run_server(&config, app_context).await;

    if let Err(e) = sink.stop().await {
        error!(error = %e, "Failed to stop Kafka producer cleanly");
    }
    info!("Server shut down.");

    served
}

async fn run_server(config: &Config, app_context: Arc<AppContext>) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    info!("{} listening on {}", SERVICE_NAME, addr);

    gpd_producer::serve(listener, app_context, gpd_producer::shutdown_signal()).await
}
