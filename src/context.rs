use crate::config::Config;
use crate::ingestion::IngestionService;
use crate::kafka::PublishSink;
use std::sync::Arc;

/// Application context containing shared dependencies
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Broker connection; owned here so shutdown can stop it
    pub sink: Arc<dyn PublishSink>,
    pub ingestion: Arc<IngestionService>,
}

impl AppContext {
    /// Creates a new application context publishing to `config.topic`
    pub fn new(config: Arc<Config>, sink: Arc<dyn PublishSink>) -> Self {
        let ingestion = Arc::new(IngestionService::new(
            sink.clone(),
            config.topic.clone(),
            config.publish_timeout,
        ));

        Self {
            config,
            sink,
            ingestion,
        }
    }
}
