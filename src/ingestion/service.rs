// ============================================================================
// Ingestion Service
// ============================================================================
//
// Coordinates validation, admission and publishing:
// - submit():      one message, optional validation, no rate limiting
// - submit_file(): NDJSON lines, always validated, token-bucket admission,
//                  optional in-flight cap, per-kind error aggregation
//
// Bulk lines run as independent tasks; one bad line never aborts the batch.
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::rate_limiter::TokenBucketLimiter;
use super::validator::MessageValidator;
use crate::error::IngestError;
use crate::kafka::{PublishSink, SinkError};
use crate::metrics;
use crate::utils::sanitize_log_value;

/// Successful single-message submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendStatus {
    pub status: String,
}

impl SendStatus {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Outcome of a single-message submission
pub type SendOutcome = Result<SendStatus, IngestError>;

/// Representative failure of one kind within a bulk submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Aggregate result of a bulk submission
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkResult {
    pub sent: u64,
    pub failed: u64,
    /// One sample per failure kind, in order of first appearance
    pub errors: Vec<FileError>,
}

impl BulkResult {
    fn record_success(&mut self) {
        self.sent += 1;
        metrics::MESSAGES_SENT_TOTAL.inc();
    }

    fn record_failure(&mut self, err: &IngestError) {
        self.failed += 1;
        let kind = err.kind();
        metrics::MESSAGES_FAILED_TOTAL.with_label_values(&[kind]).inc();

        let message = err.to_string();
        match self.errors.iter_mut().find(|e| e.kind == kind) {
            Some(existing) => existing.message = message,
            None => self.errors.push(FileError {
                kind: kind.to_string(),
                message,
            }),
        }
    }
}

/// Shared state handed to every bulk line task
struct LineContext {
    sink: Arc<dyn PublishSink>,
    topic: Arc<str>,
    publish_timeout: Duration,
    limiter: TokenBucketLimiter,
    /// In-flight cap, absent in bulk mode
    in_flight: Option<Semaphore>,
}

pub struct IngestionService {
    sink: Arc<dyn PublishSink>,
    topic: Arc<str>,
    publish_timeout: Duration,
}

impl IngestionService {
    pub fn new(
        sink: Arc<dyn PublishSink>,
        topic: impl Into<String>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            sink,
            topic: Arc::from(topic.into()),
            publish_timeout,
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.sink.is_ready().await
    }

    /// Publish one message, validating it first when `validate` is set.
    ///
    /// The payload is forwarded exactly as received.
    pub async fn submit(&self, payload: &Value, validate: bool) -> SendOutcome {
        info!(
            id = %sanitize_log_value(payload.get("id")),
            operation = %sanitize_log_value(payload.get("operation")),
            iuv = %sanitize_log_value(payload.get("iuv")),
            status = %sanitize_log_value(payload.get("status")),
            "Received message"
        );

        let outcome = self.submit_inner(payload, validate).await;
        match &outcome {
            Ok(_) => {
                metrics::MESSAGES_SENT_TOTAL.inc();
                info!("Message sent successfully");
            }
            Err(err) => {
                metrics::MESSAGES_FAILED_TOTAL
                    .with_label_values(&[err.kind()])
                    .inc();
            }
        }
        outcome
    }

    async fn submit_inner(&self, payload: &Value, validate: bool) -> SendOutcome {
        if validate {
            if let Err(e) = MessageValidator::new().validate(payload) {
                warn!(error = %e, "Validation failed");
                return Err(IngestError::Validation(e));
            }
        }

        publish(
            self.sink.as_ref(),
            &self.topic,
            payload,
            self.publish_timeout,
        )
        .await?;

        Ok(SendStatus::success())
    }

    /// Publish every NDJSON line concurrently at most `rate` messages per second.
    ///
    /// Blank lines and lines starting with `#` are skipped. Without `bulk`,
    /// at most `rate` sends are in flight at once. Returns after every line
    /// has been handled.
    pub async fn submit_file<I>(&self, lines: I, rate: u32, bulk: bool) -> BulkResult
    where
        I: IntoIterator<Item = String>,
    {
        let started = Instant::now();
        let rate = rate.max(1);
        let ctx = Arc::new(LineContext {
            sink: self.sink.clone(),
            topic: self.topic.clone(),
            publish_timeout: self.publish_timeout,
            limiter: TokenBucketLimiter::new(f64::from(rate), None),
            in_flight: (!bulk).then(|| Semaphore::new(rate as usize)),
        });

        let mut tasks = JoinSet::new();
        let mut skipped = 0u64;
        for (idx, text) in lines.into_iter().enumerate() {
            let line = text.trim();
            if line.is_empty() || line.starts_with('#') {
                skipped += 1;
                continue;
            }

            let line_no = idx + 1;
            let line = line.to_string();
            let ctx = ctx.clone();
            tasks.spawn(async move { (line_no, process_line(&ctx, &line).await) });
        }
        metrics::BULK_LINES_SKIPPED_TOTAL.inc_by(skipped);

        let mut result = BulkResult::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => result.record_success(),
                Ok((line_no, Err(err))) => {
                    debug!(line = line_no, kind = err.kind(), "Failed to send line");
                    result.record_failure(&err);
                }
                Err(join_err) => {
                    warn!(error = %join_err, "Line task aborted");
                    result.record_failure(&IngestError::Publish(format!(
                        "line task aborted: {}",
                        join_err
                    )));
                }
            }
        }

        info!(
            sent = result.sent,
            failed = result.failed,
            skipped = skipped,
            rate = rate,
            bulk = bulk,
            elapsed_ms = started.elapsed().as_millis(),
            "File ingestion completed"
        );
        result
    }
}

async fn process_line(ctx: &LineContext, line: &str) -> Result<(), IngestError> {
    let payload: Value = serde_json::from_str(line)?;
    MessageValidator::new().validate(&payload)?;

    ctx.limiter.acquire().await;
    let _permit = match &ctx.in_flight {
        Some(gate) => Some(
            gate.acquire()
                .await
                .map_err(|_| IngestError::Publish("admission gate closed".to_string()))?,
        ),
        None => None,
    };

    publish(ctx.sink.as_ref(), &ctx.topic, &payload, ctx.publish_timeout).await
}

/// Send through the sink under an outer deadline
async fn publish(
    sink: &dyn PublishSink,
    topic: &str,
    payload: &Value,
    deadline: Duration,
) -> Result<(), IngestError> {
    match tokio::time::timeout(deadline, sink.send(topic, payload)).await {
        Ok(sent) => sent.map_err(IngestError::from),
        Err(_) => Err(SinkError::Timeout(deadline).into()),
    }
}
