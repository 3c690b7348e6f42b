// Ingestion pipeline: validation, admission control and publish orchestration
// for single messages and NDJSON uploads.

pub mod rate_limiter;
pub mod service;
pub mod validator;

pub use rate_limiter::TokenBucketLimiter;
pub use service::{BulkResult, FileError, IngestionService, SendOutcome, SendStatus};
pub use validator::{MessageValidator, ValidationError};
