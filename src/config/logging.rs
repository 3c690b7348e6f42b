// ============================================================================
// Logging Configuration
// ============================================================================

use anyhow::Result;

use super::env_opt;

/// Output format of the fmt layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string, e.g. "info,rdkafka=warn"
    pub rust_log: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let format = match env_opt("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got {:?}", other),
        };

        Ok(Self {
            rust_log: env_opt("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            format,
        })
    }
}
