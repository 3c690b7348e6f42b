use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

mod kafka;
mod logging;

pub use kafka::{CredentialSource, KafkaConfig, SecurityProtocol};
pub use logging::{LogFormat, LoggingConfig};

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_PORT: u16 = 8080;

/// Default admission rate (messages per second) for the file endpoint
const DEFAULT_RATE_LIMIT: u32 = 10;

/// Outer deadline around a single publish. Slightly above the librdkafka
/// delivery timeout so the broker error wins when both fire.
const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 35_000;

pub const MIN_RATE_LIMIT: u32 = 1;
pub const MAX_RATE_LIMIT: u32 = 200;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024; // 50 MB - NDJSON uploads

pub const SERVICE_NAME: &str = "gpd-producer";

// ============================================================================
// Configuration Structures
// ============================================================================

/// Application configuration, loaded once at startup
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub logging: LoggingConfig,
    /// Destination topic (Event Hub name)
    pub topic: String,
    pub kafka: KafkaConfig,
    /// Default `rate` for `POST /send/gpd/file` when the query omits it
    pub default_rate_limit: u32,
    pub publish_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let default_rate_limit: u32 = env_parse("DEFAULT_RATE_LIMIT", DEFAULT_RATE_LIMIT)?;
        if !(MIN_RATE_LIMIT..=MAX_RATE_LIMIT).contains(&default_rate_limit) {
            anyhow::bail!(
                "DEFAULT_RATE_LIMIT must be between {} and {}, got {}",
                MIN_RATE_LIMIT,
                MAX_RATE_LIMIT,
                default_rate_limit
            );
        }

        let topic = std::env::var("EVENTHUB_TOPIC").context(
            "EVENTHUB_TOPIC is not configured. Set it to the destination Event Hub name",
        )?;
        if topic.trim().is_empty() {
            anyhow::bail!("EVENTHUB_TOPIC must not be empty");
        }

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT)?,
            logging: LoggingConfig::from_env()?,
            topic,
            kafka: KafkaConfig::from_env()?,
            default_rate_limit,
            publish_timeout: Duration::from_millis(env_parse(
                "PUBLISH_TIMEOUT_MS",
                DEFAULT_PUBLISH_TIMEOUT_MS,
            )?),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", MAX_UPLOAD_BYTES)?,
        })
    }
}

/// Reads an optional variable, treating empty values as unset
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional variable, falling back to `default` when unset.
/// A value that is present but unparsable is an error.
pub(crate) fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "EVENTHUB_TOPIC",
        "EVENTHUB_NAMESPACE",
        "KAFKA_BROKERS",
        "KAFKA_SECURITY_PROTOCOL",
        "EVENTHUB_CONNECTION_STRING",
        "EVENTHUB_SECRET_FILE",
        "DEFAULT_RATE_LIMIT",
        "PUBLISH_TIMEOUT_MS",
        "MAX_UPLOAD_BYTES",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("EVENTHUB_TOPIC", "gpd-topic");
        std::env::set_var("EVENTHUB_NAMESPACE", "pagopa-ns");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.topic, "gpd-topic");
        assert_eq!(config.default_rate_limit, DEFAULT_RATE_LIMIT);
        assert_eq!(
            config.publish_timeout,
            Duration::from_millis(DEFAULT_PUBLISH_TIMEOUT_MS)
        );
        assert_eq!(config.max_upload_bytes, MAX_UPLOAD_BYTES);
        assert_eq!(
            config.kafka.bootstrap_servers,
            "pagopa-ns.servicebus.windows.net:9093"
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_topic_fails() {
        clear_env();
        std::env::set_var("EVENTHUB_NAMESPACE", "pagopa-ns");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("EVENTHUB_TOPIC"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_rate_limit_out_of_range_fails() {
        clear_env();
        std::env::set_var("EVENTHUB_TOPIC", "gpd-topic");
        std::env::set_var("EVENTHUB_NAMESPACE", "pagopa-ns");
        std::env::set_var("DEFAULT_RATE_LIMIT", "500");

        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_number_fails() {
        clear_env();
        std::env::set_var("EVENTHUB_TOPIC", "gpd-topic");
        std::env::set_var("EVENTHUB_NAMESPACE", "pagopa-ns");
        std::env::set_var("PORT", "eighty");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));
        clear_env();
    }
}
