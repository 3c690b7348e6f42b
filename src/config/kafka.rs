// ============================================================================
// Kafka / Event Hubs Configuration
// ============================================================================

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::{env_opt, env_parse};

/// Event Hubs exposes its Kafka endpoint on this port
const EVENTHUB_KAFKA_PORT: u16 = 9093;

/// `security.protocol` values supported by the producer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityProtocol {
    SaslSsl,
    Ssl,
    Plaintext,
}

impl SecurityProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityProtocol::SaslSsl => "sasl_ssl",
            SecurityProtocol::Ssl => "ssl",
            SecurityProtocol::Plaintext => "plaintext",
        }
    }

    pub fn uses_sasl(&self) -> bool {
        matches!(self, SecurityProtocol::SaslSsl)
    }
}

impl FromStr for SecurityProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sasl_ssl" => Ok(SecurityProtocol::SaslSsl),
            "ssl" => Ok(SecurityProtocol::Ssl),
            "plaintext" => Ok(SecurityProtocol::Plaintext),
            other => Err(format!(
                "unsupported security protocol '{}' (expected sasl_ssl, ssl or plaintext)",
                other
            )),
        }
    }
}

/// Where the broker connection string comes from
#[derive(Clone, Debug)]
pub enum CredentialSource {
    /// Connection string given directly (EVENTHUB_CONNECTION_STRING)
    Inline(String),
    /// Path of a mounted secret holding the connection string (EVENTHUB_SECRET_FILE)
    SecretFile(PathBuf),
    /// No credential configured
    None,
}

/// Kafka producer configuration for the Event Hubs Kafka endpoint
#[derive(Clone, Debug)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap servers
    pub bootstrap_servers: String,
    pub security_protocol: SecurityProtocol,
    /// Path to CA certificate bundle (system store when unset)
    pub ssl_ca_location: Option<String>,
    pub client_id: String,
    pub credentials: CredentialSource,
    // producer-specific settings
    pub producer_acks: String, // "all" | "1" | "0"
    pub producer_linger_ms: u32,
    pub producer_message_timeout_ms: u32,
    /// How long `start()` waits for topic metadata before giving up
    pub ready_timeout: Duration,
}

impl KafkaConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let bootstrap_servers = match env_opt("KAFKA_BROKERS") {
            Some(brokers) => brokers,
            None => {
                let namespace = env_opt("EVENTHUB_NAMESPACE").context(
                    "EVENTHUB_NAMESPACE is not configured (or set KAFKA_BROKERS explicitly)",
                )?;
                eventhub_bootstrap(&namespace)
            }
        };

        let credentials = match (
            env_opt("EVENTHUB_CONNECTION_STRING"),
            env_opt("EVENTHUB_SECRET_FILE"),
        ) {
            (Some(conn), _) => CredentialSource::Inline(conn),
            (None, Some(path)) => CredentialSource::SecretFile(PathBuf::from(path)),
            (None, None) => CredentialSource::None,
        };

        let security_protocol = match env_opt("KAFKA_SECURITY_PROTOCOL") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid KAFKA_SECURITY_PROTOCOL: {}", e))?,
            None => SecurityProtocol::SaslSsl,
        };

        Ok(Self {
            bootstrap_servers,
            security_protocol,
            ssl_ca_location: env_opt("KAFKA_SSL_CA_LOCATION"),
            client_id: env_opt("KAFKA_CLIENT_ID").unwrap_or_else(|| "gpd-producer".to_string()),
            credentials,
            producer_acks: env_opt("KAFKA_PRODUCER_ACKS").unwrap_or_else(|| "all".to_string()),
            producer_linger_ms: env_parse("KAFKA_PRODUCER_LINGER_MS", 5)?,
            producer_message_timeout_ms: env_parse("KAFKA_PRODUCER_MESSAGE_TIMEOUT_MS", 30_000)?,
            ready_timeout: Duration::from_millis(env_parse("KAFKA_READY_TIMEOUT_MS", 10_000)?),
        })
    }
}

/// Kafka bootstrap address of an Event Hubs namespace
pub fn eventhub_bootstrap(namespace: &str) -> String {
    format!(
        "{}.servicebus.windows.net:{}",
        namespace.trim(),
        EVENTHUB_KAFKA_PORT
    )
}
