use anyhow::Result;
use rdkafka::config::ClientConfig;
use tracing::info;

use crate::config::{KafkaConfig, SecurityProtocol};

/// SASL username the Event Hubs Kafka endpoint expects with a connection string
pub const EVENTHUB_SASL_USERNAME: &str = "$ConnectionString";

/// Creates the producer's `ClientConfig` from the application's `KafkaConfig`.
///
/// It handles:
/// - Bootstrap servers and client id.
/// - TLS (`ssl` / `sasl_ssl`), with an optional CA bundle.
/// - SASL PLAIN with the Event Hubs connection string as password.
/// - Producer acknowledgment and delivery timeout settings.
///
/// `connection_string` is required when the protocol uses SASL.
pub fn create_client_config(
    config: &KafkaConfig,
    connection_string: Option<&str>,
) -> Result<ClientConfig> {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.bootstrap_servers)
        .set("client.id", &config.client_id)
        .set("security.protocol", config.security_protocol.as_str())
        .set("acks", &config.producer_acks)
        .set("linger.ms", config.producer_linger_ms.to_string())
        .set(
            "message.timeout.ms",
            config.producer_message_timeout_ms.to_string(),
        );

    if config.security_protocol != SecurityProtocol::Plaintext {
        info!("Enabling SSL/TLS for Kafka connection");
        if let Some(ca) = &config.ssl_ca_location {
            client_config.set("ssl.ca.location", ca);
        }
        client_config.set("enable.ssl.certificate.verification", "true");
    }

    if config.security_protocol.uses_sasl() {
        let password = connection_string.ok_or_else(|| {
            anyhow::anyhow!(
                "SASL authentication requires a connection string (set EVENTHUB_CONNECTION_STRING or EVENTHUB_SECRET_FILE)"
            )
        })?;
        info!(sasl_mechanism = "PLAIN", "Configuring SASL authentication");
        client_config
            .set("sasl.mechanism", "PLAIN")
            .set("sasl.username", EVENTHUB_SASL_USERNAME)
            .set("sasl.password", password);
    }

    Ok(client_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;
    use std::time::Duration;

    fn kafka_config(protocol: SecurityProtocol) -> KafkaConfig {
        KafkaConfig {
            bootstrap_servers: "ns.servicebus.windows.net:9093".to_string(),
            security_protocol: protocol,
            ssl_ca_location: None,
            client_id: "gpd-producer".to_string(),
            credentials: CredentialSource::None,
            producer_acks: "all".to_string(),
            producer_linger_ms: 5,
            producer_message_timeout_ms: 30_000,
            ready_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_sasl_ssl_config() {
        let config = kafka_config(SecurityProtocol::SaslSsl);
        let client = create_client_config(&config, Some("Endpoint=sb://ns/")).unwrap();

        assert_eq!(client.get("security.protocol"), Some("sasl_ssl"));
        assert_eq!(client.get("sasl.mechanism"), Some("PLAIN"));
        assert_eq!(client.get("sasl.username"), Some("$ConnectionString"));
        assert_eq!(client.get("sasl.password"), Some("Endpoint=sb://ns/"));
        assert_eq!(
            client.get("bootstrap.servers"),
            Some("ns.servicebus.windows.net:9093")
        );
    }

    #[test]
    fn test_sasl_requires_connection_string() {
        let config = kafka_config(SecurityProtocol::SaslSsl);
        assert!(create_client_config(&config, None).is_err());
    }

    #[test]
    fn test_plaintext_config_has_no_sasl() {
        let config = kafka_config(SecurityProtocol::Plaintext);
        let client = create_client_config(&config, None).unwrap();

        assert_eq!(client.get("security.protocol"), Some("plaintext"));
        assert_eq!(client.get("sasl.mechanism"), None);
        assert_eq!(client.get("enable.ssl.certificate.verification"), None);
    }
}
