// ============================================================================
// Broker Credentials
// ============================================================================
//
// The Event Hubs Kafka endpoint authenticates with SASL PLAIN, using the
// literal username "$ConnectionString" and the namespace connection string as
// password. Where the connection string comes from is pluggable.
//
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::CredentialSource;

/// Resolves the broker connection string at sink start
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn connection_string(&self) -> Result<String>;
}

/// Connection string known up front
pub struct StaticCredentialProvider {
    connection_string: String,
}

impl StaticCredentialProvider {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn connection_string(&self) -> Result<String> {
        Ok(self.connection_string.clone())
    }
}

/// Connection string read from a mounted secret file on every start
pub struct SecretFileCredentialProvider {
    path: PathBuf,
}

impl SecretFileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialProvider for SecretFileCredentialProvider {
    async fn connection_string(&self) -> Result<String> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read secret file {}", self.path.display()))?;

        let secret = raw.trim();
        if secret.is_empty() {
            anyhow::bail!("Secret file {} is empty", self.path.display());
        }

        tracing::info!(path = %self.path.display(), "Loaded broker connection string from secret file");
        Ok(secret.to_string())
    }
}

/// Provider for the configured credential source, if any
pub fn provider_for(source: &CredentialSource) -> Option<Box<dyn CredentialProvider>> {
    match source {
        CredentialSource::Inline(conn) => Some(Box::new(StaticCredentialProvider::new(conn.clone()))),
        CredentialSource::SecretFile(path) => {
            Some(Box::new(SecretFileCredentialProvider::new(path.clone())))
        }
        CredentialSource::None => None,
    }
}
