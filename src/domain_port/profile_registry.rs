use crate::domain_model::ConnectionProfile;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Durable registry of named LLM/DB connection profiles.
#[async_trait::async_trait]
pub trait ProfileRegistry: Send + Sync {
    async fn upsert(&self, profile: ConnectionProfile) -> Result<(), RegistryError>;
    async fn get(&self, name: &str) -> Result<Option<ConnectionProfile>, RegistryError>;
    /// Profile names, sorted.
    async fn list(&self) -> Result<Vec<String>, RegistryError>;
    /// Returns whether a profile was actually removed. Removing an unknown
    /// name is a no-op.
    async fn remove(&self, name: &str) -> Result<bool, RegistryError>;
}
