use crate::domain_model::AccessToken;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph transport error: {0}")]
    Transport(String),
}

/// A Graph API response with the status preserved. Non-2xx bodies are kept
/// verbatim so tool executors can build their own error payloads from them.
#[derive(Debug, Clone)]
pub struct GraphResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Bearer-authenticated GET against Microsoft Graph. `Transport` covers
/// connection-level failures only; HTTP error statuses come back as a
/// normal `GraphResponse`.
#[async_trait::async_trait]
pub trait GraphClient: Send + Sync {
    async fn get(&self, url: &str, token: &AccessToken) -> Result<GraphResponse, GraphError>;
}
