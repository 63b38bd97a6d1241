use crate::application_port::*;
use crate::domain_model::AccessToken;
use serde_json::Value;
use std::time::Duration;

/// Real Microsoft Graph transport. Timeouts live here, on the outbound
/// call; the credential store has no timeout semantics of its own.
pub struct HttpGraphClient {
    http: reqwest::Client,
}

impl HttpGraphClient {
    pub fn try_new() -> Result<Self, GraphError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GraphError::Transport(e.to_string()))?;
        Ok(HttpGraphClient { http })
    }
}

#[async_trait::async_trait]
impl GraphClient for HttpGraphClient {
    async fn get(&self, url: &str, token: &AccessToken) -> Result<GraphResponse, GraphError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&token.0)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| GraphError::Transport(e.to_string()))?;
        // Graph error bodies are JSON too, but keep whatever came back.
        let body = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        };
        Ok(GraphResponse { status, body })
    }
}
