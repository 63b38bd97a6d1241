use crate::domain_model::SessionId;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent runtime error: {0}")]
    Runtime(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub response: String,
}

/// Runs one prompt through the agent runtime on behalf of a session. Tool
/// calls issued by the agent are resolved against that session's stored
/// credential; the runtime itself never sees the raw token.
#[async_trait::async_trait]
pub trait AgentService: Send + Sync {
    async fn run(&self, session_id: &SessionId, prompt: &str) -> Result<AgentReply, AgentError>;
}
