use crate::domain_model::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    #[error("state mismatch")]
    StateMismatch,
    #[error("no refresh token for session")]
    NoRefreshToken,
    #[error("token exchange failed: {0}")]
    Exchange(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

/// What a client needs to start the authorization-code dance: the provider
/// URL to redirect the browser to, and the anti-forgery state baked into it.
#[derive(Debug, Clone)]
pub struct LoginStart {
    pub authorize_url: String,
    pub state: String,
}

/// Delegated (on-behalf-of) authentication flow. The only writer of
/// non-delete mutations on the credential store: it saves a bundle once per
/// successful login or refresh, and deletes on logout.
#[async_trait::async_trait]
pub trait AuthFlow: Send + Sync {
    async fn begin_login(&self) -> Result<LoginStart, AuthFlowError>;

    /// Validate the returned state, exchange the authorization code for a
    /// credential bundle, mint a fresh session id and store the bundle
    /// under it.
    async fn complete_login(&self, code: &str, state: &str) -> Result<SessionId, AuthFlowError>;

    /// Exchange the stored refresh token for a fresh bundle and overwrite
    /// the session's record.
    async fn refresh(&self, session_id: &SessionId) -> Result<(), AuthFlowError>;

    async fn logout(&self, session_id: &SessionId) -> Result<(), AuthFlowError>;
}
