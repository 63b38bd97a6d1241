use crate::domain_model::*;

/// Process-local source of truth for "what bearer credential, if any, is
/// currently usable on behalf of session S".
///
/// The store performs no I/O and cannot fail: absence is a value, not an
/// error. Callers treat `None` as "re-authenticate", never as a token.
/// All operations are atomic with respect to each other; a concurrent
/// `save` and `get_access_token` for the same session never observe a
/// partially written record.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Replace whatever is stored for the session. Last write wins; a
    /// missing refresh token is permitted.
    async fn save(&self, session_id: &SessionId, bundle: CredentialBundle);

    /// The stored access token, or `None` for an unknown session. Whether
    /// an expired record also reads as `None` is an impl policy.
    async fn get_access_token(&self, session_id: &SessionId) -> Option<AccessToken>;

    /// The stored refresh token, if the session recorded one. Not gated on
    /// access-token expiry; refresh tokens outlive the access token.
    async fn get_refresh_token(&self, session_id: &SessionId) -> Option<RefreshToken>;

    /// Idempotent removal; deleting an unknown session is a no-op.
    async fn delete(&self, session_id: &SessionId);
}
