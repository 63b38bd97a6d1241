use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken(pub String);

/// What the authorization server hands back: a bearer token, an optional
/// refresh token, and a lifetime in seconds from now.
#[derive(Debug, Clone)]
pub struct CredentialBundle {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub expires_in_secs: i64,
}

/// A stored credential with its absolute expiry.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub expires_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// A zero or negative lifetime yields a record that is already expired.
    pub fn from_bundle(bundle: CredentialBundle, now: DateTime<Utc>) -> Self {
        CredentialRecord {
            access_token: bundle.access_token,
            refresh_token: bundle.refresh_token,
            expires_at: now + Duration::seconds(bundle.expires_in_secs),
        }
    }
}
