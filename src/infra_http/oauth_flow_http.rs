use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::CredentialStore;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// e.g. `https://login.microsoftonline.com/{tenant}`
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Space-separated delegated scopes.
    pub scopes: String,
}

/// Authorization-code flow against a real identity provider. The only
/// writer of non-delete mutations on the credential store.
pub struct HttpAuthFlow {
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    config: OAuthConfig,
    pending_states: DashMap<String, ()>,
}

/// Issuer token response. A missing `expires_in` is kept as zero, which the
/// store treats as already expired.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

impl HttpAuthFlow {
    pub fn try_new(
        config: OAuthConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, AuthFlowError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthFlowError::InternalError(e.to_string()))?;
        Ok(HttpAuthFlow {
            http,
            store,
            config,
            pending_states: DashMap::new(),
        })
    }

    async fn exchange(&self, params: &[(&str, &str)]) -> Result<CredentialBundle, AuthFlowError> {
        let token_url = format!("{}/oauth2/v2.0/token", self.config.authority);
        let resp = self
            .http
            .post(&token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| AuthFlowError::Exchange(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthFlowError::Exchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let tokens: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthFlowError::Exchange(e.to_string()))?;
        Ok(CredentialBundle {
            access_token: AccessToken(tokens.access_token),
            refresh_token: tokens.refresh_token.map(RefreshToken),
            expires_in_secs: tokens.expires_in,
        })
    }
}

#[async_trait::async_trait]
impl AuthFlow for HttpAuthFlow {
    async fn begin_login(&self) -> Result<LoginStart, AuthFlowError> {
        let state = uuid::Uuid::new_v4().to_string();
        let authorize_url = Url::parse_with_params(
            &format!("{}/oauth2/v2.0/authorize", self.config.authority),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scopes.as_str()),
                ("state", state.as_str()),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| AuthFlowError::InternalError(e.to_string()))?;

        self.pending_states.insert(state.clone(), ());
        Ok(LoginStart {
            authorize_url: authorize_url.into(),
            state,
        })
    }

    async fn complete_login(&self, code: &str, state: &str) -> Result<SessionId, AuthFlowError> {
        if self.pending_states.remove(state).is_none() {
            return Err(AuthFlowError::StateMismatch);
        }

        let bundle = self
            .exchange(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scopes.as_str()),
            ])
            .await?;

        let session_id = SessionId::mint();
        self.store.save(&session_id, bundle).await;
        info!(%session_id, "login completed");
        Ok(session_id)
    }

    async fn refresh(&self, session_id: &SessionId) -> Result<(), AuthFlowError> {
        let refresh_token = self
            .store
            .get_refresh_token(session_id)
            .await
            .ok_or(AuthFlowError::NoRefreshToken)?;

        let mut bundle = self
            .exchange(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.0.as_str()),
                ("scope", self.config.scopes.as_str()),
            ])
            .await?;

        keep_previous_refresh(&mut bundle, refresh_token);
        self.store.save(session_id, bundle).await;
        info!(%session_id, "credential refreshed");
        Ok(())
    }

    async fn logout(&self, session_id: &SessionId) -> Result<(), AuthFlowError> {
        self.store.delete(session_id).await;
        Ok(())
    }
}

// Issuers may omit the refresh token on rotation; keep the old one.
fn keep_previous_refresh(bundle: &mut CredentialBundle, previous: RefreshToken) {
    if bundle.refresh_token.is_none() {
        bundle.refresh_token = Some(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(refresh_token: Option<&str>) -> CredentialBundle {
        CredentialBundle {
            access_token: AccessToken("fresh".to_string()),
            refresh_token: refresh_token.map(|r| RefreshToken(r.to_string())),
            expires_in_secs: 3600,
        }
    }

    #[test]
    fn omitted_refresh_token_keeps_the_previous_one() {
        let mut rotated = bundle(None);

        keep_previous_refresh(&mut rotated, RefreshToken("old".to_string()));

        assert_eq!(rotated.refresh_token, Some(RefreshToken("old".to_string())));
    }

    #[test]
    fn rotated_refresh_token_wins() {
        let mut rotated = bundle(Some("new"));

        keep_previous_refresh(&mut rotated, RefreshToken("old".to_string()));

        assert_eq!(rotated.refresh_token, Some(RefreshToken("new".to_string())));
    }
}
