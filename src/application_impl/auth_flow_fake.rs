use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::CredentialStore;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

// Minimal fake implementation for local runs and tests: no identity
// provider, deterministic tokens derived from the authorization code.
pub struct FakeAuthFlow {
    store: Arc<dyn CredentialStore>,
    pending_states: DashMap<String, ()>,
}

impl FakeAuthFlow {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        FakeAuthFlow {
            store,
            pending_states: DashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl AuthFlow for FakeAuthFlow {
    async fn begin_login(&self) -> Result<LoginStart, AuthFlowError> {
        let state = uuid::Uuid::new_v4().to_string();
        self.pending_states.insert(state.clone(), ());
        Ok(LoginStart {
            authorize_url: format!("https://login.fake.test/authorize?state={state}"),
            state,
        })
    }

    async fn complete_login(&self, code: &str, state: &str) -> Result<SessionId, AuthFlowError> {
        if self.pending_states.remove(state).is_none() {
            return Err(AuthFlowError::StateMismatch);
        }

        let session_id = SessionId::mint();
        let bundle = CredentialBundle {
            access_token: AccessToken(format!("fake-access-token:{code}")),
            refresh_token: Some(RefreshToken(format!("fake-refresh-token:{code}"))),
            expires_in_secs: 3600,
        };
        self.store.save(&session_id, bundle).await;
        info!(%session_id, "fake login completed");
        Ok(session_id)
    }

    async fn refresh(&self, session_id: &SessionId) -> Result<(), AuthFlowError> {
        let refresh_token = self
            .store
            .get_refresh_token(session_id)
            .await
            .ok_or(AuthFlowError::NoRefreshToken)?;
        let code = refresh_token
            .0
            .strip_prefix("fake-refresh-token:")
            .ok_or(AuthFlowError::Exchange("unrecognized fake token".to_string()))?
            .to_string();

        let bundle = CredentialBundle {
            access_token: AccessToken(format!("fake-access-token:{code}")),
            refresh_token: Some(refresh_token),
            expires_in_secs: 3600,
        };
        self.store.save(session_id, bundle).await;
        Ok(())
    }

    async fn logout(&self, session_id: &SessionId) -> Result<(), AuthFlowError> {
        self.store.delete(session_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MemoryCredentialStore;

    fn flow() -> (FakeAuthFlow, Arc<dyn CredentialStore>) {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new(true));
        (FakeAuthFlow::new(store.clone()), store)
    }

    #[tokio::test]
    async fn login_stores_a_usable_credential() {
        let (flow, store) = flow();

        let start = flow.begin_login().await.unwrap();
        let session_id = flow.complete_login("code123", &start.state).await.unwrap();

        assert_eq!(
            store.get_access_token(&session_id).await,
            Some(AccessToken("fake-access-token:code123".to_string()))
        );
    }

    #[tokio::test]
    async fn unknown_state_is_rejected() {
        let (flow, _) = flow();

        let result = flow.complete_login("code123", "forged-state").await;

        assert!(matches!(result, Err(AuthFlowError::StateMismatch)));
    }

    #[tokio::test]
    async fn state_is_single_use() {
        let (flow, _) = flow();
        let start = flow.begin_login().await.unwrap();
        flow.complete_login("a", &start.state).await.unwrap();

        let replay = flow.complete_login("b", &start.state).await;

        assert!(matches!(replay, Err(AuthFlowError::StateMismatch)));
    }

    #[tokio::test]
    async fn logout_removes_the_credential() {
        let (flow, store) = flow();
        let start = flow.begin_login().await.unwrap();
        let session_id = flow.complete_login("code123", &start.state).await.unwrap();

        flow.logout(&session_id).await.unwrap();

        assert_eq!(store.get_access_token(&session_id).await, None);
    }

    #[tokio::test]
    async fn refresh_replaces_an_expired_access_token() {
        let (flow, store) = flow();
        let sid = SessionId::from("sess_abc");
        // An expired record whose refresh token is still good.
        store
            .save(
                &sid,
                CredentialBundle {
                    access_token: AccessToken("stale".to_string()),
                    refresh_token: Some(RefreshToken("fake-refresh-token:code123".to_string())),
                    expires_in_secs: -1,
                },
            )
            .await;
        assert_eq!(store.get_access_token(&sid).await, None);

        flow.refresh(&sid).await.unwrap();

        assert_eq!(
            store.get_access_token(&sid).await,
            Some(AccessToken("fake-access-token:code123".to_string()))
        );
        assert_eq!(
            store.get_refresh_token(&sid).await,
            Some(RefreshToken("fake-refresh-token:code123".to_string()))
        );
    }

    #[tokio::test]
    async fn refresh_without_a_session_fails() {
        let (flow, _) = flow();

        let result = flow.refresh(&SessionId::from("sess_unknown")).await;

        assert!(matches!(result, Err(AuthFlowError::NoRefreshToken)));
    }
}
