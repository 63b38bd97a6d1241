use crate::domain_model::*;
use crate::domain_port::CredentialStore;
use chrono::Utc;
use dashmap::DashMap;

/// In-memory credential store. Lives for the process lifetime and is empty
/// after restart; swap in a durable impl behind the port if that matters.
///
/// One concurrent map, whole-record replacement under its shard lock. The
/// critical sections are reference swaps, so a coarse map beats per-session
/// locks on simplicity with nothing measurable to lose.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    entries: DashMap<SessionId, CredentialRecord>,
    enforce_expiry: bool,
}

impl MemoryCredentialStore {
    /// `enforce_expiry` decides whether an expired record reads as absent.
    /// The lenient mode reproduces deployments that let the downstream API
    /// reject stale tokens with a 401 instead of failing fast here.
    pub fn new(enforce_expiry: bool) -> Self {
        MemoryCredentialStore {
            entries: DashMap::new(),
            enforce_expiry,
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, session_id: &SessionId, bundle: CredentialBundle) {
        let record = CredentialRecord::from_bundle(bundle, Utc::now());
        self.entries.insert(session_id.clone(), record);
    }

    async fn get_access_token(&self, session_id: &SessionId) -> Option<AccessToken> {
        let entry = self.entries.get(session_id)?;
        if self.enforce_expiry && Utc::now() >= entry.expires_at {
            return None;
        }
        Some(entry.access_token.clone())
    }

    async fn get_refresh_token(&self, session_id: &SessionId) -> Option<RefreshToken> {
        self.entries
            .get(session_id)
            .and_then(|entry| entry.refresh_token.clone())
    }

    async fn delete(&self, session_id: &SessionId) {
        self.entries.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn bundle(token: &str, expires_in_secs: i64) -> CredentialBundle {
        CredentialBundle {
            access_token: AccessToken(token.to_string()),
            refresh_token: None,
            expires_in_secs,
        }
    }

    #[tokio::test]
    async fn save_then_get_returns_the_token() {
        let store = MemoryCredentialStore::new(true);
        let sid = SessionId::from("sess_abc");

        store.save(&sid, bundle("T", 3600)).await;

        assert_eq!(
            store.get_access_token(&sid).await,
            Some(AccessToken("T".to_string()))
        );
    }

    #[tokio::test]
    async fn unknown_session_is_absent() {
        let store = MemoryCredentialStore::new(true);

        assert_eq!(store.get_access_token(&SessionId::from("nope")).await, None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryCredentialStore::new(true);
        let sid = SessionId::from("sess_abc");
        store.save(&sid, bundle("T", 3600)).await;

        store.delete(&sid).await;
        store.delete(&sid).await;

        assert_eq!(store.get_access_token(&sid).await, None);
    }

    #[tokio::test]
    async fn second_save_wins() {
        let store = MemoryCredentialStore::new(true);
        let sid = SessionId::from("sess_abc");

        store.save(&sid, bundle("first", 3600)).await;
        store.save(&sid, bundle("second", 3600)).await;

        assert_eq!(
            store.get_access_token(&sid).await,
            Some(AccessToken("second".to_string()))
        );
    }

    #[tokio::test]
    async fn expired_record_reads_as_absent() {
        let store = MemoryCredentialStore::new(true);
        let sid = SessionId::from("sess_abc");

        store.save(&sid, bundle("T", -1)).await;

        assert_eq!(store.get_access_token(&sid).await, None);
    }

    #[tokio::test]
    async fn missing_expires_in_means_already_expired() {
        let store = MemoryCredentialStore::new(true);
        let sid = SessionId::from("sess_abc");

        // The issuer omitting expires_in is normalized to a zero lifetime.
        store.save(&sid, bundle("T", 0)).await;

        assert_eq!(store.get_access_token(&sid).await, None);
    }

    #[tokio::test]
    async fn lenient_mode_returns_expired_tokens() {
        let store = MemoryCredentialStore::new(false);
        let sid = SessionId::from("sess_abc");

        store.save(&sid, bundle("stale", -1)).await;

        assert_eq!(
            store.get_access_token(&sid).await,
            Some(AccessToken("stale".to_string()))
        );
    }

    #[tokio::test]
    async fn refresh_token_survives_access_expiry() {
        let store = MemoryCredentialStore::new(true);
        let sid = SessionId::from("sess_abc");
        store
            .save(
                &sid,
                CredentialBundle {
                    access_token: AccessToken("T".to_string()),
                    refresh_token: Some(RefreshToken("R".to_string())),
                    expires_in_secs: -1,
                },
            )
            .await;

        assert_eq!(store.get_access_token(&sid).await, None);
        assert_eq!(
            store.get_refresh_token(&sid).await,
            Some(RefreshToken("R".to_string()))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_sessions_do_not_cross() {
        let store = Arc::new(MemoryCredentialStore::new(true));

        let mut writers = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            writers.push(tokio::spawn(async move {
                let sid = SessionId(format!("sess_{i}"));
                store.save(&sid, bundle(&format!("tok_{i}"), 3600)).await;
            }));
        }
        for handle in writers {
            handle.await.unwrap();
        }

        let mut readers = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            readers.push(tokio::spawn(async move {
                let sid = SessionId(format!("sess_{i}"));
                (i, store.get_access_token(&sid).await)
            }));
        }
        for handle in readers {
            let (i, token) = handle.await.unwrap();
            assert_eq!(token, Some(AccessToken(format!("tok_{i}"))));
        }
    }
}
