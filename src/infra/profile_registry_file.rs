use crate::domain_model::ConnectionProfile;
use crate::domain_port::{ProfileRegistry, RegistryError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Profile registry backed by a single JSON document.
///
/// The whole map is loaded at startup and held in memory; every mutation
/// rewrites the file through a temp-file rename so a crash mid-write leaves
/// the previous document intact.
pub struct FileProfileRegistry {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, ConnectionProfile>>,
}

impl FileProfileRegistry {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "profile registry loaded");
        Ok(FileProfileRegistry {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, ConnectionProfile>) -> Result<(), RegistryError> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, ConnectionProfile>> {
        // A poisoned lock means a panic mid-mutation; the map itself is
        // still whole because mutations replace values, so continue.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl ProfileRegistry for FileProfileRegistry {
    async fn upsert(&self, profile: ConnectionProfile) -> Result<(), RegistryError> {
        let mut entries = self.lock();
        entries.insert(profile.name.clone(), profile);
        self.persist(&entries)
    }

    async fn get(&self, name: &str) -> Result<Option<ConnectionProfile>, RegistryError> {
        Ok(self.lock().get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.lock().keys().cloned().collect())
    }

    async fn remove(&self, name: &str) -> Result<bool, RegistryError> {
        let mut entries = self.lock();
        let removed = entries.remove(name).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::{DbProfile, LlmProfile};

    fn profile(name: &str) -> ConnectionProfile {
        ConnectionProfile {
            name: name.to_string(),
            llm: LlmProfile {
                deployment: "gpt-4.1".to_string(),
                endpoint: "https://llm.example.test".to_string(),
                api_version: "2024-06-01".to_string(),
            },
            db: DbProfile {
                host: "db.example.test".to_string(),
                port: 5432,
                database: "sales".to_string(),
                user: "reader".to_string(),
                password: "secret".to_string(),
                ssl_mode: "require".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileProfileRegistry::open(dir.path().join("profiles.json")).unwrap();

        registry.upsert(profile("prod")).await.unwrap();

        assert_eq!(registry.get("prod").await.unwrap(), Some(profile("prod")));
        assert_eq!(registry.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileProfileRegistry::open(dir.path().join("profiles.json")).unwrap();

        registry.upsert(profile("zeta")).await.unwrap();
        registry.upsert(profile("alpha")).await.unwrap();

        assert_eq!(registry.list().await.unwrap(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn remove_reports_whether_anything_was_there() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileProfileRegistry::open(dir.path().join("profiles.json")).unwrap();
        registry.upsert(profile("prod")).await.unwrap();

        assert!(registry.remove("prod").await.unwrap());
        assert!(!registry.remove("prod").await.unwrap());
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        {
            let registry = FileProfileRegistry::open(&path).unwrap();
            registry.upsert(profile("prod")).await.unwrap();
        }

        let reopened = FileProfileRegistry::open(&path).unwrap();
        assert_eq!(reopened.get("prod").await.unwrap(), Some(profile("prod")));
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileProfileRegistry::open(dir.path().join("absent.json")).unwrap();

        assert!(registry.list().await.unwrap().is_empty());
    }
}
