//! API key persistence.

use std::path::{Path, PathBuf};

use {
    secrecy::{ExposeSecret, Secret, SecretString},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

const KEY_FILENAME: &str = "api_key.json";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeySlot {
    api_key: String,
}

/// Single-slot key store backed by a JSON file in the config directory. Read
/// on every use rather than cached, so an external edit takes effect
/// immediately.
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    #[must_use]
    pub fn new(config_dir: &Path) -> Self {
        Self { path: config_dir.join(KEY_FILENAME) }
    }

    /// Load the stored key, if any. An unreadable or empty slot reads as no
    /// key.
    #[must_use]
    pub fn load(&self) -> Option<SecretString> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let slot: KeySlot = serde_json::from_str(&raw).ok()?;
        if slot.api_key.is_empty() {
            return None;
        }
        Some(Secret::new(slot.api_key))
    }

    /// Store a key, replacing any previous one.
    pub fn save(&self, key: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let slot = KeySlot { api_key: key.to_string() };
        std::fs::write(&self.path, serde_json::to_string(&slot)?)?;
        debug!(path = %self.path.display(), "stored API key");
        Ok(())
    }

    /// Expose the stored key for a GET_API_KEY response.
    #[must_use]
    pub fn load_exposed(&self) -> Option<String> {
        self.load().map(|key| key.expose_secret().clone())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        assert!(store.load().is_none());

        store.save("k-secret").unwrap();
        assert_eq!(store.load_exposed().as_deref(), Some("k-secret"));
    }

    #[test]
    fn save_replaces_previous_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        store.save("old").unwrap();
        store.save("new").unwrap();
        assert_eq!(store.load_exposed().as_deref(), Some("new"));
    }

    #[test]
    fn empty_or_garbage_slot_reads_as_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());

        std::fs::write(dir.path().join(KEY_FILENAME), "{\"apiKey\": \"\"}").unwrap();
        assert!(store.load().is_none());

        std::fs::write(dir.path().join(KEY_FILENAME), "not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(&dir.path().join("nested/config"));
        store.save("k").unwrap();
        assert!(store.load().is_some());
    }
}
