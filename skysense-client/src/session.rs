use serde::{Deserialize, Serialize};
use skysense_api::models::{Id, UserProfile};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::storage::LocalStorage;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";
const SELECTED_DEVICE_KEY: &str = "selected_device";

/// Authenticated state restored across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Session-scoped keys behind one lock, so the token and profile pair is
/// read and written atomically from the caller's point of view.
pub struct SessionStore<S: LocalStorage> {
    storage: Mutex<S>,
}

impl<S: LocalStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: Mutex::new(storage),
        }
    }

    /// Persists the token and profile pair. Login is not complete until
    /// this returns.
    pub async fn save(&self, token: &str, user: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(user).map_err(persistence)?;

        let mut storage = self.storage.lock().await;
        storage
            .set_item(TOKEN_KEY, token)
            .await
            .map_err(persistence)?;
        storage
            .set_item(USER_KEY, &raw)
            .await
            .map_err(persistence)?;

        Ok(())
    }

    /// Loads the persisted session.
    ///
    /// Absence is not an error: `Ok(None)` when nothing is stored. A pair
    /// with only one half present, or a profile that no longer parses, is
    /// logged and reported as absent.
    pub async fn load(&self) -> Result<Option<Session>> {
        let storage = self.storage.lock().await;
        let token = storage.get_item(TOKEN_KEY).await.map_err(persistence)?;
        let user = storage.get_item(USER_KEY).await.map_err(persistence)?;

        match (token, user) {
            (Some(token), Some(raw)) => match serde_json::from_str(&raw) {
                Ok(user) => Ok(Some(Session { token, user })),
                Err(err) => {
                    tracing::warn!("stored profile does not parse, treating session as absent: {err}");
                    Ok(None)
                }
            },
            (None, None) => Ok(None),
            (token, _) => {
                tracing::warn!(
                    has_token = token.is_some(),
                    "half-present session, treating as absent"
                );
                Ok(None)
            }
        }
    }

    /// Bearer token alone; pollers resolve it fresh on every fetch.
    pub async fn token(&self) -> Result<Option<String>> {
        let storage = self.storage.lock().await;
        storage.get_item(TOKEN_KEY).await.map_err(persistence)
    }

    /// Removes every session key. Best-effort: storage faults are logged
    /// and swallowed so logout always completes from the caller's view.
    pub async fn clear(&self) {
        let mut storage = self.storage.lock().await;
        for key in [TOKEN_KEY, USER_KEY, SELECTED_DEVICE_KEY] {
            if let Err(err) = storage.remove_item(key).await {
                tracing::warn!("failed to remove {key:?} during clear: {err}");
            }
        }
    }

    pub async fn set_selected_device(&self, device_id: Id) -> Result<()> {
        let mut storage = self.storage.lock().await;
        storage
            .set_item(SELECTED_DEVICE_KEY, &device_id.to_string())
            .await
            .map_err(persistence)
    }

    pub async fn selected_device(&self) -> Result<Option<Id>> {
        let storage = self.storage.lock().await;
        let raw = storage
            .get_item(SELECTED_DEVICE_KEY)
            .await
            .map_err(persistence)?;

        match raw {
            Some(raw) => match raw.parse() {
                Ok(id) => Ok(Some(id)),
                Err(_) => {
                    tracing::warn!("stored device id {raw:?} does not parse, ignoring");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}

fn persistence<E: std::fmt::Display>(err: E) -> Error {
    Error::persistence(err.to_string())
}

#[cfg(test)]
mod tests {
    use skysense_api::models::UserRole;

    use super::*;
    use crate::storage::MemoryStorage;

    fn test_user() -> UserProfile {
        UserProfile {
            id: 42,
            name: "Field Tech".to_string(),
            email: "tech@example.com".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let store = SessionStore::new(MemoryStorage::new());

        store.save("token-abc", &test_user()).await.unwrap();

        let session = store.load().await.unwrap().unwrap();
        assert_eq!(session.token, "token-abc");
        assert_eq!(session.user, test_user());
    }

    #[tokio::test]
    async fn test_load_without_session_is_none() {
        let store = SessionStore::new(MemoryStorage::new());

        assert_eq!(store.load().await.unwrap(), None);
        assert_eq!(store.token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = SessionStore::new(MemoryStorage::new());

        store.save("token-abc", &test_user()).await.unwrap();
        store.set_selected_device(7).await.unwrap();
        store.clear().await;

        assert_eq!(store.load().await.unwrap(), None);
        assert_eq!(store.token().await.unwrap(), None);
        assert_eq!(store.selected_device().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = SessionStore::new(MemoryStorage::new());

        store.clear().await;
        store.clear().await;

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_half_present_pair_reads_as_absent() {
        let mut storage = MemoryStorage::new();
        storage.set_item("token", "orphan").await.unwrap();

        let store = SessionStore::new(storage);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_profile_reads_as_absent() {
        let mut storage = MemoryStorage::new();
        storage.set_item("token", "token-abc").await.unwrap();
        storage.set_item("user", "not json").await.unwrap();

        let store = SessionStore::new(storage);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_device_id_reads_as_absent() {
        let mut storage = MemoryStorage::new();
        storage.set_item("selected_device", "seven").await.unwrap();

        let store = SessionStore::new(storage);
        assert_eq!(store.selected_device().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_selected_device_survives_save() {
        let store = SessionStore::new(MemoryStorage::new());

        store.set_selected_device(7).await.unwrap();
        store.save("token-abc", &test_user()).await.unwrap();

        assert_eq!(store.selected_device().await.unwrap(), Some(7));
    }
}
