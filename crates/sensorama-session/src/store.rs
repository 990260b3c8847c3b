//! The session store: the persisted half of a login.
//!
//! A session lives in storage as two independent records:
//!
//! | Key | Value |
//! |---|---|
//! | [`TOKEN_KEY`] | the raw token string |
//! | [`USER_KEY`] | the [`User`] as JSON |
//!
//! The store keeps them consistent. A user record is never left behind
//! without its token, and a half-valid pair is never returned.

use crate::{KeyValueStore, StorageError, User};

/// Storage key of the raw session token.
pub const TOKEN_KEY: &str = "@sensorama_token";

/// Storage key of the persisted user record.
pub const USER_KEY: &str = "@sensorama_user";

/// A token and its user, as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

/// Reads and writes the session pair on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct SessionStore<K> {
    kv: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    /// Wraps a key-value backend.
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// The underlying key-value backend.
    pub fn backend(&self) -> &K {
        &self.kv
    }

    /// Loads the persisted session.
    ///
    /// - Both records present and the user parses → `Ok(Some(..))`.
    /// - Either record missing (or empty) → `Ok(None)`.
    /// - User record present but unparsable → both records are cleared and
    ///   the result is `Ok(None)`.
    ///
    /// # Errors
    /// Storage I/O failures are returned as-is.
    pub async fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        let token = self.kv.get(TOKEN_KEY).await?.filter(|t| !t.is_empty());
        let raw_user = self.kv.get(USER_KEY).await?.filter(|u| !u.is_empty());

        let (Some(token), Some(raw_user)) = (token, raw_user) else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Ok(Some(StoredSession { token, user })),
            Err(e) => {
                tracing::warn!(error = %e, "stored user record is corrupt, clearing session");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Persists a token and its user.
    ///
    /// Two-phase: the token is written first, the user record only after
    /// the token write succeeds. If the user write then fails, the token
    /// record is rolled back to what it was before the call (removed, or
    /// restored to the previous token) and the user write's error is
    /// returned. The caller can therefore trust that an `Err` left storage
    /// as it found it, modulo a rollback failure, which is logged.
    ///
    /// # Errors
    /// Returns the first storage error encountered.
    pub async fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        // Serialize up front so a bad value can't fail between the writes.
        let user_json = serde_json::to_string(user)?;
        let previous = self.kv.get(TOKEN_KEY).await?;

        self.kv.set(TOKEN_KEY, token).await?;

        if let Err(e) = self.kv.set(USER_KEY, &user_json).await {
            let rollback = match &previous {
                Some(prev) => self.kv.set(TOKEN_KEY, prev).await,
                None => self.kv.remove(TOKEN_KEY).await,
            };
            if let Err(rollback_err) = rollback {
                tracing::error!(
                    error = %rollback_err,
                    "could not roll back token after failed user write"
                );
            }
            return Err(e);
        }

        tracing::debug!(user_id = %user.id, "session persisted");
        Ok(())
    }

    /// Rewrites only the user record, leaving the token untouched.
    ///
    /// # Errors
    /// Returns the storage error if the write fails.
    pub async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user)?;
        self.kv.set(USER_KEY, &user_json).await
    }

    /// Removes both records. Succeeds when they don't exist.
    ///
    /// The user record goes first so a failure half-way never leaves a
    /// user without a token. Both removals are always attempted.
    ///
    /// # Errors
    /// Returns the first removal error.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let user = self.kv.remove(USER_KEY).await;
        let token = self.kv.remove(TOKEN_KEY).await;
        user.and(token)
    }

    /// Reads just the raw token, if one is stored.
    ///
    /// # Errors
    /// Returns the storage error if the read fails.
    pub async fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.kv.get(TOKEN_KEY).await?.filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::MemoryStore;

    /// A memory store whose writes to one key can be made to fail.
    #[derive(Default)]
    struct FailingUserWrites {
        inner: MemoryStore,
        fail_user_writes: AtomicBool,
    }

    impl KeyValueStore for FailingUserWrites {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY && self.fail_user_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("disk full".into()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    fn alice() -> User {
        User {
            id: "u1".into(),
            username: "alice".into(),
            email: Some("alice@example.com".into()),
            profile_id: Some("p1".into()),
            roles: Some(vec!["USER".into(), "ADMIN".into()]),
        }
    }

    // =====================================================================
    // save() / load()
    // =====================================================================

    #[tokio::test]
    async fn test_save_then_load_returns_same_pair() {
        let store = SessionStore::new(MemoryStore::new());

        store.save("tok", &alice()).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(
            loaded,
            Some(StoredSession {
                token: "tok".into(),
                user: alice(),
            })
        );
    }

    #[tokio::test]
    async fn test_save_minimal_user_round_trips() {
        let store = SessionStore::new(MemoryStore::new());
        let user = User::new("u2", "bob");

        store.save("t2", &user).await.unwrap();

        assert_eq!(store.load().await.unwrap().unwrap().user, user);
    }

    #[tokio::test]
    async fn test_load_empty_store_returns_none() {
        let store = SessionStore::new(MemoryStore::new());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_token_without_user_returns_none() {
        let kv = MemoryStore::new();
        kv.set(TOKEN_KEY, "tok").await.unwrap();
        let store = SessionStore::new(kv);

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_corrupt_user_clears_both_records() {
        let kv = MemoryStore::new();
        kv.set(TOKEN_KEY, "tok").await.unwrap();
        kv.set(USER_KEY, "{not json").await.unwrap();
        let store = SessionStore::new(kv.clone());

        assert_eq!(store.load().await.unwrap(), None);
        // The first load cleared storage, so the second sees nothing.
        assert_eq!(store.load().await.unwrap(), None);
        assert!(kv.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_user_write_failure_removes_new_token() {
        let kv = FailingUserWrites::default();
        kv.fail_user_writes.store(true, Ordering::SeqCst);
        let store = SessionStore::new(kv);

        let result = store.save("tok", &alice()).await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert_eq!(store.backend().get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.backend().get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_user_write_failure_restores_previous_token() {
        let store = SessionStore::new(FailingUserWrites::default());
        store.save("old", &alice()).await.unwrap();
        store.backend().fail_user_writes.store(true, Ordering::SeqCst);

        let result = store.save("new", &User::new("u9", "mallory")).await;

        assert!(result.is_err());
        let loaded = store.load().await.unwrap().expect("old session intact");
        assert_eq!(loaded.token, "old");
        assert_eq!(loaded.user, alice());
    }

    // =====================================================================
    // clear() / token()
    // =====================================================================

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = SessionStore::new(MemoryStore::new());
        store.save("tok", &alice()).await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.expect("second clear should succeed");

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_token_returns_raw_token() {
        let store = SessionStore::new(MemoryStore::new());
        assert_eq!(store.token().await.unwrap(), None);

        store.save("tok", &alice()).await.unwrap();

        assert_eq!(store.token().await.unwrap().as_deref(), Some("tok"));
    }
}
