//! The session context: the single authority for "who is logged in".
//!
//! One `SessionContext` is created per process and handed to every screen
//! as an `Arc`. Nothing reaches it through a global; consumers get the
//! handle explicitly, and subscribe to changes through a `watch` channel.
//!
//! # Mutation rules
//!
//! Only four operations change the state: [`initialize`], [`login`],
//! [`logout`], and [`update_user`]. Each does its async storage work
//! first and then publishes the new state in one `watch` send. In
//! particular, `login` never publishes `Authenticated` before the session
//! is durably stored.
//!
//! `login` is not guarded against overlapping calls. Preventing a
//! double-submit belongs to whatever triggers it (disable the button
//! while the call is pending).
//!
//! Every storage write goes through one async lock, including the
//! background write spawned by `update_user`. That write only lands if
//! the session is still the one it was spawned for, so a user record is
//! never persisted after the token it belongs to has been cleared.
//!
//! [`initialize`]: SessionContext::initialize
//! [`login`]: SessionContext::login
//! [`logout`]: SessionContext::logout
//! [`update_user`]: SessionContext::update_user

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use sensorama_token::{JwtCodec, TokenCodec};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::{
    KeyValueStore, RouteGuard, SessionConfig, SessionError, SessionState,
    SessionStatus, SessionStore, User,
};

/// Process-wide session state machine.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [Unknown] ──initialize()──→ [Authenticated] or [Unauthenticated]
///
/// [Unauthenticated] ──login() ok──→ [Authenticated]
/// [Authenticated]   ──login() ok──→ [Authenticated] (new token)
/// [Authenticated]   ──logout()───→ [Unauthenticated]
/// any               ──login() err─→ unchanged
/// ```
pub struct SessionContext<K: KeyValueStore, C: TokenCodec = JwtCodec> {
    store: Arc<SessionStore<K>>,
    codec: C,
    config: SessionConfig,
    status: watch::Sender<SessionStatus>,
    initialized: AtomicBool,
    /// Held across every storage write.
    writes: Arc<Mutex<()>>,
}

impl<K: KeyValueStore> SessionContext<K> {
    /// Creates a context in the `Unknown` state, decoding tokens as JWTs.
    pub fn new(kv: K, config: SessionConfig) -> Self {
        Self::with_codec(kv, JwtCodec, config)
    }
}

impl<K: KeyValueStore, C: TokenCodec> SessionContext<K, C> {
    /// Creates a context with a custom token codec.
    pub fn with_codec(kv: K, codec: C, config: SessionConfig) -> Self {
        let (status, _) = watch::channel(SessionStatus::initial());
        Self {
            store: Arc::new(SessionStore::new(kv)),
            codec,
            config,
            status,
            initialized: AtomicBool::new(false),
            writes: Arc::new(Mutex::new(())),
        }
    }

    // =====================================================================
    // Mutating operations
    // =====================================================================

    /// Reads the stored session and leaves the `Unknown` state.
    ///
    /// Runs once; later calls return immediately. Never fails: an empty
    /// store, a corrupt one, or a storage error all end in
    /// `Unauthenticated` (after a best-effort clear in the error case).
    ///
    /// A `login` or `logout` that completes first wins: storage is then
    /// left alone and the state is not overwritten.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("session already initialized");
            return;
        }

        let _writes = self.writes.lock().await;
        if !self.status.borrow().state.is_unknown() {
            tracing::debug!("session settled before initialize, skipping restore");
            return;
        }

        let next = match self.store.load().await {
            Ok(Some(stored)) => {
                if !self.config.restore_expired && self.stored_token_expired(&stored.token) {
                    tracing::info!(user_id = %stored.user.id, "stored session expired, discarding");
                    self.clear_best_effort().await;
                    SessionState::Unauthenticated
                } else {
                    tracing::info!(user_id = %stored.user.id, "session restored");
                    SessionState::Authenticated {
                        token: stored.token,
                        user: stored.user,
                    }
                }
            }
            Ok(None) => {
                tracing::info!("no stored session");
                SessionState::Unauthenticated
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load session, starting logged out");
                self.clear_best_effort().await;
                SessionState::Unauthenticated
            }
        };

        self.transition(next);
    }

    /// Logs in with a token from the login endpoint.
    ///
    /// The user is derived from the token's claims when they carry a
    /// subject and username; otherwise `user_hint` (the user object some
    /// login responses embed) is used. If both are present and disagree,
    /// the claims win and the mismatch is logged.
    ///
    /// The session is persisted before it becomes visible. On success the
    /// state is `Authenticated` and the derived user is returned.
    ///
    /// # Errors
    /// - [`SessionError::MissingToken`]: `token` is empty; nothing was
    ///   written.
    /// - [`SessionError::MissingIdentity`]: no claims and no hint; nothing
    ///   was written.
    /// - [`SessionError::Persist`]: storage failed; the state is unchanged.
    pub async fn login(
        &self,
        token: &str,
        user_hint: Option<User>,
    ) -> Result<User, SessionError> {
        if token.is_empty() {
            return Err(SessionError::MissingToken);
        }
        let user = self.derive_user(token, user_hint)?;

        let _writes = self.writes.lock().await;
        self.set_busy(true);
        if let Err(e) = self.store.save(token, &user).await {
            self.set_busy(false);
            tracing::warn!(error = %e, "login not persisted, session unchanged");
            return Err(SessionError::Persist(e));
        }

        self.initialized.store(true, Ordering::SeqCst);
        self.transition(SessionState::Authenticated {
            token: token.to_owned(),
            user: user.clone(),
        });
        tracing::info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Logs out.
    ///
    /// The state becomes `Unauthenticated` no matter what storage does.
    /// If clearing storage fails, that is reported afterwards as
    /// [`SessionError::Storage`] so the caller can retry the clear, but
    /// the app is already logged out.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the stored records could not
    /// be removed.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _writes = self.writes.lock().await;
        self.set_busy(true);
        let cleared = self.store.clear().await;

        self.initialized.store(true, Ordering::SeqCst);
        self.transition(SessionState::Unauthenticated);

        match cleared {
            Ok(()) => {
                tracing::info!("logged out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "logged out, but stored session could not be cleared");
                Err(SessionError::Storage(e))
            }
        }
    }

    /// Replaces the current user record.
    ///
    /// The in-memory value changes immediately. Persisting happens on a
    /// spawned task; if it fails the error is logged and the in-memory
    /// value stays (the token remains the source of truth and the user is
    /// re-derived from storage on the next start). The returned handle
    /// can be awaited to know when the write is done; dropping it just
    /// detaches the task.
    ///
    /// The task writes whatever user is current when it gets the storage
    /// lock, and writes nothing if a login or logout happened in between.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`SessionError::NotAuthenticated`] if nobody is logged in.
    pub fn update_user(&self, user: User) -> Result<JoinHandle<()>, SessionError> {
        let mut generation = 0;
        let updated = self.status.send_if_modified(|status| match &mut status.state {
            SessionState::Authenticated { user: current, .. } => {
                *current = user;
                generation = status.generation;
                true
            }
            _ => false,
        });
        if !updated {
            return Err(SessionError::NotAuthenticated);
        }

        let store = Arc::clone(&self.store);
        let writes = Arc::clone(&self.writes);
        let status = self.status.subscribe();
        Ok(tokio::spawn(async move {
            let _writes = writes.lock().await;
            let current = {
                let status = status.borrow();
                match &status.state {
                    SessionState::Authenticated { user, .. } if status.generation == generation => {
                        Some(user.clone())
                    }
                    _ => None,
                }
            };
            let Some(user) = current else {
                tracing::debug!("session changed before user update was stored, skipping");
                return;
            };

            match store.save_user(&user).await {
                Ok(()) => tracing::debug!(user_id = %user.id, "user record updated"),
                Err(e) => tracing::warn!(
                    user_id = %user.id,
                    error = %e,
                    "could not persist updated user; keeping in-memory value"
                ),
            }
        }))
    }

    // =====================================================================
    // Observers
    // =====================================================================

    /// A snapshot of the current status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.status.borrow().state.clone()
    }

    /// `true` only when a token and a user are both held.
    pub fn is_authenticated(&self) -> bool {
        self.status.borrow().state.is_authenticated()
    }

    /// `true` before initialization finishes and while login/logout runs.
    pub fn is_loading(&self) -> bool {
        self.status.borrow().is_loading()
    }

    /// The logged-in user, if any.
    pub fn user(&self) -> Option<User> {
        match &self.status.borrow().state {
            SessionState::Authenticated { user, .. } => Some(user.clone()),
            _ => None,
        }
    }

    /// The current token, if any.
    pub fn token(&self) -> Option<String> {
        match &self.status.borrow().state {
            SessionState::Authenticated { token, .. } => Some(token.clone()),
            _ => None,
        }
    }

    /// The current token's profile id, read from its claims.
    pub fn profile_id(&self) -> Option<String> {
        self.token().and_then(|t| self.codec.profile_id(&t))
    }

    /// `true` if the current token is expired now (or unreadable).
    ///
    /// Evaluated against the clock on every call; `None` when logged out.
    pub fn token_expired(&self) -> Option<bool> {
        self.token()
            .map(|t| self.codec.is_expired(&t, SystemTime::now()))
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// A route guard redirecting to the default public entry point.
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.subscribe())
    }

    /// The session store (for reading the raw token from storage).
    pub fn store(&self) -> &SessionStore<K> {
        &self.store
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn derive_user(
        &self,
        token: &str,
        hint: Option<User>,
    ) -> Result<User, SessionError> {
        let from_claims = self
            .codec
            .decode(token)
            .ok()
            .filter(|c| !c.subject.is_empty() && !c.username.is_empty())
            .map(|c| User::from_claims(&c));

        match (from_claims, hint) {
            (Some(user), Some(hint)) => {
                if !user.same_identity(&hint) {
                    tracing::warn!(
                        claims_id = %user.id,
                        hint_id = %hint.id,
                        "login response user disagrees with token claims; using claims"
                    );
                }
                Ok(user)
            }
            (Some(user), None) => Ok(user),
            (None, Some(hint)) => {
                tracing::debug!("token carries no identity claims, using login response user");
                Ok(hint)
            }
            (None, None) => Err(SessionError::MissingIdentity),
        }
    }

    fn stored_token_expired(&self, token: &str) -> bool {
        match self.codec.decode(token) {
            Ok(claims) => claims.is_expired_at(SystemTime::now()),
            // Opaque to us; the backend decides.
            Err(_) => false,
        }
    }

    async fn clear_best_effort(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "could not clear stored session");
        }
    }

    fn set_busy(&self, busy: bool) {
        self.status.send_if_modified(|status| {
            let changed = status.busy != busy;
            status.busy = busy;
            changed
        });
    }

    fn transition(&self, state: SessionState) {
        self.status.send_modify(|status| {
            status.state = state;
            status.busy = false;
            status.generation += 1;
        });
    }
}
