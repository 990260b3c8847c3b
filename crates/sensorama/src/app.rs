//! `Sensorama` builder and the app-level operations.
//!
//! This is the entry point for a Sensorama client. It ties together all
//! the layers: API → token → session → wheel/quiz.

use std::sync::Arc;

use sensorama_api::{
    ApiClient, ApiConfig, Credentials, LoginUser, Profile, RegistrationRequest, UpdateProfile, cpf,
};
use sensorama_quiz::{QuestionRound, QuizOption, TimedQuestion};
use sensorama_session::{KeyValueStore, RouteGuard, SessionConfig, SessionContext, User};
use sensorama_token::{JwtCodec, TokenCodec};
use sensorama_wheel::{Catalog, RouteTable, Spin, Spinner, Wheel, WheelConfig};

use crate::SensoramaError;

/// What a successful [`Sensorama::sign_in`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    /// The session user, derived from the token's claims.
    pub user: User,
    /// The player's profile, when the token links one and it could be
    /// fetched. A missing profile never fails the sign-in.
    pub profile: Option<Profile>,
}

/// Builder for configuring a [`Sensorama`] client.
///
/// # Example
///
/// ```rust,ignore
/// use sensorama::prelude::*;
///
/// let app = SensoramaBuilder::new()
///     .api_config(ApiConfig::from_env()?)
///     .build(FileStore::new("session.json"))?;
/// app.start().await;
/// ```
pub struct SensoramaBuilder {
    api_config: Option<ApiConfig>,
    session_config: SessionConfig,
    catalog: Catalog,
    wheel_config: WheelConfig,
    routes: RouteTable,
}

impl SensoramaBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_config: None,
            session_config: SessionConfig::default(),
            catalog: Catalog::default(),
            wheel_config: WheelConfig::default(),
            routes: RouteTable::default(),
        }
    }

    /// Sets the backend configuration. Defaults to [`ApiConfig::from_env`].
    pub fn api_config(mut self, config: ApiConfig) -> Self {
        self.api_config = Some(config);
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Replaces the wheel's segments. Pair with [`routes`](Self::routes).
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the wheel's rotation and timing settings.
    pub fn wheel_config(mut self, config: WheelConfig) -> Self {
        self.wheel_config = config;
        self
    }

    /// Replaces the destination → route table.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Builds the client on top of `store`.
    ///
    /// Nothing is read from storage yet; call [`Sensorama::start`].
    ///
    /// # Errors
    /// - [`SensoramaError::Wheel`] if a catalog segment has no route
    /// - [`SensoramaError::Api`] if the API config is missing from the
    ///   environment or invalid
    pub fn build<K: KeyValueStore>(self, store: K) -> Result<Sensorama<K>, SensoramaError> {
        self.routes.check(&self.catalog)?;

        let api_config = match self.api_config {
            Some(config) => config,
            None => ApiConfig::from_env()?,
        };
        let api = ApiClient::new(api_config)?;

        Ok(Sensorama {
            session: Arc::new(SessionContext::new(store, self.session_config)),
            api,
            spinner: Spinner::new(Wheel::new(self.catalog, self.wheel_config)),
            routes: self.routes,
        })
    }
}

impl Default for SensoramaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The Sensorama client: session, backend and mini-game selection.
///
/// Created with [`SensoramaBuilder`]. Share it behind an `Arc`; every
/// method takes `&self`.
pub struct Sensorama<K: KeyValueStore> {
    session: Arc<SessionContext<K>>,
    api: ApiClient,
    spinner: Spinner,
    routes: RouteTable,
}

impl<K: KeyValueStore> Sensorama<K> {
    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Restores any stored session and points the API client at its token.
    ///
    /// Safe to call more than once; only the first call reads storage.
    pub async fn start(&self) {
        self.session.initialize().await;
        match self.session.token() {
            Some(token) => self.api.set_token(token).await,
            None => self.api.clear_token().await,
        }
        tracing::info!(
            authenticated = self.session.is_authenticated(),
            "Sensorama client started"
        );
    }

    /// Logs in against the backend and persists the session.
    ///
    /// The session is saved before the API client starts using the new
    /// token. The profile is then fetched on a best-effort basis: if that
    /// fails the sign-in still succeeds with `profile: None`.
    ///
    /// # Errors
    /// - [`SensoramaError::Api`] if the backend rejects the login
    /// - [`SensoramaError::Session`] if the session could not be saved
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignIn, SensoramaError> {
        let login = self
            .api
            .login(&Credentials::new(username, password))
            .await?;

        let hint = login.user.map(user_from_login);
        let user = self.session.login(&login.token, hint).await?;
        self.api.set_token(&login.token).await;

        let profile = match user.profile_id.as_deref() {
            Some(profile_id) => match self.api.profile(profile_id).await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!(profile_id, error = %e, "signed in, but profile fetch failed");
                    None
                }
            },
            None => None,
        };

        Ok(SignIn { user, profile })
    }

    /// Logs out.
    ///
    /// The API client stops sending the token and the session becomes
    /// logged out even when clearing storage fails; that failure is still
    /// reported.
    ///
    /// # Errors
    /// Returns [`SensoramaError::Session`] if storage could not be cleared.
    pub async fn sign_out(&self) -> Result<(), SensoramaError> {
        self.api.clear_token().await;
        self.session.logout().await?;
        Ok(())
    }

    /// Creates an account.
    ///
    /// A CPF, when given, is checked locally and sent as bare digits.
    ///
    /// # Errors
    /// - [`SensoramaError::InvalidCpf`] before any request is made
    /// - [`SensoramaError::Api`] if the backend refuses the registration
    pub async fn register(
        &self,
        registration: &RegistrationRequest,
    ) -> Result<serde_json::Value, SensoramaError> {
        let mut registration = registration.clone();
        if let Some(raw) = registration.cpf.as_deref() {
            if !cpf::is_valid(raw) {
                return Err(SensoramaError::InvalidCpf);
            }
            registration.cpf = Some(cpf::digits(raw));
        }

        let reply = self.api.register(&registration).await?;
        tracing::info!(username = %registration.username, "account registered");
        Ok(reply)
    }

    // -----------------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------------

    /// The profile id linked to the current session.
    ///
    /// Read from the in-memory token; falls back to the stored token when
    /// the session has not been started yet.
    ///
    /// # Errors
    /// - [`SensoramaError::NoProfile`] if no token links a profile
    /// - [`SensoramaError::Storage`] if the stored token can't be read
    pub async fn profile_id(&self) -> Result<String, SensoramaError> {
        if let Some(id) = self.session.profile_id() {
            return Ok(id);
        }
        let stored = self.session.store().token().await?;
        stored
            .and_then(|token| JwtCodec.profile_id(&token))
            .ok_or(SensoramaError::NoProfile)
    }

    /// Fetches the logged-in player's profile.
    pub async fn my_profile(&self) -> Result<Profile, SensoramaError> {
        let id = self.profile_id().await?;
        Ok(self.api.profile(&id).await?)
    }

    /// Updates the logged-in player's profile.
    ///
    /// A changed name is mirrored into the session user.
    pub async fn update_my_profile(&self, update: &UpdateProfile) -> Result<Profile, SensoramaError> {
        let id = self.profile_id().await?;
        let profile = self.api.update_profile(&id, update).await?;
        if let Some(name) = update.name.as_deref() {
            self.rename_session_user(name);
        }
        Ok(profile)
    }

    /// Changes the logged-in player's display name.
    pub async fn rename(&self, new_name: &str) -> Result<Profile, SensoramaError> {
        let id = self.profile_id().await?;
        let profile = self.api.update_profile_name(&id, new_name).await?;
        self.rename_session_user(new_name);
        Ok(profile)
    }

    fn rename_session_user(&self, name: &str) {
        let Some(user) = self.session.user() else {
            return;
        };
        let renamed = User {
            username: name.to_owned(),
            ..user
        };
        // Persisting runs in the background; its failure is logged there.
        if let Err(e) = self.session.update_user(renamed) {
            tracing::debug!(error = %e, "session ended before rename could be mirrored");
        }
    }

    // -----------------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------------

    /// Spins the wheel and waits for it to stop and reveal.
    ///
    /// # Errors
    /// Returns [`SensoramaError::Wheel`] if a spin is already in flight.
    pub async fn spin_wheel(&self) -> Result<Spin, SensoramaError> {
        Ok(self.spinner.spin_and_settle().await?)
    }

    /// The route to navigate to after `spin`.
    pub fn route_for(&self, spin: &Spin) -> &str {
        self.routes.route_for(&spin.segment.destination)
    }

    /// Starts a timed question.
    ///
    /// # Errors
    /// Returns [`SensoramaError::Quiz`] if the options are empty or
    /// repeat an id.
    pub fn start_question(&self, options: Vec<QuizOption>) -> Result<TimedQuestion, SensoramaError> {
        Ok(TimedQuestion::start(QuestionRound::new(options)?))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// A guard for a protected screen.
    pub fn guard(&self) -> RouteGuard {
        self.session.guard()
    }

    pub fn session(&self) -> &Arc<SessionContext<K>> {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }
}

fn user_from_login(user: LoginUser) -> User {
    User {
        email: user.email,
        ..User::new(user.id, user.username)
    }
}
