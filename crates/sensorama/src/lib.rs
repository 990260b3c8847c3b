//! # Sensorama
//!
//! Client core for Sensorama, a sensory quiz game.
//!
//! A player logs in, spins a prize wheel that picks one of five
//! mini-games, and answers timed questions. This crate ties the pieces
//! together behind one [`Sensorama`] value:
//!
//! - [`token`]: reading the backend's JWT
//! - [`session`]: the persisted login and route guarding
//! - [`api`]: the REST backend
//! - [`wheel`]: fair mini-game selection
//! - [`quiz`]: per-question countdown and answer state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sensorama::prelude::*;
//!
//! let app = SensoramaBuilder::new().build(FileStore::new("session.json"))?;
//! app.start().await;
//!
//! if app.guard().ready().await != GuardDecision::Allowed {
//!     app.sign_in("ana", "secret").await?;
//! }
//! let spin = app.spin_wheel().await?;
//! println!("next: {}", app.route_for(&spin));
//! ```

mod app;
mod error;

pub use app::{Sensorama, SensoramaBuilder, SignIn};
pub use error::SensoramaError;

pub use sensorama_api as api;
pub use sensorama_quiz as quiz;
pub use sensorama_session as session;
pub use sensorama_token as token;
pub use sensorama_wheel as wheel;

/// The types most apps need, in one import.
pub mod prelude {
    pub use crate::{Sensorama, SensoramaBuilder, SensoramaError, SignIn};
    pub use sensorama_api::{ApiConfig, Environment, Profile, RegistrationRequest, UpdateProfile};
    pub use sensorama_quiz::{Outcome, QuizOption, SubmitResult, TimedQuestion};
    pub use sensorama_session::{
        FileStore, GuardDecision, KeyValueStore, MemoryStore, RouteGuard, SessionConfig,
        SessionState, User,
    };
    pub use sensorama_wheel::{Catalog, RouteTable, Spin, WheelConfig};
}
