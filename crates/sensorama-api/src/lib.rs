//! REST client for the Sensorama backend.
//!
//! The backend is a separate service; this crate is the app's side of
//! the conversation:
//!
//! - [`ApiConfig`] / [`Environment`]: base URL and timeout per
//!   deployment, with environment-variable overrides
//! - [`ApiClient`]: login, registration and profile endpoints, with a
//!   shared bearer-token slot
//! - [`cpf`] and [`phone`]: validation and display formatting for the
//!   registration form's Brazilian tax id and mobile number
//!
//! All endpoints return the payload inside the server's `{ data, time }`
//! envelope; failures come back as [`ApiError`].

mod client;
pub mod config;
pub mod cpf;
mod error;
pub mod phone;
mod types;

pub use client::{ApiClient, TRACING_TARGET};
pub use config::{ApiConfig, Environment};
pub use error::{ApiError, Result};
pub use types::{
    Credentials, LoginResponse, LoginUser, Profile, RegistrationRequest, ResponseDto,
    UpdateProfile,
};
