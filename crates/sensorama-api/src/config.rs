//! Backend location and timeouts per deployment environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::ApiError;

/// Environment variable selecting the [`Environment`].
pub const ENV_VAR: &str = "SENSORAMA_ENV";
/// Environment variable overriding the base URL.
pub const URL_VAR: &str = "SENSORAMA_API_URL";
/// Environment variable overriding the timeout, in milliseconds.
pub const TIMEOUT_VAR: &str = "SENSORAMA_API_TIMEOUT_MS";

/// Timeout used for a custom base URL when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the app is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Reads [`ENV_VAR`]. Unset means [`Development`](Self::Development).
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] for an unrecognized value.
    pub fn from_env() -> Result<Self, ApiError> {
        match std::env::var(ENV_VAR) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }

    /// The built-in settings for this environment.
    pub fn config(self) -> ApiConfig {
        match self {
            Self::Development => ApiConfig {
                base_url: "http://localhost:8080/sensorama/api".into(),
                timeout: Duration::from_millis(10_000),
            },
            Self::Staging => ApiConfig {
                base_url: "https://staging-api.com/sensorama/api".into(),
                timeout: Duration::from_millis(12_000),
            },
            Self::Production => ApiConfig {
                base_url: "https://sua-api-producao.com/sensorama/api".into(),
                timeout: Duration::from_millis(15_000),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ApiError::InvalidConfig(format!(
                "unknown environment {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URL and per-request timeout for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Prefix for every endpoint path, e.g. `http://host/sensorama/api`.
    pub base_url: String,
    /// Applied to every request.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Environment::default().config()
    }
}

impl ApiConfig {
    /// A config pointing at an arbitrary backend with the default timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a config from the process environment.
    ///
    /// Starts from [`Environment::from_env`] and applies [`URL_VAR`] and
    /// [`TIMEOUT_VAR`] on top.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] for an unknown environment, a
    /// non-numeric timeout, or a result that fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let environment = match lookup(ENV_VAR) {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };
        let mut config = environment.config();

        if let Some(url) = lookup(URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_owned();
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                ApiError::InvalidConfig(format!("{TIMEOUT_VAR} must be milliseconds, got {raw:?}"))
            })?;
            config.timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        tracing::debug!(
            %environment,
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "API config loaded"
        );
        Ok(config)
    }

    /// Checks the config is usable.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] when the base URL is not an
    /// `http(s)` URL or the timeout is zero.
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ApiError::InvalidConfig("timeout must be non-zero".into()));
        }
        Ok(())
    }

    /// Full URL for an endpoint path starting with `/`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_environment_defaults_match_deployments() {
        let dev = Environment::Development.config();
        assert_eq!(dev.base_url, "http://localhost:8080/sensorama/api");
        assert_eq!(dev.timeout, Duration::from_secs(10));
        assert_eq!(Environment::Staging.config().timeout, Duration::from_secs(12));
        assert_eq!(Environment::Production.config().timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_environment_parse_accepts_short_names() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" stage ".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_from_lookup_empty_is_development() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Environment::Development.config());
    }

    #[test]
    fn test_from_lookup_overrides_apply_on_environment() {
        let config = ApiConfig::from_lookup(lookup(&[
            (ENV_VAR, "staging"),
            (TIMEOUT_VAR, "2500"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://staging-api.com/sensorama/api");
        assert_eq!(config.timeout, Duration::from_millis(2500));

        let config = ApiConfig::from_lookup(lookup(&[(URL_VAR, "http://10.0.2.2:8080/api")])).unwrap();
        assert_eq!(config.base_url, "http://10.0.2.2:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_lookup_bad_timeout_returns_invalid_config() {
        let result = ApiConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")]));
        assert!(matches!(result, Err(ApiError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_scheme() {
        assert!(ApiConfig::with_base_url("ftp://x").validate().is_err());
        assert!(
            ApiConfig::with_base_url("http://x")
                .timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(ApiConfig::with_base_url("https://x").validate().is_ok());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ApiConfig::with_base_url("http://host/api/");
        assert_eq!(config.url("/profiles/7"), "http://host/api/profiles/7");
    }
}
