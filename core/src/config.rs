//! Client configuration.
//!
//! Everything a client needs is passed in explicitly. `from_env` exists for
//! binaries and examples that want the conventional variables, but nothing
//! in the crate reads the environment on its own.

use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_HOST: &str = "api.bamboohr.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_VERSION: &str = "v1";

pub const SUBDOMAIN_ENV: &str = "BAMBOOHR_SUBDOMAIN";
pub const API_KEY_ENV: &str = "BAMBOOHR_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Company subdomain, e.g. `acme` for `acme.bamboohr.com`.
    pub subdomain: String,
    pub api_key: String,
    /// Gateway host. Defaults to `api.bamboohr.com`.
    pub host: String,
    /// Full base URL override (scheme included). Takes precedence over
    /// `host`; used to point the client at a local mock server.
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Return snake_case keys and accept snake_case keys on input.
    pub underscore_keys: bool,
    /// Check field names against the catalog before sending.
    pub verify_fields: bool,
    /// Ask for current values only when fetching an employee.
    pub only_current: bool,
}

impl ClientConfig {
    pub fn new(subdomain: &str, api_key: &str) -> Self {
        Self {
            subdomain: subdomain.trim().to_string(),
            api_key: api_key.trim().to_string(),
            host: DEFAULT_HOST.to_string(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            underscore_keys: false,
            verify_fields: true,
            only_current: true,
        }
    }

    /// Read `BAMBOOHR_SUBDOMAIN` and `BAMBOOHR_API_KEY`.
    pub fn from_env() -> Result<Self, ApiError> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| ApiError::Config(format!("{name} is not set")))
        };
        let config = Self::new(&read(SUBDOMAIN_ENV)?, &read(API_KEY_ENV)?);
        config.validate()?;
        Ok(config)
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_underscore_keys(mut self, enabled: bool) -> Self {
        self.underscore_keys = enabled;
        self
    }

    pub fn with_verify_fields(mut self, enabled: bool) -> Self {
        self.verify_fields = enabled;
        self
    }

    pub fn with_only_current(mut self, enabled: bool) -> Self {
        self.only_current = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.subdomain.is_empty() {
            return Err(ApiError::Config("subdomain is required".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(ApiError::Config("API key is required".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ApiError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Root of every endpoint, without a trailing slash.
    pub fn api_root(&self) -> String {
        let base = match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}", self.host.trim_end_matches('/')),
        };
        format!("{base}/api/gateway.php/{}/{API_VERSION}", self.subdomain)
    }
}
