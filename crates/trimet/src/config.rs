//! TriMet client configuration

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TrimetError;

/// Default endpoint of the TriMet developer web services
pub const DEFAULT_BASE_URL: &str = "http://developer.trimet.org/ws/V1/";

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("trimet-rs/", env!("CARGO_PKG_VERSION"));

/// Configuration for the TriMet web services client
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimetConfig {
    /// Base URL for API requests; must end with a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Application id issued by TriMet, sent as `appID` with every request
    #[serde(default)]
    pub app_id: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Keeps the app id out of `{:?}` output
impl fmt::Debug for TrimetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let app_id = if self.app_id.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("TrimetConfig")
            .field("base_url", &self.base_url)
            .field("app_id", &app_id)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for TrimetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_id: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl TrimetConfig {
    /// Create a configuration for the public service with the given app id
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            app_id: "abc123".to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Point the client at another base URL, adding the trailing slash if missing
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Parsed base URL
    ///
    /// # Errors
    ///
    /// Returns [`TrimetError::ConfigurationError`] if the URL does not parse
    /// or lacks the trailing slash that relative endpoints resolve against.
    pub fn parsed_base_url(&self) -> Result<Url, TrimetError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            TrimetError::ConfigurationError(format!("invalid base_url '{}': {e}", self.base_url))
        })?;
        if !url.path().ends_with('/') {
            return Err(TrimetError::ConfigurationError(format!(
                "base_url '{}' must end with a trailing slash",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), TrimetError> {
        if self.app_id.trim().is_empty() {
            return Err(TrimetError::ConfigurationError(
                "app_id must not be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(TrimetError::ConfigurationError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.parsed_base_url()?;
        Ok(())
    }
}
