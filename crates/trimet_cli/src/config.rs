//! CLI configuration
//!
//! Values are layered: built-in defaults, then a TOML file (`trimet.toml` in
//! the working directory unless `--config` names another), then `TRIMET_*`
//! environment variables such as `TRIMET_APP_ID`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use trimet::{DEFAULT_BASE_URL, TrimetConfig};

/// Settings read by `trimet-cli`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application id issued by TriMet
    #[serde(default)]
    pub app_id: String,

    /// Web services base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Print raw JSON instead of summaries
    #[serde(default)]
    pub json: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and process environment
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, a file does
    /// not parse, or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, config::Environment::with_prefix("TRIMET"))
    }

    fn load_with_env(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("trimet").required(false),
        };

        let builder = config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", default_timeout_secs())?
            .add_source(file)
            // e.g. TRIMET_APP_ID, TRIMET_TIMEOUT_SECS
            .add_source(environment.try_parsing(true));

        builder.build()?.try_deserialize()
    }

    /// Client configuration derived from these settings
    #[must_use]
    pub fn client_config(&self) -> TrimetConfig {
        TrimetConfig {
            app_id: self.app_id.clone(),
            timeout_secs: self.timeout_secs,
            ..TrimetConfig::default()
        }
        .with_base_url(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<config::Map<String, String>>();
        config::Environment::with_prefix("TRIMET").source(Some(map))
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_sources() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_toml_file() {
        let file = toml_file("app_id = \"from-file\"\ntimeout_secs = 3\njson = true\n");
        let config = AppConfig::load_with_env(Some(file.path()), env(&[])).unwrap();

        assert_eq!(config.app_id, "from-file");
        assert_eq!(config.timeout_secs, 3);
        assert!(config.json);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn environment_overrides_file() {
        let file = toml_file("app_id = \"from-file\"\n");
        let config = AppConfig::load_with_env(
            Some(file.path()),
            env(&[("TRIMET_APP_ID", "from-env"), ("TRIMET_TIMEOUT_SECS", "30")]),
        )
        .unwrap();

        assert_eq!(config.app_id, "from-env");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn numeric_app_id_stays_a_string() {
        let config =
            AppConfig::load_with_env(None, env(&[("TRIMET_APP_ID", "12345")])).unwrap();
        assert_eq!(config.app_id, "12345");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result =
            AppConfig::load_with_env(Some(Path::new("/nonexistent/trimet.toml")), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn client_config_carries_settings() {
        let config = AppConfig {
            app_id: "abc123".to_string(),
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 2,
            json: false,
        };
        let client = config.client_config();

        assert_eq!(client.app_id, "abc123");
        assert_eq!(client.base_url, "http://localhost:8080/");
        assert_eq!(client.timeout_secs, 2);
        assert!(client.validate().is_ok());
    }
}
