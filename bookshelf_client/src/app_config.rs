use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const ENV_PREFIX: &str = "BOOKSHELF";

#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct ClientConfig {
    /// Base url of the books api, without the /books suffix
    pub api_base_url: String,
}

impl ClientConfig {
    /// Loads the defaults overridden by BOOKSHELF_* environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod app_config_tests {
    use config::Map;

    use super::*;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let vars: Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(vars))
    }

    #[test]
    fn test_default_api_base_url() {
        let config = ClientConfig::load_from(environment(&[])).expect("Failed to load config");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_api_base_url_from_environment() {
        let config = ClientConfig::load_from(environment(&[
            ("BOOKSHELF_API_BASE_URL", "https://books.example.com/api"),
            ("API_BASE_URL", "http://ignored"),
        ]))
        .expect("Failed to load config");
        assert_eq!(config.api_base_url, "https://books.example.com/api");
    }
}
