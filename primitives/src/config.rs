use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use toml::de::Error as TomlError;

pub static PRODUCTION_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::try_toml(include_str!("../../docs/config/prod.toml"))
        .expect("Failed to parse prod.toml config file")
});

pub static DEVELOPMENT_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::try_toml(include_str!("../../docs/config/dev.toml"))
        .expect("Failed to parse dev.toml config file")
});

/// The environment in which the application is running.
/// Defaults to [`Environment::Development`]
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Maximum number of campaigns to return per list request
    pub campaigns_find_limit: u32,
    /// In milliseconds
    /// Bounds a single call to the durable store; a transient failure
    /// within this bound is retried exactly once.
    pub store_timeout: u32,
}

impl Config {
    /// Utility method that will deserialize a Toml file content into a [`Config`].
    ///
    /// Instead of relying on the `toml` crate directly, use this method instead.
    pub fn try_toml(toml: &str) -> Result<Self, TomlError> {
        toml::from_str(toml)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Toml parsing: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("File reading: {0}")]
    InvalidFile(#[from] std::io::Error),
}

/// If no `config_file` path is provided it will load the [`Environment`] configuration.
/// If `config_file` path is provided it will try to read and parse the file in Toml format.
pub fn configuration(
    environment: Environment,
    config_file: Option<&str>,
) -> Result<Config, ConfigError> {
    match config_file {
        Some(config_file) => {
            let content = std::fs::read_to_string(config_file)?;

            Ok(toml::from_str(&content)?)
        }
        None => match environment {
            Environment::Production => Ok(PRODUCTION_CONFIG.clone()),
            Environment::Development => Ok(DEVELOPMENT_CONFIG.clone()),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bundled_configurations_parse() {
        let development = configuration(Environment::Development, None)
            .expect("Should load the development config");
        assert_eq!(100, development.campaigns_find_limit);

        let production =
            configuration(Environment::Production, None).expect("Should load the production config");
        assert!(production.store_timeout > 0);
    }

    #[test]
    fn environment_deserializes_from_camel_case() {
        let development = serde_json::from_value::<Environment>(serde_json::json!("development"))
            .expect("Should deserialize");
        let production = serde_json::from_value::<Environment>(serde_json::json!("production"))
            .expect("Should deserialize");

        assert_eq!(Environment::Development, development);
        assert_eq!(Environment::Production, production);
    }
}
