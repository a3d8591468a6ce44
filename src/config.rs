use std::{num::ParseIntError, time::Duration};

pub const DATABASE_NAME: &str = "netgames";
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub mongodb_uri: Option<String>,
    pub database_name: String,
    pub connect_timeout: Duration,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mongodb_uri: None,
            database_name: DATABASE_NAME.to_string(),
            connect_timeout: CONNECT_TIMEOUT,
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("MONGODB_URI").ok(),
            std::env::var("PORT").ok(),
        )
    }

    fn from_vars(uri: Option<String>, port: Option<String>) -> Result<Self, ConfigError> {
        let port = match port {
            Some(p) => p.trim().parse().map_err(|e| ConfigError::InvalidPort(p, e))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            mongodb_uri: uri.filter(|u| !u.trim().is_empty()),
            port,
            ..Default::default()
        })
    }

    pub fn with_mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid PORT '{0}' | {1}")]
    InvalidPort(String, ParseIntError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(None, None).unwrap();

        assert_eq!(settings.mongodb_uri, None);
        assert_eq!(settings.database_name, "netgames");
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert_eq!(settings.port, 3000);
    }

    #[test]
    fn test_empty_uri_is_missing() {
        let settings = Settings::from_vars(Some("  ".to_string()), None).unwrap();

        assert_eq!(settings.mongodb_uri, None);
    }

    #[test]
    fn test_uri_and_port() {
        let settings = Settings::from_vars(
            Some("mongodb://localhost:27017".to_string()),
            Some("8080".to_string()),
        )
        .unwrap();

        assert_eq!(settings.mongodb_uri.as_deref(), Some("mongodb://localhost:27017"));
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn test_invalid_port() {
        let result = Settings::from_vars(None, Some("http".to_string()));

        assert!(matches!(result, Err(ConfigError::InvalidPort(p, _)) if p == "http"));
    }
}
