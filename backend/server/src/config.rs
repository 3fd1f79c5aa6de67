use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use store::FirestoreCredentials;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_CREDENTIALS_PATH: &str = "/run/secrets/FIREBASE_CREDENTIALS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    InvalidVar { key: String, reason: String },

    #[error("Malformed credentials in {path}: {source}")]
    Credentials {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub struct Config {
    pub port: u16,
    pub firestore_endpoint: Option<String>,
    pub credentials: Option<FirestoreCredentials>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let credentials_path =
            var("FIREBASE_CREDENTIALS").unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string());

        Ok(Self {
            port: try_load("RUST_PORT", DEFAULT_PORT)?,
            firestore_endpoint: var("FIRESTORE_ENDPOINT"),
            credentials: read_credentials(&credentials_path)?,
        })
    }

    /// No credentials, ephemeral port. Everything remote fails.
    pub fn local_only() -> Self {
        Self {
            port: 0,
            firestore_endpoint: None,
            credentials: None,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse(key, &raw)
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// A missing artifact is not an error: the server keeps running on the
/// local ledger alone. A present but unreadable one is.
fn read_credentials(path: &str) -> Result<Option<FirestoreCredentials>, ConfigError> {
    let contents = match read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Failed to read credentials from {path}: {e}");
            return Ok(None);
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Credentials {
            path: path.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse::<u16>("RUST_PORT", "8080").unwrap(), 8080);
        assert_eq!(parse::<u16>("RUST_PORT", " 3000 ").unwrap(), 3000);

        let err = parse::<u16>("RUST_PORT", "eighty").unwrap_err();
        assert!(err.to_string().starts_with("Invalid RUST_PORT value"));
        assert!(parse::<u16>("RUST_PORT", "70000").is_err());
    }

    #[test]
    fn test_missing_credentials_is_local_only() {
        let credentials = read_credentials("/nonexistent/FIREBASE_CREDENTIALS").unwrap();

        assert!(credentials.is_none());
    }

    #[test]
    fn test_reads_credentials() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"project_id": "school", "api_key": "abc"}}"#).unwrap();

        let credentials = read_credentials(file.path().to_str().unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(credentials.project_id, "school");
        assert_eq!(credentials.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_malformed_credentials_fail() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = read_credentials(file.path().to_str().unwrap());

        assert!(matches!(result, Err(ConfigError::Credentials { .. })));
    }
}
