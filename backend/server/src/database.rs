//! # Firestore
//!
//! Durable side of the relay. Two collections:
//!
//! - `students`: `cardId`, `name`, `class`, `rollNumber`, `registeredAt`
//! - `attendance`: `cardId`, `timestamp`, `studentId`, `studentName`, `class`, `createdAt`
//!
//! Attendance rows are a denormalized projection: the student's name and
//! class are copied in at scan time, so later edits to a student never
//! rewrite history.
//!
//! ## Startup
//! Credentials are read once. Without them the server still starts and runs
//! local-only: every remote call fails fast and each endpoint applies its
//! own fallback policy.
use std::sync::Arc;

use store::{DisconnectedStore, DocumentStore, FirestoreStore};
use tracing::{info, warn};

use crate::config::Config;

pub const STUDENTS: &str = "students";
pub const ATTENDANCE: &str = "attendance";

pub const CREATED_AT: &str = "createdAt";
pub const REGISTERED_AT: &str = "registeredAt";

pub fn init_store(config: &Config) -> Arc<dyn DocumentStore> {
    let Some(credentials) = config.credentials.clone() else {
        warn!("No remote store credentials, running local-only");
        return Arc::new(DisconnectedStore);
    };

    info!("Using Firestore project {}", credentials.project_id);

    if credentials.is_anonymous() {
        warn!(
            "No api_key or access_token for {}, Firestore calls will be unauthenticated",
            credentials.project_id
        );
    }

    match &config.firestore_endpoint {
        Some(endpoint) => {
            info!("Firestore endpoint overridden: {endpoint}");
            Arc::new(FirestoreStore::with_endpoint(credentials, endpoint))
        }
        None => Arc::new(FirestoreStore::new(credentials)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_only_without_credentials() {
        let store = init_store(&Config::local_only());

        assert_eq!(store.name(), "disconnected");
    }

    #[test]
    fn test_firestore_with_credentials() {
        let mut config = Config::local_only();
        config.credentials = Some(
            serde_json::from_str(r#"{"project_id": "school", "api_key": "k"}"#).unwrap(),
        );

        let store = init_store(&config);

        assert_eq!(store.name(), "firestore");
    }

    #[test]
    fn test_anonymous_credentials_still_reach_firestore() {
        let mut config = Config::local_only();
        config.credentials = Some(
            serde_json::from_str(r#"{"project_id": "school", "client_email": "a@b"}"#).unwrap(),
        );

        assert!(config.credentials.as_ref().is_some_and(|c| c.is_anonymous()));
        assert_eq!(init_store(&config).name(), "firestore");
    }
}
