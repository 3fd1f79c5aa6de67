//! # Students
//!
//! Owned by the remote store. The relay only registers new students and
//! looks them up by card id.
//!
//! Card ids are not unique. Registration never checks for an existing
//! holder, and lookup takes whichever matching document the store returns
//! first.
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use store::{Direction, DocumentStore, Op, Query, StoredDocument};
use tracing::{debug, warn};

use crate::{
    attendance::StudentSnapshot,
    database::{REGISTERED_AT, STUDENTS},
    error::AppError,
    utils::{non_empty, now_iso, object, required},
};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub card_id: String,
    pub name: String,
    #[serde(default = "not_available")]
    pub class: String,
    #[serde(default = "not_available")]
    pub roll_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

impl Student {
    pub fn from_document(document: StoredDocument) -> Option<Self> {
        let StoredDocument { id, mut fields } = document;
        fields.insert("id".into(), Value::String(id.clone()));

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| warn!("Skipping malformed student {id}: {e}"))
            .ok()
    }

    pub fn snapshot(&self) -> StudentSnapshot {
        StudentSnapshot {
            name: self.name.clone(),
            class: self.class.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "class")]
    pub student_class: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub card_id: String,
    pub name: String,
}

/// First match or nothing. A store fault reads the same as a miss.
pub async fn resolve(store: &dyn DocumentStore, card_id: &str) -> Option<Student> {
    let query = Query::new().filter("cardId", Op::Equal, card_id).limit(1);

    match store.query(STUDENTS, &query).await {
        Ok(documents) => {
            let student = documents.into_iter().find_map(Student::from_document);
            if student.is_none() {
                debug!("No student for card {card_id}");
            }
            student
        }
        Err(e) => {
            warn!("Student lookup for {card_id} failed: {e}");
            None
        }
    }
}

pub async fn register(
    store: &dyn DocumentStore,
    request: RegisterRequest,
) -> Result<Registration, AppError> {
    let card_id = required(request.card_id, "cardId")?;
    let name = required(request.name, "name")?;

    let class = non_empty(request.student_class).unwrap_or_else(not_available);
    let roll_number = non_empty(request.roll_number).unwrap_or_else(not_available);

    let document = object(json!({
        "cardId": card_id,
        "name": name,
        "class": class,
        "rollNumber": roll_number,
        REGISTERED_AT: now_iso(),
    }));

    let id = store.add(STUDENTS, document).await?;

    Ok(Registration { id, card_id, name })
}

/// Everyone, ordered by name.
pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Student>, AppError> {
    let query = Query::new().order_by("name", Direction::Ascending);

    let documents = store.query(STUDENTS, &query).await?;

    Ok(documents
        .into_iter()
        .filter_map(Student::from_document)
        .collect())
}
