//! # Attendance
//!
//! ## Recording
//! 1. Reject scans without a card id before touching anything.
//! 2. Resolve the student. Misses and store faults both become the unknown
//!    student.
//! 3. Append to the local ledger. This is the write that counts.
//! 4. Replicate a denormalized projection to the remote store once. On
//!    failure the scan still succeeds, just without a remote id. Nothing
//!    retries it later.
//!
//! ## Reading
//! Remote first, newest first. On a remote fault:
//!
//! | Read   | Fallback                                  |
//! |--------|-------------------------------------------|
//! | all    | whole ledger, insertion order             |
//! | latest | last 10 ledger entries, newest first      |
//! | today  | none, the fault is returned               |
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use store::{Direction, Op, Query, StoredDocument};
use tracing::{info, warn};

use crate::{
    database::{ATTENDANCE, CREATED_AT},
    error::AppError,
    state::AppState,
    students::{NOT_AVAILABLE, resolve},
    utils::{non_empty, now_iso, object, required, start_of_today_iso},
};

pub const ALL_LIMIT: usize = 100;
pub const LATEST_LIMIT: usize = 10;

pub const UNKNOWN_STUDENT: &str = "Unknown Student";
const UNKNOWN_NAME: &str = "Unknown";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub time: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct StudentSnapshot {
    pub name: String,
    pub class: String,
}

impl StudentSnapshot {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_STUDENT.to_string(),
            class: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub local_id: u64,
    pub card_id: String,
    pub timestamp: String,
    pub recorded_at: String,
    pub student: StudentSnapshot,
    #[serde(rename = "firebaseId", skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

/// A row of the `attendance` collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttendance {
    pub id: String,
    pub card_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl RemoteAttendance {
    pub fn from_document(document: StoredDocument) -> Option<Self> {
        let StoredDocument { id, mut fields } = document;
        fields.insert("id".into(), Value::String(id.clone()));

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| warn!("Skipping malformed attendance {id}: {e}"))
            .ok()
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AttendanceEntry {
    Remote(RemoteAttendance),
    Local(AttendanceRecord),
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Firebase,
    Memory,
}

pub struct AttendanceList {
    pub entries: Vec<AttendanceEntry>,
    pub source: Source,
}

pub async fn record(state: &AppState, request: ScanRequest) -> Result<AttendanceRecord, AppError> {
    let card_id = required(request.card_id, "cardId")?;

    let recorded_at = now_iso();
    let timestamp = non_empty(request.time).unwrap_or_else(|| recorded_at.clone());

    let student = resolve(state.store.as_ref(), &card_id).await;
    let snapshot = student
        .as_ref()
        .map_or_else(StudentSnapshot::unknown, |student| student.snapshot());

    let record = state.ledger.append_with(|local_id| AttendanceRecord {
        local_id,
        card_id,
        timestamp,
        recorded_at,
        student: snapshot,
        remote_id: None,
    });

    info!(
        "Scan #{} card {} -> {}",
        record.local_id, record.card_id, record.student.name
    );

    let projection = object(json!({
        "cardId": record.card_id,
        "timestamp": record.timestamp,
        "studentId": student.as_ref().map(|student| student.id.clone()),
        "studentName": student.as_ref().map_or(UNKNOWN_NAME, |student| student.name.as_str()),
        "class": student.as_ref().map_or(NOT_AVAILABLE, |student| student.class.as_str()),
        CREATED_AT: now_iso(),
    }));

    match state.store.add(ATTENDANCE, projection).await {
        Ok(remote_id) => Ok(AttendanceRecord {
            remote_id: Some(remote_id),
            ..record
        }),
        Err(e) => {
            warn!("Scan #{} kept local only: {e}", record.local_id);
            Ok(record)
        }
    }
}

async fn newest(state: &AppState, limit: usize) -> Result<Vec<AttendanceEntry>, AppError> {
    let query = Query::new()
        .order_by(CREATED_AT, Direction::Descending)
        .limit(limit);

    let documents = state.store.query(ATTENDANCE, &query).await?;

    Ok(documents
        .into_iter()
        .filter_map(RemoteAttendance::from_document)
        .map(AttendanceEntry::Remote)
        .collect())
}

fn local(records: Vec<AttendanceRecord>) -> Vec<AttendanceEntry> {
    records.into_iter().map(AttendanceEntry::Local).collect()
}

pub async fn read_all(state: &AppState) -> AttendanceList {
    match newest(state, ALL_LIMIT).await {
        Ok(entries) => AttendanceList {
            entries,
            source: Source::Firebase,
        },
        Err(e) => {
            warn!("Serving all attendance from memory: {e}");
            AttendanceList {
                entries: local(state.ledger.all()),
                source: Source::Memory,
            }
        }
    }
}

pub async fn read_latest(state: &AppState) -> AttendanceList {
    match newest(state, LATEST_LIMIT).await {
        Ok(entries) => AttendanceList {
            entries,
            source: Source::Firebase,
        },
        Err(e) => {
            warn!("Serving latest attendance from memory: {e}");
            AttendanceList {
                entries: local(state.ledger.latest(LATEST_LIMIT)),
                source: Source::Memory,
            }
        }
    }
}

/// Everything written since local midnight. No ledger fallback.
pub async fn read_today(state: &AppState) -> Result<Vec<RemoteAttendance>, AppError> {
    let query = Query::new()
        .filter(CREATED_AT, Op::GreaterOrEqual, start_of_today_iso())
        .order_by(CREATED_AT, Direction::Descending);

    let documents = state.store.query(ATTENDANCE, &query).await?;

    Ok(documents
        .into_iter()
        .filter_map(RemoteAttendance::from_document)
        .collect())
}

/// Drops the ledger. The remote history is untouched.
pub fn clear(state: &AppState) -> usize {
    let cleared = state.ledger.clear();
    info!("Cleared {cleared} local attendance records");

    cleared
}
