use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::{
    attendance::{self, ScanRequest, Source},
    error::AppError,
    state::AppState,
    students::{self, RegisterRequest},
    utils::now_iso,
};

#[derive(Serialize)]
struct DataResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct ListResponse<T> {
    success: bool,
    count: usize,
    data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Source>,
}

impl<T> ListResponse<T> {
    fn new(data: Vec<T>, source: Option<Source>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            source,
        }
    }
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    success: bool,
    remote: &'static str,
    ledger_size: usize,
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(inner)| inner)
        .map_err(|_| AppError::MalformedPayload)
}

pub async fn record_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let record = attendance::record(&state, payload(body)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            success: true,
            data: record,
        }),
    ))
}

pub async fn all_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let list = attendance::read_all(&state).await;

    Json(ListResponse::new(list.entries, Some(list.source)))
}

/// Never tagged with a source, unlike the full listing.
pub async fn latest_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let list = attendance::read_latest(&state).await;

    Json(ListResponse::new(list.entries, None))
}

pub async fn today_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let today = attendance::read_today(&state).await?;

    Ok(Json(ListResponse::new(today, None)))
}

pub async fn clear_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cleared = attendance::clear(&state);

    Json(MessageResponse {
        success: true,
        message: format!("Cleared {cleared} attendance records"),
        count: Some(cleared),
        timestamp: None,
    })
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let registration = students::register(state.store.as_ref(), payload(body)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            success: true,
            data: registration,
        }),
    ))
}

pub async fn students_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let students = students::list(state.store.as_ref()).await?;

    Ok(Json(ListResponse::new(students, None)))
}

pub async fn test_handler() -> impl IntoResponse {
    Json(MessageResponse {
        success: true,
        message: "Attendance server is running".to_string(),
        count: None,
        timestamp: Some(now_iso()),
    })
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        success: true,
        remote: state.store.name(),
        ledger_size: state.ledger.len(),
    })
}
