use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use store::StoreError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Remote store error: {0}")]
    Remote(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => "validation",
            AppError::MalformedPayload => "malformed-payload",
            AppError::Remote(_) => "remote-fault",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) | AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("{self}");
        }

        let body = ErrorBody {
            success: false,
            error: self.kind(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
