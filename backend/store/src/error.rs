use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote store not configured")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Remote store returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Injected fault")]
    Injected,
}
