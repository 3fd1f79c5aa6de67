//! Card-scan attendance relay.
//!
//! RFID readers post scans, the relay enriches them with the student the
//! card belongs to, keeps a local copy and forwards one to Firestore.
//!
//!
//!
//! # General Infrastructure
//! - Readers and the dashboard talk JSON over HTTP, no auth
//! - Firestore holds students and attendance history
//! - The process keeps its own ledger of scans since start (or last clear)
//! - Without credentials the relay still runs, on the ledger alone
//!
//!
//!
//! # Routes
//!
//! | Method | Path                 | Remote down         |
//! |--------|----------------------|---------------------|
//! | POST   | `/attendance`        | recorded locally    |
//! | GET    | `/attendance`        | ledger, `source`    |
//! | GET    | `/attendance/latest` | ledger, no `source` |
//! | GET    | `/attendance/today`  | 500                 |
//! | DELETE | `/attendance/clear`  | n/a                 |
//! | POST   | `/students/register` | 500                 |
//! | GET    | `/students`          | 500                 |
//! | GET    | `/test`              | n/a                 |
//! | GET    | `/health`            | n/a                 |
//!
//!
//!
//! # Notes
//!
//! ## Dual write
//! The ledger append is the write that decides success. The remote write is
//! tried once; if it fails the scan lives only in memory and is lost on
//! restart. A durable outbox would close that gap.
//!
//! ## Ledger ids
//! Ids are positions in the ledger, not global keys. They repeat across
//! restarts and after a clear.
//!
//!
//!
//! # Setup
//!
//! Run against Firestore.
//! ```sh
//! FIREBASE_CREDENTIALS=./credentials.json RUST_LOG=info cargo run -p attendance
//! ```
//!
//! Run against the emulator.
//! ```sh
//! FIRESTORE_ENDPOINT=http://localhost:8080/v1 cargo run -p attendance
//! ```
//!
//! Simulate a reader.
//! ```sh
//! cargo run -p tester -- scan CARD1
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{delete, get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod attendance;
pub mod config;
pub mod database;
pub mod error;
pub mod ledger;
pub mod routes;
pub mod state;
pub mod students;
pub mod utils;

use routes::{
    all_handler, clear_handler, health_handler, latest_handler, record_handler,
    register_handler, students_handler, test_handler, today_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/attendance", post(record_handler).get(all_handler))
        .route("/attendance/latest", get(latest_handler))
        .route("/attendance/today", get(today_handler))
        .route("/attendance/clear", delete(clear_handler))
        .route("/students/register", post(register_handler))
        .route("/students", get(students_handler))
        .route("/test", get(test_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new()?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let router = app(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
