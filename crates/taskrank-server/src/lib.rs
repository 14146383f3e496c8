//! HTTP surface for taskrank.
//!
//! `POST /analyze/` ingests and ranks a batch, `GET /suggest/` returns the
//! top stored tasks. Both paths are also served without the trailing slash.

pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use taskrank_core::{Clock, Config, CoreError, HolidayCalendar, Strategy, SystemClock, TaskDb};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub use error::ApiError;

/// Shared state for all handlers.
///
/// The connection sits behind one async mutex; a request holds it for its
/// whole read/score/write sequence.
pub struct AppState {
    pub db: Mutex<TaskDb>,
    pub calendar: HolidayCalendar,
    pub default_strategy: Strategy,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(db: TaskDb, calendar: HolidayCalendar, clock: Arc<dyn Clock>) -> Self {
        Self {
            db: Mutex::new(db),
            calendar,
            default_strategy: Strategy::default(),
            clock,
        }
    }

    pub fn with_default_strategy(mut self, strategy: Strategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Build production state from configuration.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        let db = TaskDb::open(config.database_path()?)?;
        let calendar = config.calendar()?;
        Ok(Self::new(db, calendar, Arc::new(SystemClock))
            .with_default_strategy(config.default_strategy()))
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let analyze = post(routes::analyze).fallback(routes::method_not_allowed);
    let suggest = get(routes::suggest).fallback(routes::method_not_allowed);

    Router::new()
        .route("/analyze", analyze.clone())
        .route("/analyze/", analyze)
        .route("/suggest", suggest.clone())
        .route("/suggest/", suggest)
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("taskrank listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}
