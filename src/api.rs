//! HTTP API.
//!
//! `/rates` always answers 200; upstream trouble is reported in the body.

use crate::core::clock::Clock;
use crate::core::rate::AcquisitionResult;
use crate::store::RateCache;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub struct AppState {
    pub cache: RateCache,
    pub clock: Box<dyn Clock>,
}

impl AppState {
    pub fn new(cache: RateCache, clock: Box<dyn Clock>) -> Self {
        Self { cache, clock }
    }
}

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/rates", get(rates))
        .with_state(state)
}

/// Start the API server and run until the listener fails.
pub async fn start(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": "MERALCO API",
        "endpoints": {
            "/rates": "Get current electricity rates",
            "/health": "Health check",
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn rates(State(state): State<Arc<AppState>>) -> Json<AcquisitionResult> {
    let now = state.clock.now();
    Json(state.cache.get(now).await)
}
