//! REST gateway in front of the asset chaincode.

pub mod error;
pub mod handlers;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, put},
};
use client::gateway::Gateway;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use error::{ApiError, ApiResult};
use handlers::{
    create_asset, get_all_assets, get_asset_history, health_check, search_asset, transfer_asset,
    update_asset_price,
};

pub struct AppState {
    pub gateway: Mutex<Gateway>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(gateway: Gateway) -> SharedState {
        Arc::new(AppState {
            gateway: Mutex::new(gateway),
        })
    }

    /// Locks the gateway. The guard must not be held across an `.await`.
    pub fn gateway(&self) -> ApiResult<MutexGuard<'_, Gateway>> {
        self.gateway.lock().map_err(|_| ApiError::Poisoned)
    }
}

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/assets", get(get_all_assets).post(create_asset))
        .route("/api/assets/{id}", get(search_asset))
        .route("/api/assets/{id}/transfer", put(transfer_asset))
        .route("/api/assets/{id}/price", put(update_asset_price))
        .route("/api/assets/{id}/history", get(get_asset_history))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
