use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Inaltera endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health))
        .route("/api/emitir", post(handler::emitir))
        .route("/api/anular/:id", post(handler::anular))
        .route("/api/verificar-hash/:hash", get(handler::verificar))
        .route("/api/uso-plan", get(handler::uso_plan))
        .route("/api/bitacora", get(handler::bitacora))
        .route("/api/registros", get(handler::registros))
        .route("/api/registros/:id/json", get(handler::registro_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
