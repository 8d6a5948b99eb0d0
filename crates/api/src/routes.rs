//! Route-Definitionen der HTTP-Schnittstelle

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use emporio_observability::{metrics_router, timing_middleware};

use crate::handlers;
use crate::state::AppState;

/// Spielraum fuer Multipart-Header und Textfelder ueber der Dateigroesse
const MULTIPART_RESERVE: u64 = 64 * 1024;

/// Erstellt den Router fuer alle Chat-Routen
pub fn api_router(max_upload_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_bytes.saturating_add(MULTIPART_RESERVE))
        .unwrap_or(usize::MAX);

    Router::new()
        // Anhaenge
        .route(
            "/chat/uploadImage",
            post(handlers::upload::upload_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/images/:filename", get(handlers::images::get_image))
        // WebSocket
        .route("/ws", get(handlers::ws::ws_upgrade))
        // Betrieb
        .route("/health", get(handlers::health::health))
}

/// Vollstaendige Anwendung inkl. `/metrics` und Request-Timing
pub fn app(state: AppState) -> Router {
    let metriken = state.metriken.clone();
    let max_upload_bytes = state.anhaenge.max_bytes();

    api_router(max_upload_bytes)
        .with_state(state)
        .merge(metrics_router(metriken.clone()))
        .layer(middleware::from_fn_with_state(metriken, timing_middleware))
}
