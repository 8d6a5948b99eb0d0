//! `GET /health` – Serverstatus

use axum::{extract::State, response::Json};
use emporio_observability::HealthResponse;

use crate::state::AppState;

/// Meldet `degraded`, solange das Upload-Verzeichnis fehlt
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let speicher_ok = tokio::fs::metadata(&state.upload_verzeichnis)
        .await
        .is_ok_and(|m| m.is_dir());

    Json(
        state
            .health
            .antwort(speicher_ok, state.broadcaster.session_anzahl()),
    )
}
