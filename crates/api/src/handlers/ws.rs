//! `GET /ws?user=<id>` – WebSocket-Upgrade fuer Chat-Sessions

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    response::Response,
};
use emporio_signaling::WsSitzung;
use serde::Deserialize;

use crate::state::AppState;

/// Query-Parameter des Upgrades
#[derive(Debug, Default, Deserialize)]
pub struct WsParameter {
    /// Ohne User empfaengt die Session nur Broadcasts
    pub user: Option<String>,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(parameter): Query<WsParameter>,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = parameter
        .user
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    let sitzung = WsSitzung::neu(state.relay.clone(), state.broadcaster.clone(), user_id);
    let metriken = state.metriken.clone();

    ws.on_upgrade(move |socket| async move {
        metriken.ws_sessions.inc();
        sitzung.verarbeiten(socket).await;
        metriken.ws_sessions.dec();
    })
}
