//! Fehlertypen fuer den Signaling-Service

use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// WebSocket-Transportfehler
    #[error("WebSocket-Fehler: {0}")]
    WebSocket(#[from] axum::Error),

    /// Verbindung wurde getrennt
    #[error("Verbindung getrennt")]
    VerbindungGetrennt,

    /// Protokollfehler (ungueltiger Frame)
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] serde_json::Error),
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
