//! Fehlertypen der HTTP-Schnittstelle und ihre Abbildung auf Statuscodes

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use emporio_chat::ChatError;
use serde_json::json;
use thiserror::Error;

/// Fehler, die ein Handler an den Client zurueckgibt
#[derive(Debug, Error)]
pub enum ApiFehler {
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// Multipart-Body konnte nicht gelesen werden
    #[error("Ungueltige Multipart-Anfrage: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    /// Anfrage ist gar kein Multipart-Formular
    #[error("Multipart-Anfrage erwartet: {}", .0.body_text())]
    KeinMultipart(#[from] MultipartRejection),

    #[error("Ungueltige Anfrage: {0}")]
    UngueltigeAnfrage(String),
}

impl ApiFehler {
    /// HTTP-Statuscode fuer den Fehler
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Chat(e) => match e {
                ChatError::UngueltigerDateityp(_) => StatusCode::BAD_REQUEST,
                ChatError::DateiZuGross { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                ChatError::NichtGefunden(_) => StatusCode::NOT_FOUND,
                ChatError::Pfadtraversal(_) => StatusCode::FORBIDDEN,
                ChatError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Multipart(e) => e.status(),
            Self::KeinMultipart(e) => e.status(),
            Self::UngueltigeAnfrage(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// `true` wenn der Fehler nicht beim Client liegt
    pub fn ist_serverfehler(&self) -> bool {
        self.http_status().is_server_error()
    }
}

impl IntoResponse for ApiFehler {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(fehler = %self, "Anfrage fehlgeschlagen");
        } else {
            tracing::debug!(status = status.as_u16(), fehler = %self, "Anfrage abgelehnt");
        }
        fehler_antwort(status, &self.to_string())
    }
}

/// Fehlerantwort im Format `{"error": {"code": .., "message": ..}}`
pub fn fehler_antwort(status: StatusCode, nachricht: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": nachricht
            }
        })),
    )
        .into_response()
}

pub type ApiResult<T> = Result<T, ApiFehler>;
