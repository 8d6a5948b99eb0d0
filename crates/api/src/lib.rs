//! emporio-api – HTTP-Schnittstelle des Emporio-Chats
//!
//! Routen:
//! - `POST /chat/uploadImage` – Bild (JPEG/PNG) hochladen, liefert die `IMAGE`-Nachricht
//! - `GET  /images/:filename` – gespeichertes Bild als Download
//! - `GET  /ws?user=<id>`     – WebSocket-Session (siehe `emporio-signaling`)
//! - `GET  /health`           – Health-Check
//! - `GET  /metrics`          – Prometheus-Metriken
//!
//! Fehler werden als `{"error": {"code": <status>, "message": "..."}}` beantwortet.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod zustellung;

// Bequeme Re-Exporte
pub use error::{ApiFehler, ApiResult};
pub use routes::{api_router, app};
pub use server::{ApiServer, ApiServerKonfig};
pub use state::{ApiKonfig, AppState};
pub use zustellung::GemesseneZustellung;
