//! emporio-signaling – WebSocket-Sessions und Zustellung
//!
//! Dieser Crate stellt die Publish/Subscribe-Schicht bereit, ueber die das
//! [`emporio_chat::MessageRelay`] Nachrichten an verbundene Clients
//! verteilt.
//!
//! ## Architektur
//!
//! ```text
//! GET /ws?user=<id>  (Upgrade im HTTP-Layer)
//!     |
//!     v
//! WsSitzung (pro Verbindung ein Task)
//!     |  ClientFrame::Send -> MessageRelay::einreichen
//!     |
//!     v
//! EventBroadcaster (implementiert Zustellung)
//!     +-- /user/queue/messages  (alle Sessions eines Users)
//!     +-- /topic/public         (alle Sessions)
//! ```

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod frames;

// Bequeme Re-Exporte
pub use broadcast::{EventBroadcaster, SessionId};
pub use connection::WsSitzung;
pub use error::{SignalingError, SignalingResult};
pub use frames::{ClientFrame, ServerFrame, BROADCAST_TOPIC, USER_QUEUE};
