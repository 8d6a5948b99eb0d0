//! emporio-chat – Nachrichten-Relay und Bild-Anhaenge
//!
//! Dieses Crate implementiert:
//! - MessageRelay: Nachrichten stempeln, adressiert oder per Broadcast zustellen
//! - AnhangService: Bild-Upload (JPEG/PNG), Ablage und Auslieferung
//! - StorageBackend-Trait + DiskStorage-Implementierung
//!
//! Die eigentliche Zustellung an verbundene Clients ist ueber das
//! [`Zustellung`]-Trait injiziert.
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use emporio_chat::{AnhangService, ChatNachricht, DiskStorage, MessageRelay, Zustellung};
//!
//! struct Verwerfen;
//!
//! impl Zustellung for Verwerfen {
//!     fn an_user_zustellen(&self, _: &str, _: &ChatNachricht) -> usize { 0 }
//!     fn an_alle_senden(&self, _: &ChatNachricht) -> usize { 0 }
//! }
//!
//! let relay = MessageRelay::neu(Verwerfen);
//! let storage = Arc::new(DiskStorage::new("uploads"));
//! let anhaenge = AnhangService::neu(storage, relay.clone(), 10 * 1024 * 1024);
//! ```

pub mod anhang;
pub mod error;
pub mod relay;
pub mod storage;
pub mod types;
pub mod zeit;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use anhang::AnhangService;
pub use error::{ChatError, ChatResult};
pub use relay::{MessageRelay, Zustellung, Zustellweg};
pub use storage::{DiskStorage, StorageBackend};
pub use types::{BildUpload, ChatNachricht, GespeichertesBild, NachrichtenTyp, BILD_URL_PRAEFIX};
pub use zeit::Zeitgeber;
