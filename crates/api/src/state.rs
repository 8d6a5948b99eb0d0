//! Geteilter Axum-State der HTTP-Schnittstelle

use std::path::PathBuf;
use std::sync::Arc;

use emporio_chat::{anhang::STANDARD_MAX_BYTES, AnhangService, DiskStorage, MessageRelay};
use emporio_observability::{EmporioMetrics, HealthState};
use emporio_signaling::{broadcast::SEND_QUEUE_GROESSE, EventBroadcaster};

use crate::zustellung::GemesseneZustellung;

/// Relay, wie es die HTTP-Schnittstelle verwendet
pub type Relay = MessageRelay<GemesseneZustellung>;

/// Anhang-Service, wie ihn die HTTP-Schnittstelle verwendet
pub type Anhaenge = AnhangService<DiskStorage, GemesseneZustellung>;

/// Laufzeit-Einstellungen fuer den Aufbau des States
#[derive(Debug, Clone)]
pub struct ApiKonfig {
    pub upload_verzeichnis: PathBuf,
    pub max_upload_bytes: u64,
    pub queue_groesse: usize,
}

impl Default for ApiKonfig {
    fn default() -> Self {
        Self {
            upload_verzeichnis: PathBuf::from("uploads"),
            max_upload_bytes: STANDARD_MAX_BYTES,
            queue_groesse: SEND_QUEUE_GROESSE,
        }
    }
}

/// Axum-State fuer alle Routen
#[derive(Clone)]
pub struct AppState {
    pub anhaenge: Arc<Anhaenge>,
    pub relay: Arc<Relay>,
    pub broadcaster: EventBroadcaster,
    pub metriken: EmporioMetrics,
    pub health: HealthState,
    pub upload_verzeichnis: PathBuf,
}

impl AppState {
    /// Baut Broadcaster, Relay und Anhang-Service zusammen
    ///
    /// Relay und Anhang-Service teilen sich Zustellung und Uhr.
    pub fn neu(konfig: &ApiKonfig, metriken: EmporioMetrics) -> Self {
        let broadcaster = EventBroadcaster::mit_queue_groesse(konfig.queue_groesse);
        let zustellung = GemesseneZustellung::neu(broadcaster.clone(), metriken.clone());
        let relay = MessageRelay::neu(zustellung);

        let storage = Arc::new(DiskStorage::new(konfig.upload_verzeichnis.clone()));
        let anhaenge = AnhangService::neu(storage, relay.clone(), konfig.max_upload_bytes);

        Self {
            anhaenge,
            relay,
            broadcaster,
            metriken,
            health: HealthState::neu(),
            upload_verzeichnis: konfig.upload_verzeichnis.clone(),
        }
    }
}
