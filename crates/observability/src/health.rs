//! Health-Check fuer Emporio
//!
//! Endpoint: `GET /health` (Handler im API-Crate)
//! Response: JSON mit Status, Version, Uptime und Anzahl offener Sessions

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Status des Health-Checks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Server laeuft, aber das Upload-Verzeichnis ist nicht verfuegbar
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub connected_sessions: usize,
}

/// Geteilter Zustand fuer den Health-Check
#[derive(Debug, Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
}

impl HealthState {
    pub fn neu() -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Baut die Antwort aus dem aktuellen Laufzeitzustand
    pub fn antwort(&self, speicher_ok: bool, connected_sessions: usize) -> HealthResponse {
        HealthResponse {
            status: if speicher_ok {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            connected_sessions,
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::neu()
    }
}
