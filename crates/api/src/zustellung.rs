//! Zustellung mit Metriken
//!
//! Legt sich um den [`EventBroadcaster`] und zaehlt Zustellungen und
//! verworfene adressierte Nachrichten in den Prometheus-Metriken.

use emporio_chat::{ChatNachricht, Zustellung};
use emporio_observability::EmporioMetrics;
use emporio_signaling::EventBroadcaster;

/// [`Zustellung`] ueber den Broadcaster, mit Zaehlern
#[derive(Clone)]
pub struct GemesseneZustellung {
    broadcaster: EventBroadcaster,
    metriken: EmporioMetrics,
}

impl GemesseneZustellung {
    pub fn neu(broadcaster: EventBroadcaster, metriken: EmporioMetrics) -> Self {
        Self {
            broadcaster,
            metriken,
        }
    }
}

impl Zustellung for GemesseneZustellung {
    fn an_user_zustellen(&self, user_id: &str, nachricht: &ChatNachricht) -> usize {
        let erreicht = self.broadcaster.an_user_zustellen(user_id, nachricht);
        if erreicht == 0 {
            self.metriken.deliveries_dropped_total.inc();
        } else {
            self.metriken.zustellung_erfassen("user", erreicht);
        }
        erreicht
    }

    fn an_alle_senden(&self, nachricht: &ChatNachricht) -> usize {
        let erreicht = self.broadcaster.an_alle_senden(nachricht);
        self.metriken.zustellung_erfassen("broadcast", erreicht);
        erreicht
    }
}
