//! Server-Zeitstempel und eindeutige Millisekunden-Praefixe

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Local, NaiveDateTime, Utc};
use parking_lot::Mutex;

/// Format der Nachrichten-Zeitstempel (lokale Zeit ohne Offset)
const ZEITSTEMPEL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Prozessweite Uhr fuer Relay und Uploads
///
/// Beide Werte laufen innerhalb eines Prozesses nie rueckwaerts, auch wenn
/// die Systemuhr verstellt wird.
#[derive(Debug)]
pub struct Zeitgeber {
    letzter_zeitstempel: Mutex<Option<NaiveDateTime>>,
    letzte_millis: AtomicI64,
}

impl Zeitgeber {
    pub fn neu() -> Self {
        Self {
            letzter_zeitstempel: Mutex::new(None),
            letzte_millis: AtomicI64::new(0),
        }
    }

    /// Aktueller Zeitstempel, nie kleiner als der zuletzt ausgegebene
    pub fn zeitstempel(&self) -> String {
        let jetzt = Local::now().naive_local();
        let mut letzter = self.letzter_zeitstempel.lock();
        let wert = match *letzter {
            Some(vorher) if vorher > jetzt => vorher,
            _ => jetzt,
        };
        *letzter = Some(wert);
        wert.format(ZEITSTEMPEL_FORMAT).to_string()
    }

    /// Epoch-Millisekunden, pro Aufruf streng monoton steigend
    ///
    /// Kollidiert ein Aufruf mit dem vorherigen in derselben Millisekunde,
    /// wird der Wert um eins weitergezaehlt.
    pub fn eindeutige_millis(&self) -> i64 {
        let jetzt = Utc::now().timestamp_millis();
        let vorher = self
            .letzte_millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |letzte| {
                Some(jetzt.max(letzte + 1))
            })
            .unwrap_or_else(|letzte| letzte);
        jetzt.max(vorher + 1)
    }
}

impl Default for Zeitgeber {
    fn default() -> Self {
        Self::neu()
    }
}
