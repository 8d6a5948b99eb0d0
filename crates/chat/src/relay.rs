//! MessageRelay – Nachrichten stempeln und adressiert oder per Broadcast zustellen
//!
//! Das Relay haelt keinen Zustand ueber eine Zustellung hinaus. Welche
//! Sessions gerade verbunden sind, weiss nur die injizierte [`Zustellung`].

use std::sync::Arc;

use crate::{types::ChatNachricht, zeit::Zeitgeber};

/// Publish/Subscribe-Faehigkeit, ueber die das Relay zustellt
///
/// Beide Methoden sind fire-and-forget und liefern nur die Anzahl der
/// erreichten Sessions zurueck.
pub trait Zustellung: Send + Sync {
    /// An alle verbundenen Sessions eines Users (private Queue)
    fn an_user_zustellen(&self, user_id: &str, nachricht: &ChatNachricht) -> usize;

    /// An alle Abonnenten des gemeinsamen Broadcast-Kanals
    fn an_alle_senden(&self, nachricht: &ChatNachricht) -> usize;
}

impl<Z: Zustellung + ?Sized> Zustellung for Arc<Z> {
    fn an_user_zustellen(&self, user_id: &str, nachricht: &ChatNachricht) -> usize {
        (**self).an_user_zustellen(user_id, nachricht)
    }

    fn an_alle_senden(&self, nachricht: &ChatNachricht) -> usize {
        (**self).an_alle_senden(nachricht)
    }
}

/// Gewaehlter Zustellweg einer Nachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Zustellweg {
    /// Punkt-zu-Punkt an einen Empfaenger
    Adressiert { empfaenger: String, erreicht: usize },
    /// An alle Abonnenten
    Broadcast { erreicht: usize },
}

impl Zustellweg {
    /// Anzahl der Sessions, die die Nachricht erhalten haben
    pub fn erreicht(&self) -> usize {
        match self {
            Self::Adressiert { erreicht, .. } | Self::Broadcast { erreicht } => *erreicht,
        }
    }
}

/// MessageRelay leitet Chat-Nachrichten an verbundene Clients weiter
pub struct MessageRelay<Z: Zustellung> {
    zustellung: Z,
    zeitgeber: Arc<Zeitgeber>,
}

impl<Z: Zustellung> MessageRelay<Z> {
    /// Erstellt ein neues Relay mit eigener Uhr
    pub fn neu(zustellung: Z) -> Arc<Self> {
        Self::mit_zeitgeber(zustellung, Arc::new(Zeitgeber::neu()))
    }

    /// Erstellt ein Relay, das sich die Uhr mit anderen Komponenten teilt
    pub fn mit_zeitgeber(zustellung: Z, zeitgeber: Arc<Zeitgeber>) -> Arc<Self> {
        Arc::new(Self {
            zustellung,
            zeitgeber,
        })
    }

    pub fn zeitgeber(&self) -> &Arc<Zeitgeber> {
        &self.zeitgeber
    }

    /// Nimmt eine Client-Nachricht entgegen, stempelt und stellt sie zu
    ///
    /// Ein mitgeschickter Zeitstempel wird ueberschrieben. Unbekannte
    /// Empfaenger sind kein Fehler, die Nachricht verfaellt dann.
    pub fn einreichen(&self, mut nachricht: ChatNachricht) -> (ChatNachricht, Zustellweg) {
        nachricht.timestamp = self.zeitgeber.zeitstempel();
        nachricht.normalisieren();
        let weg = self.zustellen(&nachricht);
        (nachricht, weg)
    }

    /// Stellt eine bereits gestempelte Nachricht zu
    ///
    /// Ein nicht-leerer `receiver` waehlt die Punkt-zu-Punkt-Zustellung,
    /// sonst geht die Nachricht an alle.
    pub fn zustellen(&self, nachricht: &ChatNachricht) -> Zustellweg {
        match nachricht.empfaenger() {
            Some(empfaenger) => {
                let erreicht = self.zustellung.an_user_zustellen(empfaenger, nachricht);
                if erreicht == 0 {
                    tracing::debug!(
                        empfaenger = %empfaenger,
                        "Empfaenger nicht verbunden, Nachricht verworfen"
                    );
                }
                Zustellweg::Adressiert {
                    empfaenger: empfaenger.to_string(),
                    erreicht,
                }
            }
            None => {
                let erreicht = self.zustellung.an_alle_senden(nachricht);
                Zustellweg::Broadcast { erreicht }
            }
        }
    }
}
