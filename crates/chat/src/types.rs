//! Oeffentliche Typen fuer Relay und Anhaenge

use serde::{Deserialize, Serialize};

use crate::storage::dateiname_pruefen;

/// Praefix der oeffentlichen Bild-URLs
pub const BILD_URL_PRAEFIX: &str = "/images/";

/// Nachrichtentyp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NachrichtenTyp {
    #[default]
    Text,
    Image,
}

/// Eine Chat-Nachricht, wie sie ueber die Leitung geht
///
/// Wertobjekt ohne Identitaet: wird pro Anfrage erzeugt, zugestellt und
/// danach verworfen. Feldnamen im JSON sind camelCase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatNachricht {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Leer oder fehlend = Broadcast
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Wird vom Server beim Empfang gesetzt, Client-Werte werden ignoriert
    #[serde(default, alias = "timeStamp")]
    pub timestamp: String,
    #[serde(default)]
    pub message_type: NachrichtenTyp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ChatNachricht {
    /// Neue Text-Nachricht (Zeitstempel setzt das Relay)
    pub fn text(
        sender: Option<String>,
        receiver: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            receiver,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Bild-Benachrichtigung fuer einen gespeicherten Anhang
    pub fn bild(
        sender: Option<String>,
        receiver: Option<String>,
        gespeicherter_name: &str,
        timestamp: String,
    ) -> Self {
        Self {
            sender,
            receiver,
            content: String::new(),
            timestamp,
            message_type: NachrichtenTyp::Image,
            image_url: Some(format!("{BILD_URL_PRAEFIX}{gespeicherter_name}")),
        }
    }

    /// Adressierter Empfaenger, falls vorhanden und nicht leer
    pub fn empfaenger(&self) -> Option<&str> {
        self.receiver
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Stellt sicher, dass `imageUrl` genau bei `IMAGE` gesetzt ist
    ///
    /// Text-Nachrichten verlieren eine mitgeschickte URL. Bild-Nachrichten,
    /// deren URL nicht auf einen Anhang unter `/images/` zeigt, werden zu
    /// Text herabgestuft.
    pub fn normalisieren(&mut self) {
        let gueltige_url = self.image_url.as_deref().is_some_and(ist_anhang_url);

        match self.message_type {
            NachrichtenTyp::Text => self.image_url = None,
            NachrichtenTyp::Image if !gueltige_url => {
                self.message_type = NachrichtenTyp::Text;
                self.image_url = None;
            }
            NachrichtenTyp::Image => {}
        }
    }
}

/// `true` fuer `/images/<dateiname>` mit genau einem gueltigen Dateinamen
pub fn ist_anhang_url(url: &str) -> bool {
    url.strip_prefix(BILD_URL_PRAEFIX)
        .is_some_and(|name| dateiname_pruefen(name).is_ok())
}

/// Daten eines Bild-Uploads, wie sie der HTTP-Layer aus dem Multipart liest
#[derive(Debug, Default)]
pub struct BildUpload {
    /// Vom Client mitgeschickter Dateiname
    pub dateiname: Option<String>,
    /// Deklarierter Content-Type
    pub content_type: Option<String>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub daten: Vec<u8>,
}

/// Ein gespeichertes Bild, bereit zur Auslieferung
#[derive(Debug, Clone)]
pub struct GespeichertesBild {
    pub dateiname: String,
    pub content_type: &'static str,
    pub daten: Vec<u8>,
}
