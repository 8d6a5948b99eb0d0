//! AnhangService – Bild-Upload, Ablage und Auslieferung
//!
//! Ein Upload wird geprueft, unter `<millis>_<dateiname>` abgelegt und als
//! `IMAGE`-Nachricht ueber das [`MessageRelay`] verteilt.

use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{ChatError, ChatResult},
    relay::{MessageRelay, Zustellung},
    storage::{dateiname_pruefen, StorageBackend},
    types::{BildUpload, ChatNachricht, GespeichertesBild},
};

/// Erlaubte Content-Types und ihre Ersatz-Dateinamen
const ERLAUBTE_TYPEN: [(&str, &str); 2] = [("image/jpeg", "image.jpg"), ("image/png", "image.png")];

/// Obergrenze fuer den bereinigten Basisnamen; mit Zeitpraefix bleibt der
/// gespeicherte Name unter dem Dateisystem-Limit von 255 Bytes
pub const MAX_BASISNAME_BYTES: usize = 200;

/// Laengste Endung, die beim Kuerzen erhalten bleibt (inkl. Punkt)
const MAX_ENDUNG_BYTES: usize = 16;

/// Standard-Obergrenze fuer Uploads (10 MiB)
pub const STANDARD_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// AnhangService verwaltet Bild-Uploads und deren Auslieferung
pub struct AnhangService<S, Z>
where
    S: StorageBackend,
    Z: Zustellung,
{
    storage: Arc<S>,
    relay: Arc<MessageRelay<Z>>,
    max_bytes: u64,
}

impl<S, Z> AnhangService<S, Z>
where
    S: StorageBackend,
    Z: Zustellung,
{
    /// Neuen AnhangService erstellen
    pub fn neu(storage: Arc<S>, relay: Arc<MessageRelay<Z>>, max_bytes: u64) -> Arc<Self> {
        Arc::new(Self {
            storage,
            relay,
            max_bytes,
        })
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Bild hochladen und als Nachricht zustellen
    ///
    /// Typ und Groesse werden vor jedem Schreibzugriff geprueft. Die
    /// erzeugte Nachricht geht denselben Weg wie eine Text-Nachricht und
    /// wird zusaetzlich an den Hochlader zurueckgegeben.
    pub async fn bild_hochladen(&self, upload: BildUpload) -> ChatResult<ChatNachricht> {
        let ersatzname = content_type_pruefen(upload.content_type.as_deref())?;

        let size = upload.daten.len() as u64;
        if size > self.max_bytes {
            return Err(ChatError::DateiZuGross {
                size,
                max: self.max_bytes,
            });
        }

        let basisname = dateiname_bereinigen(upload.dateiname.as_deref(), ersatzname);
        let gespeicherter_name = format!(
            "{}_{}",
            self.relay.zeitgeber().eindeutige_millis(),
            basisname
        );

        self.storage
            .store_new(&gespeicherter_name, &upload.daten)
            .await?;

        let nachricht = ChatNachricht::bild(
            nicht_leer(upload.sender),
            nicht_leer(upload.receiver),
            &gespeicherter_name,
            self.relay.zeitgeber().zeitstempel(),
        );
        let weg = self.relay.zustellen(&nachricht);

        tracing::info!(
            datei = %gespeicherter_name,
            size = size,
            erreicht = weg.erreicht(),
            "Bild hochgeladen"
        );

        Ok(nachricht)
    }

    /// Gespeichertes Bild anhand seines Dateinamens laden
    pub async fn bild_laden(&self, dateiname: &str) -> ChatResult<GespeichertesBild> {
        dateiname_pruefen(dateiname)?;
        let daten = self.storage.retrieve(dateiname).await?;

        Ok(GespeichertesBild {
            dateiname: dateiname.to_string(),
            content_type: content_type_aus_endung(dateiname),
            daten,
        })
    }
}

/// Prueft den deklarierten Content-Type und liefert den Ersatz-Dateinamen
fn content_type_pruefen(content_type: Option<&str>) -> ChatResult<&'static str> {
    let typ = content_type.map(str::trim);
    ERLAUBTE_TYPEN
        .iter()
        .find(|(erlaubt, _)| Some(*erlaubt) == typ)
        .map(|(_, ersatz)| *ersatz)
        .ok_or_else(|| ChatError::UngueltigerDateityp(content_type.map(str::to_string)))
}

/// Reduziert einen Client-Dateinamen auf einen sicheren Basisnamen
///
/// Nur die letzte Pfadkomponente bleibt, Zeichen ausserhalb von
/// `[A-Za-z0-9._-]` werden zu `_`. Ueberlange Namen werden auf
/// [`MAX_BASISNAME_BYTES`] gekuerzt, die Endung bleibt erhalten.
pub fn dateiname_bereinigen(original: Option<&str>, ersatz: &str) -> String {
    let letzte_komponente = original
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let bereinigt: String = letzte_komponente
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let gekuerzt = laenge_begrenzen(bereinigt);
    if gekuerzt.chars().all(|c| c == '.') {
        ersatz.to_string()
    } else {
        gekuerzt
    }
}

/// Kuerzt einen bereinigten (reinen ASCII-)Namen, Endung bleibt erhalten
fn laenge_begrenzen(name: String) -> String {
    if name.len() <= MAX_BASISNAME_BYTES {
        return name;
    }

    match name.rfind('.') {
        Some(punkt) if punkt > 0 && name.len() - punkt <= MAX_ENDUNG_BYTES => {
            let endung = &name[punkt..];
            format!("{}{}", &name[..MAX_BASISNAME_BYTES - endung.len()], endung)
        }
        _ => name[..MAX_BASISNAME_BYTES].to_string(),
    }
}

/// Content-Type fuer die Auslieferung anhand der Dateiendung
pub fn content_type_aus_endung(dateiname: &str) -> &'static str {
    let endung = Path::new(dateiname)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match endung.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn nicht_leer(wert: Option<String>) -> Option<String> {
    wert.map(|w| w.trim().to_string()).filter(|w| !w.is_empty())
}
