//! Fehlertypen fuer das Chat-Crate

use thiserror::Error;

/// Chat-Fehlertypen
#[derive(Debug, Error)]
pub enum ChatError {
    /// Content-Type fehlt oder ist weder `image/jpeg` noch `image/png`
    #[error(
        "Ungueltiger Dateityp: {}. Nur JPEG und PNG sind erlaubt",
        .0.as_deref().unwrap_or("<kein Content-Type>")
    )]
    UngueltigerDateityp(Option<String>),

    #[error("Datei zu gross: {size} Bytes (Maximum: {max} Bytes)")]
    DateiZuGross { size: u64, max: u64 },

    #[error("Datei nicht gefunden: {0}")]
    NichtGefunden(String),

    /// Dateiname zeigt aus dem Upload-Verzeichnis heraus
    #[error("Zugriff ausserhalb des Upload-Verzeichnisses verweigert: {0}")]
    Pfadtraversal(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
