//! Storage-Backend fuer Bild-Anhaenge
//!
//! Das `StorageBackend`-Trait abstrahiert den konkreten Speicher. Namen sind
//! immer einzelne Dateinamen, nie Pfade: alles liegt flach in einem
//! Verzeichnis.

use std::path::{Component, Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{ChatError, ChatResult};

/// Abstraktes Speicher-Backend fuer Anhaenge
#[allow(async_fn_in_trait)]
pub trait StorageBackend: Send + Sync {
    /// Datei neu anlegen; existiert der Name bereits, schlaegt der Aufruf fehl
    async fn store_new(&self, name: &str, data: &[u8]) -> ChatResult<()>;

    /// Datei laden
    async fn retrieve(&self, name: &str) -> ChatResult<Vec<u8>>;
}

/// Disk-basiertes Storage-Backend
///
/// Speichert Dateien unter `base_dir/<name>`.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    base_dir: PathBuf,
}

impl DiskStorage {
    /// Neues DiskStorage mit dem angegebenen Basisverzeichnis erstellen
    ///
    /// Das Verzeichnis wird erst beim ersten Speichern angelegt.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Basisverzeichnis anlegen falls noetig
    ///
    /// Ein paralleler Upload, der das Verzeichnis gerade selbst anlegt, ist
    /// kein Fehler.
    pub async fn verzeichnis_sicherstellen(&self) -> ChatResult<()> {
        match tokio::fs::create_dir_all(&self.base_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && self.base_dir.is_dir() => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Vollstaendigen Pfad fuer einen einzelnen Dateinamen berechnen
    fn full_path(&self, name: &str) -> ChatResult<PathBuf> {
        dateiname_pruefen(name)?;
        Ok(self.base_dir.join(name))
    }

    /// Loest einen Namen zu einem existierenden Pfad innerhalb von `base_dir` auf
    ///
    /// Symlinks werden aufgeloest; zeigt das Ziel aus dem Verzeichnis heraus,
    /// wird der Zugriff verweigert.
    async fn existierenden_pfad_aufloesen(&self, name: &str) -> ChatResult<PathBuf> {
        let full = self.full_path(name)?;

        let wurzel = tokio::fs::canonicalize(&self.base_dir)
            .await
            .map_err(|e| nicht_gefunden_oder_io(e, name))?;
        let ziel = tokio::fs::canonicalize(&full)
            .await
            .map_err(|e| nicht_gefunden_oder_io(e, name))?;

        if !ziel.starts_with(&wurzel) {
            tracing::warn!(
                name = %name,
                ziel = %ziel.display(),
                "Anhang zeigt aus dem Upload-Verzeichnis heraus"
            );
            return Err(ChatError::Pfadtraversal(name.to_string()));
        }

        Ok(ziel)
    }
}

impl StorageBackend for DiskStorage {
    async fn store_new(&self, name: &str, data: &[u8]) -> ChatResult<()> {
        let full = self.full_path(name)?;
        self.verzeichnis_sicherstellen().await?;

        let mut datei = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await?;

        let geschrieben = async {
            datei.write_all(data).await?;
            datei.flush().await
        }
        .await;

        if let Err(e) = geschrieben {
            // Halb geschriebene Datei darf nicht abrufbar bleiben
            drop(datei);
            if let Err(aufraeumen) = tokio::fs::remove_file(&full).await {
                tracing::warn!(
                    path = %full.display(),
                    fehler = %aufraeumen,
                    "Unvollstaendige Datei konnte nicht entfernt werden"
                );
            }
            return Err(e.into());
        }

        tracing::debug!(path = %full.display(), bytes = data.len(), "Datei gespeichert");
        Ok(())
    }

    async fn retrieve(&self, name: &str) -> ChatResult<Vec<u8>> {
        let full = self.existierenden_pfad_aufloesen(name).await?;

        let metadaten = tokio::fs::metadata(&full)
            .await
            .map_err(|e| nicht_gefunden_oder_io(e, name))?;
        if !metadaten.is_file() {
            return Err(ChatError::NichtGefunden(name.to_string()));
        }

        let data = tokio::fs::read(&full)
            .await
            .map_err(|e| nicht_gefunden_oder_io(e, name))?;
        tracing::debug!(path = %full.display(), bytes = data.len(), "Datei gelesen");
        Ok(data)
    }
}

/// Prueft, dass `name` genau eine normale Pfadkomponente ist
pub fn dateiname_pruefen(name: &str) -> ChatResult<()> {
    let verboten = name.is_empty()
        || name.contains(['/', '\\', '\0'])
        || name == "."
        || name == "..";
    if verboten {
        return Err(ChatError::Pfadtraversal(name.to_string()));
    }

    let mut komponenten = Path::new(name).components();
    match (komponenten.next(), komponenten.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ChatError::Pfadtraversal(name.to_string())),
    }
}

/// Nicht vorhanden oder nicht lesbar zaehlt als "nicht gefunden"
fn nicht_gefunden_oder_io(e: std::io::Error, name: &str) -> ChatError {
    match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            ChatError::NichtGefunden(name.to_string())
        }
        _ => ChatError::Io(e),
    }
}
