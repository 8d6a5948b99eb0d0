//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};
use emporio_api::{ApiKonfig, ApiServerKonfig};
use emporio_chat::anhang::STANDARD_MAX_BYTES;
use emporio_observability::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Ablage der Bild-Anhaenge
    pub upload: UploadEinstellungen,
    /// WebSocket-Sessions
    pub websocket: WebSocketEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den HTTP-Server
    pub bind_adresse: String,
    /// Port fuer HTTP und WebSocket
    pub http_port: u16,
    /// CORS-Origins (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            http_port: 8080,
            cors_origins: vec![],
        }
    }
}

/// Upload-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadEinstellungen {
    /// Verzeichnis fuer gespeicherte Bilder
    pub verzeichnis: PathBuf,
    /// Maximale Dateigroesse in Bytes
    pub max_bytes: u64,
}

impl Default for UploadEinstellungen {
    fn default() -> Self {
        Self {
            verzeichnis: PathBuf::from("uploads"),
            max_bytes: STANDARD_MAX_BYTES,
        }
    }
}

/// WebSocket-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketEinstellungen {
    /// Groesse der Send-Queue pro Session
    pub queue_groesse: usize,
}

impl Default for WebSocketEinstellungen {
    fn default() -> Self {
        Self { queue_groesse: 64 }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .with_context(|| format!("Konfigurationsfehler in '{pfad}'"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Logging ist hier noch nicht initialisiert
                eprintln!("Konfigurationsdatei '{pfad}' nicht gefunden, verwende Standardwerte");
                Self::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Konfigurationsdatei '{pfad}' nicht lesbar"))
            }
        };

        config.pruefen()?;
        Ok(config)
    }

    /// Prueft Werte, die TOML allein nicht ausschliesst
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            bail!("Ungueltiger Log-Level: '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            bail!("Ungueltiges Log-Format: '{}'", self.logging.format);
        }
        if self.upload.max_bytes == 0 {
            bail!("upload.max_bytes muss groesser als 0 sein");
        }
        if self.upload.verzeichnis.as_os_str().is_empty() {
            bail!("upload.verzeichnis darf nicht leer sein");
        }
        if self.websocket.queue_groesse == 0 {
            bail!("websocket.queue_groesse muss groesser als 0 sein");
        }
        self.http_socket_adresse()?;
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer HTTP zurueck
    pub fn http_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.http_port)
    }

    /// Bind-Adresse als [`SocketAddr`]
    pub fn http_socket_adresse(&self) -> anyhow::Result<SocketAddr> {
        let adresse = self.http_bind_adresse();
        adresse
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{adresse}'"))
    }

    /// Einstellungen fuer den Aufbau des API-States
    pub fn api_konfig(&self) -> ApiKonfig {
        ApiKonfig {
            upload_verzeichnis: self.upload.verzeichnis.clone(),
            max_upload_bytes: self.upload.max_bytes,
            queue_groesse: self.websocket.queue_groesse,
        }
    }

    /// Einstellungen fuer den HTTP-Server
    pub fn api_server_konfig(&self) -> anyhow::Result<ApiServerKonfig> {
        Ok(ApiServerKonfig {
            bind_addr: self.http_socket_adresse()?,
            cors_origins: self.netzwerk.cors_origins.clone(),
        })
    }
}
