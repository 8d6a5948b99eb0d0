//! emporio-server – Bibliotheks-Root
//!
//! Verdrahtet Konfiguration, Metriken, Relay, Anhang-Service und den
//! HTTP-Server und stellt den Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use std::future::Future;

use anyhow::Result;
use config::ServerConfig;
use emporio_api::{ApiServer, AppState};
use emporio_chat::DiskStorage;
use emporio_observability::EmporioMetrics;
use tokio::net::TcpListener;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Server und laeuft bis zum Shutdown-Signal (Ctrl-C)
    pub async fn starten(self) -> Result<()> {
        let adresse = self.config.http_socket_adresse()?;
        let listener = TcpListener::bind(adresse).await?;
        self.bedienen(listener, shutdown_signal()).await
    }

    /// Bedient Anfragen auf `listener` bis `shutdown` fertig ist
    ///
    /// Reihenfolge:
    /// 1. Upload-Verzeichnis anlegen
    /// 2. Metriken, Broadcaster, Relay und Anhang-Service aufbauen
    /// 3. HTTP-Server (inkl. WebSocket) starten
    pub async fn bedienen<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            adresse = %self.config.http_bind_adresse(),
            upload_verzeichnis = %self.config.upload.verzeichnis.display(),
            max_upload_bytes = self.config.upload.max_bytes,
            "Server startet"
        );

        DiskStorage::new(self.config.upload.verzeichnis.clone())
            .verzeichnis_sicherstellen()
            .await?;

        let metriken = EmporioMetrics::neu()?;
        let state = AppState::neu(&self.config.api_konfig(), metriken);

        ApiServer::neu(self.config.api_server_konfig()?)
            .bedienen(listener, state, shutdown)
            .await
    }
}

/// Wartet auf Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
        Err(e) => tracing::error!(fehler = %e, "Shutdown-Signal konnte nicht abgewartet werden"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn server_beantwortet_health_und_beendet_sich() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.upload.verzeichnis = dir.path().join("uploads");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let adresse = listener.local_addr().unwrap();
        let (stopp_tx, stopp_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(Server::neu(config).bedienen(listener, async move {
            let _ = stopp_rx.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(adresse).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut antwort = String::new();
        stream.read_to_string(&mut antwort).await.unwrap();

        assert!(antwort.starts_with("HTTP/1.1 200"), "{antwort}");
        assert!(antwort.contains("\"status\":\"healthy\""));
        assert!(dir.path().join("uploads").is_dir());

        stopp_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
