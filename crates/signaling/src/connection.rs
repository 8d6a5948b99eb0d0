//! WebSocket-Session – Verwaltet eine einzelne Client-Verbindung
//!
//! Jede Verbindung laeuft in einem eigenen tokio-Task. Die Schleife
//! verbindet zwei Richtungen:
//!
//! ```text
//! Socket  --ClientFrame-->  frame_verarbeiten  --> MessageRelay
//! Socket  <--ServerFrame--  Send-Queue         <-- EventBroadcaster
//! ```
//!
//! Beim Schliessen wird die Session aus dem Broadcaster entfernt.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use emporio_chat::{MessageRelay, Zustellung};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};

use crate::broadcast::EventBroadcaster;
use crate::error::{SignalingError, SignalingResult};
use crate::frames::{ClientFrame, ServerFrame};

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct WsSitzung<Z: Zustellung> {
    relay: Arc<MessageRelay<Z>>,
    broadcaster: EventBroadcaster,
    user_id: Option<String>,
}

impl<Z: Zustellung> WsSitzung<Z> {
    /// Erstellt eine neue Session; ohne `user_id` empfaengt sie nur Broadcasts
    pub fn neu(
        relay: Arc<MessageRelay<Z>>,
        broadcaster: EventBroadcaster,
        user_id: Option<String>,
    ) -> Self {
        Self {
            relay,
            broadcaster,
            user_id,
        }
    }

    /// Startet die Verarbeitungsschleife bis der Client trennt
    pub async fn verarbeiten(self, socket: WebSocket) {
        let (session_id, mut queue) = self.broadcaster.session_registrieren(self.user_id.clone());
        let (mut sink, mut stream) = socket.split();

        tracing::info!(session = %session_id, user_id = ?self.user_id, "WebSocket-Session geoeffnet");

        let ergebnis: SignalingResult<()> = async {
            loop {
                tokio::select! {
                    // Zustellungen aus dem Broadcaster
                    ausgehend = queue.recv() => {
                        match ausgehend {
                            Some(frame) => frame_senden(&mut sink, &frame).await?,
                            None => return Err(SignalingError::VerbindungGetrennt),
                        }
                    }
                    // Eingehende Frames vom Client
                    eingehend = stream.next() => {
                        match eingehend {
                            Some(Ok(Message::Text(text))) => {
                                if let Some(antwort) = self.frame_verarbeiten(&text) {
                                    frame_senden(&mut sink, &antwort).await?;
                                }
                            }
                            Some(Ok(Message::Binary(_))) => {
                                let antwort = ServerFrame::Fehler {
                                    message: "Binaerframes werden nicht unterstuetzt".into(),
                                };
                                frame_senden(&mut sink, &antwort).await?;
                            }
                            Some(Ok(Message::Close(_))) | None => return Ok(()),
                            // Ping/Pong beantwortet axum selbst
                            Some(Ok(_)) => {}
                            Some(Err(e)) => return Err(e.into()),
                        }
                    }
                }
            }
        }
        .await;

        self.broadcaster.session_entfernen(&session_id);

        match ergebnis {
            Ok(()) => {
                tracing::info!(session = %session_id, "WebSocket-Session vom Client geschlossen");
            }
            Err(e) => {
                tracing::warn!(session = %session_id, fehler = %e, "WebSocket-Session beendet");
            }
        }
    }

    /// Verarbeitet einen Textframe und liefert ggf. eine direkte Antwort
    ///
    /// Eingereichte Nachrichten werden nicht quittiert; nur Ping und
    /// unlesbare Frames erzeugen eine Antwort.
    pub fn frame_verarbeiten(&self, text: &str) -> Option<ServerFrame> {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                let fehler = SignalingError::from(e);
                tracing::debug!(fehler = %fehler, "Ungueltiger Client-Frame");
                return Some(ServerFrame::Fehler {
                    message: fehler.to_string(),
                });
            }
        };

        match frame {
            ClientFrame::Send { mut message } => {
                // Fehlender Absender wird aus der Session ergaenzt
                if message.sender.as_deref().map_or(true, |s| s.trim().is_empty()) {
                    message.sender = self.user_id.clone();
                }
                let (_, weg) = self.relay.einreichen(message);
                tracing::debug!(user_id = ?self.user_id, weg = ?weg, "Nachricht weitergeleitet");
                None
            }
            ClientFrame::Ping => Some(ServerFrame::Pong),
        }
    }
}

/// Serialisiert einen Frame und schreibt ihn auf den Socket
async fn frame_senden(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> SignalingResult<()> {
    let text = serde_json::to_string(frame)?;
    sink.send(Message::Text(text)).await?;
    Ok(())
}
