//! JSON-Frames zwischen Client und Server
//!
//! Jeder WebSocket-Textframe traegt genau ein Objekt mit `type`-Tag.

use emporio_chat::ChatNachricht;
use serde::{Deserialize, Serialize};

/// Ziel fuer adressierte Nachrichten (private Queue des Users)
pub const USER_QUEUE: &str = "/user/queue/messages";

/// Ziel fuer Broadcasts an alle Abonnenten
pub const BROADCAST_TOPIC: &str = "/topic/public";

/// Frames vom Client an den Server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Chat-Nachricht zur Zustellung einreichen
    Send { message: ChatNachricht },
    Ping,
}

/// Frames vom Server an den Client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Zugestellte Nachricht mit ihrem Ziel
    Message {
        destination: String,
        message: ChatNachricht,
    },
    Pong,
    #[serde(rename = "error")]
    Fehler { message: String },
}

impl ServerFrame {
    pub fn adressiert(nachricht: ChatNachricht) -> Self {
        Self::Message {
            destination: USER_QUEUE.to_string(),
            message: nachricht,
        }
    }

    pub fn broadcast(nachricht: ChatNachricht) -> Self {
        Self::Message {
            destination: BROADCAST_TOPIC.to_string(),
            message: nachricht,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_frame_dekodieren() {
        let json = r#"{"type":"send","message":{"sender":"user1","receiver":"user2","content":"Hi","messageType":"TEXT"}}"#;
        match serde_json::from_str::<ClientFrame>(json).unwrap() {
            ClientFrame::Send { message } => {
                assert_eq!(message.receiver.as_deref(), Some("user2"));
                assert_eq!(message.content, "Hi");
            }
            anderes => panic!("Unerwarteter Frame: {anderes:?}"),
        }
    }

    #[test]
    fn ping_frame_dekodieren() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(frame, ClientFrame::Ping);
    }

    #[test]
    fn unbekannter_typ_ist_fehler() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn server_frames_kodieren() {
        let json = serde_json::to_value(ServerFrame::broadcast(ChatNachricht::text(
            None,
            None,
            "x",
        )))
        .unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["destination"], BROADCAST_TOPIC);
        assert_eq!(json["message"]["content"], "x");

        let json = serde_json::to_value(ServerFrame::Fehler {
            message: "kaputt".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "kaputt");

        let json = serde_json::to_value(ServerFrame::Pong).unwrap();
        assert_eq!(json["type"], "pong");
    }
}
