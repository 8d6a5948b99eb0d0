//! Event-Broadcaster – Sendet Frames an verbundene WebSocket-Sessions
//!
//! Der EventBroadcaster verwaltet die Send-Queues aller Sessions und
//! ordnet sie User-IDs zu. Ein User kann mehrere Sessions gleichzeitig
//! halten (z.B. Handy und Browser), anonyme Sessions empfangen nur
//! Broadcasts.
//!
//! ## Zustellung
//! - An einen User (alle seine Sessions): `an_user_senden`
//! - An alle Sessions: `frame_an_alle_senden`

use dashmap::DashMap;
use emporio_chat::{ChatNachricht, Zustellung};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::frames::ServerFrame;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Standard-Groesse der Send-Queue pro Session
pub const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Eindeutige ID einer WebSocket-Session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer verbundenen Session
#[derive(Clone, Debug)]
pub struct SessionSender {
    pub session_id: SessionId,
    pub user_id: Option<String>,
    pub tx: mpsc::Sender<ServerFrame>,
}

impl SessionSender {
    /// Sendet einen Frame nicht-blockierend an die Session
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, frame: ServerFrame) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(session = %self.session_id, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(session = %self.session_id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Broadcaster fuer alle verbundenen Sessions
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    /// Session-Sender, indiziert nach SessionId
    sessions: DashMap<SessionId, SessionSender>,
    /// User-Zuordnung: user_id -> Sessions dieses Users
    user_sessions: DashMap<String, Vec<SessionId>>,
    queue_groesse: usize,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster mit Standard-Queue-Groesse
    pub fn neu() -> Self {
        Self::mit_queue_groesse(SEND_QUEUE_GROESSE)
    }

    pub fn mit_queue_groesse(queue_groesse: usize) -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                sessions: DashMap::new(),
                user_sessions: DashMap::new(),
                queue_groesse: queue_groesse.max(1),
            }),
        }
    }

    /// Registriert eine neue Session und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die WebSocket-Session liest aus dieser Queue und schreibt auf den Socket.
    pub fn session_registrieren(
        &self,
        user_id: Option<String>,
    ) -> (SessionId, mpsc::Receiver<ServerFrame>) {
        let (tx, rx) = mpsc::channel(self.inner.queue_groesse);
        let session_id = SessionId::new();

        if let Some(uid) = &user_id {
            self.inner
                .user_sessions
                .entry(uid.clone())
                .or_default()
                .push(session_id);
        }
        self.inner.sessions.insert(
            session_id,
            SessionSender {
                session_id,
                user_id: user_id.clone(),
                tx,
            },
        );

        tracing::debug!(session = %session_id, user_id = ?user_id, "Session im Broadcaster registriert");
        (session_id, rx)
    }

    /// Entfernt eine Session aus dem Broadcaster
    pub fn session_entfernen(&self, session_id: &SessionId) {
        let Some((_, sender)) = self.inner.sessions.remove(session_id) else {
            return;
        };

        if let Some(uid) = &sender.user_id {
            if let Some(mut sessions) = self.inner.user_sessions.get_mut(uid) {
                sessions.retain(|sid| sid != session_id);
            }
            // Leere User-Eintraege aufraeumen
            self.inner
                .user_sessions
                .remove_if(uid, |_, sessions| sessions.is_empty());
        }
        tracing::debug!(session = %session_id, "Session aus Broadcaster entfernt");
    }

    /// Sendet einen Frame an alle Sessions eines Users
    ///
    /// Gibt die Anzahl der Sessions zurueck, die den Frame eingereiht haben.
    pub fn an_user_senden(&self, user_id: &str, frame: ServerFrame) -> usize {
        let session_ids = match self.inner.user_sessions.get(user_id) {
            Some(ids) => ids.clone(),
            None => {
                tracing::debug!(user_id = %user_id, "Senden an nicht verbundenen User");
                return 0;
            }
        };

        let mut gesendet = 0;
        for session_id in &session_ids {
            if let Some(sender) = self.inner.sessions.get(session_id) {
                if sender.senden(frame.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    /// Sendet einen Frame an alle verbundenen Sessions
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn frame_an_alle_senden(&self, frame: ServerFrame) -> usize {
        let mut gesendet = 0;
        self.inner.sessions.iter().for_each(|entry| {
            if entry.value().senden(frame.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Gibt die Anzahl der registrierten Sessions zurueck
    pub fn session_anzahl(&self) -> usize {
        self.inner.sessions.len()
    }

    /// Prueft ob ein User mindestens eine Session hat
    pub fn ist_verbunden(&self, user_id: &str) -> bool {
        self.inner
            .user_sessions
            .get(user_id)
            .is_some_and(|sessions| !sessions.is_empty())
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

impl Zustellung for EventBroadcaster {
    fn an_user_zustellen(&self, user_id: &str, nachricht: &ChatNachricht) -> usize {
        self.an_user_senden(user_id, ServerFrame::adressiert(nachricht.clone()))
    }

    fn an_alle_senden(&self, nachricht: &ChatNachricht) -> usize {
        self.frame_an_alle_senden(ServerFrame::broadcast(nachricht.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
