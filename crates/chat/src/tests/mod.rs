mod anhang_tests;
mod typen_tests;

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::{relay::Zustellung, types::ChatNachricht};

/// Zeichnet Zustellungen auf statt sie zu versenden
#[derive(Default)]
pub(crate) struct AufzeichnendeZustellung {
    pub verbunden: Mutex<HashSet<String>>,
    pub adressiert: Mutex<Vec<(String, ChatNachricht)>>,
    pub broadcasts: Mutex<Vec<ChatNachricht>>,
}

impl AufzeichnendeZustellung {
    pub fn mit_usern(users: &[&str]) -> Self {
        let z = Self::default();
        z.verbunden
            .lock()
            .extend(users.iter().map(|u| u.to_string()));
        z
    }
}

impl Zustellung for AufzeichnendeZustellung {
    fn an_user_zustellen(&self, user_id: &str, nachricht: &ChatNachricht) -> usize {
        if !self.verbunden.lock().contains(user_id) {
            return 0;
        }
        self.adressiert
            .lock()
            .push((user_id.to_string(), nachricht.clone()));
        1
    }

    fn an_alle_senden(&self, nachricht: &ChatNachricht) -> usize {
        self.broadcasts.lock().push(nachricht.clone());
        self.verbunden.lock().len()
    }
}
