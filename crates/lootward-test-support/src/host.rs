//! Test collaborators: name lookup, messaging and permissions.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use lootward_core::host::{Messenger, NameResolver, OVERRIDE_PERMISSION, PermissionCheck};
use uuid::Uuid;

/// A messenger that records every message it is asked to deliver.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingMessenger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered to `recipient`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn messages_to(&self, recipient: Uuid) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == recipient)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Every delivered message with its recipient.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn all(&self) -> Vec<(Uuid, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Messenger for RecordingMessenger {
    fn send(&self, recipient: Uuid, message: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((recipient, message.to_owned()));
    }
}

/// A name resolver backed by fixed online and offline tables.
#[derive(Debug, Clone, Default)]
pub struct StaticNames {
    online: HashMap<Uuid, String>,
    offline: HashMap<Uuid, String>,
}

impl StaticNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as the online name of `id`.
    #[must_use]
    pub fn online(mut self, id: Uuid, name: &str) -> Self {
        self.online.insert(id, name.to_owned());
        self
    }

    /// Registers `name` as the historical name of `id`.
    #[must_use]
    pub fn offline(mut self, id: Uuid, name: &str) -> Self {
        self.offline.insert(id, name.to_owned());
        self
    }
}

impl NameResolver for StaticNames {
    fn online_name(&self, id: Uuid) -> Option<String> {
        self.online.get(&id).cloned()
    }

    fn offline_name(&self, id: Uuid) -> Option<String> {
        self.offline.get(&id).cloned()
    }
}

/// A permission check granting the override permission to a fixed set.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    granted: HashSet<(Uuid, String)>,
}

impl StaticPermissions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants the permission `node` to `id`.
    #[must_use]
    pub fn with_permission(mut self, id: Uuid, node: &str) -> Self {
        self.granted.insert((id, node.to_owned()));
        self
    }

    /// Grants the override permission to `id`.
    #[must_use]
    pub fn with_override(self, id: Uuid) -> Self {
        self.with_permission(id, OVERRIDE_PERMISSION)
    }
}

impl PermissionCheck for StaticPermissions {
    fn has_permission(&self, player: Uuid, node: &str) -> bool {
        self.granted.contains(&(player, node.to_owned()))
    }
}
