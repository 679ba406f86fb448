//! Host collaborator ports: identity lookup, messaging and permissions.

use uuid::Uuid;

/// Resolves an identity to a display name.
pub trait NameResolver: Send + Sync {
    /// Name of the identity if it is currently online.
    fn online_name(&self, id: Uuid) -> Option<String>;

    /// Last known name from historical/offline records.
    fn offline_name(&self, id: Uuid) -> Option<String>;
}

/// Placeholder used when neither lookup knows the identity.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Resolves `id` online first, then offline, then falls back to
/// [`UNKNOWN_NAME`].
#[must_use]
pub fn display_name(names: &dyn NameResolver, id: Uuid) -> String {
    names
        .online_name(id)
        .or_else(|| names.offline_name(id))
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned())
}

/// Delivers an already-rendered message to an identity.
pub trait Messenger: Send + Sync {
    /// Sends `message` to `recipient`.
    fn send(&self, recipient: Uuid, message: &str);
}

/// Permission node that lets a claimant take protected objects regardless
/// of owner.
pub const OVERRIDE_PERMISSION: &str = "lootprotect.bypass";

/// Permission checks consulted by the claim path.
pub trait PermissionCheck: Send + Sync {
    /// Whether `player` holds the permission `node`.
    fn has_permission(&self, player: Uuid, node: &str) -> bool;

    /// Whether `claimant` holds [`OVERRIDE_PERMISSION`].
    fn has_override_permission(&self, claimant: Uuid) -> bool {
        self.has_permission(claimant, OVERRIDE_PERMISSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names {
        online: Option<&'static str>,
        offline: Option<&'static str>,
    }

    impl NameResolver for Names {
        fn online_name(&self, _id: Uuid) -> Option<String> {
            self.online.map(str::to_owned)
        }

        fn offline_name(&self, _id: Uuid) -> Option<String> {
            self.offline.map(str::to_owned)
        }
    }

    #[test]
    fn test_display_name_prefers_online_lookup() {
        let names = Names {
            online: Some("Steve"),
            offline: Some("OldSteve"),
        };

        assert_eq!(display_name(&names, Uuid::new_v4()), "Steve");
    }

    #[test]
    fn test_display_name_falls_back_to_offline_lookup() {
        let names = Names {
            online: None,
            offline: Some("OldSteve"),
        };

        assert_eq!(display_name(&names, Uuid::new_v4()), "OldSteve");
    }

    #[test]
    fn test_display_name_falls_back_to_placeholder() {
        let names = Names {
            online: None,
            offline: None,
        };

        assert_eq!(display_name(&names, Uuid::new_v4()), UNKNOWN_NAME);
    }

    struct Granted(&'static str);

    impl PermissionCheck for Granted {
        fn has_permission(&self, _player: Uuid, node: &str) -> bool {
            node == self.0
        }
    }

    #[test]
    fn test_override_permission_checks_bypass_node() {
        let player = Uuid::new_v4();

        assert!(Granted(OVERRIDE_PERMISSION).has_override_permission(player));
        assert!(!Granted("lootprotect.admin").has_override_permission(player));
    }
}
