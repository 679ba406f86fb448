//! Borrowed host collaborators handed to every engine operation.

use lootward_core::host::{Messenger, NameResolver, PermissionCheck};
use lootward_core::world::World;

/// The host ports an operation may touch. Borrowed for the duration of one
/// call; the engine never retains them.
pub struct HostContext<'a> {
    /// Objects, markers and tags.
    pub world: &'a mut dyn World,
    /// Chat delivery.
    pub messenger: &'a dyn Messenger,
    /// Identity-to-name lookup.
    pub names: &'a dyn NameResolver,
    /// Override permission lookup.
    pub permissions: &'a dyn PermissionCheck,
}
