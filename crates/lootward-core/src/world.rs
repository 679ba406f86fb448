//! Spawnable-object ports: tracked objects, decorative markers and the
//! per-object tag store.
//!
//! Handles are opaque and may go stale at any time for reasons outside the
//! engine's control (picked up, despawned, world unloaded). Every access
//! re-checks liveness through the port instead of trusting a cached flag.

use std::fmt;

use crate::error::DomainError;
use crate::location::Location;

/// Handle to a spawned, claimable object in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u64);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Handle to a decorative text marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

impl fmt::Display for MarkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// A payload item handed over by a trigger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Host-specific item kind.
    pub kind: String,
    /// Stack size.
    pub quantity: u32,
}

impl ItemStack {
    /// Creates a stack of `quantity` items of `kind`.
    #[must_use]
    pub fn new(kind: impl Into<String>, quantity: u32) -> Self {
        Self {
            kind: kind.into(),
            quantity,
        }
    }

    /// An empty stack carries nothing and is never spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

/// Rendering flags for a marker. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Whether the marker's body is drawn.
    pub body_visible: bool,
    /// Whether the label is drawn.
    pub label_visible: bool,
    /// Whether the marker is affected by physics.
    pub physical: bool,
    /// Whether the marker can be damaged.
    pub invulnerable: bool,
    /// Whether players can interact with it.
    pub interactive: bool,
}

impl MarkerStyle {
    /// A floating label: invisible, non-physical, invulnerable body.
    pub const LABEL_ONLY: Self = Self {
        body_visible: false,
        label_visible: true,
        physical: false,
        invulnerable: true,
        interactive: false,
    };
}

/// Opaque string storage attached to a spawned object.
///
/// Absent by default and assumed to survive as long as the object exists.
/// Writes to an object that is gone are silently ignored.
pub trait TagStore {
    /// Reads the protection tag on `object`, if any.
    fn tag(&self, object: ObjectHandle) -> Option<String>;

    /// Writes the protection tag on `object`.
    fn set_tag(&mut self, object: ObjectHandle, value: &str);

    /// Clears the protection tag on `object`.
    fn remove_tag(&mut self, object: ObjectHandle);
}

/// Factory and liveness oracle for tracked objects and markers.
pub trait World: TagStore + Send {
    /// Whether the named world or region is currently available.
    fn is_world_loaded(&self, world: &str) -> bool;

    /// Spawns `item` as a tracked object at `location`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingWorld` if the location's world is not
    /// available.
    fn spawn_object(
        &mut self,
        location: &Location,
        item: &ItemStack,
    ) -> Result<ObjectHandle, DomainError>;

    /// Whether `object` still exists in the world.
    fn is_object_live(&self, object: ObjectHandle) -> bool;

    /// Current position of `object`, or `None` if it is gone.
    fn object_location(&self, object: ObjectHandle) -> Option<Location>;

    /// Spawns a text marker at `location`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingWorld` if the location's world is not
    /// available.
    fn spawn_marker(
        &mut self,
        location: &Location,
        text: &str,
        style: MarkerStyle,
    ) -> Result<MarkerHandle, DomainError>;

    /// Whether `marker` still exists.
    fn is_marker_live(&self, marker: MarkerHandle) -> bool;

    /// Replaces the marker's text and, when `location` is given, moves it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StaleHandle` if the marker no longer exists.
    fn update_marker(
        &mut self,
        marker: MarkerHandle,
        location: Option<&Location>,
        text: &str,
    ) -> Result<(), DomainError>;

    /// Destroys `marker`. A no-op if it is already gone.
    fn remove_marker(&mut self, marker: MarkerHandle);
}
