//! Test world: an in-memory `World` with hooks for simulating external
//! changes (pickups, despawns, unloaded worlds, destroyed markers).

use std::collections::{HashMap, HashSet};

use lootward_core::error::DomainError;
use lootward_core::location::Location;
use lootward_core::world::{ItemStack, MarkerHandle, MarkerStyle, ObjectHandle, TagStore, World};

/// A spawned object as the fake world sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeObject {
    pub location: Location,
    pub item: ItemStack,
    pub tag: Option<String>,
}

/// A spawned marker as the fake world sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeMarker {
    pub location: Location,
    pub text: String,
    pub style: MarkerStyle,
}

/// In-memory world. Every world name is loaded unless explicitly unloaded.
/// Removed objects and markers are forgotten, so their handles go stale.
#[derive(Debug, Default)]
pub struct FakeWorld {
    next_handle: u64,
    unloaded: HashSet<String>,
    rejected_kinds: HashSet<String>,
    objects: HashMap<ObjectHandle, FakeObject>,
    markers: HashMap<MarkerHandle, FakeMarker>,
}

impl FakeWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Makes `world` unavailable until `load_world` is called.
    pub fn unload_world(&mut self, world: &str) {
        self.unloaded.insert(world.to_owned());
    }

    pub fn load_world(&mut self, world: &str) {
        self.unloaded.remove(world);
    }

    /// Makes every later spawn of an item of `kind` fail.
    pub fn fail_spawns_of(&mut self, kind: &str) {
        self.rejected_kinds.insert(kind.to_owned());
    }

    /// Removes `object` as if it had been picked up or despawned.
    pub fn despawn_object(&mut self, object: ObjectHandle) {
        self.objects.remove(&object);
    }

    /// Moves `object`, as physics would.
    pub fn move_object(&mut self, object: ObjectHandle, to: Location) {
        if let Some(entry) = self.objects.get_mut(&object) {
            entry.location = to;
        }
    }

    /// Destroys `marker` from outside the engine.
    pub fn destroy_marker(&mut self, marker: MarkerHandle) {
        self.markers.remove(&marker);
    }

    #[must_use]
    pub fn object(&self, object: ObjectHandle) -> Option<&FakeObject> {
        self.objects.get(&object)
    }

    #[must_use]
    pub fn marker(&self, marker: MarkerHandle) -> Option<&FakeMarker> {
        self.markers.get(&marker)
    }

    /// Number of objects currently in the world.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of markers currently in the world.
    #[must_use]
    pub fn live_marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Handles of every marker currently in the world.
    #[must_use]
    pub fn live_markers(&self) -> Vec<MarkerHandle> {
        let mut handles: Vec<_> = self.markers.keys().copied().collect();
        handles.sort();
        handles
    }

    /// Injects a raw tag, e.g. a corrupt one.
    pub fn force_tag(&mut self, object: ObjectHandle, raw: &str) {
        self.set_tag(object, raw);
    }

    fn require_loaded(&self, location: &Location) -> Result<(), DomainError> {
        if self.unloaded.contains(&location.world) {
            return Err(DomainError::MissingWorld(location.world.clone()));
        }
        Ok(())
    }
}

impl TagStore for FakeWorld {
    fn tag(&self, object: ObjectHandle) -> Option<String> {
        self.objects.get(&object).and_then(|entry| entry.tag.clone())
    }

    fn set_tag(&mut self, object: ObjectHandle, value: &str) {
        if let Some(entry) = self.objects.get_mut(&object) {
            entry.tag = Some(value.to_owned());
        }
    }

    fn remove_tag(&mut self, object: ObjectHandle) {
        if let Some(entry) = self.objects.get_mut(&object) {
            entry.tag = None;
        }
    }
}

impl World for FakeWorld {
    fn is_world_loaded(&self, world: &str) -> bool {
        !self.unloaded.contains(world)
    }

    fn spawn_object(
        &mut self,
        location: &Location,
        item: &ItemStack,
    ) -> Result<ObjectHandle, DomainError> {
        self.require_loaded(location)?;
        if self.rejected_kinds.contains(&item.kind) {
            return Err(DomainError::SpawnRejected(item.kind.clone()));
        }
        let handle = ObjectHandle(self.next_handle());
        self.objects.insert(
            handle,
            FakeObject {
                location: location.clone(),
                item: item.clone(),
                tag: None,
            },
        );
        Ok(handle)
    }

    fn is_object_live(&self, object: ObjectHandle) -> bool {
        self.objects.contains_key(&object)
    }

    fn object_location(&self, object: ObjectHandle) -> Option<Location> {
        self.objects.get(&object).map(|entry| entry.location.clone())
    }

    fn spawn_marker(
        &mut self,
        location: &Location,
        text: &str,
        style: MarkerStyle,
    ) -> Result<MarkerHandle, DomainError> {
        self.require_loaded(location)?;
        let handle = MarkerHandle(self.next_handle());
        self.markers.insert(
            handle,
            FakeMarker {
                location: location.clone(),
                text: text.to_owned(),
                style,
            },
        );
        Ok(handle)
    }

    fn is_marker_live(&self, marker: MarkerHandle) -> bool {
        self.markers.contains_key(&marker)
    }

    fn update_marker(
        &mut self,
        marker: MarkerHandle,
        location: Option<&Location>,
        text: &str,
    ) -> Result<(), DomainError> {
        let entry = self
            .markers
            .get_mut(&marker)
            .ok_or_else(|| DomainError::StaleHandle(marker.to_string()))?;
        if let Some(location) = location {
            entry.location = location.clone();
        }
        text.clone_into(&mut entry.text);
        Ok(())
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.remove(&marker);
    }
}
