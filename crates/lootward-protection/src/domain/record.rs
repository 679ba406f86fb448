//! The protection record: owner, subject, location, deadline, and the
//! objects and markers spawned on its behalf.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lootward_core::location::{Location, SpatialKey};
use lootward_core::world::{ItemStack, MarkerHandle, ObjectHandle, World};
use uuid::Uuid;

use super::tag::{ProtectionTag, seconds_until};

/// Bookkeeping for one protected drop.
///
/// Markers and tracked objects are volatile host handles. The
/// `object_markers` side-table is a back-reference pruned on every render
/// pass; neither side owns the other.
#[derive(Debug)]
pub struct ProtectionRecord {
    owner_id: Uuid,
    subject_id: Uuid,
    location: Location,
    expires_at: DateTime<Utc>,
    pub(crate) main_marker: Option<MarkerHandle>,
    pub(crate) object_markers: HashMap<ObjectHandle, MarkerHandle>,
    items: Vec<ItemStack>,
    pub(crate) tracked_objects: Vec<ObjectHandle>,
}

impl ProtectionRecord {
    /// Creates a record holding `items` until they are spawned.
    #[must_use]
    pub fn new(
        owner_id: Uuid,
        subject_id: Uuid,
        location: Location,
        expires_at: DateTime<Utc>,
        items: Vec<ItemStack>,
    ) -> Self {
        // The tag stores millis; keep the record's deadline identical.
        let expires_at = ProtectionTag::new(owner_id, expires_at, subject_id).expires_at;
        Self {
            owner_id,
            subject_id,
            location,
            expires_at,
            main_marker: None,
            object_markers: HashMap::new(),
            items,
            tracked_objects: Vec::new(),
        }
    }

    /// The claimant allowed to collect before the deadline.
    #[must_use]
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// The identity this protection was created on behalf of.
    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    /// Where the trigger happened.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Index key for the one-protection-per-location invariant.
    #[must_use]
    pub fn spatial_key(&self) -> SpatialKey {
        self.location.spatial_key()
    }

    /// Absolute deadline.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whole seconds until the deadline, never negative.
    #[must_use]
    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        seconds_until(self.expires_at, now)
    }

    /// The tag written onto every object this record spawns.
    #[must_use]
    pub fn tag(&self) -> ProtectionTag {
        ProtectionTag::new(self.owner_id, self.expires_at, self.subject_id)
    }

    /// Objects still tracked by this record. May include objects that have
    /// disappeared since the last render pass.
    #[must_use]
    pub fn tracked_objects(&self) -> &[ObjectHandle] {
        &self.tracked_objects
    }

    /// The countdown marker above the drop location, if spawned.
    #[must_use]
    pub fn main_marker(&self) -> Option<MarkerHandle> {
        self.main_marker
    }

    /// The label marker attached to `object`, if any.
    #[must_use]
    pub fn object_marker(&self, object: ObjectHandle) -> Option<MarkerHandle> {
        self.object_markers.get(&object).copied()
    }

    /// Every marker handle this record currently references.
    pub fn marker_handles(&self) -> impl Iterator<Item = MarkerHandle> + '_ {
        self.main_marker
            .into_iter()
            .chain(self.object_markers.values().copied())
    }

    /// Hands over the payload snapshot for spawning; the record keeps none.
    pub(crate) fn take_items(&mut self) -> Vec<ItemStack> {
        std::mem::take(&mut self.items)
    }

    pub(crate) fn track(&mut self, object: ObjectHandle) {
        if !self.tracked_objects.contains(&object) {
            self.tracked_objects.push(object);
        }
    }

    /// Whether any tracked object other than `except` is still in the world.
    #[must_use]
    pub fn has_live_object_besides(&self, world: &dyn World, except: ObjectHandle) -> bool {
        self.tracked_objects
            .iter()
            .any(|&object| object != except && world.is_object_live(object))
    }

    /// Clears the protection tag from every tracked object still in the
    /// world.
    pub(crate) fn strip_tags(&self, world: &mut dyn World) {
        for &object in &self.tracked_objects {
            if world.is_object_live(object) && world.tag(object).is_some() {
                world.remove_tag(object);
            }
        }
    }

    /// Destroys the main marker and every per-object marker that is still
    /// live, and forgets all of them.
    pub(crate) fn destroy_markers(&mut self, world: &mut dyn World) {
        if let Some(marker) = self.main_marker.take() {
            if world.is_marker_live(marker) {
                world.remove_marker(marker);
            }
        }
        for (_, marker) in self.object_markers.drain() {
            if world.is_marker_live(marker) {
                world.remove_marker(marker);
            }
        }
    }

    /// Full teardown on retirement: tags first, then markers.
    pub(crate) fn release(&mut self, world: &mut dyn World) {
        self.strip_tags(world);
        self.destroy_markers(world);
    }
}
