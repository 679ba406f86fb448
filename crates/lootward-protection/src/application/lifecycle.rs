//! Protection lifecycle: creating a record on a trigger event and retiring
//! it on expiry or full collection.

use chrono::{DateTime, Utc};
use lootward_core::host::display_name;
use lootward_core::world::{ItemStack, ObjectHandle, World};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::context::HostContext;
use super::reconciler;
use super::registry::ClaimRegistry;
use crate::config::{ProtectionConfig, render_template};
use crate::domain::commands::TriggerEvent;
use crate::domain::record::ProtectionRecord;

/// Result of handling a trigger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The payload was taken over and spawned as protected objects.
    /// `undelivered` holds items that could not be spawned; the host should
    /// drop them through its normal path.
    Protected {
        objects: Vec<ObjectHandle>,
        undelivered: Vec<ItemStack>,
    },
    /// No protection applies; the host drops `items` as usual.
    Unprotected { items: Vec<ItemStack> },
}

/// Creates a protection record for `event`, spawns and tags its payload,
/// notifies the owner, and renders the initial markers.
pub fn on_trigger_event(
    registry: &mut ClaimRegistry,
    config: &ProtectionConfig,
    ctx: &mut HostContext<'_>,
    event: TriggerEvent,
    now: DateTime<Utc>,
) -> TriggerOutcome {
    let Some(owner_id) = event.protected_owner() else {
        debug!(subject_id = %event.subject_id, "no eligible owner, loot drops unprotected");
        return TriggerOutcome::Unprotected { items: event.items };
    };
    if !ctx.world.is_world_loaded(&event.location.world) {
        warn!(
            subject_id = %event.subject_id,
            world = %event.location.world,
            "world not loaded, loot drops unprotected"
        );
        return TriggerOutcome::Unprotected { items: event.items };
    }

    let subject_id = event.subject_id;
    let record = ProtectionRecord::new(
        owner_id,
        subject_id,
        event.location,
        now + config.protection_duration(),
        event.items,
    );
    let spatial_key = record.spatial_key();
    registry.insert(record, ctx.world);

    let Some(record) = registry.lookup_by_subject_mut(subject_id) else {
        return TriggerOutcome::Protected {
            objects: Vec::new(),
            undelivered: Vec::new(),
        };
    };

    let undelivered = spawn_tagged(record, ctx.world);
    let objects = record.tracked_objects().to_vec();
    if objects.is_empty() {
        retire(registry, ctx.world, subject_id);
        debug!(subject_id = %subject_id, "nothing spawned, protection not created");
        return TriggerOutcome::Protected {
            objects,
            undelivered,
        };
    }

    let owner_name = display_name(ctx.names, owner_id);
    let message = render_template(
        &config.messages.loot_protected,
        i64::from(config.protection_time),
        &owner_name,
    );
    ctx.messenger.send(owner_id, &message);

    if let Err(e) = reconciler::render(record, config, ctx, now) {
        warn!(subject_id = %subject_id, error = %e, "initial marker render skipped");
    }

    info!(
        owner = %owner_name,
        owner_id = %owner_id,
        subject_id = %subject_id,
        spatial_key = %spatial_key,
        objects = objects.len(),
        "loot protected"
    );

    TriggerOutcome::Protected {
        objects,
        undelivered,
    }
}

/// Spawns the record's payload and tags each object before anything else
/// can observe it. Returns the items that failed to spawn.
fn spawn_tagged(record: &mut ProtectionRecord, world: &mut dyn World) -> Vec<ItemStack> {
    let tag = record.tag().encode();
    let location = record.location().clone();
    let mut undelivered = Vec::new();

    for item in record.take_items() {
        if item.is_empty() {
            continue;
        }
        match world.spawn_object(&location, &item) {
            Ok(object) => {
                world.set_tag(object, &tag);
                record.track(object);
            }
            Err(e) => {
                warn!(
                    subject_id = %record.subject_id(),
                    item = %item.kind,
                    error = %e,
                    "failed to spawn protected item"
                );
                undelivered.push(item);
            }
        }
    }
    undelivered
}

/// Retires the record for `subject_id`: strips remaining tags, destroys
/// its markers, and removes it from the registry. Returns `false` if no
/// such record is indexed, which makes repeated calls a no-op.
pub fn retire(registry: &mut ClaimRegistry, world: &mut dyn World, subject_id: Uuid) -> bool {
    match registry.remove_by_subject(subject_id) {
        Some(mut record) => {
            release(&mut record, world);
            true
        }
        None => false,
    }
}

/// Releases the host resources of a record already removed from the
/// registry.
pub(crate) fn release(record: &mut ProtectionRecord, world: &mut dyn World) {
    record.release(world);
    debug!(
        subject_id = %record.subject_id(),
        spatial_key = %record.spatial_key(),
        "loot protection retired"
    );
}
