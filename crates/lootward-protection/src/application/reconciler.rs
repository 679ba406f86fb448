//! Marker reconciliation: the periodic sweep that expires stale records and
//! keeps countdown markers in one-to-one correspondence with live objects.

use chrono::{DateTime, Utc};
use lootward_core::error::DomainError;
use lootward_core::host::display_name;
use lootward_core::world::{MarkerHandle, MarkerStyle, World};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::context::HostContext;
use super::lifecycle;
use super::registry::{ClaimRegistry, Visit};
use crate::config::{ProtectionConfig, render_template};
use crate::domain::record::ProtectionRecord;

/// Height of the main marker above the trigger location.
pub const MAIN_MARKER_HEIGHT: f64 = 3.0;

/// Height of a per-object marker above its object.
pub const OBJECT_MARKER_HEIGHT: f64 = 0.5;

/// What one sweep did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Subjects whose records passed their deadline and were retired.
    pub expired: Vec<Uuid>,
    /// Subjects whose records had no objects left and were retired.
    pub collected: Vec<Uuid>,
    /// Records rendered this pass.
    pub rendered: usize,
    /// Records whose render was skipped and will be retried next pass.
    pub skipped: usize,
}

/// Runs one reconciliation pass over every live record.
pub fn sweep(
    registry: &mut ClaimRegistry,
    config: &ProtectionConfig,
    ctx: &mut HostContext<'_>,
    now: DateTime<Utc>,
) -> SweepReport {
    let mut report = SweepReport::default();

    let retired = registry.for_each_record(|record| {
        if record.is_expired(now) {
            report.expired.push(record.subject_id());
            return Visit::Remove;
        }
        match render(record, config, ctx, now) {
            Ok(0) => {
                report.collected.push(record.subject_id());
                Visit::Remove
            }
            Ok(_) => {
                report.rendered += 1;
                Visit::Keep
            }
            Err(e) => {
                warn!(
                    subject_id = %record.subject_id(),
                    error = %e,
                    "skipping marker render until next sweep"
                );
                report.skipped += 1;
                Visit::Keep
            }
        }
    });

    for mut record in retired {
        lifecycle::release(&mut record, ctx.world);
        if report.expired.contains(&record.subject_id()) {
            info!(subject_id = %record.subject_id(), "cleaned up expired loot protection");
        } else {
            info!(subject_id = %record.subject_id(), "cleaned up fully collected loot protection");
        }
    }

    report
}

/// Re-renders the countdown for one record and repairs its markers.
/// Returns how many tracked objects are still live.
///
/// # Errors
///
/// Returns `DomainError::MissingWorld` if the record's world is not loaded
/// or a marker cannot be spawned. The record is left for the next pass.
pub fn render(
    record: &mut ProtectionRecord,
    config: &ProtectionConfig,
    ctx: &mut HostContext<'_>,
    now: DateTime<Utc>,
) -> Result<usize, DomainError> {
    if !ctx.world.is_world_loaded(&record.location().world) {
        return Err(DomainError::MissingWorld(record.location().world.clone()));
    }

    let seconds = record.seconds_left(now);
    let owner_name = display_name(ctx.names, record.owner_id());

    let main_text = render_template(&config.hologram.main_text, seconds, &owner_name);
    render_main_marker(record, ctx.world, &main_text)?;

    let item_text = render_template(&config.hologram.item_text, seconds, &owner_name);
    prune_object_markers(record, ctx.world);
    render_object_markers(record, ctx.world, &item_text)?;

    Ok(record.tracked_objects.len())
}

fn render_main_marker(
    record: &mut ProtectionRecord,
    world: &mut dyn World,
    text: &str,
) -> Result<(), DomainError> {
    if let Some(marker) = record.main_marker {
        if world.update_marker(marker, None, text).is_ok() {
            return Ok(());
        }
        debug!(subject_id = %record.subject_id(), %marker, "main marker went stale");
        record.main_marker = None;
    }

    let position = record.location().raised(MAIN_MARKER_HEIGHT);
    record.main_marker = Some(world.spawn_marker(&position, text, MarkerStyle::LABEL_ONLY)?);
    Ok(())
}

/// Drops tracked objects that are gone along with their markers, and
/// mapping entries whose marker was destroyed externally.
fn prune_object_markers(record: &mut ProtectionRecord, world: &mut dyn World) {
    let (live, gone): (Vec<_>, Vec<_>) = record
        .tracked_objects
        .iter()
        .copied()
        .partition(|&object| world.is_object_live(object));
    record.tracked_objects = live;

    for object in gone {
        if let Some(marker) = record.object_markers.remove(&object) {
            destroy_if_live(world, marker);
        }
    }

    record.object_markers.retain(|&object, &mut marker| {
        let keep = world.is_object_live(object) && world.is_marker_live(marker);
        if !keep {
            destroy_if_live(world, marker);
        }
        keep
    });
}

fn render_object_markers(
    record: &mut ProtectionRecord,
    world: &mut dyn World,
    text: &str,
) -> Result<(), DomainError> {
    for &object in &record.tracked_objects {
        let Some(position) = world
            .object_location(object)
            .map(|location| location.raised(OBJECT_MARKER_HEIGHT))
        else {
            continue;
        };

        if let Some(&marker) = record.object_markers.get(&object) {
            if world.update_marker(marker, Some(&position), text).is_ok() {
                continue;
            }
        }
        let marker = world.spawn_marker(&position, text, MarkerStyle::LABEL_ONLY)?;
        record.object_markers.insert(object, marker);
    }
    Ok(())
}

fn destroy_if_live(world: &mut dyn World, marker: MarkerHandle) {
    if world.is_marker_live(marker) {
        world.remove_marker(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use lootward_core::location::Location;
    use lootward_core::world::{ItemStack, ObjectHandle};
    use lootward_test_support::{FakeWorld, RecordingMessenger, StaticNames, StaticPermissions};

    use crate::application::lifecycle::{TriggerOutcome, on_trigger_event};
    use crate::domain::commands::TriggerEvent;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    struct Fixture {
        world: FakeWorld,
        messenger: RecordingMessenger,
        names: StaticNames,
        permissions: StaticPermissions,
        registry: ClaimRegistry,
        config: ProtectionConfig,
        owner: Uuid,
        subject: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            let owner = Uuid::new_v4();
            Self {
                world: FakeWorld::new(),
                messenger: RecordingMessenger::new(),
                names: StaticNames::new().offline(owner, "Alex"),
                permissions: StaticPermissions::new(),
                registry: ClaimRegistry::new(),
                config: ProtectionConfig::from_yaml_str(
                    "hologram:\n  main-text: \"%killer% %time%\"\n  item-text: \"item %time%\"\n",
                )
                .unwrap(),
                owner,
                subject: Uuid::new_v4(),
            }
        }

        fn protect(&mut self, items: usize) -> Vec<ObjectHandle> {
            let mut ctx = HostContext {
                world: &mut self.world,
                messenger: &self.messenger,
                names: &self.names,
                permissions: &self.permissions,
            };
            let event = TriggerEvent {
                subject_id: self.subject,
                candidate_owner: Some(self.owner),
                items: (0..items)
                    .map(|i| ItemStack::new(format!("item-{i}"), 1))
                    .collect(),
                location: Location::new("overworld", 0.5, 64.0, 0.5),
            };
            match on_trigger_event(&mut self.registry, &self.config, &mut ctx, event, fixed_now()) {
                TriggerOutcome::Protected { objects, .. } => objects,
                other => panic!("expected Protected, got {other:?}"),
            }
        }

        fn sweep(&mut self, now: DateTime<Utc>) -> SweepReport {
            let mut ctx = HostContext {
                world: &mut self.world,
                messenger: &self.messenger,
                names: &self.names,
                permissions: &self.permissions,
            };
            sweep(&mut self.registry, &self.config, &mut ctx, now)
        }

        fn record(&self) -> &ProtectionRecord {
            self.registry.lookup_by_subject(self.subject).unwrap()
        }
    }

    #[test]
    fn test_sweep_updates_countdown_text() {
        // Arrange
        let mut fx = Fixture::new();
        let objects = fx.protect(1);

        // Act
        let report = fx.sweep(fixed_now() + Duration::milliseconds(10_500));

        // Assert
        assert_eq!(report.rendered, 1);
        let main = fx.record().main_marker().unwrap();
        assert_eq!(fx.world.marker(main).unwrap().text, "Alex 19");
        let item_marker = fx.record().object_marker(objects[0]).unwrap();
        assert_eq!(fx.world.marker(item_marker).unwrap().text, "item 19");
    }

    #[test]
    fn test_markers_are_placed_above_location_and_object() {
        let mut fx = Fixture::new();
        let objects = fx.protect(1);

        let main = fx.record().main_marker().unwrap();
        let item_marker = fx.record().object_marker(objects[0]).unwrap();

        let main_marker = fx.world.marker(main).unwrap();
        assert_eq!(main_marker.location, Location::new("overworld", 0.5, 67.0, 0.5));
        assert_eq!(main_marker.style, MarkerStyle::LABEL_ONLY);
        assert_eq!(
            fx.world.marker(item_marker).unwrap().location,
            Location::new("overworld", 0.5, 64.5, 0.5)
        );
    }

    #[test]
    fn test_sweep_moves_object_marker_with_its_object() {
        let mut fx = Fixture::new();
        let objects = fx.protect(1);
        fx.world
            .move_object(objects[0], Location::new("overworld", 4.0, 63.0, 2.0));

        fx.sweep(fixed_now() + Duration::seconds(1));

        let marker = fx.record().object_marker(objects[0]).unwrap();
        assert_eq!(
            fx.world.marker(marker).unwrap().location,
            Location::new("overworld", 4.0, 63.5, 2.0)
        );
    }

    #[test]
    fn test_sweep_prunes_marker_of_vanished_object() {
        // Arrange
        let mut fx = Fixture::new();
        let objects = fx.protect(2);
        let orphan = fx.record().object_marker(objects[0]).unwrap();
        fx.world.despawn_object(objects[0]);

        // Act
        fx.sweep(fixed_now() + Duration::seconds(1));

        // Assert
        assert!(!fx.world.is_marker_live(orphan));
        assert_eq!(fx.record().tracked_objects(), &[objects[1]]);
        assert!(fx.record().object_marker(objects[0]).is_none());
        assert!(fx.record().object_marker(objects[1]).is_some());
    }

    #[test]
    fn test_sweep_recreates_externally_destroyed_markers() {
        let mut fx = Fixture::new();
        let objects = fx.protect(1);
        let old_main = fx.record().main_marker().unwrap();
        let old_item = fx.record().object_marker(objects[0]).unwrap();
        fx.world.destroy_marker(old_main);
        fx.world.destroy_marker(old_item);

        fx.sweep(fixed_now() + Duration::seconds(1));

        let new_main = fx.record().main_marker().unwrap();
        let new_item = fx.record().object_marker(objects[0]).unwrap();
        assert_ne!(new_main, old_main);
        assert_ne!(new_item, old_item);
        assert_eq!(fx.world.live_marker_count(), 2);
    }

    #[test]
    fn test_sweep_retires_expired_record_and_strips_tags() {
        // Arrange
        let mut fx = Fixture::new();
        let objects = fx.protect(2);

        // Act
        let report = fx.sweep(fixed_now() + Duration::milliseconds(30_001));

        // Assert
        assert_eq!(report.expired, vec![fx.subject]);
        assert!(fx.registry.is_empty());
        assert_eq!(fx.world.live_marker_count(), 0);
        for object in objects {
            assert_eq!(fx.world.object(object).unwrap().tag, None);
        }
    }

    #[test]
    fn test_sweep_keeps_record_at_exact_deadline() {
        let mut fx = Fixture::new();
        fx.protect(1);

        let report = fx.sweep(fixed_now() + Duration::seconds(30));

        assert!(report.expired.is_empty());
        assert_eq!(fx.registry.len(), 1);
    }

    #[test]
    fn test_sweep_retires_fully_collected_record() {
        let mut fx = Fixture::new();
        let objects = fx.protect(2);
        for object in &objects {
            fx.world.despawn_object(*object);
        }

        let report = fx.sweep(fixed_now() + Duration::seconds(1));

        assert_eq!(report.collected, vec![fx.subject]);
        assert!(fx.registry.is_empty());
        assert_eq!(fx.world.live_marker_count(), 0);
    }

    #[test]
    fn test_sweep_skips_record_in_unloaded_world_without_retiring() {
        // Arrange
        let mut fx = Fixture::new();
        fx.protect(1);
        fx.world.unload_world("overworld");

        // Act
        let report = fx.sweep(fixed_now() + Duration::seconds(1));

        // Assert
        assert_eq!(report.skipped, 1);
        assert_eq!(fx.registry.len(), 1);

        fx.world.load_world("overworld");
        let report = fx.sweep(fixed_now() + Duration::seconds(2));
        assert_eq!(report.rendered, 1);
    }
}
