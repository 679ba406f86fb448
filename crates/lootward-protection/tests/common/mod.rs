//! Shared harness for engine integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use lootward_core::location::Location;
use lootward_core::world::{ItemStack, ObjectHandle, TagStore};
use lootward_protection::application::arbiter::ClaimVerdict;
use lootward_protection::application::context::HostContext;
use lootward_protection::application::engine::ProtectionEngine;
use lootward_protection::application::lifecycle::TriggerOutcome;
use lootward_protection::application::reconciler::SweepReport;
use lootward_protection::config::ProtectionConfig;
use lootward_protection::domain::commands::{ClaimAttempt, TriggerEvent};
use lootward_protection::domain::tag::ProtectionTag;
use lootward_test_support::{FakeWorld, RecordingMessenger, StaticNames, StaticPermissions};
use uuid::Uuid;

/// Fixed starting instant used across all integration tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

pub fn at(millis: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(millis)
}

/// A started engine wired to fake collaborators.
pub struct Harness {
    pub engine: ProtectionEngine,
    pub world: FakeWorld,
    pub messenger: RecordingMessenger,
    pub names: StaticNames,
    pub permissions: StaticPermissions,
}

impl Harness {
    pub fn new(names: StaticNames, permissions: StaticPermissions) -> Self {
        let mut engine = ProtectionEngine::new(ProtectionConfig::default());
        engine.start();
        Self {
            engine,
            world: FakeWorld::new(),
            messenger: RecordingMessenger::new(),
            names,
            permissions,
        }
    }

    pub fn kill(
        &mut self,
        owner: Uuid,
        victim: Uuid,
        location: Location,
        items: Vec<ItemStack>,
        now: DateTime<Utc>,
    ) -> Vec<ObjectHandle> {
        let mut ctx = HostContext {
            world: &mut self.world,
            messenger: &self.messenger,
            names: &self.names,
            permissions: &self.permissions,
        };
        let event = TriggerEvent {
            subject_id: victim,
            candidate_owner: Some(owner),
            items,
            location,
        };
        match self.engine.on_trigger_event(&mut ctx, event, now) {
            TriggerOutcome::Protected { objects, .. } => objects,
            other => panic!("expected Protected, got {other:?}"),
        }
    }

    pub fn claim(&mut self, claimant: Uuid, object: ObjectHandle, now: DateTime<Utc>) -> ClaimVerdict {
        let mut ctx = HostContext {
            world: &mut self.world,
            messenger: &self.messenger,
            names: &self.names,
            permissions: &self.permissions,
        };
        self.engine
            .on_claim_attempt(&mut ctx, ClaimAttempt { claimant, object }, now)
    }

    /// Claims `object` and, when allowed, removes it from the world the
    /// way the host does on a completed pickup.
    pub fn collect(&mut self, claimant: Uuid, object: ObjectHandle, now: DateTime<Utc>) -> ClaimVerdict {
        let verdict = self.claim(claimant, object, now);
        if verdict.is_allowed() {
            self.world.despawn_object(object);
        }
        verdict
    }

    pub fn sweep(&mut self, now: DateTime<Utc>) -> SweepReport {
        let mut ctx = HostContext {
            world: &mut self.world,
            messenger: &self.messenger,
            names: &self.names,
            permissions: &self.permissions,
        };
        self.engine.sweep(&mut ctx, now)
    }

    pub fn parsed_tag(&self, object: ObjectHandle) -> Option<ProtectionTag> {
        self.world.tag(object).map(|raw| raw.parse().unwrap())
    }
}

pub fn two_items() -> Vec<ItemStack> {
    vec![ItemStack::new("diamond_sword", 1), ItemStack::new("golden_apple", 4)]
}
