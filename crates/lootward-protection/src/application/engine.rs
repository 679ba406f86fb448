//! The protection engine: one component instance per process run, owning
//! the registry, the arbiter state and the active configuration.

use chrono::{DateTime, Utc};
use lootward_core::world::World;
use tracing::info;
use uuid::Uuid;

use super::arbiter::{ClaimArbiter, ClaimVerdict};
use super::context::HostContext;
use super::lifecycle::{self, TriggerOutcome};
use super::reconciler::{self, SweepReport};
use super::registry::ClaimRegistry;
use crate::config::ProtectionConfig;
use crate::domain::commands::{ClaimAttempt, TriggerEvent};

/// Ties the registry, lifecycle, arbiter and reconciler together.
///
/// All operations take `&mut self`; callers serialize them onto a single
/// scheduling context.
#[derive(Debug)]
pub struct ProtectionEngine {
    config: ProtectionConfig,
    registry: ClaimRegistry,
    arbiter: ClaimArbiter,
    running: bool,
}

impl ProtectionEngine {
    #[must_use]
    pub fn new(config: ProtectionConfig) -> Self {
        Self {
            config,
            registry: ClaimRegistry::new(),
            arbiter: ClaimArbiter::new(),
            running: false,
        }
    }

    /// Begins accepting trigger events and sweeping.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            info!(
                protection_time = self.config.protection_time,
                "loot protection engine started"
            );
        }
    }

    /// Tears down every remaining record's markers and clears all state.
    /// Tags are left in place.
    pub fn stop(&mut self, world: &mut dyn World) {
        let records = self.registry.drain();
        let count = records.len();
        for mut record in records {
            record.destroy_markers(world);
        }
        self.arbiter.clear();
        if self.running {
            self.running = false;
            info!(records = count, "loot protection engine stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    /// Replaces the active configuration. Existing records keep their
    /// deadlines.
    pub fn reload(&mut self, config: ProtectionConfig) {
        info!(protection_time = config.protection_time, "configuration reloaded");
        self.config = config;
    }

    #[must_use]
    pub fn registry(&self) -> &ClaimRegistry {
        &self.registry
    }

    /// Handles a trigger event. While stopped, nothing is protected.
    pub fn on_trigger_event(
        &mut self,
        ctx: &mut HostContext<'_>,
        event: TriggerEvent,
        now: DateTime<Utc>,
    ) -> TriggerOutcome {
        if !self.running {
            return TriggerOutcome::Unprotected { items: event.items };
        }
        lifecycle::on_trigger_event(&mut self.registry, &self.config, ctx, event, now)
    }

    /// Decides a claim attempt. Tags are honoured even while stopped.
    pub fn on_claim_attempt(
        &mut self,
        ctx: &mut HostContext<'_>,
        attempt: ClaimAttempt,
        now: DateTime<Utc>,
    ) -> ClaimVerdict {
        self.arbiter
            .decide(&mut self.registry, &self.config, ctx, attempt, now)
    }

    /// Runs one reconciliation pass.
    pub fn sweep(&mut self, ctx: &mut HostContext<'_>, now: DateTime<Utc>) -> SweepReport {
        if !self.running {
            return SweepReport::default();
        }
        reconciler::sweep(&mut self.registry, &self.config, ctx, now)
    }

    /// Retires the record for `subject_id`, if any.
    pub fn retire(&mut self, world: &mut dyn World, subject_id: Uuid) -> bool {
        lifecycle::retire(&mut self.registry, world, subject_id)
    }
}
