//! Claim arbitration: decides whether a claim attempt on a tagged object is
//! allowed, and rate-limits denial messages per claimant.
//!
//! The tag on the object is the ground truth. Stripping a tag and retiring
//! a record are separate steps, and each is idempotent on its own.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lootward_core::host::display_name;
use tracing::{debug, warn};
use uuid::Uuid;

use super::context::HostContext;
use super::lifecycle;
use super::registry::ClaimRegistry;
use crate::config::{ProtectionConfig, render_template};
use crate::domain::commands::ClaimAttempt;
use crate::domain::tag::ProtectionTag;

/// Minimum gap, in milliseconds, between two denial messages to the same
/// claimant.
pub const DENIAL_MESSAGE_COOLDOWN_MS: i64 = 2_000;

/// The path a claim attempt took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimVerdict {
    /// The object carries no protection tag.
    Untagged,
    /// The tag could not be parsed; it was stripped.
    MalformedTag,
    /// The protection had expired; the tag was stripped. `record_retired`
    /// is set when this was the record's last live object.
    Expired { record_retired: bool },
    /// The owner claimed the object; its tag was stripped.
    OwnerClaim,
    /// A claimant with the override permission claimed the object; its tag
    /// was stripped.
    OverrideClaim,
    /// The claim was refused. `notified` is set when a denial message was
    /// actually sent.
    Denied { seconds_left: i64, notified: bool },
}

impl ClaimVerdict {
    /// Whether the host should let the claim go through.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Denied { .. })
    }
}

/// Per-claimant anti-spam state for denial messages.
#[derive(Debug, Default)]
pub struct ClaimArbiter {
    last_notified: HashMap<Uuid, DateTime<Utc>>,
}

impl ClaimArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides `attempt`, stripping the object's tag where the claim is
    /// allowed through a protected path.
    pub fn decide(
        &mut self,
        registry: &mut ClaimRegistry,
        config: &ProtectionConfig,
        ctx: &mut HostContext<'_>,
        attempt: ClaimAttempt,
        now: DateTime<Utc>,
    ) -> ClaimVerdict {
        let object = attempt.object;
        let Some(raw) = ctx.world.tag(object) else {
            return ClaimVerdict::Untagged;
        };

        let tag: ProtectionTag = match raw.parse() {
            Ok(tag) => tag,
            Err(e) => {
                warn!(
                    %object,
                    claimant = %attempt.claimant,
                    error = %e,
                    "stripping malformed protection tag"
                );
                ctx.world.remove_tag(object);
                return ClaimVerdict::MalformedTag;
            }
        };

        if tag.is_expired(now) {
            ctx.world.remove_tag(object);
            let record_retired = retire_if_collected(registry, ctx, &tag, attempt);
            debug!(
                %object,
                claimant = %attempt.claimant,
                record_retired,
                "claim allowed, protection expired"
            );
            return ClaimVerdict::Expired { record_retired };
        }

        if attempt.claimant == tag.owner_id {
            ctx.world.remove_tag(object);
            debug!(%object, claimant = %attempt.claimant, "owner claimed protected object");
            return ClaimVerdict::OwnerClaim;
        }
        if ctx.permissions.has_override_permission(attempt.claimant) {
            ctx.world.remove_tag(object);
            debug!(%object, claimant = %attempt.claimant, "override claim on protected object");
            return ClaimVerdict::OverrideClaim;
        }

        let seconds_left = tag.seconds_left(now);
        let notified = self.should_notify(attempt.claimant, now);
        if notified {
            let owner_name = display_name(ctx.names, tag.owner_id);
            let message = render_template(&config.messages.cannot_loot, seconds_left, &owner_name);
            ctx.messenger.send(attempt.claimant, &message);
        } else {
            debug!(claimant = %attempt.claimant, "denial message suppressed");
        }
        ClaimVerdict::Denied {
            seconds_left,
            notified,
        }
    }

    /// Records a denial message to `claimant` at `now` unless one was sent
    /// within the cooldown. Stale entries for other claimants are pruned on
    /// the way.
    fn should_notify(&mut self, claimant: Uuid, now: DateTime<Utc>) -> bool {
        self.last_notified.retain(|_, &mut sent_at| {
            (now - sent_at).num_milliseconds() <= DENIAL_MESSAGE_COOLDOWN_MS
        });
        if self.last_notified.contains_key(&claimant) {
            return false;
        }
        self.last_notified.insert(claimant, now);
        true
    }

    /// Forgets all anti-spam state.
    pub fn clear(&mut self) {
        self.last_notified.clear();
    }
}

/// Retires the tag's record when no tracked object other than the one just
/// claimed is left. Only acts on the record that wrote this tag.
fn retire_if_collected(
    registry: &mut ClaimRegistry,
    ctx: &mut HostContext<'_>,
    tag: &ProtectionTag,
    attempt: ClaimAttempt,
) -> bool {
    let Some(record) = registry.lookup_by_subject(tag.subject_id) else {
        return false;
    };
    if record.expires_at() != tag.expires_at
        || record.has_live_object_besides(ctx.world, attempt.object)
    {
        return false;
    }
    lifecycle::retire(registry, ctx.world, tag.subject_id)
}
