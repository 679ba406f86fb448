//! Inputs delivered by the host: trigger events and claim attempts.

use lootward_core::location::Location;
use lootward_core::world::{ItemStack, ObjectHandle};
use uuid::Uuid;

/// A subject died (or an equivalent trigger fired) and left a payload.
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    /// Identity the protection is created on behalf of.
    pub subject_id: Uuid,
    /// Claimant that caused the trigger, absent for environmental causes.
    pub candidate_owner: Option<Uuid>,
    /// Items that would otherwise drop through the normal path.
    pub items: Vec<ItemStack>,
    /// Where the payload drops.
    pub location: Location,
}

impl TriggerEvent {
    /// The owner to protect for, or `None` when no protection applies.
    #[must_use]
    pub fn protected_owner(&self) -> Option<Uuid> {
        self.candidate_owner
            .filter(|&owner| owner != self.subject_id)
    }
}

/// A claimant is trying to pick up `object`.
#[derive(Debug, Clone, Copy)]
pub struct ClaimAttempt {
    /// Who is claiming.
    pub claimant: Uuid,
    /// What is being claimed.
    pub object: ObjectHandle,
}
