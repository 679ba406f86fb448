//! The claim registry: one owning store of protection records with two
//! indices, by subject identity and by spatial key.
//!
//! Every mutation goes through this type so both indices change together.
//! At most one record exists per spatial key and per subject.

use std::collections::HashMap;

use lootward_core::location::SpatialKey;
use lootward_core::world::World;
use tracing::info;
use uuid::Uuid;

use crate::domain::record::ProtectionRecord;

/// What `for_each_record` should do with the record just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Leave the record in the registry.
    Keep,
    /// Remove the record from both indices and hand it back.
    Remove,
}

/// Owning store of live protection records.
#[derive(Debug, Default)]
pub struct ClaimRegistry {
    records: HashMap<Uuid, ProtectionRecord>,
    by_location: HashMap<SpatialKey, Uuid>,
}

impl ClaimRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds `record`, first fully retiring any record that occupies the same
    /// spatial key or belongs to the same subject. Returns the subjects of
    /// the evicted records.
    pub fn insert(&mut self, record: ProtectionRecord, world: &mut dyn World) -> Vec<Uuid> {
        let key = record.spatial_key();
        let mut evicted = Vec::new();

        let occupants = [
            self.by_location.get(&key).copied(),
            self.records
                .contains_key(&record.subject_id())
                .then_some(record.subject_id()),
        ];
        for subject_id in occupants.into_iter().flatten() {
            if let Some(mut previous) = self.remove_by_subject(subject_id) {
                previous.release(world);
                info!(
                    subject_id = %subject_id,
                    spatial_key = %previous.spatial_key(),
                    "evicted existing loot protection"
                );
                evicted.push(subject_id);
            }
        }

        self.by_location.insert(key, record.subject_id());
        self.records.insert(record.subject_id(), record);
        evicted
    }

    #[must_use]
    pub fn lookup_by_subject(&self, subject_id: Uuid) -> Option<&ProtectionRecord> {
        self.records.get(&subject_id)
    }

    pub(crate) fn lookup_by_subject_mut(
        &mut self,
        subject_id: Uuid,
    ) -> Option<&mut ProtectionRecord> {
        self.records.get_mut(&subject_id)
    }

    #[must_use]
    pub fn lookup_by_location(&self, key: &SpatialKey) -> Option<&ProtectionRecord> {
        self.by_location
            .get(key)
            .and_then(|subject_id| self.records.get(subject_id))
    }

    /// Removes the record for `subject_id` from both indices. The caller is
    /// responsible for releasing its host resources.
    pub fn remove_by_subject(&mut self, subject_id: Uuid) -> Option<ProtectionRecord> {
        let record = self.records.remove(&subject_id)?;
        let key = record.spatial_key();
        if self.by_location.get(&key) == Some(&subject_id) {
            self.by_location.remove(&key);
        }
        Some(record)
    }

    /// Visits every record; records for which `visit` returns
    /// [`Visit::Remove`] are removed from both indices and returned.
    pub fn for_each_record<F>(&mut self, mut visit: F) -> Vec<ProtectionRecord>
    where
        F: FnMut(&mut ProtectionRecord) -> Visit,
    {
        let subjects: Vec<Uuid> = self.records.keys().copied().collect();
        let mut removed = Vec::new();
        for subject_id in subjects {
            let Some(record) = self.records.get_mut(&subject_id) else {
                continue;
            };
            if visit(record) == Visit::Remove {
                removed.extend(self.remove_by_subject(subject_id));
            }
        }
        removed
    }

    /// Empties the registry, returning every record.
    pub fn drain(&mut self) -> Vec<ProtectionRecord> {
        self.by_location.clear();
        self.records.drain().map(|(_, record)| record).collect()
    }

    /// Subjects with a live record.
    pub fn subjects(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.records.keys().copied()
    }
}
