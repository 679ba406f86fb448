//! The serialized protection tag carried by every protected object.
//!
//! The tag is the ground truth consulted at claim time. It is written once
//! when the object is spawned and afterwards only cleared, never rewritten.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lootward_core::error::DomainError;
use uuid::Uuid;

const FIELD_SEPARATOR: char = ':';

/// Whole seconds left until `deadline`, clamped at zero.
#[must_use]
pub fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((deadline - now).num_milliseconds() / 1000).max(0)
}

/// Decoded form of `"<owner>:<expires_at_millis>:<subject>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionTag {
    /// Identity allowed to claim before the deadline.
    pub owner_id: Uuid,
    /// Absolute deadline, millisecond precision.
    pub expires_at: DateTime<Utc>,
    /// Identity the protection was created on behalf of.
    pub subject_id: Uuid,
}

impl ProtectionTag {
    /// Creates a tag. The deadline is truncated to millisecond precision so
    /// that a tag compares equal to its own parsed encoding.
    #[must_use]
    pub fn new(owner_id: Uuid, expires_at: DateTime<Utc>, subject_id: Uuid) -> Self {
        let expires_at =
            DateTime::from_timestamp_millis(expires_at.timestamp_millis()).unwrap_or(expires_at);
        Self {
            owner_id,
            expires_at,
            subject_id,
        }
    }

    /// Whether the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whole seconds of protection left at `now`.
    #[must_use]
    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        seconds_until(self.expires_at, now)
    }

    /// Encodes the tag for storage on an object.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProtectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.owner_id,
            self.expires_at.timestamp_millis(),
            self.subject_id
        )
    }
}

impl FromStr for ProtectionTag {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();
        let [owner, expires, subject] = fields.as_slice() else {
            return Err(DomainError::MalformedTag(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        };

        let owner_id = Uuid::parse_str(owner)
            .map_err(|e| DomainError::MalformedTag(format!("owner id {owner:?}: {e}")))?;
        let millis: i64 = expires
            .parse()
            .map_err(|e| DomainError::MalformedTag(format!("deadline {expires:?}: {e}")))?;
        let expires_at = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            DomainError::MalformedTag(format!("deadline {millis} out of range"))
        })?;
        let subject_id = Uuid::parse_str(subject)
            .map_err(|e| DomainError::MalformedTag(format!("subject id {subject:?}: {e}")))?;

        Ok(Self {
            owner_id,
            expires_at,
            subject_id,
        })
    }
}
