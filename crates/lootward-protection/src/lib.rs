//! Lootward — time-bounded ownership tracking for spawned loot.
//!
//! When a trigger event fires, the payload is spawned as tracked objects
//! tagged with `(owner, deadline, subject)`. Until the deadline only the
//! owner, or a claimant holding the override permission, may claim them. A
//! periodic sweep keeps the countdown markers in step with the objects and
//! retires records once they expire or are fully collected.

pub mod application;
pub mod config;
pub mod domain;
