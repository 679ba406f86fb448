//! Shared test fakes and utilities for the Lootward loot protection engine.

mod clock;
mod host;
mod world;

pub use clock::ManualClock;
pub use host::{RecordingMessenger, StaticNames, StaticPermissions};
pub use world::{FakeMarker, FakeObject, FakeWorld};
