//! Lootward Core — shared abstractions.
//!
//! This crate defines the value types and host ports that the protection
//! engine is written against. It contains no policy and no host bindings;
//! the hosting runtime implements the port traits.

pub mod clock;
pub mod error;
pub mod host;
pub mod location;
pub mod world;
