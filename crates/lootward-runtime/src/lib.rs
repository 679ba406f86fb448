//! Lootward runtime — hosts the protection engine on one tokio task so that
//! trigger events, claim attempts, admin commands and the periodic sweep
//! are serialized onto a single scheduling context.

pub mod error;
pub mod service;
pub mod telemetry;
