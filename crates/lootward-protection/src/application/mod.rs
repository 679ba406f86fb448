//! Application layer: the registry and the components that drive it.

pub mod admin;
pub mod arbiter;
pub mod context;
pub mod engine;
pub mod lifecycle;
pub mod reconciler;
pub mod registry;
