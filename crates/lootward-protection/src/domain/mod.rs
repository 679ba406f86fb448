//! Domain types: protection records, tags, and the inputs that drive them.

pub mod commands;
pub mod record;
pub mod tag;
