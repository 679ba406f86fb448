//! World positions and the integer-truncated spatial key used for indexing.

use std::fmt;

/// A point in a named world or region.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Name of the world or region.
    pub world: String,
    /// East/west coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// North/south coordinate.
    pub z: f64,
}

impl Location {
    /// Creates a location in `world`.
    #[must_use]
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Returns a copy of this location raised by `dy` on the vertical axis.
    #[must_use]
    pub fn raised(&self, dy: f64) -> Self {
        Self {
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Returns the spatial key for this location.
    #[must_use]
    pub fn spatial_key(&self) -> SpatialKey {
        SpatialKey::of(self)
    }
}

/// Integer-truncated location plus world name.
///
/// Two locations share a key when they are in the same world and their
/// coordinates truncate (toward zero) to the same integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpatialKey {
    world: String,
    x: i64,
    y: i64,
    z: i64,
}

impl SpatialKey {
    /// Derives the key for `location`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn of(location: &Location) -> Self {
        Self {
            world: location.world.clone(),
            x: location.x.trunc() as i64,
            y: location.y.trunc() as i64,
            z: location.z.trunc() as i64,
        }
    }
}

impl fmt::Display for SpatialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.world, self.x, self.y, self.z)
    }
}
