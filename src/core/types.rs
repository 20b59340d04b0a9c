//! Common type aliases used by the dataset and brick-layout math.

pub use glam::{Mat4, UVec3, Vec2, Vec3};

/// Standard result type used throughout the crate.
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
