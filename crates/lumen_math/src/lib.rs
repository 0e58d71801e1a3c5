//! Lumen math - double precision vector algebra for the path tracer.
//!
//! Vectors, points and colors all share glam's `DVec3`. The remaining types
//! (`Interval`, `Aabb`, `Ray`) and the sampling helpers are the small kernel
//! every other crate in the workspace builds on.

pub use glam::DVec3;

mod aabb;
mod interval;
mod ray;
mod sampling;
mod transform;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use sampling::{
    gen_f64, gen_range, random_in_unit_disk, random_in_unit_sphere, random_unit_vector,
    random_vec,
};
pub use transform::RotationY;
pub use vector::{reflect, refract, Vec3Ext};

/// Three-component double precision vector.
pub type Vec3 = DVec3;

/// A position in world or object space.
pub type Point3 = DVec3;

/// Linear RGB color, nominally in [0, 1] before tone mapping.
pub type Color = DVec3;
