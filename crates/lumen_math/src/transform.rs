// Rotation about the Y axis.
//
// Stores the sine and cosine once so instanced geometry can move rays into
// object space and hits back out without recomputing trig per query.

use crate::{Aabb, Vec3};

/// A rotation by a fixed angle about +Y (right-handed, counter-clockwise
/// when viewed from above).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationY {
    sin_theta: f64,
    cos_theta: f64,
}

impl RotationY {
    /// Create a rotation from an angle in degrees.
    pub fn from_degrees(angle: f64) -> Self {
        let radians = angle.to_radians();
        Self {
            sin_theta: radians.sin(),
            cos_theta: radians.cos(),
        }
    }

    /// Apply the rotation (object space -> world space).
    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Apply the inverse rotation (world space -> object space).
    #[inline]
    pub fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// World-space box enclosing a rotated object-space box.
    ///
    /// Rotates all 8 corners and takes their min/max envelope.
    pub fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = aabb.corners();
        let first = self.to_world(corners[0]);

        let (min, max) = corners[1..]
            .iter()
            .map(|&corner| self.to_world(corner))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));

        Aabb::from_points(min, max)
    }
}
