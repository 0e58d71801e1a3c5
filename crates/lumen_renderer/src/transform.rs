//! Instancing wrappers that move a hittable without copying its geometry.
//!
//! Rays are carried into the object's local space, tested against the
//! wrapped object, and the resulting hit is carried back to world space.

use crate::hittable::{HitRecord, Hittable};
use lumen_math::{Aabb, Interval, Ray, RotationY, Vec3};
use rand::RngCore;

/// Displaces a hittable by a fixed offset.
pub struct Translate {
    object: Box<dyn Hittable>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(object: impl Hittable + 'static, offset: Vec3) -> Self {
        let bbox = object.bounding_box().translate(offset);
        Self {
            object: Box::new(object),
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Move the ray backwards by the offset
        let offset_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        let mut rec = self.object.hit(&offset_ray, ray_t, rng)?;

        // Move the intersection point forwards by the offset
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Rotates a hittable about the Y axis.
pub struct RotateY {
    object: Box<dyn Hittable>,
    rotation: RotationY,
    bbox: Aabb,
}

impl RotateY {
    /// `angle` is in degrees, counter-clockwise when viewed from +Y.
    pub fn new(object: impl Hittable + 'static, angle: f64) -> Self {
        let rotation = RotationY::from_degrees(angle);
        let bbox = rotation.transform_aabb(&object.bounding_box());

        Self {
            object: Box::new(object),
            rotation,
            bbox,
        }
    }
}

impl Hittable for RotateY {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Transform the ray from world space to object space
        let local_ray = Ray::new(
            self.rotation.to_object(ray.origin()),
            self.rotation.to_object(ray.direction()),
            ray.time(),
        );

        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;

        // Transform the intersection from object space back to world space
        rec.p = self.rotation.to_world(rec.p);
        rec.normal = self.rotation.to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
