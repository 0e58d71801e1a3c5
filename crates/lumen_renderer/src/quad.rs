//! Planar parallelogram primitive and the six-sided box built from it.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    Material,
};
use lumen_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

/// A parallelogram spanned by edges `u` and `v` from corner `q`.
pub struct Quad {
    q: Point3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` with `n = u x v`; maps planar offsets to (alpha, beta)
    w: Vec3,
    normal: Vec3,
    /// Plane constant: `normal . p = d` for every point on the plane
    d: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Point3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let n_len_sq = n.length_squared();

        // Zero-area quads get a zero normal and never report a hit.
        let (normal, w) = if n_len_sq > 1e-16 {
            (n / n_len_sq.sqrt(), n / n_len_sq)
        } else {
            (Vec3::ZERO, Vec3::ZERO)
        };

        let bbox_diagonal1 = Aabb::from_points(q, q + u + v);
        let bbox_diagonal2 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d: normal.dot(q),
            material,
            bbox: Aabb::surrounding(&bbox_diagonal1, &bbox_diagonal2),
        }
    }

    /// Accept a planar hit when both local coordinates fall inside [0, 1].
    fn is_interior(alpha: f64, beta: f64) -> bool {
        let unit_interval = Interval::new(0.0, 1.0);
        unit_interval.contains(alpha) && unit_interval.contains(beta)
    }
}

impl Hittable for Quad {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane, or degenerate quad
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let planar_hitpt_vector = ray.at(t) - self.q;
        let alpha = self.w.dot(planar_hitpt_vector.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt_vector));

        if !Self::is_interior(alpha, beta) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, &*self.material, alpha, beta))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// The closed box with opposite corners `a` and `b`, as six quads.
pub fn cuboid(a: Point3, b: Point3, material: Arc<dyn Material>) -> HittableList {
    let mut sides = HittableList::new();

    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    // front, right, back, left, top, bottom
    let faces = [
        (Point3::new(min.x, min.y, max.z), dx, dy),
        (Point3::new(max.x, min.y, max.z), -dz, dy),
        (Point3::new(max.x, min.y, min.z), -dx, dy),
        (Point3::new(min.x, min.y, min.z), dz, dy),
        (Point3::new(min.x, max.y, max.z), dx, -dz),
        (Point3::new(min.x, min.y, min.z), dx, dz),
    ];

    for (q, u, v) in faces {
        sides.add(Quad::new(q, u, v, material.clone()));
    }

    sides
}
