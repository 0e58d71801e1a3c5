//! Homogeneous participating media (fog, smoke, subsurface-ish glass fill).

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::{Isotropic, Material};
use lumen_core::Texture;
use lumen_math::{gen_f64, Aabb, Color, Interval, Ray, Vec3};
use rand::RngCore;

/// A volume of constant density bounded by a convex hittable.
///
/// Instead of integrating transmittance, each query samples a free-flight
/// distance from the exponential distribution and reports a scattering event
/// there if it falls before the ray leaves the boundary.
pub struct ConstantMedium {
    boundary: Box<dyn Hittable>,
    neg_inv_density: f64,
    phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    /// Medium with an isotropic phase function of the given color.
    pub fn new(boundary: impl Hittable + 'static, density: f64, albedo: Color) -> Self {
        Self::with_phase_function(boundary, density, Arc::new(Isotropic::new(albedo)))
    }

    /// Medium whose isotropic albedo comes from a texture.
    pub fn from_texture(
        boundary: impl Hittable + 'static,
        density: f64,
        texture: Arc<dyn Texture>,
    ) -> Self {
        Self::with_phase_function(boundary, density, Arc::new(Isotropic::from_texture(texture)))
    }

    fn with_phase_function(
        boundary: impl Hittable + 'static,
        density: f64,
        phase_function: Arc<dyn Material>,
    ) -> Self {
        Self {
            boundary: Box::new(boundary),
            neg_inv_density: -1.0 / density.max(0.0),
            phase_function,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Entry and exit along the whole line, then clipped to the query range
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + 0.0001, f64::INFINITY), rng)?;

        let t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        let t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;

        // u in (0, 1] keeps the logarithm finite
        let u = 1.0 - gen_f64(rng);
        let hit_distance = self.neg_inv_density * u.ln();

        // Also rejects NaN from a zero-length direction
        if !(hit_distance <= distance_inside_boundary) {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            // Arbitrary: the isotropic phase function ignores orientation
            normal: Vec3::X,
            material: &*self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}
