//! Reflection, refraction and degeneracy helpers on `Vec3`.

use crate::Vec3;

/// Extra predicates glam does not provide.
pub trait Vec3Ext {
    /// True when every component is within `1e-8` of zero.
    fn near_zero(&self) -> bool;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn near_zero(&self) -> bool {
        let s = 1e-8;
        self.x.abs() < s && self.y.abs() < s && self.z.abs() < s
    }
}

/// Mirror `v` about the plane with unit normal `n`: `v - 2 (v . n) n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with unit normal `n`
/// (pointing against `uv`), where `etai_over_etat` is the index ratio.
///
/// Callers must rule out total internal reflection first; the parallel term
/// takes the absolute value so a violated precondition cannot yield NaN.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
