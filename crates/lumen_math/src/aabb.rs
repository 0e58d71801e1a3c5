use crate::{Interval, Point3, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// One interval per axis. Boxes built through `new`/`from_points` are padded
/// so that no axis is thinner than `PAD_DELTA`, which keeps planar primitives
/// from being culled by the slab test.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Minimum thickness of any axis.
    pub const PAD_DELTA: f64 = 0.0001;

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };

    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Box spanning two opposite corners, in any order.
    pub fn from_points(a: Point3, b: Point3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Union of two boxes. Commutative and associative; `EMPTY` is the identity.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Interval for axis `n` (0 = X, 1 = Y, 2 = Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min_point(&self) -> Point3 {
        Point3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max_point(&self) -> Point3 {
        Point3::new(self.x.max, self.y.max, self.z.max)
    }

    /// The eight corner points.
    pub fn corners(&self) -> [Point3; 8] {
        let mut corners = [Point3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Point3::new(
                if i & 1 == 0 { self.x.min } else { self.x.max },
                if i & 2 == 0 { self.y.min } else { self.y.max },
                if i & 4 == 0 { self.z.min } else { self.z.max },
            );
        }
        corners
    }

    /// True when `other` lies entirely inside this box.
    pub fn encloses(&self, other: &Aabb) -> bool {
        self.x.encloses(&other.x) && self.y.encloses(&other.y) && self.z.encloses(&other.z)
    }

    /// Slab test against the ray within `ray_t`.
    ///
    /// A zero direction component leaves that axis unbounded when the origin
    /// lies inside the slab and misses otherwise; no NaN comparisons occur.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let origin = r.origin[axis];
            let direction = r.direction[axis];

            if direction == 0.0 {
                if !slab.contains(origin) {
                    return false;
                }
                continue;
            }

            let adinv = 1.0 / direction;
            let mut t0 = (slab.min - origin) * adinv;
            let mut t1 = (slab.max - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    fn pad_to_minimums(&mut self) {
        self.x = Self::pad_axis(self.x);
        self.y = Self::pad_axis(self.y);
        self.z = Self::pad_axis(self.z);
    }

    /// Widen a thin interval until its width, after rounding, reaches `PAD_DELTA`.
    fn pad_axis(interval: Interval) -> Interval {
        // Empty, unbounded and NaN intervals stay as they are
        if !interval.size().is_finite() {
            return interval;
        }

        let delta = Self::PAD_DELTA;
        let mut padding = delta;
        let mut padded = interval;
        while padded.size() < delta {
            padded = interval.expand(padding);
            padding *= 2.0;
        }
        padded
    }

    /// Box moved by `offset`.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::new(
            self.x.offset(offset.x),
            self.y.offset(offset.y),
            self.z.offset(offset.z),
        )
    }

    /// Index (0 = X, 1 = Y, 2 = Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    pub fn centroid(&self) -> Point3 {
        (self.min_point() + self.max_point()) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_range;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_box(rng: &mut StdRng) -> Aabb {
        let a = Point3::new(
            gen_range(rng, -10.0, 10.0),
            gen_range(rng, -10.0, 10.0),
            gen_range(rng, -10.0, 10.0),
        );
        let b = Point3::new(
            gen_range(rng, -10.0, 10.0),
            gen_range(rng, -10.0, 10.0),
            gen_range(rng, -10.0, 10.0),
        );
        Aabb::from_points(a, b)
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.x, Interval::new(0.0, 10.0));
        assert_eq!(aabb.y, Interval::new(0.0, 10.0));
        assert_eq!(aabb.z, Interval::new(0.0, 10.0));
    }

    #[test]
    fn test_aabb_flat_axis_is_padded() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 2.0));
        assert!(aabb.z.size() >= Aabb::PAD_DELTA);
        assert!(aabb.z.contains(2.0));
    }

    #[test]
    fn test_universe_encloses_and_catches_everything() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0e6), Vec3::splat(1.0e6));
        assert!(Aabb::UNIVERSE.encloses(&aabb));
        assert_eq!(Aabb::surrounding(&Aabb::UNIVERSE, &aabb), Aabb::UNIVERSE);

        let ray = Ray::new_simple(Point3::new(3.0, -7.0, 1.0e4), Vec3::new(0.2, 1.0, -0.5));
        assert!(Aabb::UNIVERSE.hit(&ray, Interval::new(0.001, f64::INFINITY)));
    }

    #[test]
    fn test_aabb_padding_survives_rounding_far_from_origin() {
        for coord in [2.0, 0.3, 12345.678, -98765.4321, 1.0e9] {
            let aabb = Aabb::from_points(Vec3::new(coord, 0.0, 0.0), Vec3::new(coord, 1.0, 1.0));
            assert!(aabb.x.size() >= Aabb::PAD_DELTA, "x = {}", coord);
            assert!(aabb.x.contains(coord));
        }
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.x, Interval::new(0.0, 10.0));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
    }

    #[test]
    fn test_aabb_union_laws() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            let c = random_box(&mut rng);

            let ab = Aabb::surrounding(&a, &b);
            assert_eq!(ab, Aabb::surrounding(&b, &a));
            assert_eq!(
                Aabb::surrounding(&ab, &c),
                Aabb::surrounding(&a, &Aabb::surrounding(&b, &c))
            );
            assert!(ab.encloses(&a));
            assert!(ab.encloses(&b));
        }
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Box beyond the allowed range
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_hit_zero_direction_on_slab_boundary() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);

        // Origin exactly on the x slab plane with no x motion.
        let grazing = Ray::new(Vec3::new(0.0, 0.5, -2.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(aabb.hit(&grazing, Interval::new(0.0, 10.0)));

        let outside = Ray::new(Vec3::new(2.0, 0.5, -2.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!aabb.hit(&outside, Interval::new(0.0, 10.0)));
    }

    #[test]
    fn test_aabb_corners_and_centroid() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));

        let corners = aabb.corners();
        assert!(corners.contains(&Vec3::ZERO));
        assert!(corners.contains(&Vec3::new(10.0, 0.0, 10.0)));
        assert!(corners.contains(&Vec3::new(10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_aabb_longest_axis() {
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).longest_axis(), 0);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).longest_axis(), 1);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).longest_axis(), 2);
    }

    #[test]
    fn test_aabb_translate() {
        let translated = Aabb::from_points(Vec3::ZERO, Vec3::ONE).translate(Vec3::new(5.0, 0.0, 0.0));

        assert_eq!(translated.x, Interval::new(5.0, 6.0));
        assert_eq!(translated.y, Interval::new(0.0, 1.0));
    }
}
