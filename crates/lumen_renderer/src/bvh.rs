//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree built once by median splits along a chosen axis. Each
//! subtree is exclusively owned by its parent, and the tree is never
//! mutated after construction, so it can be shared across render threads.

use std::cmp::Ordering;

use crate::{HitRecord, Hittable, HittableList, RenderError, RenderResult};
use lumen_math::{Aabb, Interval, Ray};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Chooses the axis (0 = X, 1 = Y, 2 = Z) a node's primitives are sorted on.
pub trait AxisSelector {
    fn select_axis(&mut self, objects: &[Box<dyn Hittable>]) -> usize;
}

/// Picks a uniformly random axis per node.
pub struct RandomAxis<R: RngCore = StdRng> {
    rng: R,
}

impl<R: RngCore> RandomAxis<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomAxis<StdRng> {
    /// Reproducible tree shapes for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: RngCore> AxisSelector for RandomAxis<R> {
    fn select_axis(&mut self, _objects: &[Box<dyn Hittable>]) -> usize {
        self.rng.gen_range(0..3)
    }
}

/// Picks the axis along which the primitives' centroids are most spread out.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestAxis;

impl AxisSelector for LongestAxis {
    fn select_axis(&mut self, objects: &[Box<dyn Hittable>]) -> usize {
        let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, obj| {
            let c = obj.bounding_box().centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        centroid_bounds.longest_axis()
    }
}

/// Always splits along the same axis.
#[derive(Debug, Clone, Copy)]
pub struct FixedAxis(pub usize);

impl AxisSelector for FixedAxis {
    fn select_axis(&mut self, _objects: &[Box<dyn Hittable>]) -> usize {
        self.0.min(2)
    }
}

/// BVH node.
///
/// A node over a single primitive is a `Leaf`. Two primitives become the two
/// children of a `Branch` directly; larger sets become nested nodes.
pub enum BvhNode {
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
    Branch {
        left: Box<dyn Hittable>,
        right: Box<dyn Hittable>,
        bbox: Aabb,
    },
}

/// Shape statistics gathered during construction, for logging.
#[derive(Debug, Default)]
struct BuildStats {
    nodes: usize,
    max_depth: usize,
}

impl BvhNode {
    /// Build a BVH choosing a random split axis per node.
    ///
    /// Fails on an empty list.
    pub fn new(objects: Vec<Box<dyn Hittable>>) -> RenderResult<Self> {
        Self::with_axis_selector(objects, &mut RandomAxis::from_entropy())
    }

    /// Build a BVH from all objects of a list.
    pub fn from_list(list: HittableList) -> RenderResult<Self> {
        Self::new(list.into_objects())
    }

    /// Build a BVH with an explicit split policy.
    pub fn with_axis_selector(
        objects: Vec<Box<dyn Hittable>>,
        selector: &mut dyn AxisSelector,
    ) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let count = objects.len();
        let mut stats = BuildStats::default();
        let root = Self::build(objects, selector, 1, &mut stats);

        log::debug!(
            "Built BVH over {} primitives: {} nodes, depth {}",
            count,
            stats.nodes,
            stats.max_depth
        );

        Ok(root)
    }

    /// Recursive median-split construction. `objects` is never empty here.
    fn build(
        mut objects: Vec<Box<dyn Hittable>>,
        selector: &mut dyn AxisSelector,
        depth: usize,
        stats: &mut BuildStats,
    ) -> Self {
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);

        if objects.len() == 1 {
            let object = objects.remove(0);
            let bbox = object.bounding_box();
            return BvhNode::Leaf { object, bbox };
        }

        let axis = selector.select_axis(&objects);
        objects.sort_by(|a, b| box_compare(a.as_ref(), b.as_ref(), axis));

        let (left, right): (Box<dyn Hittable>, Box<dyn Hittable>) = if objects.len() == 2 {
            let right = objects.remove(1);
            let left = objects.remove(0);
            (left, right)
        } else {
            let mid = objects.len() / 2;
            let right_objects = objects.split_off(mid);
            (
                Box::new(Self::build(objects, selector, depth + 1, stats)),
                Box::new(Self::build(right_objects, selector, depth + 1, stats)),
            )
        };

        let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
        BvhNode::Branch { left, right, bbox }
    }
}

/// Order two primitives by the minimum of their boxes along `axis`.
fn box_compare(a: &dyn Hittable, b: &dyn Hittable, axis: usize) -> Ordering {
    let a_min = a.bounding_box().axis_interval(axis).min;
    let b_min = b.bounding_box().axis_interval(axis).min;
    // Total order, so boxes with NaN bounds cannot upset the sort
    a_min.total_cmp(&b_min)
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                object.hit(ray, ray_t, rng)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t, rng);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cuboid, Lambertian, Material, Quad, Sphere};
    use lumen_math::{gen_range, random_unit_vector, random_vec, Color, Point3, Vec3};
    use std::sync::Arc;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::splat(0.5)))
    }

    /// Random spheres and quads; calling twice with the same seed yields the same scene.
    fn random_scene(seed: u64, count: usize) -> Vec<Box<dyn Hittable>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let material = gray();

        (0..count)
            .map(|i| {
                let center = random_vec(&mut rng, -20.0, 20.0);
                if i % 4 == 0 {
                    let u = random_vec(&mut rng, -3.0, 3.0);
                    let v = random_vec(&mut rng, -3.0, 3.0);
                    Box::new(Quad::new(center, u, v, material.clone())) as Box<dyn Hittable>
                } else {
                    let radius = gen_range(&mut rng, 0.2, 2.0);
                    Box::new(Sphere::new(center, radius, material.clone())) as Box<dyn Hittable>
                }
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty_is_an_error() {
        assert!(matches!(BvhNode::new(vec![]), Err(RenderError::EmptyScene)));
        assert!(matches!(
            BvhNode::from_list(HittableList::new()),
            Err(RenderError::EmptyScene)
        ));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, gray());
        let bvh = BvhNode::new(vec![Box::new(sphere)]).unwrap();
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_bvh_two_primitives_are_direct_children() {
        let objects: Vec<Box<dyn Hittable>> = vec![
            Box::new(Sphere::new(Point3::new(3.0, 0.0, 0.0), 0.5, gray())),
            Box::new(Sphere::new(Point3::new(-3.0, 0.0, 0.0), 0.5, gray())),
        ];
        let bvh = BvhNode::with_axis_selector(objects, &mut FixedAxis(0)).unwrap();

        match &bvh {
            BvhNode::Branch { left, right, .. } => {
                assert!(left.bounding_box().x.max < right.bounding_box().x.min);
            }
            BvhNode::Leaf { .. } => panic!("expected a branch"),
        }
        assert_eq!(bvh.bounding_box().x, Interval::new(-3.5, 3.5));
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<Box<dyn Hittable>> = (0..10)
            .map(|i| {
                Box::new(Sphere::new(Point3::new(i as f64, 0.0, -5.0), 0.5, gray()))
                    as Box<dyn Hittable>
            })
            .collect();
        let bvh = BvhNode::with_axis_selector(spheres, &mut RandomAxis::seeded(3)).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Point3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();

        // Sphere at z = -5 with radius 0.5
        assert!((rec.p.z - (-4.5)).abs() < 1e-9);
    }

    #[test]
    fn test_bvh_box_encloses_every_primitive() {
        let objects = random_scene(21, 64);
        let boxes: Vec<Aabb> = objects.iter().map(|o| o.bounding_box()).collect();
        let bvh = BvhNode::with_axis_selector(objects, &mut LongestAxis).unwrap();

        for b in &boxes {
            assert!(bvh.bounding_box().encloses(b));
        }
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let selectors: Vec<Box<dyn AxisSelector>> = vec![
            Box::new(RandomAxis::seeded(1)),
            Box::new(LongestAxis),
            Box::new(FixedAxis(2)),
        ];

        for (scene_seed, mut selector) in selectors.into_iter().enumerate() {
            let scene_seed = scene_seed as u64 + 100;
            let bvh = BvhNode::with_axis_selector(random_scene(scene_seed, 150), selector.as_mut())
                .unwrap();
            let list: HittableList = random_scene(scene_seed, 150).into_iter().collect();

            let mut rng = StdRng::seed_from_u64(scene_seed);
            let interval = Interval::new(0.001, f64::INFINITY);
            let mut hits = 0;

            for _ in 0..2000 {
                let origin = random_vec(&mut rng, -30.0, 30.0);
                let ray = Ray::new_simple(origin, random_unit_vector(&mut rng));

                let expected = list.hit(&ray, interval, &mut rng).map(|rec| rec.t);
                let actual = bvh.hit(&ray, interval, &mut rng).map(|rec| rec.t);

                match (expected, actual) {
                    (Some(e), Some(a)) => {
                        hits += 1;
                        assert!((e - a).abs() < 1e-9, "brute force t={} bvh t={}", e, a);
                    }
                    (None, None) => {}
                    other => panic!("mismatch between brute force and BVH: {:?}", other),
                }
            }

            assert!(hits > 100, "too few hits ({}) to be meaningful", hits);
        }
    }

    #[test]
    fn test_bvh_tolerates_nan_primitives() {
        let centers: Vec<Point3> = (0..64)
            .map(|i| {
                let x = if i % 5 == 0 { f64::NAN } else { (i % 8) as f64 * 3.0 };
                Point3::new(x, (i / 8) as f64 * 3.0, -10.0)
            })
            .collect();
        let scene = || -> Vec<Box<dyn Hittable>> {
            centers
                .iter()
                .map(|&c| Box::new(Sphere::new(c, 1.0, gray())) as Box<dyn Hittable>)
                .collect()
        };

        let selectors: Vec<Box<dyn AxisSelector>> = vec![
            Box::new(FixedAxis(0)),
            Box::new(LongestAxis),
            Box::new(RandomAxis::seeded(9)),
        ];

        for mut selector in selectors {
            let bvh = BvhNode::with_axis_selector(scene(), selector.as_mut()).unwrap();
            let list: HittableList = scene().into_iter().collect();
            let mut rng = StdRng::seed_from_u64(4);
            let interval = Interval::new(0.001, f64::INFINITY);

            for (i, target) in centers.iter().enumerate() {
                if target.x.is_nan() {
                    continue;
                }
                let ray = Ray::new_simple(Point3::new(target.x, target.y, 0.0), -Vec3::Z);
                let expected = list.hit(&ray, interval, &mut rng).map(|rec| rec.t);
                let actual = bvh.hit(&ray, interval, &mut rng).map(|rec| rec.t);

                assert!(expected.is_some(), "sphere {} should be visible", i);
                assert_eq!(expected, actual);
            }
        }
    }

    #[test]
    fn test_bvh_nests_inside_lists() {
        let mut world = HittableList::new();
        let boxes = cuboid(Point3::ZERO, Point3::ONE, gray());
        world.add(BvhNode::from_list(boxes).unwrap());
        world.add(Sphere::new(Point3::new(0.5, 0.5, 5.0), 0.5, gray()));

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Point3::new(0.5, 0.5, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = world
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 4.5).abs() < 1e-9);

        let past_sphere = Ray::new_simple(Point3::new(0.5, 0.5, 4.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = world
            .hit(&past_sphere, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 3.0).abs() < 1e-9);
    }
}
