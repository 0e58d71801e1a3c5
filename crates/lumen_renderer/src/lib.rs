//! Lumen Renderer - CPU Monte Carlo path tracing.
//!
//! Scenes are assembled from [`Hittable`] primitives (spheres, quads, boxes,
//! volumes and their instanced transforms), usually wrapped in a [`BvhNode`],
//! and rendered through a validated [`Camera`] into an [`ImageBuffer`].

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod medium;
mod quad;
mod renderer;
mod sphere;
mod transform;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{AxisSelector, BvhNode, FixedAxis, LongestAxis, RandomAxis};
pub use camera::{Camera, CameraConfig};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult,
};
pub use medium::ConstantMedium;
pub use quad::{cuboid, Quad};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render, render_pixel, render_with_progress,
    ImageBuffer, ScanlineSink,
};
pub use sphere::Sphere;
pub use transform::{RotateY, Translate};

/// Re-export the math and texture types scenes are built from
pub use lumen_core::{CheckerTexture, ImageTexture, SolidColor, Texture};
pub use lumen_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
