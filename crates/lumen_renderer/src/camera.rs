//! Camera configuration and ray generation.

use crate::{RenderError, RenderResult, DEFAULT_BUCKET_SIZE};
use lumen_math::{gen_f64, gen_range, random_in_unit_disk, Color, Point3, Ray, Vec3, Vec3Ext};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// User-facing camera and render settings.
///
/// Every field has a default, so partial JSON documents deserialize cleanly.
/// Call [`CameraConfig::build`] to validate and get an immutable [`Camera`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Ratio of image width over height
    pub aspect_ratio: f64,
    /// Rendered image width in pixels
    pub image_width: u32,
    /// Explicit height; derived from the aspect ratio when absent
    pub image_height: Option<u32>,
    /// Random samples for each pixel
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces into the scene
    pub max_depth: u32,
    /// Scene background color
    pub background: Color,

    /// Vertical view angle (field of view) in degrees
    pub vfov: f64,
    /// Point the camera is looking from
    pub look_from: Point3,
    /// Point the camera is looking at
    pub look_at: Point3,
    /// Camera-relative "up" direction
    pub vup: Vec3,

    /// Variation angle of rays through each pixel, in degrees
    pub defocus_angle: f64,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f64,

    /// Shutter interval sampled for motion blur
    pub shutter_open: f64,
    pub shutter_close: f64,

    /// Seed for reproducible renders
    pub seed: Option<u64>,
    /// Side of the square work units handed to render threads
    pub bucket_size: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            image_height: None,
            samples_per_pixel: 10,
            max_depth: 10,
            background: Color::ZERO,
            vfov: 90.0,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            shutter_open: 0.0,
            shutter_close: 1.0,
            seed: None,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl CameraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width plus aspect ratio; the height is derived.
    pub fn with_image(mut self, image_width: u32, aspect_ratio: f64) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self.image_height = None;
        self
    }

    /// Explicit resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = Some(height);
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, defocus_angle: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_shutter(mut self, open: f64, close: f64) -> Self {
        self.shutter_open = open;
        self.shutter_close = close;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Image height after applying the aspect ratio, before validation.
    fn resolved_height(&self) -> RenderResult<u32> {
        match self.image_height {
            Some(0) => Err(RenderError::ZeroImageHeight),
            Some(height) => Ok(height),
            None => {
                if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
                    return Err(RenderError::InvalidAspectRatio(self.aspect_ratio));
                }
                Ok(((self.image_width as f64 / self.aspect_ratio) as u32).max(1))
            }
        }
    }

    /// Validate the settings and precompute the viewport.
    pub fn build(&self) -> RenderResult<Camera> {
        if self.image_width == 0 {
            return Err(RenderError::ZeroImageWidth);
        }
        let image_height = self.resolved_height()?;
        if self.samples_per_pixel == 0 {
            return Err(RenderError::ZeroSamples);
        }
        if self.bucket_size == 0 {
            return Err(RenderError::ZeroBucketSize);
        }

        let center = self.look_from;

        // Viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f64 / image_height as f64);

        // Camera basis; degenerate views fall back to a valid frame
        let view = self.look_from - self.look_at;
        let w = if view.near_zero() { Vec3::Z } else { view.normalize() };
        let side = self.vup.cross(w);
        let u = if side.near_zero() {
            w.any_orthonormal_vector()
        } else {
            side.normalize()
        };
        let v = w.cross(u);

        // Vectors across the horizontal and down the vertical viewport edges
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / self.image_width as f64;
        let pixel_delta_v = viewport_v / image_height as f64;

        let viewport_upper_left = center - self.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();

        log::debug!(
            "Camera {}x{} looking from {:?} to {:?}, vfov {}",
            self.image_width,
            image_height,
            self.look_from,
            self.look_at,
            self.vfov
        );

        Ok(Camera {
            image_width: self.image_width,
            image_height,
            samples_per_pixel: self.samples_per_pixel,
            max_depth: self.max_depth,
            background: self.background,
            defocus_angle: self.defocus_angle,
            shutter_open: self.shutter_open,
            shutter_close: self.shutter_close,
            seed: self.seed,
            bucket_size: self.bucket_size,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            samples_scale: 1.0 / self.samples_per_pixel as f64,
        })
    }
}

/// Validated, immutable camera that generates primary rays.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    background: Color,
    defocus_angle: f64,
    shutter_open: f64,
    shutter_close: f64,
    seed: Option<u64>,
    bucket_size: u32,

    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    samples_scale: f64,
}

impl Camera {
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn bucket_size(&self) -> u32 {
        self.bucket_size
    }

    /// Scale factor averaging the per-pixel samples (1 / samples_per_pixel).
    pub fn samples_scale(&self) -> f64 {
        self.samples_scale
    }

    /// Camera ray through a random point of pixel (i, j).
    ///
    /// The ray starts on the defocus disk (or the camera center when defocus
    /// is off) and carries a random time inside the shutter interval.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);
        let pixel_sample = self.pixel00_loc
            + (i as f64 + offset.x) * self.pixel_delta_u
            + (j as f64 + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_range(rng, self.shutter_open, self.shutter_close);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Random offset in the square [-0.5, 0.5) x [-0.5, 0.5).
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f64(rng) - 0.5, gen_f64(rng) - 0.5, 0.0)
}
