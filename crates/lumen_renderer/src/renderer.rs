//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a fixed depth budget
//! - Anti-aliasing via multi-sampling
//! - Bucket-parallel rendering with per-bucket random streams
//! - Gamma correction on output

use std::time::Instant;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::{Camera, Hittable};
use lumen_math::{Color, Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

/// Nearest accepted hit parameter along scene rays.
const T_MIN: f64 = 0.001;

/// Compute the color seen by a ray.
///
/// Returns black once the depth budget is exhausted and `background` when the
/// ray escapes the scene.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    background: Color,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f64::INFINITY), rng) else {
        return background;
    };

    let emission = rec.material.emitted(&rec);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, depth - 1, background, rng);
            emission + result.attenuation * scattered_color
        }
        // Absorbed or emissive-only surface
        None => emission,
    }
}

/// Average of the camera's samples through pixel (x, y), in linear color.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // With no bounce budget every path would be black; show the backdrop instead
    if camera.max_depth() == 0 {
        return camera.background();
    }

    let mut pixel_color = Color::ZERO;
    for _ in 0..camera.samples_per_pixel() {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth(), camera.background(), rng);
    }

    pixel_color * camera.samples_scale()
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize one linear channel to a byte.
#[inline]
fn channel_to_u8(linear: f64) -> u8 {
    (256.0 * linear_to_gamma(linear).clamp(0.0, 0.999)) as u8
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    [
        channel_to_u8(color.x),
        channel_to_u8(color.y),
        channel_to_u8(color.z),
    ]
}

/// Receives an image one row at a time, top row first.
pub trait ScanlineSink {
    /// `row` holds the pixels of row `y`, left to right.
    fn write_row(&mut self, y: u32, row: &[[u8; 3]]);
}

/// Flat row-major RGB bytes.
impl ScanlineSink for Vec<u8> {
    fn write_row(&mut self, _y: u32, row: &[[u8; 3]]) {
        self.extend(row.iter().flatten());
    }
}

impl ScanlineSink for Vec<[u8; 3]> {
    fn write_row(&mut self, _y: u32, row: &[[u8; 3]]) {
        self.extend_from_slice(row);
    }
}

/// Linear-color render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (row, chunk) in result.pixels.chunks(bucket.width as usize).enumerate() {
            let start = self.index(bucket.x, bucket.y + row as u32);
            self.pixels[start..start + chunk.len()].copy_from_slice(chunk);
        }
    }

    /// Gamma-corrected, clamped 8-bit copy of the image.
    pub fn to_rgb8(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(color_to_rgb8(self.get(x, y)))
        })
    }

    /// Stream quantized rows into `sink`, top to bottom.
    pub fn write_scanlines(&self, sink: &mut impl ScanlineSink) {
        let mut row = Vec::with_capacity(self.width as usize);
        for y in 0..self.height {
            row.clear();
            row.extend((0..self.width).map(|x| color_to_rgb8(self.get(x, y))));
            sink.write_row(y, &row);
        }
    }
}

/// Random stream for one bucket: reproducible when the camera carries a seed.
fn bucket_rng(seed: Option<u64>, bucket_index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(bucket_index as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Render the entire scene to an image buffer.
pub fn render(camera: &Camera, world: &dyn Hittable) -> ImageBuffer {
    render_with_progress(camera, world, |_| {})
}

/// Render the scene, calling `on_bucket` as each bucket finishes.
///
/// Buckets run in parallel, so the callback may be invoked from several
/// threads and in any order.
pub fn render_with_progress<F>(camera: &Camera, world: &dyn Hittable, on_bucket: F) -> ImageBuffer
where
    F: Fn(&BucketResult) + Sync,
{
    let width = camera.image_width();
    let height = camera.image_height();
    let buckets = generate_buckets(width, height, camera.bucket_size());

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {} ({} buckets)",
        width,
        height,
        camera.samples_per_pixel(),
        camera.max_depth(),
        buckets.len()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = bucket_rng(camera.seed(), bucket.index);
            let result = render_bucket(bucket, camera, world, &mut rng);
            log::debug!(
                "Bucket {} at ({}, {}) done",
                bucket.index,
                bucket.x,
                bucket.y
            );
            on_bucket(&result);
            result
        })
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Rendered in {:.2?}", start.elapsed());
    image
}
