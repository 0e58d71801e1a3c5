//! Textures: color lookup by surface parameterization.
//!
//! Textures are shared read-only between materials (`Arc<dyn Texture>`), so
//! every implementation is `Send + Sync` and never mutates on lookup.

use std::sync::Arc;

use lumen_math::{Color, Interval, Point3};
use thiserror::Error;

/// Errors that can occur while building a texture from pixel data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A color source evaluated at a hit point.
pub trait Texture: Send + Sync {
    /// Color at surface coordinates `(u, v)` and world position `p`.
    fn value(&self, u: f64, v: f64, p: Point3) -> Color;
}

/// A constant color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn from_rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::new(Color::new(red, green, blue))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Point3) -> Color {
        self.albedo
    }
}

/// A 3D checkerboard alternating between two textures.
///
/// Cells are cubes of side `scale` in world space, so the pattern does not
/// depend on the surface parameterization.
pub struct CheckerTexture {
    inv_scale: f64,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(scale: f64, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    pub fn from_colors(scale: f64, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        let cell = (self.inv_scale * p).floor();
        let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);

        if parity == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// A texture backed by an already-decoded image.
///
/// Pixels are stored as linear colors, row-major, with row 0 at the top of
/// the image. Lookups use nearest-pixel sampling; `(u, v)` outside [0, 1]
/// is clamped to the border.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageTexture {
    /// Build from linear pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyImage { width, height });
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from an 8-bit sRGB image, converting to linear color.
    pub fn from_rgb_image(img: &image::RgbImage) -> TextureResult<Self> {
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| {
                Color::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        let texture = Self::new(width, height, pixels)?;
        log::debug!("Created image texture ({}x{})", width, height);
        Ok(texture)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Point3) -> Color {
        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        // Flip V to image coordinates
        let v = 1.0 - unit.clamp(v);

        let x = ((u * self.width as f64) as u32).min(self.width - 1);
        let y = ((v * self.height as f64) as u32).min(self.height - 1);

        self.pixel(x, y)
    }
}

/// Convert an sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f64 {
    let v = value as f64 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> ImageTexture {
        // Top row: red, green. Bottom row: blue, white.
        ImageTexture::new(
            2,
            2,
            vec![
                Color::new(1.0, 0.0, 0.0),
                Color::new(0.0, 1.0, 0.0),
                Color::new(0.0, 0.0, 1.0),
                Color::ONE,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_solid_color_ignores_inputs() {
        let tex = SolidColor::from_rgb(1.0, 0.5, 0.0);
        assert_eq!(tex.value(0.3, 0.9, Point3::new(4.0, 5.0, 6.0)), Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(-3.0, 7.0, Point3::ZERO), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates_between_cells() {
        let tex = CheckerTexture::from_colors(1.0, Color::ZERO, Color::ONE);

        assert_eq!(tex.value(0.0, 0.0, Point3::new(0.5, 0.5, 0.5)), Color::ZERO);
        assert_eq!(tex.value(0.0, 0.0, Point3::new(1.5, 0.5, 0.5)), Color::ONE);
        assert_eq!(tex.value(0.0, 0.0, Point3::new(-0.5, 0.5, 0.5)), Color::ONE);
        assert_eq!(tex.value(0.0, 0.0, Point3::new(1.5, 1.5, 0.5)), Color::ZERO);
    }

    #[test]
    fn test_image_texture_lookup() {
        let tex = two_by_two();

        // v = 1 is the top row
        assert_eq!(tex.value(0.25, 0.75, Point3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.75, 0.75, Point3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.25, 0.25, Point3::ZERO), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.value(1.0, 0.0, Point3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_texture_clamps_out_of_range_coordinates() {
        let tex = two_by_two();

        assert_eq!(tex.value(-4.0, 9.0, Point3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(3.0, -2.0, Point3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_texture_rejects_bad_buffers() {
        assert_eq!(
            ImageTexture::new(0, 4, vec![]).unwrap_err(),
            TextureError::EmptyImage { width: 0, height: 4 }
        );
        assert_eq!(
            ImageTexture::new(2, 2, vec![Color::ZERO; 3]).unwrap_err(),
            TextureError::BufferSize { expected: 4, actual: 3 }
        );
    }

    #[test]
    fn test_from_rgb_image_converts_to_linear() {
        let img = image::RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([255, 0, 128])
            } else {
                image::Rgb([0, 0, 0])
            }
        });

        let tex = ImageTexture::from_rgb_image(&img).unwrap();
        assert_eq!((tex.width(), tex.height()), (2, 1));

        let c = tex.value(0.0, 0.5, Point3::ZERO);
        assert!((c.x - 1.0).abs() < 1e-9);
        assert_eq!(c.y, 0.0);
        // Mid-gray is darker in linear
        assert!(c.z > 0.1 && c.z < 0.5);
    }

    #[test]
    fn test_decoded_png_builds_texture() {
        let img = image::RgbImage::from_fn(4, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        let mut encoded = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut encoded, image::ImageFormat::Png)
            .unwrap();

        let decoded = image::load_from_memory(encoded.get_ref()).unwrap().to_rgb8();
        let tex = ImageTexture::from_rgb_image(&decoded).unwrap();

        assert_eq!((tex.width(), tex.height()), (4, 2));
        // v = 1 is the top row, whose first pixel is white
        let white = tex.value(0.0, 1.0, Point3::ZERO);
        assert!((white - Color::ONE).abs().max_element() < 1e-9);
        assert_eq!(tex.value(0.3, 1.0, Point3::ZERO), Color::ZERO);
    }

    #[test]
    fn test_empty_rgb_image_is_rejected() {
        let img = image::RgbImage::new(0, 0);
        assert!(ImageTexture::from_rgb_image(&img).is_err());
    }
}
