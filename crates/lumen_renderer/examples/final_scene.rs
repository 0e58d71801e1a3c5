//! Final scene demo.
//!
//! Green box terrain, emissive spheres, a row of image-textured spheres,
//! a glass ball filled with blue fog, a motion-blurred checker sphere and a
//! rotated cluster of small spheres, all seen through thin global haze.
//! Saves `final_scene.png`.
//!
//! Pass an image path to wrap it around the textured spheres:
//!
//! ```text
//! RUST_LOG=info cargo run --release --example final_scene -- eye.png
//! ```
//!
//! Without one, a generated eye pattern is used.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use lumen_renderer::{
    cuboid, render_with_progress, BvhNode, CameraConfig, CheckerTexture, Color, ConstantMedium,
    Dielectric, DiffuseLight, HittableList, ImageTexture, Lambertian, Material, Metal, Point3,
    RotateY, Sphere, Translate, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 2024;

fn main() -> Result<()> {
    env_logger::init();

    let start = std::time::Instant::now();
    let surface = load_surface(std::env::args().nth(1).as_deref())?;
    let world = build_scene(surface)?;
    log::info!("Scene built in {:?}", start.elapsed());

    let camera = CameraConfig::new()
        .with_image(400, 16.0 / 9.0)
        .with_quality(50, 20)
        .with_position(
            Point3::new(478.0, 278.0, -600.0),
            Point3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_background(Color::ZERO)
        .with_seed(SEED)
        .build()?;

    let total = lumen_renderer::generate_buckets(
        camera.image_width(),
        camera.image_height(),
        camera.bucket_size(),
    )
    .len();
    let done = AtomicUsize::new(0);

    let image = render_with_progress(&camera, &world, |_| {
        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        if finished % 16 == 0 || finished == total {
            log::info!("{}/{} buckets", finished, total);
        }
    });

    let filename = "final_scene.png";
    image.to_rgb8().save(filename)?;
    log::info!("Saved to {}", filename);

    Ok(())
}

/// Texture for the sphere row: a decoded image file, or a generated eye.
fn load_surface(path: Option<&str>) -> Result<ImageTexture> {
    let pixels = match path {
        Some(path) => {
            log::info!("Loading texture {}", path);
            image::open(path)?.to_rgb8()
        }
        None => eye_pattern(256, 128),
    };
    Ok(ImageTexture::from_rgb_image(&pixels)?)
}

/// Iris and pupil centred in a white sclera, in equirectangular layout.
fn eye_pattern(width: u32, height: u32) -> image::RgbImage {
    image::RgbImage::from_fn(width, height, |x, y| {
        let u = (x as f64 + 0.5) / width as f64 - 0.5;
        let v = (y as f64 + 0.5) / height as f64 - 0.5;
        let r = (u * u * 4.0 + v * v).sqrt();
        if r < 0.08 {
            image::Rgb([10, 10, 10])
        } else if r < 0.2 {
            image::Rgb([40, 110, 170])
        } else {
            image::Rgb([235, 230, 225])
        }
    })
}

fn build_scene(surface: ImageTexture) -> Result<HittableList> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut world = HittableList::new();

    // Floor and ceiling of boxes with random heights
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.48, 0.83, 0.53)));
    let mut boxes = HittableList::new();
    let boxes_per_side = 20;
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f64 * w;
            let z0 = -1000.0 + j as f64 * w;
            let y1 = rng.gen_range(1.0..101.0);
            let y3 = 555.0 - rng.gen_range(1.0..101.0);

            boxes.add(cuboid(
                Point3::new(x0, 0.0, z0),
                Point3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            ));
            boxes.add(cuboid(
                Point3::new(x0, 555.0, z0),
                Point3::new(x0 + w, y3, z0 + w),
                ground.clone(),
            ));
        }
    }
    world.add(BvhNode::from_list(boxes)?);

    // Lights
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(7.0)));
    let lights = [
        (Point3::new(-600.0, 70.0, 400.0), 50.0),
        (Point3::new(110.0, 110.0, 115.0), 70.0),
        (Point3::new(550.0, 120.0, 550.0), 20.0),
        (Point3::new(600.0, 80.0, 150.0), 40.0),
        (Point3::new(-600.0, 400.0, 400.0), 40.0),
        (Point3::new(110.0, 500.0, 300.0), 70.0),
        (Point3::new(550.0, 400.0, 800.0), 20.0),
        (Point3::new(600.0, 500.0, 150.0), 40.0),
    ];
    for (center, radius) in lights {
        world.add(Sphere::new(center, radius, light.clone()));
    }

    // A row of image-textured spheres
    let eye_surface: Arc<dyn Material> = Arc::new(Lambertian::from_texture(Arc::new(surface)));
    for k in 0..8 {
        let x = -500.0 + 200.0 * k as f64;
        let (y, z) = if k % 2 == 0 { (400.0, 1000.0) } else { (200.0, 800.0) };
        world.add(Sphere::new(Point3::new(x, y, z), 70.0, eye_surface.clone()));
    }

    let checker: Arc<dyn Material> = Arc::new(Lambertian::from_texture(Arc::new(
        CheckerTexture::from_colors(20.0, Color::new(0.9, 0.9, 0.9), Color::new(0.1, 0.1, 0.1)),
    )));

    // Glass and brushed metal
    world.add(Sphere::new(
        Point3::new(-100.0, 100.0, 200.0),
        60.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(Sphere::new(
        Point3::ZERO,
        40.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    ));

    // Moving sphere
    let center0 = Point3::new(-400.0, 300.0, 250.0);
    world.add(Sphere::moving(
        center0,
        center0 + Vec3::new(30.0, 0.0, 0.0),
        50.0,
        checker,
    ));

    // Glass ball filled with blue fog
    let boundary = Arc::new(Sphere::new(
        Point3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(boundary.clone());
    world.add(ConstantMedium::new(boundary, 0.2, Color::new(0.2, 0.4, 0.9)));

    // Thin haze over everything
    let haze = Sphere::new(Point3::ZERO, 5000.0, Arc::new(Dielectric::new(1.5)));
    world.add(ConstantMedium::new(haze, 0.0001, Color::ONE));

    // Cluster of small spheres, rotated and moved into place
    let crimson: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.9, 0.1, 0.3)));
    let cluster: HittableList = (0..1000)
        .map(|_| {
            let center = Point3::new(
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
            );
            Box::new(Sphere::new(center, 10.0, crimson.clone())) as Box<dyn lumen_renderer::Hittable>
        })
        .collect();
    world.add(Translate::new(
        RotateY::new(BvhNode::from_list(cluster)?, 15.0),
        Vec3::new(-500.0, 270.0, 395.0),
    ));

    log::info!("Scene has {} top-level objects", world.len());
    Ok(world)
}
