use std::path::PathBuf;

use whitted_tracer::canvas::{ Canvas, Drawable };
use whitted_tracer::color::Color;
use whitted_tracer::demo;
use whitted_tracer::raytracer::Raytracer;
use whitted_tracer::scene::Scene;

fn assert_all_valid(canvas: &Canvas) {
    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            let c = canvas.read_pixel(x, y).unwrap();
            assert!(c.is_valid(), "Pixel ({}, {}) is {}", x, y, c);
        }
    }
}

#[test]
fn render_first_demo() {
    let scene = demo::demo(1).unwrap();
    let mut canvas = Canvas::new(32, 24);

    let stats = Raytracer::new(&scene.world, &scene.camera).render(&mut canvas);

    assert_all_valid(&canvas);
    assert!(stats.shadow > 0);
    assert!(stats.reflected > 0);
    assert_eq!(stats.refracted, 0);

    // The sphere sits dead ahead, and it's red.
    let center = canvas.read_pixel(16, 12).unwrap();
    assert!(center.r > center.g && center.r > center.b);
}

#[test]
fn render_second_demo_with_antialiasing() {
    let scene = demo::demo(2).unwrap();
    let mut canvas = Canvas::new(16, 12);

    let stats = Raytracer::new(&scene.world, &scene.camera)
        .antialiasing(true)
        .render(&mut canvas);

    assert_all_valid(&canvas);
    assert!(stats.refracted > 0);
    assert!(stats.reflected > 0);
}

#[test]
fn rendering_twice_gives_the_same_image() {
    let scene = demo::demo(2).unwrap();
    let tracer = Raytracer::new(&scene.world, &scene.camera);

    let mut first = Canvas::new(12, 9);
    let mut second = Canvas::new(12, 9);
    let s1 = tracer.render(&mut first);
    let s2 = tracer.render(&mut second);

    assert_eq!(first, second);
    assert_eq!(s1, s2);
}

#[test]
fn load_and_render_scene_file() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("spheres.json");
    let scene = Scene::load(&path).unwrap();

    assert_eq!(scene.world.objects.len(), 5);
    assert_eq!(scene.world.lights.len(), 3);
    assert_eq!(scene.world.materials.len(), 4);
    assert_eq!(scene.world.background, Color::rgb(0.02, 0.02, 0.1));

    let mut canvas = Canvas::new(20, 15);
    let stats = Raytracer::new(&scene.world, &scene.camera)
        .max_depth(3)
        .render(&mut canvas);

    assert_all_valid(&canvas);
    assert!(stats.total() > 0);
}

#[test]
fn save_png_and_ppm() {
    let scene = demo::demo(1).unwrap();
    let mut canvas = Canvas::new(8, 6);
    Raytracer::new(&scene.world, &scene.camera).render(&mut canvas);

    let dir = std::env::temp_dir()
        .join(format!("whitted-tracer-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let png = dir.join("demo.png");
    canvas.save(&png).unwrap();
    let bytes = std::fs::read(&png).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");

    let ppm = dir.join("demo.ppm");
    canvas.save(&ppm).unwrap();
    let text = std::fs::read_to_string(&ppm).unwrap();
    assert!(text.starts_with("P3\n8 6\n255\n"));

    std::fs::remove_dir_all(&dir).unwrap();
}
