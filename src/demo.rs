use std::sync::Arc;

use crate::camera::{ self, Camera };
use crate::color::Color;
use crate::light::Light;
use crate::material::{ self, Material };
use crate::scene::Scene;
use crate::shape::{ Primitive, Shape };
use crate::texture::{ self, Texture };
use crate::vector::Vector3;
use crate::world::World;

/// Numbers accepted by `demo`.
pub const DEMOS: [u32; 2] = [1, 2];

/// Builds one of the built-in demo scenes by number.
pub fn demo(which: u32) -> Option<Scene> {
    match which {
        1 => Some(mirror_floor()),
        2 => Some(glass_spheres()),
        _ => None,
    }
}

fn default_lights(world: &mut World) {
    world.add_light(Light::point(Vector3::new(3.0, 10.0, 7.0), Color::white()))
        .add_light(Light::ambient(Color::rgb(0.05, 0.05, 0.05)));
}

fn floor(material: Arc<Material>) -> Primitive {
    Primitive::new(Shape::plane(Vector3::new(0.0, 1.0, 0.0), -1.0), material)
}

/// A red sphere floating over a reflective checkerboard.
pub fn mirror_floor() -> Scene {
    let mut world = World::new();

    let dim = world.add_texture(Texture::plain(Color::rgb(0.2, 0.2, 0.2)));
    let checked = world.add_texture(
        Texture::checked(Color::white(), Color::black()));

    let sphere = world.add_material(Material {
        reflect: dim,
        ..Material::with_diffuse(texture::red())
    });
    let plane = world.add_material(Material {
        specular: texture::black(),
        reflect: texture::white(),
        ..Material::with_diffuse(checked)
    });

    world.add_object(Primitive::new(
            Shape::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0), sphere))
        .add_object(floor(plane));
    default_lights(&mut world);

    let camera = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0),
        camera::fov_from_degrees(45.0), None);

    Scene { world, camera }
}

/// Two glass spheres in front of a finely checked one, over a dark floor.
pub fn glass_spheres() -> Scene {
    let mut world = World::new();

    let floor_tex = world.add_texture(
        Texture::checked(Color::black(), Color::rgb(0.8, 0.8, 0.8)));
    let fine = world.add_texture(
        Texture::checked_sized(Color::blue(), Color::red(), 0.2, 0.2, true));

    let matte = |diffuse| Material {
        specular: texture::black(),
        ..Material::with_diffuse(diffuse)
    };
    let checked = world.add_material(matte(fine));
    let plane = world.add_material(matte(floor_tex));

    world.add_object(Primitive::new(
            Shape::sphere(Vector3::new(1.0, 0.0, 8.0), 1.0), material::glass()))
        .add_object(Primitive::new(
            Shape::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0), checked))
        .add_object(Primitive::new(
            Shape::sphere(Vector3::new(-1.5, 0.0, 8.0), 1.0), material::glass()))
        .add_object(floor(plane));
    default_lights(&mut world);

    let camera = Camera::new(Vector3::new(-2.0, 3.0, -2.0),
        Vector3::new(0.2, -0.3, 1.0), camera::fov_from_degrees(45.0), None);

    Scene { world, camera }
}

#[test]
fn demos_by_number() {
    for n in DEMOS.iter() {
        assert!(demo(*n).is_some());
    }
    assert!(demo(0).is_none());
    assert!(demo(3).is_none());
}

#[test]
fn first_demo_contents() {
    let s = mirror_floor();

    assert_eq!(s.world.objects.len(), 2);
    assert_eq!(s.world.lights.len(), 2);
    assert_eq!(s.camera.up, Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(s.world.objects[0].color_at(Vector3::new(0.0, 0.0, 9.0),
        material::Filter::Reflect), Color::rgb(0.2, 0.2, 0.2));
}

#[test]
fn second_demo_shares_glass() {
    let s = glass_spheres();

    assert_eq!(s.world.objects.len(), 4);
    assert!(Arc::ptr_eq(&s.world.objects[0].material,
        &s.world.objects[2].material));
    assert_eq!(s.world.objects[0].material.index, crate::consts::GLASS_RI);
}
