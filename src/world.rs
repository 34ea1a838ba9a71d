use std::sync::Arc;

use crate::color::Color;
use crate::consts::VACUUM_RI;
use crate::light::Light;
use crate::material::Material;
use crate::ray::Ray;
use crate::shape::Primitive;
use crate::texture::Texture;

/// A world with objects and light.
///
/// Worlds own every entity built for a scene: primitives, lights, and the
/// materials and textures they reference. A world is assembled once and only
/// read while rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub objects: Vec<Primitive>,
    pub lights: Vec<Light>,
    pub materials: Vec<Arc<Material>>,
    pub textures: Vec<Arc<Texture>>,

    /// Color of pixels whose camera ray escapes the scene.
    pub background: Color,

    /// Refractive index of the medium camera rays start in.
    pub atmosphere: f64,
}

impl Default for World {
    fn default() -> World {
        World {
            objects: Vec::new(),
            lights: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            background: Color::black(),
            atmosphere: VACUUM_RI,
        }
    }
}

impl World {
    /// Creates an empty world with a black background in vacuum.
    pub fn new() -> World {
        Default::default()
    }

    pub fn add_object(&mut self, object: Primitive) -> &mut World {
        self.objects.push(object);
        self
    }

    pub fn add_light(&mut self, light: Light) -> &mut World {
        self.lights.push(light);
        self
    }

    /// Takes ownership of a material, returning a shared handle to it.
    pub fn add_material(&mut self, material: Material) -> Arc<Material> {
        let material = Arc::new(material);
        self.materials.push(Arc::clone(&material));
        material
    }

    /// Takes ownership of a texture, returning a shared handle to it.
    pub fn add_texture(&mut self, texture: Texture) -> Arc<Texture> {
        let texture = Arc::new(texture);
        self.textures.push(Arc::clone(&texture));
        texture
    }

    /// Finds the nearest visible object hit by `ray`.
    ///
    /// Every object is tested. On an exact tie the object added first wins.
    pub fn collide(&self, ray: &Ray) -> Option<(f64, &Primitive)> {
        let mut nearest: Option<(f64, &Primitive)> = None;

        for obj in self.objects.iter().filter(|o| o.visible) {
            if let Some(t) = obj.collide(ray) {
                match nearest {
                    Some((best, _)) if !(t < best) => {},
                    _ => nearest = Some((t, obj)),
                }
            }
        }

        nearest
    }
}

#[cfg(test)]
use crate::vector::Vector3;

#[cfg(test)]
fn two_spheres_in_a_row() -> World {
    let mut w = World::new();
    w.add_object(Primitive::sphere(Vector3::new(0.0, 0.0, 20.0), 1.0))
        .add_object(Primitive::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0));
    w
}

#[test]
fn empty_world_has_no_collisions() {
    let w = World::new();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert!(w.collide(&r).is_none());
    assert_eq!(w.background, Color::black());
    assert_eq!(w.atmosphere, 1.0);
}

#[test]
fn collide_picks_nearest_object() {
    let w = two_spheres_in_a_row();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    let (t, obj) = w.collide(&r).expect("Ray should hit a sphere.");
    assert_eq!(t, 9.0);
    assert!(std::ptr::eq(obj, &w.objects[1]));
}

#[test]
fn collide_misses_everything() {
    let w = two_spheres_in_a_row();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    assert!(w.collide(&r).is_none());
}

#[test]
fn collide_keeps_first_object_on_ties() {
    let mut w = World::new();
    w.add_object(Primitive::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0))
        .add_object(Primitive::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0));
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    let (_, obj) = w.collide(&r).unwrap();
    assert!(std::ptr::eq(obj, &w.objects[0]));
}

#[test]
fn collide_skips_invisible_objects() {
    let mut w = two_spheres_in_a_row();
    w.objects[1].visible = false;
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    let (t, obj) = w.collide(&r).unwrap();
    assert_eq!(t, 19.0);
    assert!(std::ptr::eq(obj, &w.objects[0]));
}

#[test]
fn added_materials_are_shared() {
    let mut w = World::new();
    let m = w.add_material(Default::default());
    w.add_object(Primitive::new(
        crate::shape::Shape::sphere(Vector3::zero(), 1.0), Arc::clone(&m)));

    assert_eq!(w.materials.len(), 1);
    assert!(Arc::ptr_eq(&w.objects[0].material, &w.materials[0]));
}
