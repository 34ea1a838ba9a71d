use std::fmt;

use log::info;

use crate::camera::{ Camera, View };
use crate::canvas::Drawable;
use crate::color::Color;
use crate::consts::{ AA_SIZE, DEFAULT_MAX_DEPTH };
use crate::material::{ Filter, Property };
use crate::ray::Ray;
use crate::vector::Vector3;
use crate::world::World;

/// Counts of secondary rays cast during a render.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RayStats {
    pub shadow: u64,
    pub reflected: u64,
    pub refracted: u64,
}

impl RayStats {
    pub fn total(&self) -> u64 {
        self.shadow + self.reflected + self.refracted
    }
}

impl fmt::Display for RayStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "reflected={} refracted={} shadow={} all={}",
            self.reflected, self.refracted, self.shadow, self.total())
    }
}

/// A recursive (Whitted) ray tracer over a borrowed world and camera.
///
/// The tracer never mutates the world. Per-render diagnostics are returned
/// from `render` instead of being kept in the tracer.
#[derive(Copy, Clone, Debug)]
pub struct Raytracer<'a> {
    pub world: &'a World,
    pub camera: &'a Camera,

    /// Cast `AA_SIZE * AA_SIZE` rays per pixel and average them.
    pub antialiasing: bool,

    /// Recursion depth past which no reflected or refracted rays are cast.
    pub max_depth: usize,
}

impl<'a> Raytracer<'a> {
    pub fn new(world: &'a World, camera: &'a Camera) -> Raytracer<'a> {
        Raytracer {
            world,
            camera,
            antialiasing: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn antialiasing(mut self, antialiasing: bool) -> Raytracer<'a> {
        self.antialiasing = antialiasing;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Raytracer<'a> {
        self.max_depth = max_depth;
        self
    }

    /// Sums the light reaching `point`.
    ///
    /// Returns the diffuse and the specular light. Ambient lights always add
    /// to the diffuse light. A point light contributes nothing if anything at
    /// all lies along the ray towards it, even beyond the light itself.
    pub fn trace_lights(&self, point: Vector3, normal: &Vector3,
        reflected: &Ray, shininess: f64, stats: &mut RayStats)
        -> (Color, Color) {
        let mut diffuse = Color::black();
        let mut specular = Color::black();

        for light in self.world.lights.iter() {
            let position = match light.position() {
                Some(p) => p,
                None => {
                    diffuse = diffuse + light.color();
                    continue;
                },
            };

            stats.shadow += 1;
            let to_light = Ray::from_points(point, position);
            if self.world.collide(&to_light).is_some() {
                continue;
            }

            let light_dir = to_light.direction;
            let diffuse_coeff = normal.dot(&light_dir);
            let specular_coeff = if shininess > 0.0 {
                reflected.direction.dot(&light_dir).max(0.0).powf(shininess)
            } else {
                0.0
            };

            diffuse = diffuse + light.color() * diffuse_coeff;
            specular = specular + light.color() * specular_coeff;
        }

        (diffuse, specular)
    }

    /// Traces a ray through the world.
    ///
    /// `index` is the refractive index of the medium the ray travels in.
    /// Returns `None` when the ray escapes the world. Secondary rays that
    /// escape contribute black, never the background.
    pub fn trace(&self, ray: &Ray, depth: usize, index: f64,
        stats: &mut RayStats) -> Option<Color> {
        let (t, obj) = self.world.collide(ray)?;

        let point = ray.point_at(t);
        let normal = obj.normal_at(point);

        // Shading treats the incoming direction as a unit vector.
        let incoming = Ray::new(ray.origin, ray.direction.normalize());
        let reflected = incoming.reflect(&normal, point);

        let obj_diffuse = obj.color_at(point, Filter::Diffuse);
        let obj_specular = obj.color_at(point, Filter::Specular);
        let obj_reflect = obj.color_at(point, Filter::Reflect);
        let obj_refract = obj.color_at(point, Filter::Refract);
        let shininess = obj.property(Property::Shininess);
        let obj_index = obj.property(Property::Index);

        let (diffuse, specular) =
            self.trace_lights(point, &normal, &reflected, shininess, stats);

        let mut reflect = Color::black();
        let mut refract = Color::black();

        if depth < self.max_depth {
            if !obj_reflect.is_black() {
                stats.reflected += 1;
                reflect = self.trace(&reflected, depth + 1, index, stats)
                    .unwrap_or_else(Color::black);
            }

            if !obj_refract.is_black() {
                // Hitting a surface of the medium we're in means leaving it.
                let (normal, into) = if obj_index == index {
                    (-normal, self.world.atmosphere)
                } else {
                    (normal, obj_index)
                };

                if let Some(r) = incoming.refract(&normal, point, index, into) {
                    stats.refracted += 1;
                    refract = self.trace(&r, depth + 1, into, stats)
                        .unwrap_or_else(Color::black);
                }
            }
        }

        let specular = if shininess > 0.0 {
            (specular * obj_specular).pow(shininess)
        } else {
            Color::black()
        };

        Some(diffuse * obj_diffuse
            + specular
            + reflect * obj_reflect
            + refract * obj_refract)
    }

    /// Traces the camera ray through view pixel `(x, y)`, falling back to the
    /// background color.
    fn sample(&self, view: &View, x: usize, y: usize,
        stats: &mut RayStats) -> Color {
        self.trace(&view.at(x, y), 0, self.world.atmosphere, stats)
            .unwrap_or(self.world.background)
    }

    /// Renders the world onto `target`, one color per pixel.
    pub fn render(&self, target: &mut dyn Drawable) -> RayStats {
        let width = target.width();
        let height = target.height();
        let mut stats = RayStats::default();

        info!("Rendering {}x{} (antialiasing: {}, max depth: {})",
            width, height, self.antialiasing, self.max_depth);

        if self.antialiasing {
            let view = self.camera.create_view(width * AA_SIZE,
                height * AA_SIZE);
            let mut samples = Vec::with_capacity(AA_SIZE * AA_SIZE);

            for y in 0..height {
                for x in 0..width {
                    samples.clear();
                    for aa_x in 0..AA_SIZE {
                        for aa_y in 0..AA_SIZE {
                            samples.push(self.sample(&view,
                                x * AA_SIZE + aa_x, y * AA_SIZE + aa_y,
                                &mut stats));
                        }
                    }

                    target.put_pixel(x, y, Color::mean(&samples));
                }
            }
        } else {
            let view = self.camera.create_view(width, height);

            for y in 0..height {
                for x in 0..width {
                    let color = self.sample(&view, x, y, &mut stats);
                    target.put_pixel(x, y, color);
                }
            }
        }

        info!("Rays: {}", stats);
        stats
    }
}

#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use crate::canvas::Canvas;
#[cfg(test)]
use crate::light::Light;
#[cfg(test)]
use crate::material::{ self, Material };
#[cfg(test)]
use crate::shape::{ Primitive, Shape };
#[cfg(test)]
use crate::texture::{ self, Texture };

#[cfg(test)]
fn mirror_and_glass_world() -> World {
    let mut w = World::new();
    let mirror = w.add_material(Material {
        reflect: texture::white(),
        ..Material::with_diffuse(texture::gray())
    });

    w.add_object(Primitive::new(
            Shape::plane(Vector3::new(0.0, 1.0, 0.0), -1.0), mirror))
        .add_object(Primitive::new(
            Shape::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0), material::glass()))
        .add_light(Light::point(Vector3::new(3.0, 10.0, 7.0), Color::white()))
        .add_light(Light::ambient(Color::rgb(0.05, 0.05, 0.05)));
    w
}

#[test]
fn depth_zero_casts_no_secondary_rays() {
    let w = mirror_and_glass_world();
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, -0.2, 1.0),
        crate::camera::fov_from_degrees(60.0), None);
    let mut canvas = Canvas::new(8, 8);

    let stats = Raytracer::new(&w, &c).max_depth(0).render(&mut canvas);

    assert_eq!(stats.reflected, 0);
    assert_eq!(stats.refracted, 0);
    assert!(stats.shadow > 0);

    let stats = Raytracer::new(&w, &c).max_depth(3).render(&mut canvas);
    assert!(stats.reflected > 0);
    assert!(stats.refracted > 0);
}

#[test]
fn tracing_is_deterministic() {
    let w = mirror_and_glass_world();
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.05, -0.02, 1.0));

    let mut s1 = RayStats::default();
    let mut s2 = RayStats::default();
    let c1 = rt.trace(&r, 0, w.atmosphere, &mut s1).unwrap();
    let c2 = rt.trace(&r, 0, w.atmosphere, &mut s2).unwrap();

    assert_eq!(c1.r.to_bits(), c2.r.to_bits());
    assert_eq!(c1.g.to_bits(), c2.g.to_bits());
    assert_eq!(c1.b.to_bits(), c2.b.to_bits());
    assert_eq!(s1, s2);
}

#[test]
fn antialiasing_keeps_constant_scene_unchanged() {
    let mut w = World::new();
    let m = w.add_material(Material::with_diffuse(texture::gray()));
    w.add_object(Primitive::new(Shape::sphere(Vector3::zero(), 100.0), m))
        .add_light(Light::ambient(Color::gray()));
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0),
        crate::camera::fov_from_degrees(45.0), None);

    let mut plain = Canvas::new(6, 4);
    let mut smooth = Canvas::new(6, 4);
    Raytracer::new(&w, &c).render(&mut plain);
    Raytracer::new(&w, &c).antialiasing(true).render(&mut smooth);

    for y in 0..4 {
        for x in 0..6 {
            assert_eq!(plain.read_pixel(x, y).unwrap(),
                Color::rgb(0.25, 0.25, 0.25));
            assert_eq!(plain.read_pixel(x, y), smooth.read_pixel(x, y));
        }
    }
}

#[test]
fn small_render_produces_valid_colors() {
    let mut w = World::new();
    let floor = w.add_texture(Texture::checked(Color::white(), Color::black()));
    let floor = w.add_material(Material::with_diffuse(floor));
    w.add_object(Primitive::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0))
        .add_object(Primitive::new(
            Shape::plane(Vector3::new(0.0, 1.0, 0.0), -1.0), floor))
        .add_light(Light::point(Vector3::new(3.0, 10.0, 7.0), Color::white()))
        .add_light(Light::ambient(Color::rgb(0.05, 0.05, 0.05)));
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0),
        crate::camera::fov_from_degrees(45.0), None);
    let mut canvas = Canvas::new(4, 4);

    Raytracer::new(&w, &c).render(&mut canvas);

    for y in 0..4 {
        for x in 0..4 {
            assert!(canvas.read_pixel(x, y).unwrap().is_valid());
        }
    }
}

#[test]
fn escaped_rays_show_background() {
    let mut w = World::new();
    w.background = Color::blue();
    let c: Camera = Default::default();
    let mut canvas = Canvas::new(3, 2);

    let stats = Raytracer::new(&w, &c).antialiasing(true).render(&mut canvas);

    assert_eq!(stats.total(), 0);
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(canvas.read_pixel(x, y).unwrap(), Color::blue());
        }
    }
}

#[test]
fn escaped_reflections_are_black_not_background() {
    let mut w = World::new();
    w.background = Color::white();
    let mirror = w.add_material(Material {
        diffuse: texture::black(),
        specular: texture::black(),
        reflect: texture::white(),
        ..Default::default()
    });
    w.add_object(Primitive::new(
        Shape::plane(Vector3::new(0.0, 1.0, 0.0), 0.0), mirror));
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 1.0));

    let mut stats = RayStats::default();
    let color = rt.trace(&r, 0, w.atmosphere, &mut stats);

    assert_eq!(color, Some(Color::black()));
    assert_eq!(stats.reflected, 1);
}

#[test]
fn reflections_pick_up_mirrored_objects() {
    let mut w = World::new();
    let mirror = w.add_material(Material {
        diffuse: texture::black(),
        specular: texture::black(),
        reflect: texture::white(),
        ..Default::default()
    });
    let lit = w.add_material(Material::with_diffuse(texture::green()));
    w.add_object(Primitive::new(
            Shape::plane(Vector3::new(0.0, 1.0, 0.0), 0.0), mirror))
        .add_object(Primitive::new(
            Shape::sphere(Vector3::new(0.0, 5.0, 10.0), 1.0), lit))
        .add_light(Light::ambient(Color::white()));
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);

    // Hits the floor at (0, 0, 5) and bounces straight at the sphere.
    let r = Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 1.0));
    let mut stats = RayStats::default();

    assert_eq!(rt.trace(&r, 0, w.atmosphere, &mut stats), Some(Color::green()));
}

#[test]
fn occluded_point_light_adds_nothing() {
    let mut w = World::new();
    w.add_object(Primitive::sphere(Vector3::new(0.0, 5.0, 0.0), 1.0))
        .add_light(Light::point(Vector3::new(0.0, 10.0, 0.0), Color::white()));
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);

    let up = Vector3::new(0.0, 1.0, 0.0);
    let reflected = Ray::new(Vector3::zero(), up);
    let mut stats = RayStats::default();

    let (diffuse, specular) =
        rt.trace_lights(Vector3::zero(), &up, &reflected, 12.0, &mut stats);
    assert!(diffuse.is_black());
    assert!(specular.is_black());
    assert_eq!(stats.shadow, 1);

    // Off to the side the light is visible again.
    let side = Vector3::new(5.0, 0.0, 0.0);
    let (diffuse, _) =
        rt.trace_lights(side, &up, &reflected, 12.0, &mut stats);
    assert!(!diffuse.is_black());
}

#[test]
fn objects_behind_the_light_still_shadow() {
    let mut w = World::new();
    w.add_object(Primitive::sphere(Vector3::new(0.0, 20.0, 0.0), 1.0))
        .add_light(Light::point(Vector3::new(0.0, 10.0, 0.0), Color::white()));
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);

    let up = Vector3::new(0.0, 1.0, 0.0);
    let mut stats = RayStats::default();
    let (diffuse, _) = rt.trace_lights(Vector3::zero(), &up,
        &Ray::new(Vector3::zero(), up), 12.0, &mut stats);

    assert!(diffuse.is_black());
}

#[test]
fn ambient_light_is_never_shadowed() {
    let mut w = World::new();
    w.add_object(Primitive::sphere(Vector3::new(0.0, 5.0, 0.0), 1.0))
        .add_light(Light::ambient(Color::gray()));
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);

    let up = Vector3::new(0.0, 1.0, 0.0);
    let mut stats = RayStats::default();
    let (diffuse, specular) = rt.trace_lights(Vector3::zero(), &up,
        &Ray::new(Vector3::zero(), up), 12.0, &mut stats);

    assert_eq!(diffuse, Color::gray());
    assert!(specular.is_black());
    assert_eq!(stats.shadow, 0);
}

#[test]
fn refracted_ray_passes_through_glass() {
    let mut w = World::new();
    let clear = w.add_material(Material {
        diffuse: texture::black(),
        specular: texture::black(),
        refract: texture::white(),
        index: 1.5,
        ..Default::default()
    });
    let backdrop = w.add_material(Material::with_diffuse(texture::blue()));
    w.add_object(Primitive::new(
            Shape::sphere(Vector3::new(0.0, 0.0, 5.0), 1.0), Arc::clone(&clear)))
        .add_object(Primitive::new(
            Shape::plane(Vector3::new(0.0, 0.0, -1.0), -20.0), backdrop))
        .add_light(Light::ambient(Color::white()));
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);

    // Straight through the center: in, out, then onto the blue backdrop.
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let mut stats = RayStats::default();

    assert_eq!(rt.trace(&r, 0, w.atmosphere, &mut stats), Some(Color::blue()));
    assert_eq!(stats.refracted, 2);
}

#[test]
fn grazing_exit_from_glass_is_totally_reflected() {
    let mut w = World::new();
    let clear = w.add_material(Material {
        diffuse: texture::black(),
        specular: texture::black(),
        refract: texture::white(),
        index: 1.5,
        ..Default::default()
    });
    w.add_object(Primitive::new(Shape::sphere(Vector3::zero(), 1.0), clear));
    let c: Camera = Default::default();
    let rt = Raytracer::new(&w, &c);

    // From inside the sphere, meeting its surface at ~64 degrees.
    let grazing = Ray::new(Vector3::new(0.0, 0.9, 0.0), Vector3::new(1.0, 0.0, 0.0));
    let mut stats = RayStats::default();

    assert_eq!(rt.trace(&grazing, 0, 1.5, &mut stats), Some(Color::black()));
    assert_eq!(stats.refracted, 0);
    assert_eq!(stats.reflected, 0);

    // Head-on the ray leaves the glass.
    let head_on = Ray::new(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0));
    let mut stats = RayStats::default();

    rt.trace(&head_on, 0, 1.5, &mut stats);
    assert_eq!(stats.refracted, 1);
}
