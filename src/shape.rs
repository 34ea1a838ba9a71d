use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::color::Color;
use crate::consts::NEAREST_COLLISION;
use crate::material::{ self, Filter, Material, Property };
use crate::ray::Ray;
use crate::vector::Vector3;

/// The geometry of a primitive.
///
/// The set of shapes is closed, so shapes are a plain enum dispatched with
/// `match` in the collision loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    /// A sphere (ball, really) around `center`.
    Sphere { center: Vector3, radius: f64 },

    /// An infinite plane of points `p` with `dot(normal, p) == distance`.
    ///
    /// `normal` should be a unit vector.
    Plane { normal: Vector3, distance: f64 },
}

impl Shape {
    pub fn sphere(center: Vector3, radius: f64) -> Shape {
        Shape::Sphere { center, radius }
    }

    pub fn plane(normal: Vector3, distance: f64) -> Shape {
        Shape::Plane { normal, distance }
    }

    /// Finds the nearest collision of `ray` with this shape.
    ///
    /// Returns the ray offset `t` of the collision. Only collisions strictly
    /// further than `NEAREST_COLLISION` along the ray count, which keeps rays
    /// leaving a surface from hitting that same surface again.
    pub fn collide(&self, ray: &Ray) -> Option<f64> {
        match *self {
            Shape::Sphere { center, radius } =>
                Self::collide_sphere(center, radius, ray),
            Shape::Plane { normal, distance } =>
                Self::collide_plane(normal, distance, ray),
        }
    }

    /// Solves `|O + tD - C|^2 = R^2` for `t`.
    fn collide_sphere(center: Vector3, radius: f64, ray: &Ray) -> Option<f64> {
        let v = ray.origin - center;
        let denominator = 2.0 * ray.direction.square_length();
        let a = 2.0 * v.dot(&ray.direction);
        let delta = a * a
            - 2.0 * denominator * (v.square_length() - radius * radius);

        // A tangent ray (delta == 0) doesn't count as a hit.
        if !(delta > 0.0) {
            return None;
        }

        let b = delta.sqrt();
        let first = (-a - b) / denominator;
        let second = (-a + b) / denominator;

        if first > NEAREST_COLLISION {
            Some(first)
        } else if second > NEAREST_COLLISION {
            Some(second)
        } else {
            None
        }
    }

    fn collide_plane(normal: Vector3, distance: f64, ray: &Ray) -> Option<f64> {
        let t = (-normal.dot(&ray.origin) + distance)
            / normal.dot(&ray.direction);

        // A ray parallel to the plane divides by zero; never a hit.
        if t.is_finite() && t > NEAREST_COLLISION {
            Some(t)
        } else {
            None
        }
    }

    /// The surface normal at `point`, which should lie on the surface.
    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        match *self {
            Shape::Sphere { center, .. } => (point - center).normalize(),
            Shape::Plane { normal, .. } => normal,
        }
    }

    /// Maps a surface point to texture coordinates `(u, v)`.
    ///
    /// Planes use `(x, z)` directly, which is only meaningful for horizontal
    /// planes. Spheres use a latitude/longitude mapping into `[0, 1]`.
    pub fn uv_at(&self, point: Vector3) -> (f64, f64) {
        match *self {
            Shape::Plane { .. } => (point.x, point.z),
            Shape::Sphere { center, radius } => {
                let w = (point - center) / radius;

                let v = w.y.clamp(-1.0, 1.0).acos() / PI;

                // At the poles every longitude is the same point.
                let ring = (PI * v).sin();
                let h = if ring.abs() < 1e-12 {
                    0.0
                } else {
                    (w.x / ring).clamp(-1.0, 1.0).acos()
                };

                let u = if w.y > 0.0 {
                    h / 2.0 / PI
                } else {
                    (PI + h) / 2.0 / PI
                };

                (u, v)
            },
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Shape::Sphere { center, radius } =>
                write!(f, "[Sphere center={} radius={}]", center, radius),
            Shape::Plane { normal, distance } =>
                write!(f, "[Plane normal={} distance={}]", normal, distance),
        }
    }
}

/// A renderable object: a shape with a (shared) material.
///
/// Invisible primitives are kept in the world but never collide with rays.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub material: Arc<Material>,
    pub visible: bool,
}

impl Primitive {
    pub fn new(shape: Shape, material: Arc<Material>) -> Primitive {
        Primitive { shape, material, visible: true }
    }

    /// A sphere with the red library material.
    pub fn sphere(center: Vector3, radius: f64) -> Primitive {
        Primitive::new(Shape::sphere(center, radius), material::red())
    }

    /// A plane with the red library material.
    pub fn plane(normal: Vector3, distance: f64) -> Primitive {
        Primitive::new(Shape::plane(normal, distance), material::red())
    }

    pub fn collide(&self, ray: &Ray) -> Option<f64> {
        self.shape.collide(ray)
    }

    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        self.shape.normal_at(point)
    }

    pub fn uv_at(&self, point: Vector3) -> (f64, f64) {
        self.shape.uv_at(point)
    }

    /// The color of one material channel at a surface point.
    pub fn color_at(&self, point: Vector3, filter: Filter) -> Color {
        self.material.color_at(filter, self.uv_at(point))
    }

    pub fn property(&self, property: Property) -> f64 {
        self.material.property(property)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.shape, self.material)
    }
}

#[test]
fn ray_hits_sphere_in_front() {
    let s = Shape::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    let t = s.collide(&r).expect("Ray should hit the sphere.");
    assert_eq!(t, 9.0);
    assert_eq!(r.point_at(t), Vector3::new(0.0, 0.0, 9.0));
}

#[test]
fn ray_misses_sphere() {
    let s = Shape::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(s.collide(&r), None);
}

#[test]
fn ray_tangent_to_sphere_misses() {
    let s = Shape::sphere(Vector3::new(0.0, 1.0, 5.0), 1.0);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(s.collide(&r), None);
}

#[test]
fn ray_inside_sphere_hits_far_side() {
    let s = Shape::sphere(Vector3::zero(), 1.0);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(s.collide(&r), Some(1.0));
}

#[test]
fn sphere_behind_ray_is_not_hit() {
    let s = Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(s.collide(&r), None);
}

#[test]
fn ray_leaving_sphere_surface_ignores_itself() {
    let s = Shape::sphere(Vector3::zero(), 1.0);
    let r = Ray::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(s.collide(&r), None);
}

#[test]
fn sphere_collision_point_lies_on_surface() {
    let center = Vector3::new(0.5, -1.0, 7.0);
    let radius = 2.5;
    let s = Shape::sphere(center, radius);

    for &(dx, dy) in &[(0.0, 0.0), (0.1, 0.05), (-0.2, 0.1), (0.15, -0.3)] {
        let r = Ray::new(Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(dx, dy, 1.0).normalize());
        if let Some(t) = s.collide(&r) {
            let d = (r.point_at(t) - center).length();
            assert!((d - radius).abs() < 1e-6);
        }
    }
}

#[test]
fn ray_hits_plane_from_above() {
    let p = Shape::plane(Vector3::new(0.0, 1.0, 0.0), 0.0);
    let r = Ray::new(Vector3::new(0.0, 3.0, 0.0), Vector3::new(0.0, -0.5, 2.0));

    let t = p.collide(&r).expect("Ray should hit the plane.");
    assert_eq!(r.point_at(t), Vector3::new(0.0, 0.0, 12.0));
}

#[test]
fn plane_collision_point_satisfies_plane_equation() {
    let normal = Vector3::new(0.0, 1.0, 1.0).normalize();
    let distance = -2.0;
    let p = Shape::plane(normal, distance);
    let r = Ray::new(Vector3::new(1.0, 2.0, 3.0),
        Vector3::new(0.2, -1.0, -0.4).normalize());

    let t = p.collide(&r).expect("Ray should hit the plane.");
    assert!((normal.dot(&r.point_at(t)) - distance).abs() < 1e-6);
}

#[test]
fn ray_parallel_to_plane_misses() {
    let p = Shape::plane(Vector3::new(0.0, 1.0, 0.0), 0.0);
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(p.collide(&r), None);
}

#[test]
fn ray_pointing_away_from_plane_misses() {
    let p = Shape::plane(Vector3::new(0.0, 1.0, 0.0), 0.0);
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(p.collide(&r), None);
}

#[test]
fn normal_on_sphere() {
    let s = Shape::sphere(Vector3::new(0.0, 1.0, 0.0), 2.0);

    assert_eq!(s.normal_at(Vector3::new(2.0, 1.0, 0.0)),
        Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(s.normal_at(Vector3::new(0.0, 3.0, 0.0)),
        Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn normal_on_plane_is_constant() {
    let n = Vector3::new(0.0, 1.0, 0.0);
    let p = Shape::plane(n, -1.0);

    assert_eq!(p.normal_at(Vector3::new(10.0, -1.0, -5.0)), n);
    assert_eq!(p.normal_at(Vector3::new(-3.0, -1.0, 42.0)), n);
}

#[test]
fn plane_uv_uses_x_and_z() {
    let p = Shape::plane(Vector3::new(0.0, 1.0, 0.0), -1.0);

    assert_eq!(p.uv_at(Vector3::new(1.5, -1.0, -2.5)), (1.5, -2.5));
}

#[test]
fn sphere_uv_is_in_unit_square() {
    let s = Shape::sphere(Vector3::new(1.0, 2.0, 3.0), 2.0);
    let points = [
        Vector3::new(3.0, 2.0, 3.0),
        Vector3::new(1.0, 4.0, 3.0),
        Vector3::new(1.0, 0.0, 3.0),
        Vector3::new(1.0, 2.0, 5.0),
        Vector3::new(1.0 + 2f64.sqrt(), 2.0 - 2f64.sqrt(), 3.0),
    ];

    for p in points.iter() {
        let (u, v) = s.uv_at(*p);
        assert!(u.is_finite() && v.is_finite());
        assert!((0.0..=1.0).contains(&u));
        assert!((0.0..=1.0).contains(&v));
    }

    // The top pole maps to v == 0, the bottom pole to v == 1.
    assert_eq!(s.uv_at(Vector3::new(1.0, 4.0, 3.0)).1, 0.0);
    assert_eq!(s.uv_at(Vector3::new(1.0, 0.0, 3.0)).1, 1.0);
}

#[test]
fn primitive_resolves_material_colors() {
    let p = Primitive::new(
        Shape::plane(Vector3::new(0.0, 1.0, 0.0), 0.0),
        Arc::new(Material::with_diffuse(Arc::new(
            crate::texture::Texture::checked(Color::white(), Color::black())
        ))),
    );

    assert_eq!(p.color_at(Vector3::new(0.25, 0.0, 0.25), Filter::Diffuse),
        Color::white());
    assert_eq!(p.color_at(Vector3::new(0.75, 0.0, 0.25), Filter::Diffuse),
        Color::black());
    assert_eq!(p.property(Property::Shininess), 12.0);
    assert!(p.visible);
}
