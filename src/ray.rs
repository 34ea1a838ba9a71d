use std::fmt;

use crate::vector::Vector3;

/// A ray, starting at `origin` and heading along `direction`.
///
/// Rays are immutable once built; reflecting or refracting one produces a
/// new ray starting at the collision point.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Ray origin={} direction={}]", self.origin, self.direction)
    }
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    /// Creates a ray from `source` through `destination`, with a normalized
    /// direction.
    pub fn from_points(source: Vector3, destination: Vector3) -> Ray {
        Ray {
            origin: source,
            direction: (destination - source).normalize(),
        }
    }

    /// The point at offset `t` along the ray.
    pub fn point_at(&self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }

    /// Mirrors the ray about `normal`, starting the new ray at `point`.
    ///
    /// `normal` must be a unit vector.
    pub fn reflect(&self, normal: &Vector3, point: Vector3) -> Ray {
        let d = self.direction;
        Ray {
            origin: point,
            direction: d - *normal * (2.0 * normal.dot(&d)),
        }
    }

    /// Bends the ray through a surface according to Snell's law.
    ///
    /// `index_from` is the refractive index of the medium the ray is
    /// travelling in, `index_into` the index of the medium it enters. `normal`
    /// must be a unit vector facing against the ray.
    ///
    /// Returns `None` on total internal reflection, when no transmitted ray
    /// exists.
    pub fn refract(&self, normal: &Vector3, point: Vector3,
        index_from: f64, index_into: f64) -> Option<Ray> {
        let d = self.direction;
        let n = index_from / index_into;
        let c1 = -normal.dot(&d);
        let radicand = 1.0 - n * n * (1.0 - c1 * c1);

        if radicand < 0.0 {
            return None;
        }

        let c2 = radicand.sqrt();
        let c3 = n * c1 - c2;

        Some(Ray {
            origin: point,
            direction: d * n + *normal * c3,
        })
    }
}

#[test]
fn point_along_ray() {
    let r = Ray::new(Vector3::new(2.0, 3.0, 4.0), Vector3::new(1.0, 0.0, 0.0));

    assert_eq!(r.point_at(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.point_at(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.point_at(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.point_at(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn point_at_ten_along_z() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(r.point_at(10.0), Vector3::new(0.0, 0.0, 10.0));
}

#[test]
fn ray_from_points_is_normalized() {
    let r = Ray::from_points(Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(1.0, 5.0, 1.0));

    assert_eq!(r.origin, Vector3::new(1.0, 1.0, 1.0));
    assert_eq!(r.direction, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn reflect_45() {
    let r = Ray::new(Vector3::new(-1.0, 1.0, 0.0), Vector3::new(1.0, -1.0, 0.0));
    let n = Vector3::new(0.0, 1.0, 0.0);
    let p = Vector3::zero();
    let reflected = r.reflect(&n, p);

    assert_eq!(reflected.origin, p);
    assert_eq!(reflected.direction, Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn reflection_preserves_angle_of_incidence() {
    let n = Vector3::new(0.0, 1.0, 0.0);
    let incoming = Vector3::new(0.3, -0.8, 0.52).normalize();
    let r = Ray::new(Vector3::new(0.0, 5.0, 0.0), incoming);
    let reflected = r.reflect(&n, Vector3::zero());

    assert!((n.dot(&reflected.direction) + n.dot(&incoming)).abs() < 1e-9);

    // Reflecting twice about the same normal restores the direction.
    let back = reflected.reflect(&n, Vector3::zero());
    assert_eq!(back.direction, incoming);
}

#[test]
fn refract_along_normal_passes_straight() {
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
    let n = Vector3::new(0.0, 1.0, 0.0);
    let refracted = r.refract(&n, Vector3::zero(), 1.0, 1.5)
        .expect("Head-on refraction should always transmit.");

    assert_eq!(refracted.direction, Vector3::new(0.0, -1.0, 0.0));
}

#[test]
fn refract_bends_towards_normal_when_entering_denser_medium() {
    let incoming = Vector3::new(1.0, -1.0, 0.0).normalize();
    let r = Ray::new(Vector3::new(-1.0, 1.0, 0.0), incoming);
    let n = Vector3::new(0.0, 1.0, 0.0);
    let refracted = r.refract(&n, Vector3::zero(), 1.0, 1.5).unwrap();

    // Snell: sin(theta_t) = sin(theta_i) / 1.5
    let sin_t = refracted.direction.normalize().x;
    assert!((sin_t - (0.5f64.sqrt() / 1.5)).abs() < 1e-9);
    assert!(refracted.direction.y < 0.0);
}

#[test]
fn refract_total_internal_reflection_has_no_ray() {
    // Grazing exit from glass into vacuum.
    let incoming = Vector3::new(1.0, -0.2, 0.0).normalize();
    let r = Ray::new(Vector3::zero(), incoming);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(r.refract(&n, Vector3::zero(), 1.6, 1.0), None);
}
