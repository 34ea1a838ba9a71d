use std::fmt;

use log::debug;

use crate::ray::Ray;
use crate::vector::Vector3;

/// A camera record for generating rays.
///
/// This record gives a "frame" of the world: where the eye is, where it looks,
/// which way is up and how wide it can see. It holds no render state; each
/// render asks it for a `View` of the output resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vector3,
    pub direction: Vector3,

    /// Unit vector pointing to the top of the image.
    pub up: Vector3,

    /// The angle describing "how much" the camera can see, in radians.
    pub field_of_view: f64,
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new(
            Vector3::new(0.0, 1.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
            fov_from_degrees(45.0),
            None,
        )
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Camera position={} direction={} up={} fov={}]",
            self.position, self.direction, self.up, self.field_of_view)
    }
}

/// Converts an angle in degrees to radians.
pub fn fov_from_degrees(degrees: f64) -> f64 {
    degrees.to_radians()
}

impl Camera {
    /// Creates a camera.
    ///
    /// Without an explicit `up` vector one is derived from `direction`; see
    /// `auto_top`.
    pub fn new(position: Vector3, direction: Vector3, field_of_view: f64,
        up: Option<Vector3>) -> Camera {
        let up = match up {
            Some(u) => u.normalize(),
            None => auto_top(&direction),
        };

        Camera { position, direction, up, field_of_view }
    }

    /// Precomputes the world-space pixel basis for an output resolution.
    pub fn create_view(&self, x_res: usize, y_res: usize) -> View {
        let ratio = x_res as f64 / y_res as f64;
        let x_width = (self.field_of_view / 2.0).tan();
        let y_width = x_width / ratio;

        let x_dist = x_width / x_res as f64;
        let y_dist = y_width / y_res as f64;

        let x_step = self.up.cross(&self.direction).normalize() * x_dist;
        let y_step = self.up * y_dist;

        debug!("View {}x{}: world size {} x {}, pixel size {} x {}",
            x_res, y_res, x_width, y_width, x_dist, y_dist);

        View {
            x_step,
            y_step,
            x_res_half: x_res as f64 / 2.0,
            y_res_half: y_res as f64 / 2.0,
            position: self.position,
            direction: self.direction,
        }
    }
}

/// Derives an up vector orthogonal to `direction`, with no roll.
///
/// This is `+y` with its component along `direction` removed, so the result
/// lies in the plane spanned by `+y` and `direction`. It always points
/// upwards. For a (nearly) horizontal direction up is simply `+y`.
pub fn auto_top(direction: &Vector3) -> Vector3 {
    let Vector3 { x, y, z } = *direction;

    if y.abs() < 0.0001 {
        return Vector3::new(0.0, 1.0, 0.0);
    }

    let top = Vector3::new(x, -(z * z + x * x) / y, z).normalize();
    if top.y < 0.0 {
        -top
    } else {
        top
    }
}

/// A camera prepared for one output resolution.
///
/// Pixel `(x, y)` maps to a constant-time ray: the forward direction offset by
/// whole pixel steps from the image center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct View {
    pub x_step: Vector3,
    pub y_step: Vector3,
    pub x_res_half: f64,
    pub y_res_half: f64,
    pub position: Vector3,
    pub direction: Vector3,
}

impl View {
    /// The camera ray through pixel `(x, y)`.
    ///
    /// The direction is not normalized.
    pub fn at(&self, x: usize, y: usize) -> Ray {
        let base = self.x_step * (x as f64 - self.x_res_half)
            + self.y_step * (self.y_res_half - y as f64);

        Ray::new(self.position, base + self.direction)
    }
}

#[test]
fn default_camera() {
    let c: Camera = Default::default();

    assert_eq!(c.position, Vector3::new(0.0, 1.0, -1.0));
    assert_eq!(c.direction, Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(c.up, Vector3::new(0.0, 1.0, 0.0));
    assert!((c.field_of_view - std::f64::consts::PI / 4.0).abs() < 1e-12);
}

#[test]
fn auto_top_is_orthogonal_without_roll() {
    for d in [Vector3::new(0.2, -0.3, 1.0), Vector3::new(-1.0, 0.5, 0.3),
        Vector3::new(0.0, -1.0, 1.0)].iter() {
        let top = auto_top(d);

        let y = Vector3::new(0.0, 1.0, 0.0);

        assert!(top.dot(d).abs() < 1e-9);
        assert!(top.dot(&y.cross(d)).abs() < 1e-9);
        assert!(top.y > 0.0);
        assert!((top.length() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn auto_top_of_horizontal_direction_is_y() {
    assert_eq!(auto_top(&Vector3::new(1.0, 0.0, 1.0)), Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(auto_top(&Vector3::new(0.0, 0.00001, 1.0)),
        Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn explicit_up_is_normalized() {
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0), 1.0,
        Some(Vector3::new(0.0, 3.0, 0.0)));

    assert_eq!(c.up, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0),
        fov_from_degrees(90.0), None);
    let v = c.create_view(200, 100);
    let r = v.at(100, 50);

    assert_eq!(r.origin, Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn view_pixel_steps() {
    // tan(45deg) == 1, so a 4x2 view is 1 wide and 0.5 high: steps of 1/4 both ways.
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0),
        fov_from_degrees(90.0), None);
    let v = c.create_view(4, 2);

    assert_eq!(v.x_step, Vector3::new(0.25, 0.0, 0.0));
    assert_eq!(v.y_step, Vector3::new(0.0, 0.25, 0.0));
    assert_eq!(v.x_res_half, 2.0);
    assert_eq!(v.y_res_half, 1.0);

    // Top left corner: left of center and above it.
    let r = v.at(0, 0);
    assert_eq!(r.direction, Vector3::new(-0.5, 0.25, 1.0));
}

#[test]
fn view_rays_are_not_normalized() {
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, 2.0),
        fov_from_degrees(60.0), None);
    let r = c.create_view(10, 10).at(5, 5);

    assert_eq!(r.direction, Vector3::new(0.0, 0.0, 2.0));
}
