use std::fmt;

use crate::color::Color;
use crate::vector::Vector3;

/// A light source.
///
/// The ray tracer understands exactly these two kinds of light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    /// A light radiating from a single position. Casts hard shadows.
    Point { position: Vector3, color: Color },

    /// Light arriving uniformly from everywhere. Never shadowed.
    Ambient { color: Color },
}

impl Light {
    /// Creates a point light.
    pub fn point(position: Vector3, color: Color) -> Light {
        Light::Point { position, color }
    }

    /// Creates an ambient light.
    pub fn ambient(color: Color) -> Light {
        Light::Ambient { color }
    }

    /// The color of the light.
    pub fn color(&self) -> Color {
        match *self {
            Light::Point { color, .. } => color,
            Light::Ambient { color } => color,
        }
    }

    /// The position of the light, if it has one.
    pub fn position(&self) -> Option<Vector3> {
        match *self {
            Light::Point { position, .. } => Some(position),
            Light::Ambient { .. } => None,
        }
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Light::Point { position, color } =>
                write!(f, "[PointLight position={} color={}]", position, color),
            Light::Ambient { color } =>
                write!(f, "[AmbientLight color={}]", color),
        }
    }
}

#[test]
fn point_light_has_position_and_color() {
    let l = Light::point(Vector3::new(3.0, 10.0, 7.0), Color::white());

    assert_eq!(l.position(), Some(Vector3::new(3.0, 10.0, 7.0)));
    assert_eq!(l.color(), Color::white());
}

#[test]
fn ambient_light_has_no_position() {
    let l = Light::ambient(Color::gray());

    assert_eq!(l.position(), None);
    assert_eq!(l.color(), Color::gray());
}
