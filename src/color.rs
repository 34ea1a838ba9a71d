use std::fmt;
use std::ops::{ Add, Sub, Mul };

use crate::feq;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Each value
/// ranges from 0.0 to 1.0 inclusive, and stays there: every arithmetic
/// operation crops its result back into `[0, 1]`. Use `Vector3` where
/// unbounded accumulation is needed.
///
/// # Examples
///
/// Adding two colors saturates at white:
///
/// ```
/// # use whitted_tracer::color::Color;
/// let sum = Color::gray() + Color::rgb(0.8, 0.8, 0.8);
/// assert_eq!(sum, Color::white());
/// ```
///
/// Filtering one color by another:
///
/// ```
/// # use whitted_tracer::color::Color;
/// let yellow = Color::rgb(1.0, 1.0, 0.0);
/// let purple = Color::rgb(1.0, 0.0, 1.0);
/// assert_eq!(yellow * purple, Color::red());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// `Color`s are compared component-wise, accounting for possible floating
/// point error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.r, self.g, self.b)
    }
}

fn crop(c: f64) -> f64 {
    // NaN falls through `clamp` unchanged, so map it to black explicitly.
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}

impl Color {
    /// Creates a color with red, green and blue values, cropped to `[0, 1]`.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r: crop(r), g: crop(g), b: crop(b) }
    }

    /// The color black.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    /// The color white.
    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    /// The color red.
    pub fn red() -> Color {
        Color { r: 1.0, g: 0.0, b: 0.0 }
    }

    /// The color green.
    pub fn green() -> Color {
        Color { r: 0.0, g: 1.0, b: 0.0 }
    }

    /// The color blue.
    pub fn blue() -> Color {
        Color { r: 0.0, g: 0.0, b: 1.0 }
    }

    /// A neutral half-intensity gray.
    pub fn gray() -> Color {
        Color { r: 0.5, g: 0.5, b: 0.5 }
    }

    /// Looks up one of the named library colors.
    pub fn named(name: &str) -> Option<Color> {
        match name {
            "Black" => Some(Color::black()),
            "White" => Some(Color::white()),
            "Red" => Some(Color::red()),
            "Green" => Some(Color::green()),
            "Blue" => Some(Color::blue()),
            "Gray" => Some(Color::gray()),
            _ => None,
        }
    }

    /// Whether every component is exactly zero.
    ///
    /// The ray tracer uses this to skip reflection and refraction for
    /// materials whose filter lets nothing through, so the comparison is
    /// exact rather than tolerant.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Raises each component to the power `exp`, then crops.
    pub fn pow(&self, exp: f64) -> Color {
        Color::rgb(self.r.powf(exp), self.g.powf(exp), self.b.powf(exp))
    }

    /// Computes the Hadamard (element-wise) product of two colors.
    ///
    /// The `*` operator between two colors is shorthand for this.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color::rgb(c1.r * c2.r, c1.g * c2.g, c1.b * c2.b)
    }

    /// Averages a set of color samples.
    ///
    /// Components are summed without cropping and divided by the number of
    /// samples, so averaging never saturates early. An empty slice averages
    /// to black.
    pub fn mean(samples: &[Color]) -> Color {
        if samples.is_empty() {
            return Color::black();
        }

        let (r, g, b) = samples.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            (acc.0 + c.r, acc.1 + c.g, acc.2 + c.b)
        });

        let n = samples.len() as f64;
        Color::rgb(r / n, g / n, b / n)
    }

    /// Whether all three components are finite numbers inside `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b].iter()
            .all(|c| c.is_finite() && *c >= 0.0 && *c <= 1.0)
    }
}

/// Adds two colors together, cropping the result.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color::rgb(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

/// Subtracts one color from another, cropping the result at black.
impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color::rgb(self.r - other.r, self.g - other.g, self.b - other.b)
    }
}

/// Multiplies a color by a scalar, cropping the result.
///
/// A negative scalar (e.g. a light hitting the back of a surface) yields
/// black.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color::rgb(self.r * other, self.g * other, self.b * other)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Multiplies a color by a color.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors_crops_at_one() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.0, 0.7, 1.0));
}

#[test]
fn subtract_colors_crops_at_zero() {
    let c1 = Color::rgb(0.9, 0.1, 0.75);
    let c2 = Color::rgb(0.7, 0.6, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.0, 0.5));
}

#[test]
fn multiply_color_by_scalar() {
    let c1 = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c1 * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(c1 * -1.0, Color::black());
    assert_eq!(c1 * 10.0, Color::white());
}

#[test]
fn constructor_crops_components() {
    let c = Color::rgb(1.5, -0.5, f64::NAN);

    assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));
    assert!(c.is_valid());
}

#[test]
fn pow_of_color() {
    let c = Color::rgb(0.5, 1.0, 0.0);

    assert_eq!(c.pow(2.0), Color::rgb(0.25, 1.0, 0.0));
}

#[test]
fn mean_does_not_saturate_early() {
    let samples = [Color::white(), Color::white(), Color::black(), Color::black()];

    assert_eq!(Color::mean(&samples), Color::gray());
    assert_eq!(Color::mean(&[]), Color::black());
}

#[test]
fn black_is_exact() {
    assert!(Color::black().is_black());
    assert!(!Color::rgb(0.0, 0.0, 0.00001).is_black());
}

#[test]
fn named_library_colors() {
    assert_eq!(Color::named("Gray"), Some(Color::gray()));
    assert_eq!(Color::named("Purple"), None);
}
