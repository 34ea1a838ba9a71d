use std::sync::{ Arc, OnceLock };

use crate::color::Color;

/// A texture: a function from surface coordinates `(u, v)` to a color.
///
/// Textures never change once built and are shared between materials through
/// `Arc` handles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Texture {
    /// One color everywhere.
    Plain(Color),

    /// A two-color checkerboard tile of `size_u` by `size_v`.
    ///
    /// When `tiled`, the tile repeats across the whole surface. Otherwise
    /// coordinates outside the tile are black.
    Checked {
        a: Color,
        b: Color,
        size_u: f64,
        size_v: f64,
        tiled: bool,
    },
}

impl Default for Texture {
    fn default() -> Texture {
        Texture::Plain(Color::black())
    }
}

impl Texture {
    pub fn plain(color: Color) -> Texture {
        Texture::Plain(color)
    }

    /// A repeating checkerboard with a unit tile.
    pub fn checked(a: Color, b: Color) -> Texture {
        Texture::Checked { a, b, size_u: 1.0, size_v: 1.0, tiled: true }
    }

    /// A checkerboard with an explicit tile size and tiling mode.
    pub fn checked_sized(a: Color, b: Color, size_u: f64, size_v: f64,
        tiled: bool) -> Texture {
        Texture::Checked { a, b, size_u, size_v, tiled }
    }

    /// Gets the texture color at surface coordinates `(u, v)`.
    pub fn color_at(&self, u: f64, v: f64) -> Color {
        match *self {
            Texture::Plain(c) => c,
            Texture::Checked { a, b, size_u, size_v, tiled } => {
                let (u, v) = if tiled {
                    (u - (u / size_u).floor() * size_u,
                     v - (v / size_v).floor() * size_v)
                } else if u < 0.0 || v < 0.0 || u > size_u || v > size_v {
                    return Color::black();
                } else {
                    (u, v)
                };

                let half_u = size_u / 2.0;
                let half_v = size_v / 2.0;

                if (u < half_u && v < half_v) || (u > half_u && v > half_v) {
                    a
                } else {
                    b
                }
            },
        }
    }
}

macro_rules! plain_library_texture {
    ($name:ident, $color:expr) => {
        /// Shared plain texture of the matching library color.
        pub fn $name() -> Arc<Texture> {
            static TEX: OnceLock<Arc<Texture>> = OnceLock::new();
            Arc::clone(TEX.get_or_init(|| Arc::new(Texture::Plain($color))))
        }
    };
}

plain_library_texture!(red, Color::red());
plain_library_texture!(green, Color::green());
plain_library_texture!(blue, Color::blue());
plain_library_texture!(white, Color::white());
plain_library_texture!(black, Color::black());
plain_library_texture!(gray, Color::gray());

/// Looks up a shared library texture by name.
pub fn named(name: &str) -> Option<Arc<Texture>> {
    match name {
        "Red" => Some(red()),
        "Green" => Some(green()),
        "Blue" => Some(blue()),
        "White" => Some(white()),
        "Black" => Some(black()),
        "Gray" => Some(gray()),
        _ => None,
    }
}

#[test]
fn plain_texture_ignores_coordinates() {
    let t = Texture::plain(Color::red());

    assert_eq!(t.color_at(0.0, 0.0), Color::red());
    assert_eq!(t.color_at(-15.3, 1e6), Color::red());
}

#[test]
fn checked_texture_quadrants() {
    let t = Texture::checked(Color::white(), Color::black());

    assert_eq!(t.color_at(0.25, 0.25), Color::white());
    assert_eq!(t.color_at(0.75, 0.75), Color::white());
    assert_eq!(t.color_at(0.75, 0.25), Color::black());
    assert_eq!(t.color_at(0.25, 0.75), Color::black());
}

#[test]
fn checked_texture_tiles_negative_coordinates() {
    let t = Texture::checked(Color::white(), Color::black());

    // -0.75 wraps to 0.25, -0.25 wraps to 0.75.
    assert_eq!(t.color_at(-0.75, -0.75), Color::white());
    assert_eq!(t.color_at(-0.25, -0.75), Color::black());
    assert_eq!(t.color_at(3.25, 7.25), Color::white());
}

#[test]
fn checked_texture_respects_tile_size() {
    let t = Texture::checked_sized(Color::blue(), Color::red(), 0.2, 0.2, true);

    assert_eq!(t.color_at(0.05, 0.05), Color::blue());
    assert_eq!(t.color_at(0.15, 0.05), Color::red());
    assert_eq!(t.color_at(0.25, 0.25), Color::blue());
}

#[test]
fn untiled_checked_texture_is_black_outside() {
    let t = Texture::checked_sized(Color::white(), Color::red(), 1.0, 2.0, false);

    assert_eq!(t.color_at(0.25, 0.5), Color::white());
    assert_eq!(t.color_at(0.75, 0.5), Color::red());
    assert_eq!(t.color_at(1.5, 0.5), Color::black());
    assert_eq!(t.color_at(0.5, 2.5), Color::black());
    assert_eq!(t.color_at(-0.5, 0.5), Color::black());
}

#[test]
fn library_textures_are_shared() {
    assert!(Arc::ptr_eq(&red(), &red()));
    assert_eq!(named("Gray").unwrap().color_at(0.0, 0.0), Color::gray());
    assert!(named("Mauve").is_none());
}
