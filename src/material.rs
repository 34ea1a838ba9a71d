use std::fmt;
use std::sync::{ Arc, OnceLock };

use crate::color::Color;
use crate::texture::{ self, Texture };
use crate::consts::{ VACUUM_RI, AIR_RI, WATER_RI, DIAMOND_RI, AMBER_RI,
    SALT_RI, ICE_RI, GLASS_RI };

/// Selects one of the four texture channels of a material.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Matte color, lit by the diffuse light term.
    Diffuse,
    /// Highlight color, lit by the specular light term.
    Specular,
    /// Filter applied to the color seen in the mirror direction.
    Reflect,
    /// Filter applied to the color seen through the surface.
    Refract,
}

/// Selects one of the scalar properties of a material.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Property {
    Reflective,
    Refractive,
    Absorptive,
    Shininess,
    Index,
}

/// A material record.
///
/// Bundles four shared textures with a few scalar properties. Materials are
/// usually shared by many primitives, so they are handed around as
/// `Arc<Material>` and never mutated once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Arc<Texture>,
    pub specular: Arc<Texture>,
    pub reflect: Arc<Texture>,
    pub refract: Arc<Texture>,

    /// Fraction of photons reflected.
    pub reflective: f64,
    /// Fraction of photons refracted.
    pub refractive: f64,
    /// Fraction of photons absorbed.
    pub absorptive: f64,
    /// Phong exponent for specular highlights.
    pub shininess: f64,
    /// Refractive index of the material.
    pub index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse: texture::red(),
            specular: texture::white(),
            reflect: texture::black(),
            refract: texture::black(),

            reflective: 0.0,
            refractive: 0.0,
            absorptive: 0.9,
            shininess: 12.0,
            index: VACUUM_RI,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Material diffuse={:?} specular={:?} reflect={:?} \
            refract={:?} index={} shininess={}]",
            self.diffuse, self.specular, self.reflect, self.refract,
            self.index, self.shininess)
    }
}

impl Material {
    /// Creates a plain material whose diffuse channel is `diffuse`; the rest
    /// of the channels use the defaults.
    pub fn with_diffuse(diffuse: Arc<Texture>) -> Material {
        Material { diffuse, ..Default::default() }
    }

    /// Returns the texture behind one of the four channels.
    pub fn texture(&self, filter: Filter) -> &Texture {
        match filter {
            Filter::Diffuse => &*self.diffuse,
            Filter::Specular => &*self.specular,
            Filter::Reflect => &*self.reflect,
            Filter::Refract => &*self.refract,
        }
    }

    /// Gets the color of one channel at surface coordinates `(u, v)`.
    pub fn color_at(&self, filter: Filter, uv: (f64, f64)) -> Color {
        self.texture(filter).color_at(uv.0, uv.1)
    }

    /// Gets one of the scalar properties.
    pub fn property(&self, property: Property) -> f64 {
        match property {
            Property::Reflective => self.reflective,
            Property::Refractive => self.refractive,
            Property::Absorptive => self.absorptive,
            Property::Shininess => self.shininess,
            Property::Index => self.index,
        }
    }
}

macro_rules! plain_library_material {
    ($name:ident) => {
        /// Shared one-color, non-reflective material.
        pub fn $name() -> Arc<Material> {
            static MAT: OnceLock<Arc<Material>> = OnceLock::new();
            Arc::clone(MAT.get_or_init(||
                Arc::new(Material::with_diffuse(texture::$name()))
            ))
        }
    };
}

plain_library_material!(red);
plain_library_material!(green);
plain_library_material!(blue);
plain_library_material!(white);
plain_library_material!(black);
plain_library_material!(gray);

/// Shared glass material: faintly blue, mostly transparent, slightly
/// reflective.
pub fn glass() -> Arc<Material> {
    static MAT: OnceLock<Arc<Material>> = OnceLock::new();
    Arc::clone(MAT.get_or_init(|| Arc::new(Material {
        diffuse: Arc::new(Texture::plain(Color::rgb(0.0, 0.0, 0.2))),
        specular: Arc::new(Texture::plain(Color::rgb(0.8, 0.8, 0.8))),
        reflect: Arc::new(Texture::plain(Color::rgb(0.1, 0.1, 0.1))),
        refract: Arc::new(Texture::plain(Color::rgb(0.8, 0.8, 0.8))),

        reflective: 0.9,
        refractive: 0.9,
        absorptive: 1.0,
        shininess: 7.8,
        index: GLASS_RI,
    })))
}

/// Looks up a shared library material by name.
pub fn named(name: &str) -> Option<Arc<Material>> {
    match name {
        "Red" => Some(red()),
        "Green" => Some(green()),
        "Blue" => Some(blue()),
        "White" => Some(white()),
        "Black" => Some(black()),
        "Gray" => Some(gray()),
        "Glass" => Some(glass()),
        _ => None,
    }
}

/// Looks up a refractive index by medium name.
pub fn refractive_index(name: &str) -> Option<f64> {
    match name {
        "Vacuum" => Some(VACUUM_RI),
        "Air" => Some(AIR_RI),
        "Water" => Some(WATER_RI),
        "Diamond" => Some(DIAMOND_RI),
        "Amber" => Some(AMBER_RI),
        "Salt" => Some(SALT_RI),
        "Ice" => Some(ICE_RI),
        "Glass" => Some(GLASS_RI),
        _ => None,
    }
}

#[test]
fn default_material_is_red_and_opaque() {
    let m: Material = Default::default();

    assert_eq!(m.color_at(Filter::Diffuse, (0.3, 0.3)), Color::red());
    assert_eq!(m.color_at(Filter::Specular, (0.3, 0.3)), Color::white());
    assert!(m.color_at(Filter::Reflect, (0.3, 0.3)).is_black());
    assert!(m.color_at(Filter::Refract, (0.3, 0.3)).is_black());
    assert_eq!(m.property(Property::Shininess), 12.0);
    assert_eq!(m.property(Property::Index), 1.0);
}

#[test]
fn filters_select_matching_texture() {
    let checker = Arc::new(Texture::checked(Color::white(), Color::blue()));
    let m = Material {
        reflect: Arc::clone(&checker),
        ..Material::with_diffuse(texture::green())
    };

    assert_eq!(m.color_at(Filter::Diffuse, (0.75, 0.25)), Color::green());
    assert_eq!(m.color_at(Filter::Reflect, (0.25, 0.25)), Color::white());
    assert_eq!(m.color_at(Filter::Reflect, (0.75, 0.25)), Color::blue());
}

#[test]
fn glass_properties() {
    let g = glass();

    assert_eq!(g.property(Property::Index), GLASS_RI);
    assert_eq!(g.property(Property::Reflective), 0.9);
    assert_eq!(g.property(Property::Refractive), 0.9);
    assert_eq!(g.property(Property::Absorptive), 1.0);
    assert_eq!(g.property(Property::Shininess), 7.8);
    assert_eq!(g.color_at(Filter::Refract, (0.0, 0.0)),
        Color::rgb(0.8, 0.8, 0.8));
    assert!(Arc::ptr_eq(&g, &glass()));
}

#[test]
fn refractive_index_library() {
    assert_eq!(refractive_index("Water"), Some(1.333));
    assert_eq!(refractive_index("Vacuum"), Some(1.0));
    assert_eq!(refractive_index("Jelly"), None);
}

#[test]
fn material_library_lookup() {
    assert!(Arc::ptr_eq(&named("Blue").unwrap(), &blue()));
    assert_eq!(named("Blue").unwrap().color_at(Filter::Diffuse, (0.0, 0.0)),
        Color::blue());
    assert!(named("Chrome").is_none());
}
