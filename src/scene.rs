use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{ debug, info };
use serde::Deserialize;
use thiserror::Error;

use crate::camera::{ self, Camera };
use crate::color::Color;
use crate::consts::GLASS_RI;
use crate::light::Light;
use crate::material::{ self, Material };
use crate::shape::{ Primitive, Shape };
use crate::texture::{ self, Texture };
use crate::vector::Vector3;
use crate::world::World;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Unable to read scene file: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed scene description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Color \"{0}\" is not defined")]
    UnknownColor(String),

    #[error("Texture \"{0}\" is not defined")]
    UnknownTexture(String),

    #[error("Material \"{0}\" is not defined")]
    UnknownMaterial(String),

    #[error("No refractive index named \"{0}\"")]
    UnknownIndex(String),

    #[error("Material \"{0}\" is already defined")]
    DuplicateMaterial(String),

    #[error("Texture \"{0}\" is already defined")]
    DuplicateTexture(String),

    #[error("Color \"{0}\" has components outside [0, 1]")]
    ColorOutOfRange(String),

    #[error("Invalid color declaration: {0}")]
    InvalidColor(String),
}

/// A loaded scene: the world to render and the camera to render it with.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Reads and resolves a JSON scene description file.
    pub fn load(path: &Path) -> Result<Scene, SceneError> {
        info!("Loading scene {}", path.display());
        let text = fs::read_to_string(path)?;
        Scene::from_json(&text)
    }

    /// Resolves a JSON scene description.
    ///
    /// Named entities must be declared before they are used. Colors,
    /// textures and materials can refer to the shared libraries by name.
    pub fn from_json(text: &str) -> Result<Scene, SceneError> {
        let json: SceneJson = serde_json::from_str(text)?;
        let scene = Loader::new().load(json)?;

        info!("Scene has {} objects, {} lights, {} materials, {} textures",
            scene.world.objects.len(), scene.world.lights.len(),
            scene.world.materials.len(), scene.world.textures.len());

        Ok(scene)
    }
}

#[derive(Deserialize)]
struct SceneJson {
    background: Option<ColorRef>,
    atmosphere: Option<IndexRef>,

    #[serde(default)]
    colors: Vec<ColorJson>,
    #[serde(default)]
    textures: Vec<TextureJson>,
    #[serde(default)]
    materials: Vec<MaterialJson>,
    #[serde(default)]
    lights: Vec<LightJson>,

    camera: Option<CameraJson>,

    #[serde(default)]
    objects: Vec<ObjectJson>,
}

/// Either the id of a known color or an inline color.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRef {
    Id(String),
    Inline(ColorJson),
}

#[derive(Deserialize)]
struct ColorJson {
    id: Option<String>,
    r: Option<f64>,
    g: Option<f64>,
    b: Option<f64>,
}

/// Either a literal refractive index or the name of a known one.
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexRef {
    Value(f64),
    Name(String),
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TextureJson {
    Plain {
        id: String,
        color: ColorRef,
    },
    Checked {
        id: String,
        a: ColorRef,
        b: ColorRef,
        #[serde(default = "one")]
        width: f64,
        #[serde(default = "one")]
        height: f64,
        #[serde(default = "yes")]
        tile: bool,
    },
}

#[derive(Deserialize)]
struct MaterialJson {
    id: String,
    diffuse: Option<String>,
    specular: Option<String>,
    reflect: Option<String>,
    refract: Option<String>,
    reflective: Option<f64>,
    refractive: Option<f64>,
    absorptive: Option<f64>,
    shininess: Option<f64>,
    index: Option<IndexRef>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum LightJson {
    Point {
        position: [f64; 3],
        color: ColorRef,
    },
    Ambient {
        color: ColorRef,
    },
}

#[derive(Deserialize)]
struct CameraJson {
    position: Option<[f64; 3]>,
    direction: Option<[f64; 3]>,
    up: Option<[f64; 3]>,
    /// In degrees.
    fov: Option<f64>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ObjectJson {
    Sphere {
        center: Option<[f64; 3]>,
        radius: f64,
        material: Option<String>,
        #[serde(default = "yes")]
        visible: bool,
    },
    Plane {
        normal: Option<[f64; 3]>,
        distance: f64,
        material: Option<String>,
        #[serde(default = "yes")]
        visible: bool,
    },
}

/// Resolves ids against everything declared so far.
struct Loader {
    colors: HashMap<String, Color>,
    textures: HashMap<String, Arc<Texture>>,
    materials: HashMap<String, Arc<Material>>,
    world: World,
}

const LIBRARY: [&str; 6] = ["Black", "White", "Red", "Green", "Blue", "Gray"];

impl Loader {
    fn new() -> Loader {
        let mut colors = HashMap::new();
        let mut textures = HashMap::new();
        let mut materials = HashMap::new();

        for name in LIBRARY.iter() {
            if let Some(c) = Color::named(name) {
                colors.insert(name.to_string(), c);
            }
            if let Some(t) = texture::named(name) {
                textures.insert(name.to_string(), t);
            }
            if let Some(m) = material::named(name) {
                materials.insert(name.to_string(), m);
            }
        }
        materials.insert("Glass".to_string(), material::glass());

        Loader { colors, textures, materials, world: World::new() }
    }

    fn load(mut self, json: SceneJson) -> Result<Scene, SceneError> {
        for c in json.colors.iter() {
            if c.id.is_none() {
                return Err(SceneError::InvalidColor(
                    "declared color has no id".to_string()));
            }
            self.inline_color(c)?;
        }

        if let Some(bg) = &json.background {
            self.world.background = self.color(bg)?;
        }
        if let Some(idx) = &json.atmosphere {
            self.world.atmosphere = index(idx)?;
        }
        debug!("Background {}, atmosphere {}",
            self.world.background, self.world.atmosphere);

        for t in json.textures.iter() {
            self.texture(t)?;
        }
        for m in json.materials.iter() {
            self.material(m)?;
        }
        for l in json.lights.iter() {
            let light = match l {
                LightJson::Point { position, color } =>
                    Light::point(Vector3::from(*position), self.color(color)?),
                LightJson::Ambient { color } =>
                    Light::ambient(self.color(color)?),
            };
            debug!("Adding light {}", light);
            self.world.add_light(light);
        }

        let camera = match &json.camera {
            Some(c) => Camera::new(
                Vector3::from(c.position.unwrap_or([0.0, 0.0, 0.0])),
                Vector3::from(c.direction.unwrap_or([0.0, 0.0, 1.0])),
                camera::fov_from_degrees(c.fov.unwrap_or(45.0)),
                c.up.map(Vector3::from),
            ),
            None => Default::default(),
        };
        debug!("Using camera {}", camera);

        for o in json.objects.iter() {
            let object = self.object(o)?;
            debug!("Adding object {}", object);
            self.world.add_object(object);
        }

        Ok(Scene { world: self.world, camera })
    }

    fn color(&mut self, c: &ColorRef) -> Result<Color, SceneError> {
        match c {
            ColorRef::Id(id) => self.colors.get(id).copied()
                .ok_or_else(|| SceneError::UnknownColor(id.clone())),
            ColorRef::Inline(c) => self.inline_color(c),
        }
    }

    /// An id that's already known wins over inline components. Otherwise the
    /// components define a new color, registered under the id if given.
    fn inline_color(&mut self, c: &ColorJson) -> Result<Color, SceneError> {
        if let Some(id) = &c.id {
            if let Some(known) = self.colors.get(id) {
                return Ok(*known);
            }
        }

        let name = c.id.clone().unwrap_or_else(|| "<inline>".to_string());
        let (r, g, b) = match (c.r, c.g, c.b) {
            (Some(r), Some(g), Some(b)) => (r, g, b),
            _ if c.id.is_some() => return Err(SceneError::UnknownColor(name)),
            _ => return Err(SceneError::InvalidColor(
                "expected an id or r, g and b components".to_string())),
        };

        if [r, g, b].iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(SceneError::ColorOutOfRange(name));
        }

        let color = Color::rgb(r, g, b);
        if let Some(id) = &c.id {
            debug!("Declaring color {} = {}", id, color);
            self.colors.insert(id.clone(), color);
        }

        Ok(color)
    }

    fn texture(&mut self, t: &TextureJson) -> Result<(), SceneError> {
        let (id, texture) = match t {
            TextureJson::Plain { id, color } =>
                (id, Texture::plain(self.color(color)?)),
            TextureJson::Checked { id, a, b, width, height, tile } => {
                let a = self.color(a)?;
                let b = self.color(b)?;
                (id, Texture::checked_sized(a, b, *width, *height, *tile))
            },
        };

        if self.textures.contains_key(id) {
            return Err(SceneError::DuplicateTexture(id.clone()));
        }

        debug!("Declaring texture {} = {:?}", id, texture);
        let texture = self.world.add_texture(texture);
        self.textures.insert(id.clone(), texture);
        Ok(())
    }

    fn texture_ref(&self, id: &Option<String>, default: fn() -> Arc<Texture>)
        -> Result<Arc<Texture>, SceneError> {
        match id {
            None => Ok(default()),
            Some(id) => self.textures.get(id).cloned()
                .ok_or_else(|| SceneError::UnknownTexture(id.clone())),
        }
    }

    fn material(&mut self, m: &MaterialJson) -> Result<(), SceneError> {
        if self.materials.contains_key(&m.id) {
            return Err(SceneError::DuplicateMaterial(m.id.clone()));
        }

        let defaults: Material = Default::default();
        let material = Material {
            diffuse: self.texture_ref(&m.diffuse, texture::green)?,
            specular: self.texture_ref(&m.specular, texture::white)?,
            reflect: self.texture_ref(&m.reflect, texture::black)?,
            refract: self.texture_ref(&m.refract, texture::black)?,
            reflective: m.reflective.unwrap_or(defaults.reflective),
            refractive: m.refractive.unwrap_or(defaults.refractive),
            absorptive: m.absorptive.unwrap_or(defaults.absorptive),
            shininess: m.shininess.unwrap_or(defaults.shininess),
            index: match &m.index {
                Some(idx) => index(idx)?,
                None => GLASS_RI,
            },
        };

        debug!("Declaring material {} = {}", m.id, material);
        let material = self.world.add_material(material);
        self.materials.insert(m.id.clone(), material);
        Ok(())
    }

    fn material_ref(&self, id: &Option<String>)
        -> Result<Arc<Material>, SceneError> {
        match id {
            None => Ok(material::gray()),
            Some(id) => self.materials.get(id).cloned()
                .ok_or_else(|| SceneError::UnknownMaterial(id.clone())),
        }
    }

    fn object(&self, o: &ObjectJson) -> Result<Primitive, SceneError> {
        let (shape, material, visible) = match o {
            ObjectJson::Sphere { center, radius, material, visible } => (
                Shape::sphere(Vector3::from(center.unwrap_or([0.0, 0.0, 0.0])),
                    *radius),
                material,
                *visible,
            ),
            ObjectJson::Plane { normal, distance, material, visible } => (
                Shape::plane(
                    Vector3::from(normal.unwrap_or([0.0, 1.0, 0.0])).normalize(),
                    *distance),
                material,
                *visible,
            ),
        };

        Ok(Primitive {
            shape,
            material: self.material_ref(material)?,
            visible,
        })
    }
}

fn index(idx: &IndexRef) -> Result<f64, SceneError> {
    match idx {
        IndexRef::Value(v) => Ok(*v),
        IndexRef::Name(name) => material::refractive_index(name)
            .ok_or_else(|| SceneError::UnknownIndex(name.clone())),
    }
}

#[test]
fn empty_scene_uses_defaults() {
    let s = Scene::from_json("{}").unwrap();

    assert!(s.world.objects.is_empty());
    assert!(s.world.lights.is_empty());
    assert_eq!(s.world.background, Color::black());
    assert_eq!(s.world.atmosphere, crate::consts::VACUUM_RI);
    assert_eq!(s.camera, Camera::default());
}

#[test]
fn full_scene_resolves_references() {
    let s = Scene::from_json(r#"{
        "background": { "id": "Sky", "r": 0.1, "g": 0.2, "b": 0.8 },
        "atmosphere": "Water",
        "colors": [ { "id": "Sand", "r": 0.9, "g": 0.8, "b": 0.5 } ],
        "textures": [
            { "id": "Floor", "type": "checked", "a": "Sand", "b": "Sky",
              "width": 2.0, "tile": false },
            { "id": "Matte", "type": "plain", "color": { "r": 0.3, "g": 0.3, "b": 0.3 } }
        ],
        "materials": [
            { "id": "Tiles", "diffuse": "Floor", "reflect": "Matte" },
            { "id": "Crystal", "diffuse": "Black", "refract": "White",
              "shininess": 30.0, "index": 2.0 }
        ],
        "lights": [
            { "type": "point", "position": [3, 10, 7], "color": "White" },
            { "type": "ambient", "color": { "r": 0.05, "g": 0.05, "b": 0.05 } }
        ],
        "camera": { "position": [0, 1, -5], "direction": [0, 0, 1], "fov": 90 },
        "objects": [
            { "type": "plane", "normal": [0, 2, 0], "distance": -1, "material": "Tiles" },
            { "type": "sphere", "center": [0, 0, 10], "radius": 1.5, "material": "Crystal" },
            { "type": "sphere", "radius": 0.5, "visible": false }
        ]
    }"#).unwrap();

    let w = &s.world;
    assert_eq!(w.background, Color::rgb(0.1, 0.2, 0.8));
    assert_eq!(w.atmosphere, 1.333);
    assert_eq!(w.textures.len(), 2);
    assert_eq!(w.materials.len(), 2);
    assert_eq!(w.lights.len(), 2);
    assert_eq!(w.objects.len(), 3);

    assert_eq!(*w.textures[0], Texture::checked_sized(
        Color::rgb(0.9, 0.8, 0.5), Color::rgb(0.1, 0.2, 0.8), 2.0, 1.0, false));

    let tiles = &w.objects[0].material;
    assert!(Arc::ptr_eq(tiles, &w.materials[0]));
    assert!(Arc::ptr_eq(&tiles.diffuse, &w.textures[0]));
    assert_eq!(*tiles.specular, Texture::plain(Color::white()));
    assert_eq!(tiles.index, GLASS_RI);
    assert_eq!(tiles.shininess, 12.0);

    let crystal = &w.objects[1].material;
    assert_eq!(crystal.index, 2.0);
    assert_eq!(crystal.shininess, 30.0);

    assert_eq!(w.objects[0].shape,
        Shape::plane(Vector3::new(0.0, 1.0, 0.0), -1.0));
    assert_eq!(w.objects[2].shape, Shape::sphere(Vector3::zero(), 0.5));
    assert!(!w.objects[2].visible);
    assert!(Arc::ptr_eq(&w.objects[2].material, &material::gray()));

    assert_eq!(s.camera.position, Vector3::new(0.0, 1.0, -5.0));
    assert_eq!(s.camera.up, Vector3::new(0.0, 1.0, 0.0));
    assert!((s.camera.field_of_view - std::f64::consts::PI / 2.0).abs() < 1e-12);
}

#[test]
fn library_materials_are_available() {
    let s = Scene::from_json(r#"{
        "objects": [ { "type": "sphere", "radius": 1, "material": "Glass" } ]
    }"#).unwrap();

    assert!(Arc::ptr_eq(&s.world.objects[0].material, &material::glass()));
}

#[test]
fn unknown_material_is_an_error() {
    let e = Scene::from_json(r#"{
        "objects": [ { "type": "sphere", "radius": 1, "material": "Chrome" } ]
    }"#).unwrap_err();

    assert!(matches!(e, SceneError::UnknownMaterial(ref id) if id == "Chrome"));
}

#[test]
fn unknown_texture_is_an_error() {
    let e = Scene::from_json(r#"{
        "materials": [ { "id": "M", "diffuse": "Marble" } ]
    }"#).unwrap_err();

    assert!(matches!(e, SceneError::UnknownTexture(ref id) if id == "Marble"));
}

#[test]
fn colors_resolve_before_textures() {
    let e = Scene::from_json(r#"{
        "textures": [
            { "id": "A", "type": "checked", "a": "Red", "b": "Later" }
        ],
        "colors": [ { "id": "Later", "r": 0, "g": 0, "b": 0 } ]
    }"#);

    // Colors are always declared first, so this one resolves.
    assert!(e.is_ok());

    let e = Scene::from_json(r#"{
        "textures": [ { "id": "A", "type": "plain", "color": "Nowhere" } ]
    }"#).unwrap_err();
    assert!(matches!(e, SceneError::UnknownColor(ref id) if id == "Nowhere"));
}

#[test]
fn unknown_index_is_an_error() {
    let e = Scene::from_json(r#"{ "atmosphere": "Jelly" }"#).unwrap_err();

    assert!(matches!(e, SceneError::UnknownIndex(ref n) if n == "Jelly"));
}

#[test]
fn duplicates_are_errors() {
    let e = Scene::from_json(r#"{
        "materials": [ { "id": "M" }, { "id": "M" } ]
    }"#).unwrap_err();
    assert!(matches!(e, SceneError::DuplicateMaterial(ref id) if id == "M"));

    let e = Scene::from_json(r#"{
        "textures": [
            { "id": "T", "type": "plain", "color": "Red" },
            { "id": "T", "type": "plain", "color": "Blue" }
        ]
    }"#).unwrap_err();
    assert!(matches!(e, SceneError::DuplicateTexture(ref id) if id == "T"));
}

#[test]
fn bad_colors_are_errors() {
    let e = Scene::from_json(r#"{ "background": { "r": 1.5, "g": 0, "b": 0 } }"#)
        .unwrap_err();
    assert!(matches!(e, SceneError::ColorOutOfRange(_)));

    let e = Scene::from_json(r#"{ "background": { "r": 0.5, "g": 0 } }"#)
        .unwrap_err();
    assert!(matches!(e, SceneError::InvalidColor(_)));

    let e = Scene::from_json(r#"{ "colors": [ { "r": 0.5, "g": 0, "b": 0 } ] }"#)
        .unwrap_err();
    assert!(matches!(e, SceneError::InvalidColor(_)));
}

#[test]
fn malformed_documents_are_json_errors() {
    let e = Scene::from_json(r#"{ "objects": [ { "type": "sphere" } ] }"#)
        .unwrap_err();
    assert!(matches!(e, SceneError::Json(_)));

    let e = Scene::from_json(r#"{ "objects": [ { "type": "torus", "radius": 1 } ] }"#)
        .unwrap_err();
    assert!(matches!(e, SceneError::Json(_)));

    let e = Scene::from_json("{ \"background\": ").unwrap_err();
    assert!(matches!(e, SceneError::Json(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let e = Scene::load(Path::new("/nonexistent/scene.json")).unwrap_err();

    assert!(matches!(e, SceneError::Io(_)));
}
