pub mod consts;

pub mod vector;
pub mod color;
pub mod ray;

pub mod texture;
pub mod material;
pub mod light;
pub mod shape;
pub mod world;
pub mod camera;

pub mod raytracer;
pub mod canvas;

pub mod scene;
pub mod demo;

use consts::FEQ_EPSILON;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
