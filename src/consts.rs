// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Collisions closer than this along a ray are ignored (prevents shadow acne)
pub const NEAREST_COLLISION: f64 = 0.001;

// Square root of the number of rays cast per pixel with antialiasing
pub const AA_SIZE: usize = 2;

// Maximum recursion depth for reflected and refracted rays
pub const DEFAULT_MAX_DEPTH: usize = 5;

// Default output resolution
pub const DEFAULT_WIDTH: usize = 640;
pub const DEFAULT_HEIGHT: usize = 480;

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const AIR_RI: f64 = 1.0002926;
pub const WATER_RI: f64 = 1.333;
pub const DIAMOND_RI: f64 = 2.419;
pub const AMBER_RI: f64 = 1.55;
pub const SALT_RI: f64 = 1.544;
pub const ICE_RI: f64 = 1.31;
pub const GLASS_RI: f64 = 1.60;
