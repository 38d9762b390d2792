use std::f64;
use types::c64;

pub const ONE_C64: c64 = c64 { re: 1.0, im: 0.0 };
pub const ZERO_C64: c64 = c64 { re: 0.0, im: 0.0 };
pub const I_C64: c64 = c64 { re: 0.0, im: 1.0 };

// pi

pub const PI: f64 = f64::consts::PI;
pub const TWOPI: f64 = 2.0 * f64::consts::PI;
pub const FOURPI: f64 = 4.0 * f64::consts::PI;

pub const SQRT2: f64 = f64::consts::SQRT_2;

// numerical convergence

pub const EPS3: f64 = 1E-3;
pub const EPS6: f64 = 1E-6;
pub const EPS8: f64 = 1E-8;
pub const EPS10: f64 = 1E-10;
pub const EPS12: f64 = 1E-12;
pub const EPS16: f64 = 1E-16;
