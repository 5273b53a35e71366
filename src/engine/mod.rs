pub mod attendance;
pub mod compare;
pub mod error;
pub mod strategy;

pub use strategy::Planner;

/// Subtracted before taking the ceiling of the required-lectures closed form
/// so that an exact answer like 15.000000000000002 stays 15.
pub const NEEDED_EPSILON: f64 = 1e-9;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
