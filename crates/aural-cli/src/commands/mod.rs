//! CLI command implementations.

pub mod impulse;
pub mod info;
pub mod process;

/// Convert a linear amplitude to decibels, flooring silence at -120 dB.
pub(crate) fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
