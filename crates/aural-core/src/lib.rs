//! Aural Core - filter primitives for offline reverberation
//!
//! This crate provides the building blocks the reverb algorithms are made of.
//! Every primitive owns its state exclusively; one instance serves one channel
//! of one request and is dropped afterwards.
//!
//! # Filters
//!
//! - [`DelayLine`] - Fixed-length circular buffer with integer delay
//! - [`CombFilter`] - Feedback comb, `y[n] = x[n] + g * y[n - N]`
//! - [`AllpassFilter`] - Schroeder allpass for diffusion
//!
//! Feedback gains are validated at construction: any `|g| >= 1` is rejected
//! with [`FilterError::NumericInstability`] instead of being clamped, since an
//! unstable filter is a configuration error rather than a signal condition.
//!
//! # Utilities
//!
//! - Mixing and limiting: [`wet_dry_mix`], [`hard_clip`]
//! - Level helpers: [`peak`], [`normalize_peak`]
//! - Time conversion: [`ms_to_samples`], [`seconds_to_samples`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the crate with `alloc` only:
//!
//! ```toml
//! [dependencies]
//! aural-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use aural_core::{AllpassFilter, CombFilter};
//!
//! let mut comb = CombFilter::new(1422, 0.8).unwrap();
//! let mut allpass = AllpassFilter::new(225, 0.7).unwrap();
//!
//! let out = allpass.process(comb.process(1.0));
//! assert!(out.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod comb;
pub mod delay;
pub mod error;
pub mod math;

pub use allpass::AllpassFilter;
pub use comb::CombFilter;
pub use delay::DelayLine;
pub use error::FilterError;
pub use math::{
    flush_denormal, hard_clip, ms_to_samples, normalize_peak, peak, seconds_to_samples,
    wet_dry_mix,
};

/// Check that a feedback gain keeps a recursive filter stable.
///
/// Returns the gain unchanged when `|gain| < 1` and the gain is finite.
pub fn validate_gain(gain: f32) -> Result<f32, FilterError> {
    if gain.is_finite() && gain.abs() < 1.0 {
        Ok(gain)
    } else {
        #[cfg(feature = "tracing")]
        tracing::debug!(gain, "rejected unstable feedback gain");
        Err(FilterError::NumericInstability { gain })
    }
}
