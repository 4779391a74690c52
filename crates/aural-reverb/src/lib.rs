//! Aural Reverb - the reverberation algorithms
//!
//! Three interchangeable strategies behind one [`Reverb`] trait:
//!
//! - [`SimpleReverb`] - one feedback comb per channel modelling a single wall
//!   reflection
//! - [`SchroederReverb`] - four parallel combs into two series allpasses
//! - [`ConvolutionReverb`] - linear convolution with a recorded room impulse
//!   response, direct or FFT overlap-add
//!
//! Supporting modules:
//!
//! - [`fft`] - FFT wrapper over `rustfft`
//! - [`convolution`] - direct and overlap-add linear convolution
//! - [`resample`] - polyphase rational resampling for impulse responses
//! - [`impulse`] - the impulse-response asset type and a synthetic generator
//!
//! Every algorithm produces only the wet signal. Blending with the dry input
//! and limiting are the caller's job, so each algorithm reports its
//! [`Reverb::default_mix`] instead of applying it.
//!
//! ## Example
//!
//! ```rust
//! use aural_reverb::{Reverb, SchroederParams, SchroederReverb};
//!
//! let reverb = SchroederReverb::new(SchroederParams::default(), 44100).unwrap();
//! let input = vec![vec![1.0, 0.0, 0.0, 0.0]];
//! let wet = reverb.process(&input).unwrap();
//! assert_eq!(wet[0].len(), 4);
//! ```

pub mod convolution;
pub mod fft;
pub mod impulse;
pub mod resample;
mod rir;
mod schroeder;
mod simple;

pub use convolution::{OverlapAdd, convolve, convolve_direct};
pub use fft::Fft;
pub use impulse::ImpulseResponse;
pub use rir::{ConvolutionParams, ConvolutionReverb};
pub use schroeder::{
    ALLPASS_DELAYS_MS, ALLPASS_GAINS, COMB_DELAYS_MS, COMB_GAINS, COMB_OUTPUT_SCALE,
    SchroederParams, SchroederReverb,
};
pub use simple::{SPEED_OF_SOUND, SimpleParams, SimpleReverb};

use aural_core::FilterError;
use rayon::prelude::*;

/// Errors raised while configuring or running a reverb.
#[derive(Debug, thiserror::Error)]
pub enum ReverbError {
    /// A filter could not be built (unstable gain or zero delay).
    #[error("filter configuration error: {0}")]
    Filter(#[from] FilterError),

    /// A parameter is outside its valid range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// An impulse response with no channels or no samples.
    #[error("impulse response is empty")]
    EmptyImpulse,

    /// Sample-rate conversion of an impulse response failed.
    #[error("resampling failed: {0}")]
    Resample(String),
}

/// Common interface of the reverberation algorithms.
///
/// An implementation is an immutable, per-request configuration. Filter state
/// is created inside [`Reverb::process`] for each channel and dropped when it
/// returns, so a single instance can be shared across threads.
pub trait Reverb: Send + Sync {
    /// Short identifier (`simple`, `schroeder`, `rir`).
    fn name(&self) -> &'static str;

    /// Wet/dry ratio this algorithm is designed to be mixed at.
    fn default_mix(&self) -> f32;

    /// Number of output frames produced for `input_len` input frames.
    fn output_len(&self, input_len: usize) -> usize;

    /// Produce the wet signal for every channel.
    ///
    /// Each returned buffer has [`Reverb::output_len`] samples.
    fn process(&self, channels: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ReverbError>;
}

/// Run `f` on every channel in parallel and collect the results in order.
///
/// Channels never share state, so they are independent work items; the
/// closure itself processes its channel sequentially.
pub(crate) fn per_channel<F>(channels: &[Vec<f32>], f: F) -> Result<Vec<Vec<f32>>, ReverbError>
where
    F: Fn(usize, &[f32]) -> Result<Vec<f32>, ReverbError> + Sync,
{
    channels
        .par_iter()
        .enumerate()
        .map(|(i, ch)| f(i, ch))
        .collect()
}

pub(crate) fn validate_mix(mix: f32) -> Result<f32, ReverbError> {
    if (0.0..=1.0).contains(&mix) {
        Ok(mix)
    } else {
        Err(ReverbError::InvalidParameter {
            name: "mix",
            reason: format!("{mix} is outside 0.0..=1.0"),
        })
    }
}
