//! Single-reflection reverb.
//!
//! One feedback comb per channel. The comb delay is the travel time of the
//! first wall reflection: from the source to the wall and back past the
//! listener, `source_distance + 2 * wall_distance` metres at the speed of
//! sound. The delay is therefore the same physical time at every sample rate.

use crate::{Reverb, ReverbError, per_channel, validate_mix};
use aural_core::{CombFilter, validate_gain};

/// Speed of sound in air at 20 °C, in metres per second.
pub const SPEED_OF_SOUND: f32 = 343.0;

/// Parameters of [`SimpleReverb`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimpleParams {
    /// Distance from the source to the listener, in metres.
    pub source_distance_m: f32,
    /// Distance from the listener to the reflecting wall, in metres.
    pub wall_distance_m: f32,
    /// Comb feedback gain, `|g| < 1`.
    pub feedback: f32,
    /// Wet/dry ratio.
    pub mix: f32,
}

impl Default for SimpleParams {
    fn default() -> Self {
        Self {
            source_distance_m: 2.0,
            wall_distance_m: 10.0,
            feedback: 0.5,
            mix: 0.3,
        }
    }
}

impl SimpleParams {
    /// Check every field; an unstable feedback gain is a
    /// [`ReverbError::Filter`] carrying `NumericInstability`.
    pub fn validate(&self) -> Result<(), ReverbError> {
        for (name, value) in [
            ("source_distance_m", self.source_distance_m),
            ("wall_distance_m", self.wall_distance_m),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ReverbError::InvalidParameter {
                    name,
                    reason: format!("{value} is not a non-negative distance"),
                });
            }
        }
        if self.path_length_m() <= 0.0 {
            return Err(ReverbError::InvalidParameter {
                name: "wall_distance_m",
                reason: "reflection path has zero length".to_string(),
            });
        }
        validate_gain(self.feedback)?;
        validate_mix(self.mix)?;
        Ok(())
    }

    /// Length of the reflected path in metres.
    pub fn path_length_m(&self) -> f32 {
        self.source_distance_m + 2.0 * self.wall_distance_m
    }

    /// Reflection delay in samples at `sample_rate`, at least one.
    pub fn delay_samples(&self, sample_rate: u32) -> usize {
        let samples = (self.path_length_m() * sample_rate as f32 / SPEED_OF_SOUND).round();
        (samples as usize).max(1)
    }
}

/// Feedback-comb reverb modelling one wall reflection.
///
/// ```rust
/// use aural_reverb::{Reverb, SimpleParams, SimpleReverb};
///
/// let reverb = SimpleReverb::new(SimpleParams::default(), 44100).unwrap();
/// assert_eq!(reverb.delay_samples(), 2829);
///
/// let wet = reverb.process(&[vec![0.0; 100]]).unwrap();
/// assert!(wet[0].iter().all(|&s| s == 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleReverb {
    params: SimpleParams,
    delay_samples: usize,
}

impl SimpleReverb {
    /// Configure the reverb for audio at `sample_rate` Hz.
    pub fn new(params: SimpleParams, sample_rate: u32) -> Result<Self, ReverbError> {
        params.validate()?;
        if sample_rate == 0 {
            return Err(ReverbError::InvalidParameter {
                name: "sample_rate",
                reason: "must be greater than zero".to_string(),
            });
        }

        let delay_samples = params.delay_samples(sample_rate);
        tracing::trace!(delay_samples, feedback = params.feedback, "simple reverb configured");

        Ok(Self {
            params,
            delay_samples,
        })
    }

    /// Comb delay in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Parameters in use.
    pub fn params(&self) -> &SimpleParams {
        &self.params
    }
}

impl Reverb for SimpleReverb {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn default_mix(&self) -> f32 {
        self.params.mix
    }

    fn output_len(&self, input_len: usize) -> usize {
        input_len
    }

    fn process(&self, channels: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ReverbError> {
        per_channel(channels, |_, input| {
            let mut comb = CombFilter::new(self.delay_samples, self.params.feedback)?;
            let mut out = input.to_vec();
            comb.process_in_place(&mut out);
            Ok(out)
        })
    }
}
