//! Schroeder reverb: four parallel combs into two series allpasses.
//!
//! ```text
//!         ┌─ comb 29.7 ms ─┐
//!         ├─ comb 37.1 ms ─┤
//! x ──────┤                ├─ Σ · 1/4 ── allpass 5.0 ms ── allpass 1.7 ms ── y
//!         ├─ comb 41.1 ms ─┤
//!         └─ comb 43.7 ms ─┘
//! ```
//!
//! The comb delays share no simple ratio, so their echo patterns do not line
//! up into audible periodicity. Every channel gets its own bank.
//!
//! Reference: M. R. Schroeder, "Natural sounding artificial reverberation",
//! J. Audio Eng. Soc. 10(3), 1962.

use crate::{Reverb, ReverbError, per_channel, validate_mix};
use aural_core::{AllpassFilter, CombFilter, ms_to_samples};

/// Parallel comb delays in milliseconds.
pub const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];

/// Parallel comb feedback gains, paired with [`COMB_DELAYS_MS`].
pub const COMB_GAINS: [f32; 4] = [0.805, 0.827, 0.783, 0.764];

/// Scale applied to the summed comb outputs.
pub const COMB_OUTPUT_SCALE: f32 = 0.25;

/// Series allpass delays in milliseconds.
pub const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];

/// Series allpass gains, paired with [`ALLPASS_DELAYS_MS`].
pub const ALLPASS_GAINS: [f32; 2] = [0.7, 0.7];

/// Parameters of [`SchroederReverb`]. The filter network itself is fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchroederParams {
    /// Wet/dry ratio.
    pub mix: f32,
}

impl Default for SchroederParams {
    fn default() -> Self {
        Self { mix: 0.3 }
    }
}

impl SchroederParams {
    /// Check the mix ratio.
    pub fn validate(&self) -> Result<(), ReverbError> {
        validate_mix(self.mix).map(|_| ())
    }
}

/// Classic Schroeder reverberator.
#[derive(Debug, Clone)]
pub struct SchroederReverb {
    params: SchroederParams,
    comb_delays: [usize; 4],
    allpass_delays: [usize; 2],
}

impl SchroederReverb {
    /// Configure the network for audio at `sample_rate` Hz.
    pub fn new(params: SchroederParams, sample_rate: u32) -> Result<Self, ReverbError> {
        params.validate()?;
        if sample_rate == 0 {
            return Err(ReverbError::InvalidParameter {
                name: "sample_rate",
                reason: "must be greater than zero".to_string(),
            });
        }

        let sr = sample_rate as f32;
        let comb_delays = COMB_DELAYS_MS.map(|ms| ms_to_samples(ms, sr));
        let allpass_delays = ALLPASS_DELAYS_MS.map(|ms| ms_to_samples(ms, sr));
        tracing::trace!(?comb_delays, ?allpass_delays, "schroeder reverb configured");

        Ok(Self {
            params,
            comb_delays,
            allpass_delays,
        })
    }

    /// Comb delays in samples.
    pub fn comb_delays(&self) -> [usize; 4] {
        self.comb_delays
    }

    /// Allpass delays in samples.
    pub fn allpass_delays(&self) -> [usize; 2] {
        self.allpass_delays
    }

    fn build_bank(&self) -> Result<([CombFilter; 4], [AllpassFilter; 2]), ReverbError> {
        let [c0, c1, c2, c3] = self.comb_delays;
        let [a0, a1] = self.allpass_delays;
        Ok((
            [
                CombFilter::new(c0, COMB_GAINS[0])?,
                CombFilter::new(c1, COMB_GAINS[1])?,
                CombFilter::new(c2, COMB_GAINS[2])?,
                CombFilter::new(c3, COMB_GAINS[3])?,
            ],
            [
                AllpassFilter::new(a0, ALLPASS_GAINS[0])?,
                AllpassFilter::new(a1, ALLPASS_GAINS[1])?,
            ],
        ))
    }
}

impl Reverb for SchroederReverb {
    fn name(&self) -> &'static str {
        "schroeder"
    }

    fn default_mix(&self) -> f32 {
        self.params.mix
    }

    fn output_len(&self, input_len: usize) -> usize {
        input_len
    }

    fn process(&self, channels: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ReverbError> {
        per_channel(channels, |_, input| {
            let (mut combs, mut allpasses) = self.build_bank()?;

            Ok(input
                .iter()
                .map(|&x| {
                    let sum: f32 = combs.iter_mut().map(|c| c.process(x)).sum();
                    allpasses
                        .iter_mut()
                        .fold(sum * COMB_OUTPUT_SCALE, |acc, ap| ap.process(acc))
                })
                .collect())
        })
    }
}
