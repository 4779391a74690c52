//! Convolution reverb against a recorded room impulse response.

use crate::convolution::{DEFAULT_DIRECT_THRESHOLD, convolve};
use crate::{ImpulseResponse, Reverb, ReverbError, per_channel, validate_mix};
use aural_core::normalize_peak;
use std::sync::Arc;

/// Parameters of [`ConvolutionReverb`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConvolutionParams {
    /// Wet/dry ratio. Fully wet by default.
    pub mix: f32,
    /// Largest `input_len * response_len` product convolved in the time
    /// domain; anything bigger goes through FFT overlap-add.
    pub direct_threshold: u64,
}

impl Default for ConvolutionParams {
    fn default() -> Self {
        Self {
            mix: 1.0,
            direct_threshold: DEFAULT_DIRECT_THRESHOLD,
        }
    }
}

impl ConvolutionParams {
    /// Check the mix ratio.
    pub fn validate(&self) -> Result<(), ReverbError> {
        validate_mix(self.mix).map(|_| ())
    }
}

/// Linear convolution with a shared impulse response.
///
/// The full tail is kept: `n` input frames become `n + m - 1` output frames
/// for a response of `m` frames. When the convolved signal peaks above 1.0 all
/// channels are scaled down by the same gain, preserving the stereo image.
///
/// ```rust
/// use std::sync::Arc;
/// use aural_reverb::{ConvolutionParams, ConvolutionReverb, ImpulseResponse, Reverb};
///
/// let ir = Arc::new(ImpulseResponse::new(44100, vec![vec![0.5, 0.25]]).unwrap());
/// let reverb = ConvolutionReverb::new(ConvolutionParams::default(), ir, 44100).unwrap();
///
/// let wet = reverb.process(&[vec![1.0, 0.0, 0.0]]).unwrap();
/// assert_eq!(wet[0], vec![0.5, 0.25, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct ConvolutionReverb {
    params: ConvolutionParams,
    impulse: Arc<ImpulseResponse>,
}

impl ConvolutionReverb {
    /// Configure the reverb. `impulse` must already be at `sample_rate`.
    pub fn new(
        params: ConvolutionParams,
        impulse: Arc<ImpulseResponse>,
        sample_rate: u32,
    ) -> Result<Self, ReverbError> {
        params.validate()?;
        if impulse.sample_rate() != sample_rate {
            return Err(ReverbError::InvalidParameter {
                name: "impulse",
                reason: format!(
                    "response is at {} Hz but the input is at {sample_rate} Hz",
                    impulse.sample_rate()
                ),
            });
        }

        Ok(Self { params, impulse })
    }

    /// The impulse response in use.
    pub fn impulse(&self) -> &ImpulseResponse {
        &self.impulse
    }
}

impl Reverb for ConvolutionReverb {
    fn name(&self) -> &'static str {
        "rir"
    }

    fn default_mix(&self) -> f32 {
        self.params.mix
    }

    fn output_len(&self, input_len: usize) -> usize {
        if input_len == 0 {
            0
        } else {
            input_len + self.impulse.frames() - 1
        }
    }

    fn process(&self, channels: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ReverbError> {
        let threshold = self.params.direct_threshold;
        let mut wet = per_channel(channels, |c, input| {
            Ok(convolve(input, self.impulse.channel_for(c), threshold))
        })?;

        let mut views: Vec<&mut [f32]> = wet.iter_mut().map(Vec::as_mut_slice).collect();
        let gain = normalize_peak(&mut views, 1.0);
        if gain < 1.0 {
            tracing::debug!(gain, "normalized convolution output");
        }

        Ok(wet)
    }
}
