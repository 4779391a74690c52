//! Room impulse responses.
//!
//! An [`ImpulseResponse`] is a fixed, read-only asset: it is built once (from a
//! WAV file or synthesized), resampled to every rate it will be used at, and
//! shared behind an `Arc` by all requests.

use crate::resample::resample_rate;
use crate::{ReverbError, per_channel};
use aural_io::Waveform;

/// Decay of 60 dB expressed as a natural-log amplitude ratio, `ln(1000)`.
const DECAY_60DB: f32 = 6.907_755;

/// A multi-channel room impulse response at a known sample rate.
///
/// Invariants: at least one channel, at least one frame, every channel the
/// same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl ImpulseResponse {
    /// Build a response from per-channel samples.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, ReverbError> {
        if sample_rate == 0 {
            return Err(ReverbError::InvalidParameter {
                name: "sample_rate",
                reason: "must be greater than zero".to_string(),
            });
        }

        let frames = channels.first().map_or(0, Vec::len);
        if frames == 0 {
            return Err(ReverbError::EmptyImpulse);
        }
        if let Some(bad) = channels.iter().position(|ch| ch.len() != frames) {
            return Err(ReverbError::InvalidParameter {
                name: "channels",
                reason: format!(
                    "channel {bad} has {} frames, expected {frames}",
                    channels[bad].len()
                ),
            });
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Take the samples of a decoded WAV file.
    pub fn from_waveform(waveform: Waveform) -> Result<Self, ReverbError> {
        let sample_rate = waveform.sample_rate();
        Self::new(sample_rate, waveform.into_channels())
    }

    /// Synthesize a response: a unit direct path followed by exponentially
    /// decaying white noise that falls by 60 dB over `rt60_secs`.
    ///
    /// Each channel uses a different noise seed so stereo output decorrelates.
    /// The generator is deterministic.
    ///
    /// ```rust
    /// use aural_reverb::ImpulseResponse;
    ///
    /// let ir = ImpulseResponse::synthetic(44100, 0.5, 0.4, 2).unwrap();
    /// assert_eq!(ir.num_channels(), 2);
    /// assert_eq!(ir.frames(), 22050);
    /// assert_eq!(ir.channel_for(0)[0], 1.0);
    /// ```
    pub fn synthetic(
        sample_rate: u32,
        duration_secs: f32,
        rt60_secs: f32,
        channels: usize,
    ) -> Result<Self, ReverbError> {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return Err(ReverbError::InvalidParameter {
                name: "duration",
                reason: format!("{duration_secs} s is not a positive duration"),
            });
        }
        if !(rt60_secs.is_finite() && rt60_secs > 0.0) {
            return Err(ReverbError::InvalidParameter {
                name: "rt60",
                reason: format!("{rt60_secs} s is not a positive decay time"),
            });
        }
        if channels == 0 {
            return Err(ReverbError::InvalidParameter {
                name: "channels",
                reason: "at least one channel is required".to_string(),
            });
        }

        let sr = sample_rate as f32;
        let frames = aural_core::seconds_to_samples(duration_secs, sr);
        let rate = DECAY_60DB / (rt60_secs * sr);

        let data = (0..channels)
            .map(|ch| {
                let mut state = 0x9E37_79B9_u32.wrapping_mul(ch as u32 + 1);
                let mut h = Vec::with_capacity(frames);
                h.push(1.0);
                for n in 1..frames {
                    state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    let noise = (state as i32 as f32) / (i32::MAX as f32);
                    h.push(noise * (-rate * n as f32).exp());
                }
                h
            })
            .collect();

        Self::new(sample_rate, data)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of every channel.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Response channel used for input channel `channel`.
    ///
    /// Channels wrap: a mono response serves every input channel, a stereo
    /// response alternates.
    pub fn channel_for(&self, channel: usize) -> &[f32] {
        &self.channels[channel % self.channels.len()]
    }

    /// Copy of this response converted to `sample_rate`.
    pub fn resampled_to(&self, sample_rate: u32) -> Result<Self, ReverbError> {
        if sample_rate == self.sample_rate {
            return Ok(self.clone());
        }

        let channels = per_channel(&self.channels, |_, ch| {
            resample_rate(ch, self.sample_rate, sample_rate)
        })?;
        Self::new(sample_rate, channels)
    }
}
