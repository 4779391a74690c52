//! Feedback comb filter.
//!
//! The recursive comb is the resonator at the heart of every Schroeder-style
//! reverb: each pass around the loop is one echo, attenuated by the feedback
//! gain.
//!
//! ```text
//! x ──→ (+) ──────────┬──→ y
//!        ↑            │
//!        └── g · [z^-N] ←┘
//! ```

use crate::{DelayLine, FilterError, flush_denormal, validate_gain};

/// Feedback comb filter, `y[n] = x[n] + g · y[n - N]`.
///
/// Stable for `|g| < 1`; for input bounded by `A` the output never exceeds
/// `A / (1 - |g|)`.
///
/// # Example
///
/// ```rust
/// use aural_core::CombFilter;
///
/// let mut comb = CombFilter::new(2, 0.5).unwrap();
/// let out: Vec<f32> = [1.0, 0.0, 0.0, 0.0, 0.0]
///     .iter()
///     .map(|&x| comb.process(x))
///     .collect();
/// assert_eq!(out, vec![1.0, 0.0, 0.5, 0.0, 0.25]);
/// ```
#[derive(Debug, Clone)]
pub struct CombFilter {
    delay: DelayLine,
    gain: f32,
}

impl CombFilter {
    /// Create a comb filter with `delay_samples` of delay and feedback `gain`.
    ///
    /// # Errors
    ///
    /// - [`FilterError::NumericInstability`] if `|gain| >= 1`
    /// - [`FilterError::ZeroDelay`] if `delay_samples == 0`
    pub fn new(delay_samples: usize, gain: f32) -> Result<Self, FilterError> {
        let gain = validate_gain(gain)?;
        Ok(Self {
            delay: DelayLine::new(delay_samples)?,
            gain,
        })
    }

    /// Feedback gain.
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Process a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = flush_denormal(input + self.gain * self.delay.read());
        self.delay.write(output);
        output
    }

    /// Process a buffer in place.
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the filter state.
    pub fn clear(&mut self) {
        self.delay.clear();
    }

    /// Delay length in samples.
    pub fn delay_len(&self) -> usize {
        self.delay.len()
    }
}
