//! Schroeder allpass filter for reverb diffusion.
//!
//! Passes every frequency at equal magnitude while smearing phase, which turns
//! the discrete echoes of a comb bank into a dense tail.

use crate::{DelayLine, FilterError, flush_denormal, validate_gain};

/// Schroeder allpass filter.
///
/// ```text
/// y[n]     = -g · x[n] + d[n]
/// d[n + N] =  x[n] + g · y[n]
/// ```
///
/// Stable for `|g| < 1`.
///
/// # Example
///
/// ```rust
/// use aural_core::AllpassFilter;
///
/// let mut allpass = AllpassFilter::new(1, 0.5).unwrap();
/// assert_eq!(allpass.process(1.0), -0.5);
/// assert_eq!(allpass.process(0.0), 0.75);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    delay: DelayLine,
    gain: f32,
}

impl AllpassFilter {
    /// Create an allpass filter with `delay_samples` of delay and coefficient `gain`.
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

    /// Allpass coefficient.
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Process a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = -self.gain * input + self.delay.read();
        self.delay.write(flush_denormal(input + self.gain * output));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allpass_rejects_unstable_gain() {
        assert!(matches!(
            AllpassFilter::new(10, 1.0),
            Err(FilterError::NumericInstability { .. })
        ));
    }

    #[test]
    fn test_allpass_impulse_response() {
        let mut allpass = AllpassFilter::new(10, 0.5).unwrap();

        let first = allpass.process(1.0);
        assert!((first + 0.5).abs() < 1e-7, "First output should be -g");

        for _ in 0..9 {
            assert!(allpass.process(0.0).abs() < 1e-7);
        }

        // 1 - g^2 arrives after N samples
        let delayed = allpass.process(0.0);
        assert!((delayed - 0.75).abs() < 1e-6, "got {delayed}");
    }

    #[test]
    fn test_allpass_energy_conservation() {
        // Total impulse-response energy of an allpass is exactly 1
        let mut allpass = AllpassFilter::new(50, 0.7).unwrap();

        let mut energy = 0.0f32;
        for i in 0..20_000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let y = allpass.process(x);
            energy += y * y;
        }

        assert!((energy - 1.0).abs() < 1e-3, "energy {energy} should be ~1");
    }

    #[test]
    fn test_allpass_clear() {
        let mut allpass = AllpassFilter::new(10, 0.5).unwrap();

        for _ in 0..20 {
            allpass.process(1.0);
        }

        allpass.clear();

        let out = allpass.process(0.0);
        assert!(out.abs() < 1e-10, "Should be silent after clear");
    }

    #[test]
    fn test_no_denormals_after_silence() {
        let mut allpass = AllpassFilter::new(100, 0.7).unwrap();

        for _ in 0..1000 {
            allpass.process(0.5);
        }

        for i in 0..100_000 {
            let out = allpass.process(0.0);
            assert!(
                out == 0.0 || out.abs() > f32::MIN_POSITIVE,
                "Denormal detected at sample {}: {:.2e}",
                i,
                out
            );
        }
    }
}
