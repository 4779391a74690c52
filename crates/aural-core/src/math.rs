//! Mathematical utility functions for DSP.
//!
//! Allocation-free helpers shared by the reverb algorithms and the mixer.
//!
//! - [`wet_dry_mix`] - Crossfade between dry and processed signal
//! - [`hard_clip`] - Hard limiter
//! - [`peak`] / [`normalize_peak`] - Peak measurement and scaling
//! - [`ms_to_samples`] / [`seconds_to_samples`] - Time conversions

/// Flush denormal floats to zero.
///
/// Feedback loops decaying towards silence otherwise spend a long time in the
/// subnormal range, which is very slow on most CPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals.
///
/// Equivalent to `dry * (1 - mix) + wet * mix`.
///
/// ```rust
/// use aural_core::wet_dry_mix;
///
/// assert_eq!(wet_dry_mix(1.0, 0.0, 0.0), 1.0);
/// assert_eq!(wet_dry_mix(1.0, 0.0, 1.0), 0.0);
/// assert!((wet_dry_mix(1.0, 0.0, 0.3) - 0.7).abs() < 1e-6);
/// ```
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Hard clip to `[-threshold, threshold]`.
///
/// Non-finite input maps to 0 so a NaN can never reach the encoder.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    if x.is_finite() {
        x.clamp(-threshold, threshold)
    } else if x.is_nan() {
        0.0
    } else {
        libm::copysignf(threshold, x)
    }
}

/// Peak absolute value of a buffer (0 for an empty buffer).
#[inline]
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Scale `buffers` jointly so their common peak does not exceed `ceiling`.
///
/// Buffers already within the ceiling are left untouched, which keeps quiet
/// material quiet. Returns the gain that was applied.
///
/// ```rust
/// use aural_core::normalize_peak;
///
/// let mut left = vec![0.5, -2.0];
/// let mut right = vec![1.0, 0.25];
/// let gain = normalize_peak(&mut [&mut left[..], &mut right[..]], 1.0);
/// assert_eq!(gain, 0.5);
/// assert_eq!(left, vec![0.25, -1.0]);
/// assert_eq!(right, vec![0.5, 0.125]);
/// ```
pub fn normalize_peak(buffers: &mut [&mut [f32]], ceiling: f32) -> f32 {
    let max = buffers.iter().map(|b| peak(b)).fold(0.0f32, f32::max);
    if max <= ceiling || max == 0.0 {
        return 1.0;
    }

    let gain = ceiling / max;
    for buffer in buffers.iter_mut() {
        for sample in buffer.iter_mut() {
            *sample *= gain;
        }
    }
    gain
}

/// Convert milliseconds to a whole number of samples (rounded, at least 1).
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    seconds_to_samples(ms * 0.001, sample_rate)
}

/// Convert seconds to a whole number of samples (rounded, at least 1).
#[inline]
pub fn seconds_to_samples(seconds: f32, sample_rate: f32) -> usize {
    let samples = libm::roundf(seconds * sample_rate);
    if samples < 1.0 { 1 } else { samples as usize }
}
