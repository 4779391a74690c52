//! Dry/wet blending and output limiting.
//!
//! This is the one place that guarantees every sample handed to the encoder
//! is finite and inside `[-1.0, 1.0]`.

use aural_core::{hard_clip, wet_dry_mix};

/// Blend `dry` and `wet` as `dry * (1 - mix) + wet * mix`.
///
/// The shorter signal is treated as zero past its end, so a convolution tail
/// longer than the input is kept.
///
/// ```rust
/// use aural_engine::mixer::mix;
///
/// let out = mix(&[1.0, 1.0], &[0.0, 0.0, 0.5], 0.5);
/// assert_eq!(out, vec![0.5, 0.5, 0.25]);
/// ```
pub fn mix(dry: &[f32], wet: &[f32], mix: f32) -> Vec<f32> {
    let len = dry.len().max(wet.len());
    (0..len)
        .map(|i| {
            let d = dry.get(i).copied().unwrap_or(0.0);
            let w = wet.get(i).copied().unwrap_or(0.0);
            wet_dry_mix(d, w, mix)
        })
        .collect()
}

/// Clamp every sample to `[-1.0, 1.0]`; NaN becomes silence.
pub fn limit(samples: &mut [f32]) {
    for s in samples {
        *s = hard_clip(*s, 1.0);
    }
}

/// Blend and limit every channel.
///
/// Returns the output channels and the number of samples the limiter changed.
pub fn mix_channels(dry: &[Vec<f32>], wet: &[Vec<f32>], ratio: f32) -> (Vec<Vec<f32>>, usize) {
    let mut clipped = 0;
    let out = dry
        .iter()
        .zip(wet)
        .map(|(d, w)| {
            let mut ch = mix(d, w, ratio);
            clipped += ch.iter().filter(|s| s.is_nan() || s.abs() > 1.0).count();
            limit(&mut ch);
            ch
        })
        .collect();
    (out, clipped)
}
