//! Rational sample-rate conversion for impulse responses.
//!
//! An impulse response recorded at one rate has to be brought to the rate of
//! the audio it is convolved with. Conversion by `P/Q` is modelled as
//! upsampling by `P`, lowpass filtering at `0.9 / max(P, Q)` of Nyquist, then
//! keeping every `Q`-th sample. The polyphase form below computes only the
//! samples that survive the final decimation.
//!
//! Reference: P. P. Vaidyanathan, *Multirate Systems and Filter Banks*,
//! Prentice Hall, 1993, Section 4.3.
//!
//! # Example
//!
//! ```rust
//! use aural_reverb::resample::resample_rate;
//!
//! let ir = vec![1.0f32, 0.5, 0.25, 0.125];
//! let up = resample_rate(&ir, 44100, 48000).unwrap();
//! assert_eq!(up.len(), (4 * 160usize).div_ceil(147));
//! ```

use crate::ReverbError;
use std::f32::consts::PI;

/// Windowed-sinc lowpass FIR with a Blackman window, normalized to unity DC
/// gain.
///
/// `cutoff` is normalized to Nyquist (`1.0 == fs / 2`).
///
/// Reference: A. V. Oppenheim and R. W. Schafer, *Discrete-Time Signal
/// Processing*, 3rd ed., Section 7.6.
pub fn design_lowpass(num_taps: usize, cutoff: f32) -> Vec<f32> {
    if num_taps == 0 {
        return Vec::new();
    }

    let m = num_taps - 1;
    let centre = m as f32 / 2.0;

    let mut coeffs: Vec<f32> = (0..num_taps)
        .map(|n| {
            let x = n as f32 - centre;
            let sinc = if x.abs() < 1e-7 {
                cutoff
            } else {
                (PI * cutoff * x).sin() / (PI * x)
            };
            let window = if m == 0 {
                1.0
            } else {
                let phase = 2.0 * PI * n as f32 / m as f32;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            };
            sinc * window
        })
        .collect();

    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-10 {
        for c in &mut coeffs {
            *c /= sum;
        }
    }

    coeffs
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Largest reduced up/down factor [`resample_rate`] filters with exactly.
///
/// Every pair of common rates up to 768 kHz reduces below this (44.1 kHz to
/// 768 kHz is 2560/147). Rarer pairs are approximated by the nearest ratio
/// within the bound.
pub const MAX_RESAMPLE_FACTOR: usize = 4096;

/// Resample by the rational factor `p / q`.
///
/// The ratio is reduced by its GCD first; `1/1` returns the input unchanged.
/// `filter_order` is the prototype FIR length, `0` selects
/// `40 * max(P, Q) + 1` taps. Output length is `ceil(len * P / Q)`.
///
/// The prototype's group delay is removed, so output sample `0` is aligned
/// with input sample `0` and the last input sample lands inside the output.
/// Memory and time grow with `max(P, Q)`; [`resample_rate`] bounds it.
///
/// # Panics
///
/// Panics if `p` or `q` is zero.
pub fn resample(signal: &[f32], p: usize, q: usize, filter_order: usize) -> Vec<f32> {
    assert!(p >= 1 && q >= 1, "resampling factors must be >= 1");

    let g = gcd(p, q);
    let (p, q) = (p / g, q / g);

    if p == 1 && q == 1 {
        return signal.to_vec();
    }

    let num_taps = if filter_order == 0 {
        40 * p.max(q) + 1
    } else {
        filter_order
    };
    let prototype = design_lowpass(num_taps, 0.9 / p.max(q) as f32);
    let delay = (num_taps - 1) / 2;

    // Branch k holds prototype taps k, k + P, k + 2P, ...
    let taps_per_phase = num_taps.div_ceil(p);
    let mut polyphase = vec![vec![0.0f32; taps_per_phase]; p];
    for (idx, &coeff) in prototype.iter().enumerate() {
        polyphase[idx % p][idx / p] = coeff;
    }

    let out_len = (signal.len() * p).div_ceil(q);
    let gain = p as f32;

    (0..out_len)
        .map(|m| {
            let upsampled_idx = m * q + delay;
            let n = upsampled_idx / p;
            let branch = &polyphase[upsampled_idx % p];

            let acc: f32 = branch
                .iter()
                .enumerate()
                .take_while(|&(i, _)| i <= n)
                .filter_map(|(i, &c)| signal.get(n - i).map(|&x| c * x))
                .sum();
            acc * gain
        })
        .collect()
}

/// Best approximation of `p / q` with both terms at most `max`, from the
/// continued-fraction convergents. `None` when even the first usable
/// convergent is out of range.
fn approximate_ratio(p: usize, q: usize, max: usize) -> Option<(usize, usize)> {
    let (mut h0, mut h1) = (0usize, 1usize);
    let (mut k0, mut k1) = (1usize, 0usize);
    let (mut num, mut den) = (p, q);
    let mut best = None;

    while den != 0 {
        let a = num / den;
        let h = a.checked_mul(h1).and_then(|v| v.checked_add(h0));
        let k = a.checked_mul(k1).and_then(|v| v.checked_add(k0));
        match (h, k) {
            (Some(h), Some(k)) if h <= max && k <= max => {
                if h > 0 {
                    best = Some((h, k));
                }
                (h0, h1) = (h1, h);
                (k0, k1) = (k1, k);
            }
            _ => break,
        }
        (num, den) = (den, num - a * den);
    }
    best
}

/// Convert `signal` from `from_rate` Hz to `to_rate` Hz.
///
/// Equal rates return a copy. Zero rates and rates above
/// [`aural_io::MAX_SAMPLE_RATE`] are rejected. When the reduced ratio needs a
/// factor above [`MAX_RESAMPLE_FACTOR`] the nearest ratio within it is used,
/// which shifts the response's time scale by a few parts per million at most.
pub fn resample_rate(
    signal: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, ReverbError> {
    let limit = aural_io::MAX_SAMPLE_RATE;
    if from_rate == 0 || to_rate == 0 || from_rate > limit || to_rate > limit {
        return Err(ReverbError::Resample(format!(
            "cannot convert between {from_rate} Hz and {to_rate} Hz"
        )));
    }
    if from_rate == to_rate {
        return Ok(signal.to_vec());
    }

    let g = gcd(to_rate as usize, from_rate as usize);
    let (mut p, mut q) = (to_rate as usize / g, from_rate as usize / g);
    if p.max(q) > MAX_RESAMPLE_FACTOR {
        (p, q) = approximate_ratio(p, q, MAX_RESAMPLE_FACTOR).ok_or_else(|| {
            ReverbError::Resample(format!(
                "ratio {to_rate}/{from_rate} is too extreme to resample"
            ))
        })?;
        tracing::debug!(from_rate, to_rate, p, q, "approximated resampling ratio");
    }

    tracing::debug!(from_rate, to_rate, len = signal.len(), "resampling signal");
    Ok(resample(signal, p, q, 0))
}
