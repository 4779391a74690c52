//! Linear convolution, direct and FFT overlap-add.
//!
//! Both forms compute the full linear convolution: for a signal of length `n`
//! and a kernel of length `m` the result has `n + m - 1` samples. The tail past
//! the end of the signal is part of the result, never trimmed.
//!
//! # Overlap-add
//!
//! The signal is cut into blocks of `L = N - m + 1` samples, where `N` is the
//! FFT size. Each block is zero-padded to `N`, transformed, multiplied with the
//! precomputed kernel spectrum and transformed back, which yields that block's
//! `L + m - 1` sample contribution without circular wrap-around. Contributions
//! overlap by `m - 1` samples and are summed into the output.
//!
//! ```text
//! x: [ block 0 ][ block 1 ][ block 2 ]
//! y: [ block 0 * h      ]
//!              [ block 1 * h      ]
//!                         [ block 2 * h      ]
//! ```
//!
//! Blocks are independent, so their transforms run in parallel; the final
//! accumulation is sequential.
//!
//! Reference: A. V. Oppenheim and R. W. Schafer, *Discrete-Time Signal
//! Processing*, 3rd ed., Section 8.7.3.

use crate::fft::Fft;
use rayon::prelude::*;
use rustfft::num_complex::Complex;

/// Smallest FFT size used by [`OverlapAdd`].
pub const MIN_FFT_SIZE: usize = 256;

/// Default `n * m` work bound below which [`convolve`] uses the direct form.
pub const DEFAULT_DIRECT_THRESHOLD: u64 = 65_536;

/// Direct time-domain linear convolution.
///
/// O(n·m). Returns an empty vector when either input is empty.
///
/// ```rust
/// use aural_reverb::convolve_direct;
///
/// let y = convolve_direct(&[1.0, 2.0], &[1.0, 0.5, 0.25]);
/// assert_eq!(y, vec![1.0, 2.5, 1.25, 0.5]);
/// ```
pub fn convolve_direct(signal: &[f32], kernel: &[f32]) -> Vec<f32> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let mut output = vec![0.0f32; signal.len() + kernel.len() - 1];
    for (i, &x) in signal.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (o, &h) in output[i..].iter_mut().zip(kernel) {
            *o += x * h;
        }
    }
    output
}

/// Linear convolution choosing the direct or overlap-add form by cost.
///
/// Uses [`convolve_direct`] when `signal.len() * kernel.len() <=
/// direct_threshold`, otherwise a one-off [`OverlapAdd`].
pub fn convolve(signal: &[f32], kernel: &[f32], direct_threshold: u64) -> Vec<f32> {
    if (signal.len() as u64).saturating_mul(kernel.len() as u64) <= direct_threshold {
        convolve_direct(signal, kernel)
    } else {
        OverlapAdd::new(kernel).convolve(signal)
    }
}

/// FFT size for a kernel of `kernel_len` samples: the next power of two at
/// least twice the kernel length, so each block carries at least `m + 1`
/// fresh samples.
pub fn fft_size_for(kernel_len: usize) -> usize {
    (2 * kernel_len).next_power_of_two().max(MIN_FFT_SIZE)
}

/// Overlap-add convolver with a precomputed kernel spectrum.
///
/// Build once per kernel, then convolve any number of signals.
#[derive(Debug, Clone)]
pub struct OverlapAdd {
    fft: Fft,
    kernel_len: usize,
    block_len: usize,
    kernel_spectrum: Vec<Complex<f32>>,
}

impl OverlapAdd {
    /// Prepare a convolver for `kernel` with the default FFT size.
    ///
    /// # Panics
    ///
    /// Panics if `kernel` is empty.
    pub fn new(kernel: &[f32]) -> Self {
        Self::with_fft_size(kernel, fft_size_for(kernel.len()))
    }

    /// Prepare a convolver with an explicit FFT size.
    ///
    /// # Panics
    ///
    /// Panics if `kernel` is empty or `fft_size < kernel.len()`.
    pub fn with_fft_size(kernel: &[f32], fft_size: usize) -> Self {
        assert!(!kernel.is_empty(), "kernel must not be empty");
        assert!(
            fft_size >= kernel.len(),
            "FFT size {fft_size} is smaller than kernel length {}",
            kernel.len()
        );

        let fft = Fft::new(fft_size);
        let kernel_spectrum = fft.forward_real(kernel);

        Self {
            fft,
            kernel_len: kernel.len(),
            block_len: fft_size - kernel.len() + 1,
            kernel_spectrum,
        }
    }

    /// FFT size in use.
    pub fn fft_size(&self) -> usize {
        self.fft.size()
    }

    /// Input samples consumed per block.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Convolve `signal` with the kernel. Output length is `n + m - 1`
    /// (empty for an empty signal).
    pub fn convolve(&self, signal: &[f32]) -> Vec<f32> {
        if signal.is_empty() {
            return Vec::new();
        }

        let partials: Vec<Vec<f32>> = signal
            .par_chunks(self.block_len)
            .map(|block| self.convolve_block(block))
            .collect();

        let mut output = vec![0.0f32; signal.len() + self.kernel_len - 1];
        for (i, partial) in partials.into_iter().enumerate() {
            let offset = i * self.block_len;
            for (o, p) in output[offset..].iter_mut().zip(partial) {
                *o += p;
            }
        }
        output
    }

    fn convolve_block(&self, block: &[f32]) -> Vec<f32> {
        let mut buffer = self.fft.forward_real(block);
        for (b, h) in buffer.iter_mut().zip(&self.kernel_spectrum) {
            *b *= h;
        }
        self.fft.inverse_complex(&mut buffer);

        buffer[..block.len() + self.kernel_len - 1]
            .iter()
            .map(|c| c.re)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(n: usize, seed: u32) -> Vec<f32> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state as i32 as f32) / (i32::MAX as f32)
            })
            .collect()
    }

    fn assert_close(a: &[f32], b: &[f32], tol: f32) {
        assert_eq!(a.len(), b.len(), "length mismatch");
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() <= tol, "sample {i}: {x} vs {y}");
        }
    }

    #[test]
    fn test_direct_identity_kernel() {
        let x = noise(100, 1);
        assert_eq!(convolve_direct(&x, &[1.0]), x);
    }

    #[test]
    fn test_direct_impulse_returns_kernel() {
        let h = noise(37, 2);
        assert_eq!(convolve_direct(&[1.0], &h), h);
    }

    #[test]
    fn test_direct_empty() {
        assert!(convolve_direct(&[], &[1.0]).is_empty());
        assert!(convolve_direct(&[1.0], &[]).is_empty());
    }

    #[test]
    fn test_overlap_add_matches_direct_single_block() {
        let x = noise(100, 3);
        let h = noise(50, 4);
        let ola = OverlapAdd::new(&h);
        assert_close(&ola.convolve(&x), &convolve_direct(&x, &h), 1e-4);
    }

    #[test]
    fn test_overlap_add_matches_direct_many_blocks() {
        let x = noise(5000, 5);
        let h = noise(300, 6);
        let ola = OverlapAdd::with_fft_size(&h, 512);
        assert_eq!(ola.block_len(), 213);

        let y = ola.convolve(&x);
        assert_eq!(y.len(), 5000 + 300 - 1);
        assert_close(&y, &convolve_direct(&x, &h), 1e-3);
    }

    #[test]
    fn test_overlap_add_kernel_longer_than_signal() {
        let x = noise(10, 7);
        let h = noise(1000, 8);
        let y = OverlapAdd::new(&h).convolve(&x);
        assert_close(&y, &convolve_direct(&x, &h), 1e-4);
    }

    #[test]
    fn test_overlap_add_impulse_returns_kernel() {
        let h = noise(2048, 9);
        let y = OverlapAdd::new(&h).convolve(&[1.0]);
        assert_close(&y, &h, 1e-5);
    }

    #[test]
    fn test_convolve_dispatch_lengths() {
        let x = noise(1000, 10);
        let h = noise(200, 11);
        let direct = convolve(&x, &h, u64::MAX);
        let fft = convolve(&x, &h, 0);
        assert_eq!(direct.len(), 1199);
        assert_close(&fft, &direct, 1e-3);
    }

    #[test]
    fn test_fft_size_for() {
        assert_eq!(fft_size_for(1), MIN_FFT_SIZE);
        assert_eq!(fft_size_for(200), 512);
        assert_eq!(fft_size_for(256), 512);
        assert_eq!(fft_size_for(257), 1024);
    }

    #[test]
    fn test_silence_stays_silent() {
        let h = noise(500, 12);
        let y = OverlapAdd::new(&h).convolve(&vec![0.0; 3000]);
        assert!(y.iter().all(|&s| s == 0.0));
    }
}
