//! Fixed-length delay line.
//!
//! A circular buffer holding exactly `N` samples. Each tick reads the oldest
//! sample and then overwrites that same slot with the newest one, so a value
//! written at tick `n` is read back at tick `n + N`.
//!
//! | Use | Typical length |
//! |-----|----------------|
//! | Schroeder allpass | 1-5 ms |
//! | Schroeder comb | 30-45 ms |
//! | Single-reflection echo | 20-100 ms |
//!
//! Only integer delays are supported; reverb tunings are whole sample counts.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::FilterError;

/// Integer delay line backed by a heap-allocated circular buffer.
///
/// The buffer is allocated once in [`DelayLine::new`] and never reallocates.
///
/// # Example
///
/// ```rust
/// use aural_core::DelayLine;
///
/// let mut delay = DelayLine::new(3).unwrap();
/// let mut out = Vec::new();
/// for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
///     out.push(delay.read());
///     delay.write(x);
/// }
/// assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Circular buffer storage
    buffer: Vec<f32>,
    /// Slot read this tick and overwritten by the next write
    pos: usize,
}

impl DelayLine {
    /// Creates a delay line of `length` samples, initially silent.
    ///
    /// Returns [`FilterError::ZeroDelay`] when `length` is 0.
    pub fn new(length: usize) -> Result<Self, FilterError> {
        if length == 0 {
            return Err(FilterError::ZeroDelay);
        }

        Ok(Self {
            buffer: vec![0.0; length],
            pos: 0,
        })
    }

    /// Returns the oldest sample, written `len()` ticks ago.
    #[inline]
    pub fn read(&self) -> f32 {
        self.buffer[self.pos]
    }

    /// Overwrites the oldest slot with `sample` and advances one tick.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.pos] = sample;
        self.pos += 1;
        if self.pos == self.buffer.len() {
            self.pos = 0;
        }
    }

    /// Combined read and write: returns the oldest sample and stores `sample`.
    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        let out = self.read();
        self.write(sample);
        out
    }

    /// Clears the delay line (sets all samples to 0).
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }

    /// Delay length in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always `false`; a delay line holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
