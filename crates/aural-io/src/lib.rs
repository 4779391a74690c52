//! WAV codec for the aural reverberation engine.
//!
//! This crate converts between RIFF/WAVE bytes and [`Waveform`], the
//! normalized, de-interleaved sample buffer every algorithm works on.
//!
//! - **In-memory codec**: [`decode`] and [`encode`] operate on byte buffers,
//!   matching an upload/download boundary
//! - **Metadata**: [`read_info`] inspects the header without converting samples
//! - **Files**: [`read_file`] and [`write_file`] for the CLI and asset loading
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aural_io::{decode, encode};
//!
//! let waveform = decode(&bytes)?;
//! println!("{} channels, {} frames", waveform.num_channels(), waveform.frames());
//! let bytes = encode(&waveform)?;
//! ```

mod wav;

pub use wav::{
    MAX_SAMPLE_RATE, SUPPORTED_BIT_DEPTHS, WavFormat, WavInfo, WavSpec, Waveform, decode, encode,
    full_scale, read_file, read_info, write_file,
};

/// Error types for WAV encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a valid PCM WAV file: bad container magic, truncated
    /// chunks or an unsupported bit depth.
    #[error("invalid WAV data: {0}")]
    Format(String),

    /// A waveform violates its shape invariants (channel count, lengths, depth).
    #[error("invalid waveform: {0}")]
    InvalidWaveform(String),

    /// WAV serialization error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for WAV operations.
pub type Result<T> = std::result::Result<T, Error>;
