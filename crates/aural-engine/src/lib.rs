//! Aural Engine - offline reverberation behind one facade
//!
//! The [`Engine`] takes an encoded WAV file and a reverb selector, and returns
//! the encoded, reverberated result:
//!
//! ```text
//! bytes ─▶ decode ─▶ Reverb (simple | schroeder | rir) ─▶ mix + limit ─▶ encode ─▶ bytes
//! ```
//!
//! - [`Algorithm`] / [`ReverbRequest`] - the closed set of algorithms and one
//!   invocation's parameters
//! - [`mixer`] - dry/wet blending and the output limiter
//! - [`EngineConfig`] - TOML configuration with per-algorithm defaults
//! - [`EngineError`] / [`ErrorKind`] - the failure taxonomy reported to callers
//!
//! Requests are independent. The only state that outlives a request is the
//! impulse-response bank, built once in [`Engine::new`] and shared read-only.
//!
//! ## Example
//!
//! ```rust
//! use aural_engine::{Algorithm, Engine, EngineConfig};
//! use aural_io::{Waveform, encode};
//!
//! let config = EngineConfig { preload_rates: vec![], ..EngineConfig::default() };
//! let engine = Engine::new(config).unwrap();
//!
//! let input = encode(&Waveform::pcm(44100, 16, vec![vec![0.0; 441]]).unwrap()).unwrap();
//! let output = engine.process_selector(&input, "simple").unwrap();
//!
//! let decoded = aural_io::decode(&output).unwrap();
//! assert_eq!(decoded.frames(), 441);
//! ```

mod config;
mod engine;
mod error;
pub mod mixer;
mod request;

pub use config::{DEFAULT_PRELOAD_RATES, EngineConfig, user_config_path};
pub use engine::{Engine, SYNTHETIC_IMPULSE_SECS, SYNTHETIC_RT60_SECS, output_file_name};
pub use error::{ConfigError, EngineError, ErrorKind};
pub use request::{Algorithm, ReverbRequest};

/// Re-export of the reverb parameter types used in [`ReverbRequest`].
pub use aural_reverb::{ConvolutionParams, ImpulseResponse, SchroederParams, SimpleParams};
