//! Algorithm selection and per-invocation requests.

use crate::EngineConfig;
use crate::error::EngineError;
use aural_reverb::{ConvolutionParams, SchroederParams, SimpleParams};
use std::fmt;
use std::str::FromStr;

/// The closed set of reverberation algorithms the engine offers.
///
/// Parsed from a selector string: case-insensitive, surrounding whitespace
/// ignored. Anything else, including the `comb` and `allpass` selectors that
/// are not offered yet, is rejected with
/// [`EngineError::UnsupportedAlgorithm`].
///
/// ```rust
/// use aural_engine::Algorithm;
///
/// assert_eq!(" Schroeder ".parse::<Algorithm>().unwrap(), Algorithm::Schroeder);
/// assert!("comb".parse::<Algorithm>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Single feedback comb per channel.
    Simple,
    /// Four parallel combs into two series allpasses.
    Schroeder,
    /// Convolution with the room impulse response.
    Rir,
}

impl Algorithm {
    /// Every supported algorithm, in selector order.
    pub const ALL: [Algorithm; 3] = [Algorithm::Simple, Algorithm::Schroeder, Algorithm::Rir];

    /// Selector string of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Simple => "simple",
            Algorithm::Schroeder => "schroeder",
            Algorithm::Rir => "rir",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str() == tag)
            .ok_or_else(|| EngineError::UnsupportedAlgorithm(s.trim().to_string()))
    }
}

/// One invocation's algorithm and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReverbRequest {
    /// Single-reflection comb reverb.
    Simple(SimpleParams),
    /// Schroeder network.
    Schroeder(SchroederParams),
    /// Convolution with the engine's impulse response.
    Convolution(ConvolutionParams),
}

impl ReverbRequest {
    /// Request for `algorithm` with the defaults from `config`.
    pub fn from_config(algorithm: Algorithm, config: &EngineConfig) -> Self {
        match algorithm {
            Algorithm::Simple => Self::Simple(config.simple),
            Algorithm::Schroeder => Self::Schroeder(config.schroeder),
            Algorithm::Rir => Self::Convolution(config.convolution),
        }
    }

    /// Parse `selector` and build the request from `config`.
    pub fn from_selector(selector: &str, config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::from_config(selector.parse()?, config))
    }

    /// Algorithm this request runs.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Simple(_) => Algorithm::Simple,
            Self::Schroeder(_) => Algorithm::Schroeder,
            Self::Convolution(_) => Algorithm::Rir,
        }
    }

    /// Wet/dry ratio of this request.
    pub fn mix(&self) -> f32 {
        match self {
            Self::Simple(p) => p.mix,
            Self::Schroeder(p) => p.mix,
            Self::Convolution(p) => p.mix,
        }
    }

    /// Same request with a different wet/dry ratio.
    #[must_use]
    pub fn with_mix(mut self, mix: f32) -> Self {
        match &mut self {
            Self::Simple(p) => p.mix = mix,
            Self::Schroeder(p) => p.mix = mix,
            Self::Convolution(p) => p.mix = mix,
        }
        self
    }
}
