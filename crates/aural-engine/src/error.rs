//! Error types for the engine boundary.

use aural_core::FilterError;
use aural_reverb::ReverbError;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure category reported to callers of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input bytes are not an acceptable WAV file.
    FormatError,
    /// The requested algorithm is unknown or not offered.
    UnsupportedAlgorithm,
    /// A failure inside the engine that the caller cannot fix by changing input.
    InternalError,
    /// A filter was configured with a feedback gain that would not decay.
    NumericInstability,
}

impl ErrorKind {
    /// Stable identifier of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormatError => "FormatError",
            Self::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            Self::InternalError => "InternalError",
            Self::NumericInstability => "NumericInstability",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`Engine`](crate::Engine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input could not be decoded.
    #[error("invalid input: {0}")]
    Format(#[source] aural_io::Error),

    /// The selector does not name a supported algorithm.
    #[error("unsupported reverb algorithm '{0}' (expected simple, schroeder or rir)")]
    UnsupportedAlgorithm(String),

    /// A filter gain would make the recursion diverge.
    #[error("numerically unstable configuration: {0}")]
    NumericInstability(#[source] FilterError),

    /// Processing failed for a reason unrelated to the input bytes.
    #[error("internal error: {0}")]
    Internal(String),

    /// The engine configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format(_) => ErrorKind::FormatError,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::NumericInstability(_) => ErrorKind::NumericInstability,
            Self::Internal(_) => ErrorKind::InternalError,
            Self::Config(err) if err.is_instability() => ErrorKind::NumericInstability,
            Self::Config(_) => ErrorKind::InternalError,
        }
    }
}

impl From<aural_io::Error> for EngineError {
    fn from(err: aural_io::Error) -> Self {
        Self::Format(err)
    }
}

impl From<ReverbError> for EngineError {
    fn from(err: ReverbError) -> Self {
        match err {
            ReverbError::Filter(f @ FilterError::NumericInstability { .. }) => {
                Self::NumericInstability(f)
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Errors from loading, saving or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A section holds out-of-range values.
    #[error("invalid [{section}] settings: {source}")]
    Invalid {
        /// Name of the offending section.
        section: &'static str,
        /// What the reverb rejected.
        #[source]
        source: ReverbError,
    },

    /// A preload sample rate of zero.
    #[error("preload_rates contains 0 Hz")]
    ZeroPreloadRate,

    /// The impulse-response asset could not be loaded.
    #[error("failed to load impulse response '{path}': {source}")]
    ImpulseResponse {
        /// Path of the asset.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: aural_io::Error,
    },

    /// The impulse-response asset decoded but is unusable.
    #[error("unusable impulse response: {0}")]
    InvalidImpulse(#[source] ReverbError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Whether the rejection was an unstable feedback gain.
    pub fn is_instability(&self) -> bool {
        matches!(
            self,
            ConfigError::Invalid {
                source: ReverbError::Filter(FilterError::NumericInstability { .. }),
                ..
            }
        )
    }
}
