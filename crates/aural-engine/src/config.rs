//! Engine configuration.
//!
//! Settings live in a TOML file. Every key is optional; missing keys take the
//! built-in defaults.
//!
//! ```toml
//! # Relative paths resolve against the directory of this file
//! impulse_response = "rooms/hall.wav"
//! preload_rates = [44100, 48000]
//!
//! [simple]
//! source_distance_m = 2.0
//! wall_distance_m = 10.0
//! feedback = 0.5
//! mix = 0.3
//!
//! [schroeder]
//! mix = 0.3
//!
//! [convolution]
//! mix = 1.0
//! direct_threshold = 65536
//! ```
//!
//! # Lookup order
//!
//! [`EngineConfig::discover`] uses an explicit path when given, otherwise
//! [`user_config_path`] if that file exists, otherwise the defaults.

use crate::error::ConfigError;
use aural_reverb::{ConvolutionParams, ReverbError, SchroederParams, SimpleParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "aural";

/// File name of the engine configuration.
const CONFIG_FILE: &str = "engine.toml";

/// Sample rates the impulse response is resampled to at start-up.
pub const DEFAULT_PRELOAD_RATES: [u32; 5] = [22050, 44100, 48000, 88200, 96000];

/// Location of the per-user configuration file.
///
/// - Linux: `~/.config/aural/engine.toml`
/// - macOS: `~/Library/Application Support/aural/engine.toml`
/// - Windows: `%APPDATA%\aural\engine.toml`
///
/// `None` when the platform has no configuration directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// WAV file holding the room impulse response. When absent a synthetic
    /// response is generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impulse_response: Option<PathBuf>,
    /// Rates the response is prepared for when the engine starts.
    pub preload_rates: Vec<u32>,
    /// Defaults for `simple` requests.
    pub simple: SimpleParams,
    /// Defaults for `schroeder` requests.
    pub schroeder: SchroederParams,
    /// Defaults for `rir` requests.
    pub convolution: ConvolutionParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            impulse_response: None,
            preload_rates: DEFAULT_PRELOAD_RATES.to_vec(),
            simple: SimpleParams::default(),
            schroeder: SchroederParams::default(),
            convolution: ConvolutionParams::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration file.
    ///
    /// A relative `impulse_response` path is resolved against the directory
    /// containing `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let mut config = Self::from_toml(&content)?;

        if let Some(dir) = path.parent()
            && let Some(ir) = config.impulse_response.as_mut()
            && ir.is_relative()
        {
            *ir = dir.join(&*ir);
        }

        tracing::debug!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::write_file(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Resolve the configuration for a run: `explicit` if given, else the
    /// per-user file if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match user_config_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Check every section.
    ///
    /// An unstable feedback gain surfaces as [`ConfigError::Invalid`] wrapping
    /// a `NumericInstability` filter error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |section: &'static str| {
            move |source: ReverbError| ConfigError::Invalid { section, source }
        };

        self.simple.validate().map_err(invalid("simple"))?;
        self.schroeder.validate().map_err(invalid("schroeder"))?;
        self.convolution.validate().map_err(invalid("convolution"))?;

        if self.preload_rates.contains(&0) {
            return Err(ConfigError::ZeroPreloadRate);
        }
        Ok(())
    }
}
