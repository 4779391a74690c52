//! The engine facade: bytes in, bytes out.

use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError};
use crate::mixer;
use crate::request::{Algorithm, ReverbRequest};
use aural_io::Waveform;
use aural_reverb::{ConvolutionReverb, ImpulseResponse, Reverb, SchroederReverb, SimpleReverb};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Length of the synthetic response used when no impulse-response file is
/// configured.
pub const SYNTHETIC_IMPULSE_SECS: f32 = 1.0;

/// Decay time of the synthetic response.
pub const SYNTHETIC_RT60_SECS: f32 = 0.8;

const SYNTHETIC_RATE: u32 = 48000;
const SYNTHETIC_CHANNELS: usize = 2;

/// Offline reverberation engine.
///
/// Holds the configuration and the impulse-response bank; everything else is
/// created per request and dropped when the request returns. The engine is
/// `Send + Sync` and can serve concurrent requests through a shared reference.
///
/// ```rust,no_run
/// use aural_engine::{Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::default())?;
/// let input = std::fs::read("voice.wav")?;
/// let output = engine.process_selector(&input, "schroeder")?;
/// std::fs::write("voice_schroeder_reverb.wav", output)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    impulse: Arc<ImpulseResponse>,
    bank: BTreeMap<u32, Arc<ImpulseResponse>>,
}

impl Engine {
    /// Build an engine, loading the configured impulse response (or
    /// synthesizing one) and resampling it to every preload rate.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let impulse = match &config.impulse_response {
            Some(path) => load_impulse(path)?,
            None => {
                tracing::info!(
                    duration_secs = SYNTHETIC_IMPULSE_SECS,
                    rt60_secs = SYNTHETIC_RT60_SECS,
                    "no impulse response configured, using a synthetic one"
                );
                ImpulseResponse::synthetic(
                    SYNTHETIC_RATE,
                    SYNTHETIC_IMPULSE_SECS,
                    SYNTHETIC_RT60_SECS,
                    SYNTHETIC_CHANNELS,
                )
                .map_err(ConfigError::InvalidImpulse)?
            }
        };

        Self::build(config, impulse)
    }

    /// Build an engine around an impulse response the caller already holds.
    ///
    /// `config.impulse_response` is ignored.
    pub fn with_impulse(
        config: EngineConfig,
        impulse: ImpulseResponse,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Self::build(config, impulse)
    }

    fn build(config: EngineConfig, impulse: ImpulseResponse) -> Result<Self, EngineError> {
        let impulse = Arc::new(impulse);
        let mut bank = BTreeMap::new();
        bank.insert(impulse.sample_rate(), Arc::clone(&impulse));

        for &rate in &config.preload_rates {
            if bank.contains_key(&rate) {
                continue;
            }
            let resampled = impulse
                .resampled_to(rate)
                .map_err(ConfigError::InvalidImpulse)?;
            tracing::info!(
                from = impulse.sample_rate(),
                to = rate,
                frames = resampled.frames(),
                "preloaded impulse response"
            );
            bank.insert(rate, Arc::new(resampled));
        }

        Ok(Self {
            config,
            impulse,
            bank,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The impulse response at its native rate.
    pub fn impulse(&self) -> &ImpulseResponse {
        &self.impulse
    }

    /// Rates with a prepared impulse response, ascending.
    pub fn preloaded_rates(&self) -> impl Iterator<Item = u32> + '_ {
        self.bank.keys().copied()
    }

    /// Request for `algorithm` with the configured defaults.
    pub fn request(&self, algorithm: Algorithm) -> ReverbRequest {
        ReverbRequest::from_config(algorithm, &self.config)
    }

    /// Apply `request` to an encoded WAV file and return the encoded result.
    ///
    /// The output keeps the input's sample rate, channel count, bit depth and
    /// sample format. It has as many frames as the input, or more for
    /// convolution.
    ///
    /// # Errors
    ///
    /// [`EngineError::Format`] if `bytes` is not an acceptable WAV file.
    pub fn process(&self, bytes: &[u8], request: &ReverbRequest) -> Result<Vec<u8>, EngineError> {
        let input = aural_io::decode(bytes)?;
        let output = self.process_waveform(&input, request)?;
        aural_io::encode(&output).map_err(|e| EngineError::Internal(e.to_string()))
    }

    /// Like [`Engine::process`], selecting the algorithm by name.
    ///
    /// The selector is checked before the bytes are decoded, so an unknown
    /// algorithm is reported even for malformed input.
    pub fn process_selector(&self, bytes: &[u8], selector: &str) -> Result<Vec<u8>, EngineError> {
        let request = ReverbRequest::from_selector(selector, &self.config)?;
        self.process(bytes, &request)
    }

    /// Apply `request` to decoded audio.
    pub fn process_waveform(
        &self,
        input: &Waveform,
        request: &ReverbRequest,
    ) -> Result<Waveform, EngineError> {
        let sample_rate = input.sample_rate();
        let frames = input.frames();
        tracing::debug!(
            algorithm = %request.algorithm(),
            channels = input.num_channels(),
            frames,
            sample_rate,
            mix = request.mix(),
            "processing request"
        );

        let reverb = self.build_reverb(request, sample_rate)?;
        let wet = reverb.process(input.channels())?;

        let expected = reverb.output_len(frames);
        if wet.len() != input.num_channels() || wet.iter().any(|ch| ch.len() != expected) {
            return Err(EngineError::Internal(format!(
                "{} produced a malformed signal",
                reverb.name()
            )));
        }

        let (mixed, clipped) = mixer::mix_channels(input.channels(), &wet, request.mix());
        if clipped > 0 {
            tracing::debug!(clipped, "limiter engaged");
        }

        input
            .with_samples(mixed)
            .map_err(|e| EngineError::Internal(e.to_string()))
    }

    fn build_reverb(
        &self,
        request: &ReverbRequest,
        sample_rate: u32,
    ) -> Result<Box<dyn Reverb>, EngineError> {
        let reverb: Box<dyn Reverb> = match *request {
            ReverbRequest::Simple(params) => Box::new(SimpleReverb::new(params, sample_rate)?),
            ReverbRequest::Schroeder(params) => {
                Box::new(SchroederReverb::new(params, sample_rate)?)
            }
            ReverbRequest::Convolution(params) => {
                let impulse = self.impulse_for(sample_rate)?;
                Box::new(ConvolutionReverb::new(params, impulse, sample_rate)?)
            }
        };
        Ok(reverb)
    }

    fn impulse_for(&self, sample_rate: u32) -> Result<Arc<ImpulseResponse>, EngineError> {
        if let Some(ir) = self.bank.get(&sample_rate) {
            return Ok(Arc::clone(ir));
        }

        tracing::debug!(
            from = self.impulse.sample_rate(),
            to = sample_rate,
            "resampling impulse response for this request"
        );
        Ok(Arc::new(self.impulse.resampled_to(sample_rate)?))
    }
}

fn load_impulse(path: &Path) -> Result<ImpulseResponse, ConfigError> {
    let waveform = aural_io::read_file(path).map_err(|source| ConfigError::ImpulseResponse {
        path: path.to_path_buf(),
        source,
    })?;
    let impulse = ImpulseResponse::from_waveform(waveform).map_err(ConfigError::InvalidImpulse)?;

    tracing::info!(
        path = %path.display(),
        sample_rate = impulse.sample_rate(),
        channels = impulse.num_channels(),
        frames = impulse.frames(),
        "loaded impulse response"
    );
    Ok(impulse)
}

/// Name of the file a processed upload is returned as:
/// `{base}_{algorithm}_reverb.wav`, where `base` is `original` without its
/// directory and extension.
///
/// ```rust
/// use aural_engine::{Algorithm, output_file_name};
///
/// assert_eq!(output_file_name("takes/voice.wav", Algorithm::Rir), "voice_rir_reverb.wav");
/// ```
pub fn output_file_name(original: &str, algorithm: Algorithm) -> String {
    let base = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output");
    format!("{base}_{algorithm}_reverb.wav")
}
