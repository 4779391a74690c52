//! WAV decoding and encoding over byte buffers.

use crate::{Error, Result};
use aural_core::hard_clip;
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::Cursor;
use std::path::Path;

/// Bit depths accepted by [`decode`] and [`Waveform::new`].
pub const SUPPORTED_BIT_DEPTHS: [u16; 4] = [8, 16, 24, 32];

/// Highest sample rate accepted by [`decode`] and [`Waveform::new`], in Hz.
///
/// Covers every studio rate up to 768 kHz. Headers claiming more are treated
/// as malformed.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    #[default]
    Pcm,
    /// IEEE 754 floating-point samples (32-bit only).
    IeeeFloat,
}

/// Shape of a waveform: everything in the `fmt ` chunk that survives processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (8, 16, 24 or 32).
    pub bits_per_sample: u16,
    /// Integer PCM or IEEE float.
    pub format: WavFormat,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            format: WavFormat::Pcm,
        }
    }
}

impl WavSpec {
    fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(Error::InvalidWaveform("channel count must be >= 1".into()));
        }
        if self.sample_rate == 0 {
            return Err(Error::InvalidWaveform("sample rate must be > 0".into()));
        }
        if self.sample_rate > MAX_SAMPLE_RATE {
            return Err(Error::InvalidWaveform(format!(
                "sample rate {} Hz exceeds the {MAX_SAMPLE_RATE} Hz limit",
                self.sample_rate
            )));
        }
        match self.format {
            WavFormat::Pcm if !SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample) => {
                Err(Error::InvalidWaveform(format!(
                    "unsupported PCM bit depth {}",
                    self.bits_per_sample
                )))
            }
            WavFormat::IeeeFloat if self.bits_per_sample != 32 => Err(Error::InvalidWaveform(
                format!("unsupported float bit depth {}", self.bits_per_sample),
            )),
            _ => Ok(()),
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: match spec.format {
                WavFormat::Pcm => SampleFormat::Int,
                WavFormat::IeeeFloat => SampleFormat::Float,
            },
        }
    }
}

/// WAV header metadata extracted without converting sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Normalized, de-interleaved audio.
///
/// Invariants, checked on construction:
/// - one sample buffer per channel, at least one channel
/// - every channel has the same length
/// - the bit depth is one of [`SUPPORTED_BIT_DEPTHS`]
///
/// Decoded samples always lie in `[-1.0, 1.0]` regardless of source depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    spec: WavSpec,
    samples: Vec<Vec<f32>>,
}

impl Waveform {
    /// Build a waveform from per-channel sample buffers.
    ///
    /// `spec.channels` must match `samples.len()`.
    pub fn new(spec: WavSpec, samples: Vec<Vec<f32>>) -> Result<Self> {
        spec.validate()?;

        if samples.len() != spec.channels as usize {
            return Err(Error::InvalidWaveform(format!(
                "spec declares {} channels but {} were supplied",
                spec.channels,
                samples.len()
            )));
        }

        let frames = samples[0].len();
        if let Some((i, ch)) = samples
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != frames)
        {
            return Err(Error::InvalidWaveform(format!(
                "channel {i} has {} samples, channel 0 has {frames}",
                ch.len()
            )));
        }

        Ok(Self { spec, samples })
    }

    /// Build an integer-PCM waveform, deriving the channel count from `samples`.
    pub fn pcm(sample_rate: u32, bits_per_sample: u16, samples: Vec<Vec<f32>>) -> Result<Self> {
        let channels = u16::try_from(samples.len())
            .map_err(|_| Error::InvalidWaveform("too many channels".into()))?;
        Self::new(
            WavSpec {
                channels,
                sample_rate,
                bits_per_sample,
                format: WavFormat::Pcm,
            },
            samples,
        )
    }

    /// A silent waveform with the given shape.
    pub fn silence(spec: WavSpec, frames: usize) -> Result<Self> {
        Self::new(spec, vec![vec![0.0; frames]; spec.channels as usize])
    }

    /// Replace the sample data while keeping rate, depth and format.
    ///
    /// The channel count of `samples` must match this waveform's.
    pub fn with_samples(&self, samples: Vec<Vec<f32>>) -> Result<Self> {
        Self::new(self.spec, samples)
    }

    /// Format description.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Bit depth of the source/target encoding.
    pub fn bits_per_sample(&self) -> u16 {
        self.spec.bits_per_sample
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.samples[0].len()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.spec.sample_rate as f64
    }

    /// Per-channel sample buffers.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.samples
    }

    /// One channel's samples.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.samples.get(index).map(Vec::as_slice)
    }

    /// Consume the waveform, returning the per-channel buffers.
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.samples
    }
}

/// Signed full-scale value for an integer bit depth, `2^(bits - 1)`.
///
/// ```rust
/// assert_eq!(aural_io::full_scale(16), 32768.0);
/// assert_eq!(aural_io::full_scale(8), 128.0);
/// ```
pub fn full_scale(bits_per_sample: u16) -> f32 {
    (1u64 << (bits_per_sample - 1)) as f32
}

fn open(bytes: &[u8]) -> Result<WavReader<Cursor<&[u8]>>> {
    WavReader::new(Cursor::new(bytes)).map_err(|e| Error::Format(e.to_string()))
}

fn spec_of(reader_spec: hound::WavSpec) -> Result<WavSpec> {
    let format = match reader_spec.sample_format {
        SampleFormat::Int => WavFormat::Pcm,
        SampleFormat::Float => WavFormat::IeeeFloat,
    };

    let spec = WavSpec {
        channels: reader_spec.channels,
        sample_rate: reader_spec.sample_rate,
        bits_per_sample: reader_spec.bits_per_sample,
        format,
    };
    spec.validate().map_err(|e| match e {
        Error::InvalidWaveform(msg) => Error::Format(msg),
        other => other,
    })?;
    Ok(spec)
}

/// Read WAV header metadata without converting sample data.
pub fn read_info(bytes: &[u8]) -> Result<WavInfo> {
    let reader = open(bytes)?;
    let hound_spec = reader.spec();
    let num_frames = u64::from(reader.duration());
    let format = match hound_spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: hound_spec.channels,
        sample_rate: hound_spec.sample_rate,
        bits_per_sample: hound_spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(hound_spec.sample_rate.max(1)),
        format,
    })
}

/// Decode WAV bytes into a normalized, de-interleaved [`Waveform`].
///
/// Integer samples are divided by the signed full-scale value of their bit
/// depth (16-bit: 32768). Float samples are clamped to `[-1.0, 1.0]`.
///
/// # Errors
///
/// [`Error::Format`] when the `RIFF`/`WAVE` tags are missing, the `fmt ` or
/// `data` chunk cannot be located, chunk sizes overrun the buffer, the data is
/// not a whole number of frames, the bit depth is not 8, 16, 24 or 32, or the
/// sample rate is zero or above [`MAX_SAMPLE_RATE`].
pub fn decode(bytes: &[u8]) -> Result<Waveform> {
    let reader = open(bytes)?;
    let spec = spec_of(reader.spec())?;
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.format {
        WavFormat::IeeeFloat => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| hard_clip(v, 1.0)))
            .collect::<std::result::Result<Vec<_>, _>>(),
        WavFormat::Pcm => {
            let max_val = full_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| Error::Format(format!("truncated sample data: {e}")))?;

    if interleaved.len() % channels != 0 {
        return Err(Error::Format(format!(
            "data chunk holds {} samples, not a multiple of {channels} channels",
            interleaved.len()
        )));
    }

    let frames = interleaved.len() / channels;
    let mut samples = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (ch, &s) in samples.iter_mut().zip(frame) {
            ch.push(s);
        }
    }

    tracing::debug!(
        channels,
        frames,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "decoded WAV"
    );

    Waveform::new(spec, samples)
}

/// Encode a [`Waveform`] as WAV bytes.
///
/// Channels are re-interleaved; integer formats quantize with
/// `round(x * full_scale)` and clamp to `[-full_scale, full_scale - 1]` so
/// out-of-range input saturates instead of wrapping. The header is written
/// with recomputed chunk sizes.
pub fn encode(waveform: &Waveform) -> Result<Vec<u8>> {
    let spec = waveform.spec();
    let channels = waveform.channels();
    let frames = waveform.frames();

    let mut bytes = Vec::with_capacity(44 + frames * channels.len() * 4);
    {
        let mut writer = WavWriter::new(Cursor::new(&mut bytes), hound::WavSpec::from(spec))?;

        match spec.format {
            WavFormat::IeeeFloat => {
                for i in 0..frames {
                    for ch in channels {
                        writer.write_sample(hard_clip(ch[i], 1.0))?;
                    }
                }
            }
            WavFormat::Pcm => {
                let max_val = full_scale(spec.bits_per_sample);
                for i in 0..frames {
                    for ch in channels {
                        writer.write_sample(quantize(ch[i], max_val))?;
                    }
                }
            }
        }

        writer.finalize()?;
    }

    tracing::debug!(
        channels = channels.len(),
        frames,
        bytes = bytes.len(),
        "encoded WAV"
    );

    Ok(bytes)
}

#[inline]
fn quantize(sample: f32, max_val: f32) -> i32 {
    let scaled = if sample.is_nan() {
        0.0
    } else {
        (f64::from(sample) * f64::from(max_val)).round()
    };
    scaled.clamp(-f64::from(max_val), f64::from(max_val) - 1.0) as i32
}

/// Read and decode a WAV file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Waveform> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode and write a WAV file.
pub fn write_file<P: AsRef<Path>>(path: P, waveform: &Waveform) -> Result<()> {
    let bytes = encode(waveform)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frames: usize, freq: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
        (0..frames)
            .map(|i| {
                (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
                    * amplitude
            })
            .collect()
    }

    /// Build a minimal canonical 44-byte-header PCM file by hand.
    fn handmade_wav(channels: u16, bits: u16, data: &[u8]) -> Vec<u8> {
        handmade_wav_at(8000, channels, bits, data)
    }

    fn handmade_wav_at(sample_rate: u32, channels: u16, bits: u16, data: &[u8]) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&sample_rate.wrapping_mul(u32::from(block_align)).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_decode_handmade_16bit_stereo() {
        // Frames: (16384, -32768), (0, 32767)
        let mut data = Vec::new();
        for v in [16384i16, -32768, 0, 32767] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let w = decode(&handmade_wav(2, 16, &data)).unwrap();

        assert_eq!(w.num_channels(), 2);
        assert_eq!(w.frames(), 2);
        assert_eq!(w.sample_rate(), 8000);
        assert_eq!(w.channel(0).unwrap(), &[0.5, 0.0]);
        assert_eq!(w.channel(1).unwrap()[0], -1.0);
        assert!((w.channel(1).unwrap()[1] - 32767.0 / 32768.0).abs() < 1e-7);
    }

    #[test]
    fn test_decode_8bit_is_offset_binary() {
        // 8-bit WAV stores unsigned samples centred on 128
        let w = decode(&handmade_wav(1, 8, &[128, 0, 255, 192])).unwrap();
        let ch = w.channel(0).unwrap();
        assert_eq!(ch[0], 0.0);
        assert_eq!(ch[1], -1.0);
        assert!((ch[2] - 127.0 / 128.0).abs() < 1e-7);
        assert_eq!(ch[3], 0.5);
    }

    #[test]
    fn test_decode_rejects_missing_riff() {
        let mut bytes = handmade_wav(1, 16, &[0, 0]);
        bytes[..4].copy_from_slice(b"RIFX");
        assert!(matches!(decode(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_decode_rejects_missing_wave() {
        let mut bytes = handmade_wav(1, 16, &[0, 0]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(decode(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        let mut data = Vec::new();
        for v in 0..100i16 {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut bytes = handmade_wav(1, 16, &data);
        bytes.truncate(bytes.len() - 51);
        assert!(matches!(decode(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_decode_rejects_empty_and_garbage() {
        assert!(matches!(decode(&[]), Err(Error::Format(_))));
        assert!(matches!(decode(b"hello, world"), Err(Error::Format(_))));
    }

    #[test]
    fn test_decode_rejects_unsupported_depth() {
        // 12-bit PCM in 16-bit containers
        let mut bytes = handmade_wav(1, 16, &[0, 0, 0, 0]);
        bytes[34..36].copy_from_slice(&12u16.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_decode_rejects_absurd_sample_rate() {
        for rate in [MAX_SAMPLE_RATE + 1, 2_000_003, u32::MAX] {
            let bytes = handmade_wav_at(rate, 1, 16, &[0, 0]);
            assert!(matches!(decode(&bytes), Err(Error::Format(_))), "{rate} Hz");
        }

        let at_limit = decode(&handmade_wav_at(MAX_SAMPLE_RATE, 1, 16, &[0, 0])).unwrap();
        assert_eq!(at_limit.sample_rate(), MAX_SAMPLE_RATE);
    }

    #[test]
    fn test_waveform_rejects_absurd_sample_rate() {
        assert!(matches!(
            Waveform::pcm(MAX_SAMPLE_RATE + 1, 16, vec![vec![0.0]]),
            Err(Error::InvalidWaveform(_))
        ));
    }

    #[test]
    fn test_roundtrip_each_depth() {
        for bits in SUPPORTED_BIT_DEPTHS {
            let samples = sine(1000, 440.0, 44100, 0.9);
            let w = Waveform::pcm(44100, bits, vec![samples.clone()]).unwrap();
            let back = decode(&encode(&w).unwrap()).unwrap();

            assert_eq!(back.spec(), w.spec());
            let step = 1.0 / full_scale(bits);
            for (a, b) in samples.iter().zip(back.channel(0).unwrap()) {
                assert!(
                    (a - b).abs() <= step,
                    "{bits}-bit: {a} vs {b} exceeds one step {step}"
                );
            }
        }
    }

    #[test]
    fn test_roundtrip_float() {
        let samples = sine(512, 1000.0, 48000, 1.0);
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            format: WavFormat::IeeeFloat,
        };
        let w = Waveform::new(spec, vec![samples.clone()]).unwrap();
        let back = decode(&encode(&w).unwrap()).unwrap();

        assert_eq!(back.spec().format, WavFormat::IeeeFloat);
        assert_eq!(back.channel(0).unwrap(), &samples[..]);
    }

    #[test]
    fn test_encode_saturates_instead_of_wrapping() {
        let w = Waveform::pcm(8000, 16, vec![vec![1.0, -1.0, 3.0, -3.0, f32::NAN]]).unwrap();
        let back = decode(&encode(&w).unwrap()).unwrap();
        let ch = back.channel(0).unwrap();

        assert!((ch[0] - 32767.0 / 32768.0).abs() < 1e-7);
        assert_eq!(ch[1], -1.0);
        assert!(ch[2] > 0.999);
        assert_eq!(ch[3], -1.0);
        assert_eq!(ch[4], 0.0);
    }

    #[test]
    fn test_roundtrip_multichannel_interleave() {
        let ch0: Vec<f32> = (0..64).map(|i| i as f32 / 128.0).collect();
        let ch1: Vec<f32> = (0..64).map(|i| -(i as f32) / 128.0).collect();
        let ch2 = vec![0.25; 64];
        let w = Waveform::pcm(22050, 24, vec![ch0.clone(), ch1.clone(), ch2.clone()]).unwrap();

        let back = decode(&encode(&w).unwrap()).unwrap();
        assert_eq!(back.num_channels(), 3);
        // Multiples of 1/128 are exact at 24 bits
        assert_eq!(back.channel(0).unwrap(), &ch0[..]);
        assert_eq!(back.channel(1).unwrap(), &ch1[..]);
        assert_eq!(back.channel(2).unwrap(), &ch2[..]);
    }

    #[test]
    fn test_waveform_rejects_ragged_channels() {
        let err = Waveform::pcm(44100, 16, vec![vec![0.0; 10], vec![0.0; 9]]).unwrap_err();
        assert!(matches!(err, Error::InvalidWaveform(_)));
    }

    #[test]
    fn test_waveform_rejects_bad_depth_and_no_channels() {
        assert!(Waveform::pcm(44100, 12, vec![vec![0.0]]).is_err());
        assert!(Waveform::pcm(44100, 16, vec![]).is_err());
    }

    #[test]
    fn test_read_info() {
        let w = Waveform::silence(
            WavSpec {
                channels: 2,
                sample_rate: 48000,
                bits_per_sample: 24,
                format: WavFormat::Pcm,
            },
            24000,
        )
        .unwrap();
        let info = read_info(&encode(&w).unwrap()).unwrap();

        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 48000);
        assert_eq!(info.bits_per_sample, 24);
        assert_eq!(info.num_frames, 24000);
        assert!((info.duration_secs - 0.5).abs() < 1e-9);
        assert_eq!(info.format, WavFormat::Pcm);
    }

    #[test]
    fn test_empty_waveform_roundtrip() {
        let w = Waveform::pcm(44100, 16, vec![vec![]]).unwrap();
        let back = decode(&encode(&w).unwrap()).unwrap();
        assert_eq!(back.frames(), 0);
        assert_eq!(back.num_channels(), 1);
    }
}
