//! Integration tests for the aural-io WAV codec.

use aural_io::{
    Error, SUPPORTED_BIT_DEPTHS, WavFormat, WavSpec, Waveform, decode, encode, full_scale,
    read_file, write_file,
};
use proptest::prelude::*;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

fn sine_wave(sample_rate: u32, freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[test]
fn wav_file_roundtrip_stereo_16() {
    let sr = 44100;
    let left = sine_wave(sr, 440.0, sr as usize);
    let right = sine_wave(sr, 660.0, sr as usize);
    let w = Waveform::pcm(sr, 16, vec![left.clone(), right.clone()]).unwrap();

    let file = NamedTempFile::new().unwrap();
    write_file(file.path(), &w).unwrap();

    let loaded = read_file(file.path()).unwrap();
    assert_eq!(loaded.sample_rate(), sr);
    assert_eq!(loaded.num_channels(), 2);
    assert_eq!(loaded.frames(), sr as usize);

    for (a, b) in left.iter().zip(loaded.channel(0).unwrap()) {
        assert!((a - b).abs() <= 1.0 / 32768.0, "left mismatch: {a} vs {b}");
    }
    for (a, b) in right.iter().zip(loaded.channel(1).unwrap()) {
        assert!((a - b).abs() <= 1.0 / 32768.0, "right mismatch: {a} vs {b}");
    }
}

#[test]
fn read_missing_file_is_io_error() {
    let err = read_file("/nonexistent/definitely/missing.wav").unwrap_err();
    assert!(matches!(err, Error::Io(_)), "got {err:?}");
}

#[test]
fn encoded_header_is_canonical_riff() {
    let w = Waveform::pcm(44100, 16, vec![vec![0.0; 100]]).unwrap();
    let bytes = encode(&w).unwrap();

    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");

    let riff_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
    assert_eq!(riff_size, bytes.len() - 8, "RIFF size must cover the file");

    let data_pos = bytes
        .windows(4)
        .position(|w| w == b"data")
        .expect("data chunk present");
    let data_size = u32::from_le_bytes(bytes[data_pos + 4..data_pos + 8].try_into().unwrap());
    assert_eq!(data_size, 200);
}

#[test]
fn silence_roundtrips_exactly() {
    for bits in SUPPORTED_BIT_DEPTHS {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: bits,
            format: WavFormat::Pcm,
        };
        let w = Waveform::silence(spec, 4410).unwrap();
        let back = decode(&encode(&w).unwrap()).unwrap();
        assert_eq!(back, w, "{bits}-bit silence changed");
    }
}

// ---------------------------------------------------------------------------
// Round-trip law
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// decode(encode(w)) reproduces w within one quantization step per sample.
    #[test]
    fn roundtrip_within_one_step(
        depth_idx in 0usize..4,
        channels in 1usize..=4,
        frames in 0usize..200,
        seed in prop::collection::vec(-1.0f32..=1.0f32, 800),
    ) {
        let bits = SUPPORTED_BIT_DEPTHS[depth_idx];
        let samples: Vec<Vec<f32>> = (0..channels)
            .map(|c| (0..frames).map(|i| seed[(c * 200 + i) % seed.len()]).collect())
            .collect();
        let w = Waveform::pcm(48000, bits, samples).unwrap();

        let back = decode(&encode(&w).unwrap()).unwrap();
        prop_assert_eq!(back.spec(), w.spec());
        prop_assert_eq!(back.frames(), frames);

        let step = 1.0 / full_scale(bits);
        for (orig, dec) in w.channels().iter().zip(back.channels()) {
            for (a, b) in orig.iter().zip(dec) {
                prop_assert!((a - b).abs() <= step, "{}-bit: {} vs {}", bits, a, b);
                prop_assert!((-1.0..=1.0).contains(b));
            }
        }
    }
}
