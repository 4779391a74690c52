//! End-to-end tests through the byte-level engine API.

use aural_engine::{Algorithm, Engine, EngineConfig, ErrorKind, ImpulseResponse, output_file_name};
use aural_io::{WavFormat, WavSpec, Waveform, decode, encode};
use std::sync::OnceLock;

/// Engine with a half-second synthetic response at 44.1 kHz.
fn engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| {
        let config = EngineConfig {
            preload_rates: vec![44100, 48000],
            ..EngineConfig::default()
        };
        let ir = ImpulseResponse::synthetic(44100, 0.5, 0.4, 2).unwrap();
        Engine::with_impulse(config, ir).unwrap()
    })
}

fn silence(sample_rate: u32, bits: u16, channels: u16, frames: usize) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bits,
        format: WavFormat::Pcm,
    };
    encode(&Waveform::silence(spec, frames).unwrap()).unwrap()
}

fn tone(sample_rate: u32, bits: u16, frames: usize, amplitude: f32) -> Vec<u8> {
    let samples: Vec<f32> = (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect();
    encode(&Waveform::pcm(sample_rate, bits, vec![samples.clone(), samples]).unwrap()).unwrap()
}

#[test]
fn simple_on_one_second_of_silence() {
    let input = silence(44100, 16, 1, 44100);
    let output = decode(&engine().process_selector(&input, "simple").unwrap()).unwrap();

    assert_eq!(output.sample_rate(), 44100);
    assert_eq!(output.bits_per_sample(), 16);
    assert_eq!(output.num_channels(), 1);
    assert_eq!(output.frames(), 44100);
    assert!(output.channels()[0].iter().all(|&s| s == 0.0));
}

#[test]
fn rir_on_one_second_of_silence_keeps_tail() {
    let input = silence(44100, 16, 1, 44100);
    let output = decode(&engine().process_selector(&input, "rir").unwrap()).unwrap();

    let ir_len = engine().impulse().frames();
    assert_eq!(ir_len, 22050);
    assert_eq!(output.frames(), 44100 + ir_len - 1);
    assert!(output.channels()[0].iter().all(|&s| s == 0.0));
}

#[test]
fn every_algorithm_preserves_header_fields() {
    for bits in [8u16, 16, 24, 32] {
        let input = tone(48000, bits, 4800, 0.5);
        for alg in Algorithm::ALL {
            let bytes = engine().process_selector(&input, alg.as_str()).unwrap();
            let info = aural_io::read_info(&bytes).unwrap();
            assert_eq!(info.sample_rate, 48000, "{alg} {bits}-bit");
            assert_eq!(info.channels, 2, "{alg} {bits}-bit");
            assert_eq!(info.bits_per_sample, bits, "{alg} {bits}-bit");
            assert!(info.num_frames >= 4800, "{alg} {bits}-bit");
        }
    }
}

#[test]
fn float_input_stays_float() {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 32,
        format: WavFormat::IeeeFloat,
    };
    let input = encode(&Waveform::new(spec, vec![vec![0.25; 1000]]).unwrap()).unwrap();
    let bytes = engine().process_selector(&input, "schroeder").unwrap();
    assert_eq!(aural_io::read_info(&bytes).unwrap().format, WavFormat::IeeeFloat);
}

#[test]
fn loud_input_is_limited() {
    let input = tone(44100, 16, 44100, 1.0);
    for alg in Algorithm::ALL {
        let output = decode(&engine().process_selector(&input, alg.as_str()).unwrap()).unwrap();
        for &s in output.channels().iter().flatten() {
            assert!(s.is_finite() && (-1.0..=1.0).contains(&s), "{alg}: {s}");
        }
    }
}

#[test]
fn malformed_input_is_format_error() {
    let valid = silence(44100, 16, 2, 100);

    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("empty", Vec::new()),
        ("garbage", b"definitely not audio".to_vec()),
        ("bad riff tag", {
            let mut b = valid.clone();
            b[..4].copy_from_slice(b"RIFX");
            b
        }),
        ("bad wave tag", {
            let mut b = valid.clone();
            b[8..12].copy_from_slice(b"AVI ");
            b
        }),
        ("truncated data", valid[..valid.len() - 3].to_vec()),
    ];

    for (name, bytes) in cases {
        let err = engine().process_selector(&bytes, "simple").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError, "{name}: {err}");
    }
}

#[test]
fn absurd_header_rate_is_format_error() {
    // Sample rate lives at byte 24 of the canonical header
    for rate in [u32::MAX, 4_294_967_291, 2_000_003] {
        let mut bytes = silence(44100, 16, 1, 1);
        bytes[24..28].copy_from_slice(&rate.to_le_bytes());

        let err = engine().process_selector(&bytes, "rir").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError, "{rate} Hz: {err}");
    }
}

#[test]
fn awkward_rate_resamples_on_demand() {
    // 44101 shares no factor with 44100 beyond 1
    let input = silence(44101, 16, 1, 100);
    let output = decode(&engine().process_selector(&input, "rir").unwrap()).unwrap();
    assert_eq!(output.sample_rate(), 44101);
    assert!(output.frames() > 100);
}

#[test]
fn unknown_selector_is_unsupported() {
    let input = silence(44100, 16, 1, 10);
    for selector in ["comb", "allpass", "hall", ""] {
        let err = engine().process_selector(&input, selector).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm, "{selector:?}");
    }
}

#[test]
fn concurrent_requests_share_one_engine() {
    let input = tone(44100, 16, 8820, 0.5);
    let expected = engine().process_selector(&input, "rir").unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine().process_selector(&input, "rir").unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn returned_file_name_follows_convention() {
    assert_eq!(
        output_file_name("uploads/guitar.wav", Algorithm::Schroeder),
        "guitar_schroeder_reverb.wav"
    );
}
