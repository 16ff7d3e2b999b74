//! Synthesis and sample processing through the public API.

use spacegen::GenError;
use spacegen::audio::*;
use spacegen::seed::SeededRng;

fn assert_len_close(buffer: &AudioBuffer, duration: f32) {
    let expected = (duration * buffer.sample_rate as f32).round() as i64;
    let len = buffer.len() as i64;
    assert!((len - expected).abs() <= 1, "len {} vs expected {}", len, expected);
}

#[test]
fn test_envelope_duration_bound() {
    let synth = Synth::default();
    for method in [SynthMethod::Additive, SynthMethod::PulseWave, SynthMethod::Subtractive] {
        for duration in [0.05, 0.3, 1.25] {
            let mut params = SynthParams::defaults(method);
            match &mut params {
                SynthParams::Additive(p) => p.duration = duration,
                SynthParams::PulseWave(p) => p.duration = duration,
                SynthParams::Subtractive(p) => p.duration = duration,
                _ => unreachable!(),
            }
            let buffer = synth.synthesize(&params).unwrap();
            assert_len_close(&buffer, duration);
        }
    }
}

#[test]
fn test_synthesis_is_deterministic() {
    let synth = Synth::default();
    for method in SynthMethod::ALL {
        let params = SynthParams::defaults(method);
        assert_eq!(
            synth.synthesize(&params).unwrap(),
            synth.synthesize(&params).unwrap(),
            "{}",
            method
        );
    }
}

#[test]
fn test_reverse_scenario() {
    let mut processor = SampleProcessor::new();
    processor.load("clip", AudioBuffer::mono(SAMPLE_RATE, vec![0.1, 0.2, 0.3, 0.4]));
    let reversed = processor.reverse("clip").unwrap();
    assert_eq!(reversed.samples(), &[0.4, 0.3, 0.2, 0.1]);
    assert!(processor.sample_info().iter().any(|s| s.name == "clip_reversed"));
}

#[test]
fn test_sfx_wav_decodes_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ui_click.wav");
    let click = generate_sfx("ui_click").unwrap();
    write_wav(&click, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let decoded = load_wav_bytes(&bytes).unwrap();
    assert_eq!(decoded.len(), click.len());
    assert_eq!(decoded.sample_rate, SAMPLE_RATE);
    for (a, b) in decoded.samples().iter().zip(click.samples()) {
        assert!((a - b).abs() < 1e-3);
    }
}

#[test]
fn test_processing_chain_on_rendered_preset() {
    let mut processor = SampleProcessor::new();
    let mut wav = std::io::Cursor::new(Vec::new());
    encode_wav(&generate_sfx("explosion_small").unwrap(), &mut wav).unwrap();
    let info = processor.load_bytes("boom", wav.get_ref()).unwrap();
    assert_eq!(info.channels, 1);

    let crushed = processor
        .bitcrush(&BitcrushParams {
            sample_name: "boom".into(),
            duration: Some(0.2),
            ..Default::default()
        })
        .unwrap();
    assert_len_close(&crushed, 0.2);

    let cloud = processor
        .granular(
            &GranularParams {
                sample_name: "boom".into(),
                duration: 0.5,
                ..Default::default()
            },
            &mut SeededRng::new(12),
        )
        .unwrap();
    assert_eq!(cloud.channel_count(), 2);

    let missing = processor.distortion(&DistortionParams {
        sample_name: "nothing".into(),
        ..Default::default()
    });
    assert!(matches!(missing, Err(GenError::SampleNotFound(_))));
}

#[test]
fn test_garbage_bytes_are_decode_errors() {
    let mut processor = SampleProcessor::new();
    assert!(matches!(
        processor.load_bytes("junk", b"RIFF....WAVEjunk"),
        Err(GenError::DecodeError(_))
    ));
    assert!(processor.sample_info().is_empty());
}
