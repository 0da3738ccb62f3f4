mod common;

use common::{gen_sine, run_blocks, SR};
use voiceshift::{ProcessorConfig, VoiceProcessor};

#[test]
fn zero_input_gives_exact_zero_output() {
    for (pitch, formant) in [(1.0f32, 1.0f32), (2.0, 1.0), (0.5, 1.5), (1.0, 0.7)] {
        let input = vec![0.0f32; 10_000];
        let output = run_blocks(ProcessorConfig::default(), &input, 128, pitch, formant);
        assert!(
            output.iter().all(|&s| s == 0.0),
            "pitch {} formant {}",
            pitch,
            formant
        );
    }
}

#[test]
fn empty_block_is_a_no_op() {
    let mut processor = VoiceProcessor::new();
    let mut empty: [f32; 0] = [];
    processor.process(&mut empty);

    // The stream position is unchanged: an impulse still lands at latency.
    let mut input = vec![0.0f32; 4096];
    input[10] = 1.0;
    for block in input.chunks_mut(128) {
        processor.process(block);
        processor.process(&mut empty);
    }
    assert!((input[10 + processor.latency_samples()] - 1.0).abs() < 1e-4);
}

#[test]
fn non_finite_input_is_treated_as_silence() {
    let mut input = gen_sine(250.0, SR, 12_000, |_| 0.5);
    for i in (0..input.len()).step_by(97) {
        input[i] = match i % 3 {
            0 => f32::NAN,
            1 => f32::INFINITY,
            _ => f32::NEG_INFINITY,
        };
    }
    for pitch in [1.0f32, 1.4] {
        let output = run_blocks(ProcessorConfig::default(), &input, 128, pitch, 1.0);
        assert!(output.iter().all(|s| s.is_finite()), "pitch {}", pitch);
    }
}

#[test]
fn non_finite_burst_recovers() {
    let mut processor = VoiceProcessor::new();
    processor.set_pitch(0.8);
    let mut burst = [f32::NAN; 128];
    for _ in 0..20 {
        processor.process(&mut burst);
    }
    assert!(burst.iter().all(|s| s.is_finite()));

    let mut signal = gen_sine(300.0, SR, SR as usize, |_| 0.5);
    for block in signal.chunks_mut(128) {
        processor.process(block);
    }
    let tail = &signal[SR as usize / 2..];
    assert!(tail.iter().all(|s| s.is_finite()));
    assert!(tail.iter().any(|s| s.abs() > 0.1), "output did not recover");
}

#[test]
fn huge_input_is_saturated() {
    let input = gen_sine(150.0, SR, 8192, |_| 1e6);
    for (pitch, formant) in [(1.0f32, 1.0f32), (1.9, 0.6)] {
        let output = run_blocks(ProcessorConfig::default(), &input, 128, pitch, formant);
        assert!(
            output.iter().all(|s| s.is_finite() && s.abs() <= 32.0),
            "pitch {} formant {}",
            pitch,
            formant
        );
    }
}

#[test]
fn subnormal_input_is_flushed() {
    let input = vec![1e-40f32; 4096];
    let output = run_blocks(ProcessorConfig::default(), &input, 128, 1.3, 1.0);
    assert!(output.iter().all(|&s| s == 0.0));
}

#[test]
fn block_partition_does_not_change_output() {
    let input = gen_sine(210.0, SR, 9000, |i| 0.2 + 0.3 * (i as f32 / 9000.0));
    let reference = run_blocks(ProcessorConfig::default(), &input, 128, 1.33, 0.85);

    for block in [1usize, 7, 64, 127, 200, 1000] {
        let output = run_blocks(ProcessorConfig::default(), &input, block, 1.33, 0.85);
        assert_eq!(output, reference, "block size {}", block);
    }
}

#[test]
fn invalid_configurations_are_rejected() {
    let bad = [
        ProcessorConfig::default().with_block_size(0),
        ProcessorConfig::default().with_window_size(1000),
        ProcessorConfig::default().with_hop_size(0),
        ProcessorConfig::default().with_hop_size(512),
        ProcessorConfig::default().with_envelope_order(0),
        ProcessorConfig::default().with_sample_rate(0),
    ];
    for config in bad {
        assert!(VoiceProcessor::with_config(config.clone()).is_err(), "{:?}", config);
    }
}
