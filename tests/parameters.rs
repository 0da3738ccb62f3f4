mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{gen_sine, max_step, SR};
use voiceshift::{clamp_ratio, ParamHandle, VoiceProcessor, MAX_RATIO, MIN_RATIO};

#[test]
fn setters_clamp_out_of_range_values() {
    let processor = VoiceProcessor::new();
    let params = processor.params();

    processor.set_pitch(0.0);
    assert_eq!(params.pitch(), MIN_RATIO);
    processor.set_pitch(-1.0);
    assert_eq!(params.pitch(), MIN_RATIO);
    processor.set_pitch(f32::NEG_INFINITY);
    assert_eq!(params.pitch(), MIN_RATIO);
    processor.set_pitch(f32::INFINITY);
    assert_eq!(params.pitch(), MAX_RATIO);
    processor.set_pitch(100.0);
    assert_eq!(params.pitch(), MAX_RATIO);

    processor.set_formant(0.8);
    processor.set_formant(f32::NAN);
    assert_eq!(params.formant(), 0.8);
}

#[test]
fn clamp_ratio_policy() {
    assert_eq!(clamp_ratio(1.5, 1.0), 1.5);
    assert_eq!(clamp_ratio(0.1, 1.0), MIN_RATIO);
    assert_eq!(clamp_ratio(9.0, 1.0), MAX_RATIO);
    assert_eq!(clamp_ratio(f32::NAN, 2.5), 2.5);
}

#[test]
fn invalid_parameters_still_give_finite_output() {
    for bad in [0.0f32, -1.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let mut processor = VoiceProcessor::new();
        processor.set_pitch(bad);
        processor.set_formant(bad);
        let mut signal = gen_sine(200.0, SR, 8192, |_| 0.5);
        for block in signal.chunks_mut(128) {
            processor.process(block);
        }
        assert!(signal.iter().all(|s| s.is_finite()), "parameter {}", bad);
    }
}

#[test]
fn pitch_step_does_not_click() {
    let input = gen_sine(220.0, SR, SR as usize * 2, |_| 0.5);
    let mut processor = VoiceProcessor::new();
    let mut output = input.clone();

    let switch_at = SR as usize;
    for (i, block) in output.chunks_mut(128).enumerate() {
        if i * 128 == switch_at {
            processor.set_pitch(2.0);
        }
        processor.process(block);
    }

    // A 440 Hz sine at 0.5 moves at most ~0.03 per sample; allow generous
    // headroom for the transition but nothing resembling a step.
    let around = &output[switch_at..switch_at + 8192];
    let step = max_step(around);
    assert!(step < 0.2, "largest sample step {} at parameter change", step);
}

#[test]
fn ratios_glide_rather_than_jump() {
    let mut processor = VoiceProcessor::new();
    let mut block = [0.0f32; 128];
    processor.set_pitch(4.0);
    processor.process(&mut block);
    let first = processor.pitch_ratio();
    assert!(first > 1.0 && first < 4.0, "first frame ratio {}", first);

    let mut previous = first;
    for _ in 0..100 {
        processor.process(&mut block);
        let now = processor.pitch_ratio();
        assert!(now >= previous);
        previous = now;
    }
    assert_eq!(processor.pitch_ratio(), 4.0);
}

#[test]
fn latest_value_wins_across_threads() {
    let mut processor = VoiceProcessor::new();
    let params: ParamHandle = processor.params();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            for i in 0..10_000 {
                params.set_pitch(0.5 + (i % 100) as f32 * 0.01);
                params.set_formant(1.0 + (i % 50) as f32 * 0.01);
            }
            params.set_pitch(1.75);
            params.set_formant(0.9);
            done.store(true, Ordering::Release);
        })
    };

    let mut block = gen_sine(180.0, SR, 128, |_| 0.3);
    while !done.load(Ordering::Acquire) {
        processor.process(&mut block);
        assert!(block.iter().all(|s| s.is_finite()));
    }
    writer.join().unwrap();

    for _ in 0..200 {
        processor.process(&mut block);
    }
    assert_eq!(processor.pitch_ratio(), 1.75);
    assert_eq!(processor.formant_ratio(), 0.9);
}
