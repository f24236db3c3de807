//! Integration tests for trivox-core.
//!
//! Exercises the public API the synth layer builds on: ladder filtering of
//! generated signals, tempo-synced LFOs, and noise feeding the filter.

use std::f32::consts::PI;

use trivox_core::{
    FilterMode, LadderFilter, Lfo, LfoWaveform, NoiseGenerator, NoiseType, ParamDescriptor,
    ParamUnit, Processor, RateMode, SyncDivision, STATE_LIMIT,
};

const SR: f32 = 48000.0;

fn generate_sine(freq: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / SR).sin())
        .collect()
}

fn rms(signal: &[f32]) -> f32 {
    (signal.iter().map(|s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
}

// ---------------------------------------------------------------------------
// 1. Ladder filter
// ---------------------------------------------------------------------------

#[test]
fn ladder_lowpass_sweep_is_monotonic() {
    let input = generate_sine(2000.0, 9600);
    let mut last = 0.0;
    for cutoff in [200.0, 800.0, 3200.0, 12000.0] {
        let mut filter = LadderFilter::new(SR);
        filter.set_cutoff(cutoff);
        let mut output = vec![0.0; input.len()];
        filter.process_block(&input, &mut output);
        let level = rms(&output[4800..]);
        assert!(
            level > last,
            "raising cutoff to {} Hz should pass more 2 kHz energy ({} <= {})",
            cutoff,
            level,
            last
        );
        last = level;
    }
}

#[test]
fn ladder_resonance_boosts_cutoff_region() {
    let input = generate_sine(1000.0, 9600);
    let mut levels = [0.0; 2];
    for (slot, resonance) in [0.0, 0.9].into_iter().enumerate() {
        let mut filter = LadderFilter::new(SR);
        filter.set_cutoff(1000.0);
        filter.set_resonance(resonance);
        let mut buffer = input.clone();
        filter.process_block_inplace(&mut buffer);
        levels[slot] = rms(&buffer[4800..]);
    }
    assert!(
        levels[1] > levels[0],
        "resonance should emphasize the cutoff: {:?}",
        levels
    );
}

#[test]
fn ladder_survives_white_noise_at_full_resonance() {
    let mut noise = NoiseGenerator::with_seed(2024);
    let mut filter = LadderFilter::new(44100.0);
    filter.set_cutoff(12000.0);
    filter.set_resonance(1.0);
    for mode in FilterMode::ALL {
        filter.set_mode(mode);
        for _ in 0..100_000 {
            let out = filter.process(noise.advance());
            assert!(out.is_finite() && out.abs() <= STATE_LIMIT, "{:?}: {}", mode, out);
        }
    }
}

// ---------------------------------------------------------------------------
// 2. LFO
// ---------------------------------------------------------------------------

#[test]
fn lfo_synced_cycle_length_matches_tempo() {
    let mut lfo = Lfo::new(SR);
    lfo.set_waveform(LfoWaveform::Sawtooth);
    lfo.set_depth(1.0);
    lfo.set_rate_mode(RateMode::Sync);
    lfo.set_bpm(120.0);
    lfo.set_sync_division(SyncDivision::Quarter);

    // quarter at 120 BPM = 0.5 s = 24000 samples; count ramp resets
    let mut wraps = 0;
    let mut prev = lfo.advance();
    for _ in 0..90_000 {
        let v = lfo.advance();
        if v < prev {
            wraps += 1;
        }
        prev = v;
    }
    assert_eq!(wraps, 3);
}

#[test]
fn lfo_divisions_get_slower() {
    let mut lfo = Lfo::new(SR);
    lfo.set_rate_mode(RateMode::Sync);
    let mut last = f32::INFINITY;
    for division in SyncDivision::ALL {
        lfo.set_sync_division(division);
        let rate = lfo.effective_rate();
        assert!(rate < last, "{:?} should be slower than the previous division", division);
        last = rate;
    }
}

// ---------------------------------------------------------------------------
// 3. Noise and parameters
// ---------------------------------------------------------------------------

#[test]
fn pink_noise_has_less_high_frequency_energy() {
    let mut white = NoiseGenerator::with_seed(9);
    let mut pink = NoiseGenerator::with_seed(9);
    pink.set_noise_type(NoiseType::Pink);

    let diff_energy = |g: &mut NoiseGenerator| {
        let s: Vec<f32> = (0..48_000).map(|_| g.advance()).collect();
        let d: Vec<f32> = s.windows(2).map(|w| w[1] - w[0]).collect();
        rms(&d) / rms(&s)
    };
    assert!(diff_energy(&mut pink) < diff_energy(&mut white));
}

#[test]
fn descriptor_clamps_like_the_filter() {
    let desc = ParamDescriptor::new(
        "Cutoff",
        "filter_cutoff",
        ParamUnit::Hertz,
        20.0,
        12000.0,
        1000.0,
    );
    let mut filter = LadderFilter::new(SR);
    for raw in [-5.0, 10.0, 500.0, 15000.0, f32::NAN] {
        filter.set_cutoff(raw);
        assert_eq!(filter.cutoff(), desc.clamp(raw));
    }
}
