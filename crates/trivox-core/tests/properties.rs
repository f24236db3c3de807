//! Property-based tests for trivox-core DSP primitives.
//!
//! Covers pitch math, ladder filter stability, and LFO/noise output bounds
//! using proptest for randomized inputs.

use proptest::prelude::*;
use trivox_core::{
    FilterMode, LadderFilter, Lfo, LfoWaveform, NoiseGenerator, NoiseType, Processor, RateMode,
    STATE_LIMIT, SyncDivision, midi_to_freq, poly_blep, wrap_phase,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Twelve semitones up is exactly one octave for every MIDI note.
    #[test]
    fn midi_octave_doubling(note in 0u8..=127) {
        let ratio = midi_to_freq(note + 12) / midi_to_freq(note);
        prop_assert!(
            (ratio - 2.0).abs() < 1e-4,
            "note {} octave ratio {}", note, ratio
        );
    }

    /// The PolyBLEP residual mirrors across the wrap point.
    #[test]
    fn poly_blep_antisymmetry(dt in 0.0005f32..0.45, frac in 0.0f32..1.0) {
        let t = frac * dt;
        let after = poly_blep(t, dt);
        let before = poly_blep(1.0 - t, dt);
        prop_assert!(
            (after + before).abs() < 1e-3,
            "dt={} t={}: {} vs {}", dt, t, after, before
        );
    }

    /// Wrapped phases always land in [0, 1).
    #[test]
    fn wrap_phase_in_unit_interval(phase in -1000.0f32..1000.0) {
        let wrapped = wrap_phase(phase);
        prop_assert!((0.0..1.0).contains(&wrapped), "{} -> {}", phase, wrapped);
    }

    /// For any cutoff, resonance, and mode the ladder stays finite and
    /// bounded on random full-scale input.
    #[test]
    fn ladder_stability(
        cutoff in 20.0f32..12000.0,
        resonance in 0.0f32..=1.0,
        mode in 0usize..3,
        sample_rate in prop::sample::select(vec![22050.0f32, 44100.0, 48000.0, 96000.0]),
        input in prop::collection::vec(-1.0f32..=1.0, 256),
    ) {
        let mut filter = LadderFilter::new(sample_rate);
        filter.set_cutoff(cutoff);
        filter.set_resonance(resonance);
        filter.set_mode(FilterMode::ALL[mode]);

        for _ in 0..8 {
            for &sample in &input {
                let out = filter.process(sample);
                prop_assert!(
                    out.is_finite() && out.abs() <= STATE_LIMIT,
                    "mode {} cutoff {} res {} sr {} produced {}",
                    mode, cutoff, resonance, sample_rate, out
                );
            }
        }
    }

    /// Depth-scaled LFO output never exceeds the depth.
    #[test]
    fn lfo_bounded_by_depth(
        waveform in 0usize..5,
        rate in 0.01f32..20.0,
        depth in 0.0f32..=1.0,
        synced in any::<bool>(),
        division in 0usize..7,
        bpm in 20.0f32..300.0,
    ) {
        let mut lfo = Lfo::new(48000.0);
        lfo.set_waveform(LfoWaveform::ALL[waveform]);
        lfo.set_rate(rate);
        lfo.set_depth(depth);
        lfo.set_bpm(bpm);
        lfo.set_sync_division(SyncDivision::ALL[division]);
        lfo.set_rate_mode(if synced { RateMode::Sync } else { RateMode::Free });

        for _ in 0..2048 {
            let v = lfo.advance();
            prop_assert!(v.abs() <= depth + 1e-6, "value {} exceeds depth {}", v, depth);
        }
    }

    /// Every noise color stays within [-1, 1] for any seed.
    #[test]
    fn noise_bounded(seed in any::<u64>(), kind in 0usize..3) {
        let mut noise = NoiseGenerator::with_seed(seed);
        noise.set_noise_type(NoiseType::ALL[kind]);
        for _ in 0..4096 {
            let s = noise.advance();
            prop_assert!((-1.0..=1.0).contains(&s), "{:?} produced {}", NoiseType::ALL[kind], s);
        }
    }
}
