//! Low frequency oscillator for per-voice modulation.
//!
//! Supports free-running rates in Hz and tempo-synced rates expressed as a
//! [`SyncDivision`], a depth control applied to the output, and a
//! sample-and-hold shape driven by an instance-owned PRNG.

use core::f32::consts::TAU;

use libm::sinf;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::math::clamp;
use crate::tempo::{DEFAULT_BPM, MAX_BPM, MIN_BPM, SyncDivision};

/// Slowest free-running rate in Hz.
pub const MIN_LFO_RATE: f32 = 0.01;
/// Fastest free-running rate in Hz.
pub const MAX_LFO_RATE: f32 = 20.0;

/// Seed used by [`Lfo::new`].
pub const DEFAULT_LFO_SEED: u64 = 0x6c66_6f5f_7368_0001;

/// LFO waveform type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Smooth sinusoid.
    #[default]
    Sine,
    /// Linear ramp up then down, peak at phase 0.5.
    Triangle,
    /// +1 for the first half cycle, -1 for the second.
    Square,
    /// Rising ramp from -1 to +1.
    Sawtooth,
    /// Random value held for one full cycle.
    SampleAndHold,
}

impl LfoWaveform {
    /// All waveforms in flat-parameter index order.
    pub const ALL: [LfoWaveform; 5] = [
        LfoWaveform::Sine,
        LfoWaveform::Triangle,
        LfoWaveform::Square,
        LfoWaveform::Sawtooth,
        LfoWaveform::SampleAndHold,
    ];

    /// Waveform for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// How the LFO rate is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateMode {
    /// Rate set directly in Hz.
    #[default]
    Free,
    /// Rate derived from tempo and a [`SyncDivision`].
    Sync,
}

impl RateMode {
    /// Both modes in flat-parameter index order.
    pub const ALL: [RateMode; 2] = [RateMode::Free, RateMode::Sync];

    /// Mode for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Low frequency oscillator with depth and tempo sync.
///
/// `advance()` returns the bipolar waveform value multiplied by depth and
/// then moves the phase forward. `value()` reports the same quantity for
/// the current phase without advancing, so several consumers can read one
/// LFO tick.
///
/// ## Parameters
/// - `rate`: Free-running rate (0.01 to 20.0 Hz, default 1.0)
/// - `depth`: Output scale (0.0 to 1.0, default 0.0)
/// - `bpm`: Tempo for sync mode (20 to 300, default 120)
///
/// # Example
///
/// ```rust
/// use trivox_core::{Lfo, LfoWaveform, RateMode, SyncDivision};
///
/// let mut lfo = Lfo::new(48000.0);
/// lfo.set_waveform(LfoWaveform::Triangle);
/// lfo.set_depth(1.0);
/// lfo.set_rate_mode(RateMode::Sync);
/// lfo.set_bpm(120.0);
/// lfo.set_sync_division(SyncDivision::Quarter);
/// assert!((lfo.effective_rate() - 2.0).abs() < 1e-6);
///
/// let value = lfo.advance();
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    phase_inc: f32,
    sample_rate: f32,
    waveform: LfoWaveform,
    rate: f32,
    rate_mode: RateMode,
    sync_division: SyncDivision,
    bpm: f32,
    depth: f32,
    sh_value: f32,
    rng: SmallRng,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Lfo {
    /// Create a 1 Hz sine LFO with zero depth.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, DEFAULT_LFO_SEED)
    }

    /// Create an LFO whose sample-and-hold sequence derives from `seed`.
    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        let mut lfo = Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate,
            waveform: LfoWaveform::Sine,
            rate: 1.0,
            rate_mode: RateMode::Free,
            sync_division: SyncDivision::Quarter,
            bpm: DEFAULT_BPM,
            depth: 0.0,
            sh_value: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        };
        lfo.update_phase_inc();
        lfo.sh_value = lfo.draw_sh();
        lfo
    }

    /// Set the sample rate, keeping the effective rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_phase_inc();
    }

    /// Set waveform
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Set the free-running rate in Hz (clamped to 0.01–20).
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate = clamp(rate_hz, MIN_LFO_RATE, MAX_LFO_RATE);
        self.update_phase_inc();
    }

    /// Free-running rate in Hz.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Choose between free-running and tempo-synced rate.
    pub fn set_rate_mode(&mut self, mode: RateMode) {
        self.rate_mode = mode;
        self.update_phase_inc();
    }

    /// Current rate mode.
    pub fn rate_mode(&self) -> RateMode {
        self.rate_mode
    }

    /// Set the musical division used in sync mode.
    pub fn set_sync_division(&mut self, division: SyncDivision) {
        self.sync_division = division;
        self.update_phase_inc();
    }

    /// Current sync division.
    pub fn sync_division(&self) -> SyncDivision {
        self.sync_division
    }

    /// Set the tempo used in sync mode (clamped to 20–300 BPM).
    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = clamp(bpm, MIN_BPM, MAX_BPM);
        self.update_phase_inc();
    }

    /// Current tempo.
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Set modulation depth (clamped to 0–1).
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = clamp(depth, 0.0, 1.0);
    }

    /// Current modulation depth.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Rate in Hz after applying the rate mode.
    pub fn effective_rate(&self) -> f32 {
        match self.rate_mode {
            RateMode::Free => self.rate,
            RateMode::Sync => self.sync_division.to_hz(self.bpm),
        }
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Zero the phase and draw a fresh sample-and-hold value.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.sh_value = self.draw_sh();
    }

    /// Depth-scaled output at the current phase, without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        self.shape(self.phase) * self.depth
    }

    /// Return the depth-scaled output, then advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let out = self.value();

        let last_phase = self.phase;
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        if self.phase < last_phase {
            self.sh_value = self.draw_sh();
        }

        out
    }

    #[inline]
    fn shape(&self, phase: f32) -> f32 {
        match self.waveform {
            LfoWaveform::Sine => sinf(phase * TAU),
            LfoWaveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
            LfoWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            LfoWaveform::Sawtooth => 2.0 * phase - 1.0,
            LfoWaveform::SampleAndHold => self.sh_value,
        }
    }

    fn draw_sh(&mut self) -> f32 {
        self.rng.random_range(-1.0f32..=1.0)
    }

    fn update_phase_inc(&mut self) {
        self.phase_inc = self.effective_rate() / self.sample_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_depth(waveform: LfoWaveform, rate: f32) -> Lfo {
        let mut lfo = Lfo::with_seed(48000.0, 1);
        lfo.set_waveform(waveform);
        lfo.set_rate(rate);
        lfo.set_depth(1.0);
        lfo
    }

    #[test]
    fn test_lfo_phase_accumulation() {
        let mut lfo = full_depth(LfoWaveform::Sine, 1.0);
        for _ in 0..48000 {
            lfo.advance();
        }
        let phase_error = lfo.phase().min((lfo.phase() - 1.0).abs());
        assert!(phase_error < 0.01, "phase error {}", phase_error);
    }

    #[test]
    fn test_lfo_output_range() {
        for waveform in LfoWaveform::ALL {
            let mut lfo = full_depth(waveform, 7.0);
            for _ in 0..20_000 {
                let value = lfo.advance();
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "Waveform {:?} out of range: {}",
                    waveform,
                    value
                );
            }
        }
    }

    #[test]
    fn test_zero_depth_is_silent() {
        let mut lfo = Lfo::new(48000.0);
        lfo.set_waveform(LfoWaveform::Square);
        for _ in 0..1000 {
            assert_eq!(lfo.advance(), 0.0);
        }
    }

    #[test]
    fn test_depth_scales_output() {
        let mut lfo = full_depth(LfoWaveform::Square, 1.0);
        lfo.set_depth(0.5);
        assert_eq!(lfo.advance(), 0.5);
    }

    #[test]
    fn test_value_does_not_advance() {
        let mut lfo = full_depth(LfoWaveform::Sawtooth, 5.0);
        for _ in 0..100 {
            lfo.advance();
        }
        let peek = lfo.value();
        assert_eq!(lfo.value(), peek);
        assert_eq!(lfo.advance(), peek);
        assert_ne!(lfo.value(), peek);
    }

    #[test]
    fn test_shapes_at_known_phases() {
        let mut tri = full_depth(LfoWaveform::Triangle, 1.0);
        assert_eq!(tri.value(), -1.0);
        for _ in 0..24000 {
            tri.advance();
        }
        assert!((tri.value() - 1.0).abs() < 1e-3);

        let saw = full_depth(LfoWaveform::Sawtooth, 1.0);
        assert_eq!(saw.value(), -1.0);

        let sine = full_depth(LfoWaveform::Sine, 1.0);
        assert_eq!(sine.value(), 0.0);
    }

    #[test]
    fn test_sample_and_hold_changes_only_on_wrap() {
        let mut lfo = full_depth(LfoWaveform::SampleAndHold, 10.0);
        // 10 Hz at 48 kHz: one hold per 4800 samples
        let first = lfo.advance();
        for _ in 1..4799 {
            assert_eq!(lfo.advance(), first);
        }
        let mut changes = 0;
        let mut last = first;
        for _ in 0..48000 {
            let v = lfo.advance();
            if v != last {
                changes += 1;
                last = v;
            }
        }
        assert!(
            (9..=10).contains(&changes),
            "expected ~10 redraws per second, got {}",
            changes
        );
    }

    #[test]
    fn test_reset_zeroes_phase_and_redraws() {
        let mut lfo = full_depth(LfoWaveform::SampleAndHold, 3.0);
        let before = lfo.value();
        for _ in 0..1234 {
            lfo.advance();
        }
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
        assert_ne!(lfo.value(), before);
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
    }

    #[test]
    fn test_sync_rate() {
        let mut lfo = Lfo::new(48000.0);
        lfo.set_rate_mode(RateMode::Sync);
        lfo.set_bpm(120.0);
        lfo.set_sync_division(SyncDivision::Eighth);
        assert!((lfo.effective_rate() - 4.0).abs() < 1e-5);

        lfo.set_sync_division(SyncDivision::FourBars);
        assert!((lfo.effective_rate() - 0.125).abs() < 1e-6);

        lfo.set_rate_mode(RateMode::Free);
        assert_eq!(lfo.effective_rate(), lfo.rate());
    }

    #[test]
    fn test_parameter_clamping() {
        let mut lfo = Lfo::new(48000.0);
        lfo.set_rate(100.0);
        assert_eq!(lfo.rate(), MAX_LFO_RATE);
        lfo.set_rate(0.0);
        assert_eq!(lfo.rate(), MIN_LFO_RATE);
        lfo.set_depth(2.0);
        assert_eq!(lfo.depth(), 1.0);
        lfo.set_depth(f32::NAN);
        assert_eq!(lfo.depth(), 0.0);
        lfo.set_bpm(1000.0);
        assert_eq!(lfo.bpm(), MAX_BPM);
    }

    #[test]
    fn test_lfo_sample_rate_change() {
        let mut lfo = full_depth(LfoWaveform::Sine, 2.0);
        let inc_48k = lfo.phase_inc;
        lfo.set_sample_rate(96000.0);
        assert!((inc_48k / lfo.phase_inc - 2.0).abs() < 1e-5);
        assert_eq!(lfo.effective_rate(), 2.0);
    }
}
