//! Audio-rate oscillators with anti-aliasing.
//!
//! Provides band-limited oscillators using second-order PolyBLEP
//! (Polynomial Band-Limited Step) corrections at every waveform
//! discontinuity.

use core::f32::consts::TAU;

use libm::sinf;
use rand::Rng;
use trivox_core::{clamp, poly_blep, wrap_phase};

/// Lowest oscillator frequency in Hz.
pub const MIN_FREQUENCY: f32 = 20.0;
/// Highest oscillator frequency in Hz.
pub const MAX_FREQUENCY: f32 = 20000.0;
/// Narrowest pulse width.
pub const MIN_PULSE_WIDTH: f32 = 0.01;
/// Widest pulse width.
pub const MAX_PULSE_WIDTH: f32 = 0.99;

/// Oscillator waveform types
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OscillatorWaveform {
    /// Pure fundamental.
    #[default]
    Sine,
    /// Sawtooth, all harmonics.
    Saw,
    /// Pulse with variable width (odd harmonics only at 50%).
    Square,
    /// Triangle, odd harmonics rolling off faster than square.
    Triangle,
}

impl OscillatorWaveform {
    /// All waveforms in flat-parameter index order.
    pub const ALL: [OscillatorWaveform; 4] = [
        OscillatorWaveform::Sine,
        OscillatorWaveform::Saw,
        OscillatorWaveform::Square,
        OscillatorWaveform::Triangle,
    ];

    /// Waveform for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Audio-rate oscillator with PolyBLEP anti-aliasing.
///
/// The phase lives in `[0, 1)` and advances by `frequency / sample_rate`
/// each sample. The sample returned by [`advance`](Self::advance) is the
/// waveform at the phase *before* the increment, so a freshly reset sine
/// starts at exactly 0.
///
/// Saw and square edges get a PolyBLEP step correction. Triangle corners
/// get the same residual scaled by `4·dt`, so the triangle can exceed ±1 by
/// at most that amount near its peak and trough.
///
/// ## Parameters
/// - `frequency`: Pitch (20.0 to 20000.0 Hz, default 440.0)
/// - `pulse_width`: Square duty cycle (0.01 to 0.99, default 0.5)
///
/// # Example
///
/// ```rust
/// use trivox_synth::{Oscillator, OscillatorWaveform};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_frequency(440.0); // A4
/// osc.set_waveform(OscillatorWaveform::Saw);
///
/// let sample = osc.advance();
/// assert!(sample.abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    waveform: OscillatorWaveform,
    pulse_width: f32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create a 440 Hz sine oscillator.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate,
            frequency: 440.0,
            waveform: OscillatorWaveform::Sine,
            pulse_width: 0.5,
        };
        osc.update_phase_inc();
        osc
    }

    /// Set frequency in Hz (clamped to 20–20000).
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = clamp(freq_hz, MIN_FREQUENCY, MAX_FREQUENCY);
        self.update_phase_inc();
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set waveform.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform.
    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Set square-wave duty cycle (clamped to 0.01–0.99).
    #[inline]
    pub fn set_pulse_width(&mut self, width: f32) {
        self.pulse_width = clamp(width, MIN_PULSE_WIDTH, MAX_PULSE_WIDTH);
    }

    /// Current duty cycle.
    pub fn pulse_width(&self) -> f32 {
        self.pulse_width
    }

    /// Set sample rate, keeping the frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_phase_inc();
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Zero the phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Jump to a uniformly random phase.
    ///
    /// Used for unison stacks so detuned copies do not start phase-locked.
    pub fn set_random_phase<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.phase = rng.random_range(0.0f32..1.0);
    }

    /// Generate one sample and advance the phase.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let sample = self.generate();
        self.phase = wrap_phase(self.phase + self.phase_inc);
        sample
    }

    #[inline]
    fn generate(&self) -> f32 {
        let t = self.phase;
        let dt = self.phase_inc;
        match self.waveform {
            OscillatorWaveform::Sine => sinf(t * TAU),
            OscillatorWaveform::Saw => 2.0 * t - 1.0 - poly_blep(t, dt),
            OscillatorWaveform::Square => {
                let pw = self.pulse_width;
                let naive = if t < pw { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep(wrap_phase(t - pw), dt)
            }
            OscillatorWaveform::Triangle => {
                let naive = if t < 0.5 { 4.0 * t - 1.0 } else { 3.0 - 4.0 * t };
                let scale = 4.0 * dt;
                naive + poly_blep(wrap_phase(t - 0.5), dt) * scale - poly_blep(t, dt) * scale
            }
        }
    }

    fn update_phase_inc(&mut self) {
        self.phase_inc = self.frequency / self.sample_rate;
    }
}
