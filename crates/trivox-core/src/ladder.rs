//! Four-pole resonant ladder filter.
//!
//! A Moog-style cascade of four one-pole lowpass stages with global
//! feedback from the last stage, `tanh` saturation at the ladder input, and
//! three output taps.
//!
//! # Stability
//!
//! The filter guards itself against blow-up in three ways:
//!
//! - every stage is clamped to ±[`STATE_LIMIT`] after each update
//! - the final output is clamped to the same range
//! - non-finite state is detected at the start of each sample and cleared

use core::f32::consts::PI;

use libm::{tanf, tanhf};

use crate::math::{clamp, flush_denormal};
use crate::processor::Processor;

/// Lowest cutoff in Hz.
pub const MIN_CUTOFF: f32 = 20.0;
/// Highest cutoff in Hz.
pub const MAX_CUTOFF: f32 = 12000.0;
/// Bound applied to every stage and to the output.
pub const STATE_LIMIT: f32 = 10.0;

/// Cutoff / sample-rate ceiling before prewarping.
const MAX_NORMALIZED_CUTOFF: f32 = 0.45;
/// Resonance 1.0 maps to this feedback gain.
const FEEDBACK_SCALE: f32 = 3.5;
/// Passband makeup per unit of feedback gain.
const RESONANCE_COMPENSATION: f32 = 0.15;

/// Ladder output tap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// 24 dB/oct lowpass (fourth stage).
    #[default]
    LowPass,
    /// First stage minus fourth stage.
    BandPass,
    /// Unsaturated ladder input (after feedback) minus fourth stage.
    HighPass,
}

impl FilterMode {
    /// All modes in flat-parameter index order.
    pub const ALL: [FilterMode; 3] = [
        FilterMode::LowPass,
        FilterMode::BandPass,
        FilterMode::HighPass,
    ];

    /// Mode for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Moog-style 4-pole ladder filter.
///
/// Coefficients are cached and only recomputed on the first `process` call
/// after cutoff, resonance, or sample rate actually change.
///
/// ```text
/// g        = tan(π · clamp(cutoff / sr, 0, 0.45))
/// feedback = resonance · 3.5
///
/// d    = input − s4 · feedback
/// s[n] = s[n] + g · (s[n−1] − s[n])      (s[0] fed by tanh(d))
/// out  = tap(mode) · (1 + 0.15 · feedback)
/// ```
///
/// ## Parameters
/// - `cutoff`: Cutoff frequency (20.0 to 12000.0 Hz, default 1000.0)
/// - `resonance`: Feedback amount (0.0 to 1.0, default 0.0)
///
/// # Example
///
/// ```rust
/// use trivox_core::{FilterMode, LadderFilter, Processor};
///
/// let mut filter = LadderFilter::new(48000.0);
/// filter.set_mode(FilterMode::LowPass);
/// filter.set_cutoff(2000.0);
/// filter.set_resonance(0.6);
///
/// let out = filter.process(1.0);
/// assert!(out.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct LadderFilter {
    mode: FilterMode,
    cutoff: f32,
    resonance: f32,
    sample_rate: f32,
    stages: [f32; 4],
    g: f32,
    feedback_gain: f32,
    coeffs_dirty: bool,
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl LadderFilter {
    /// Create a lowpass ladder at 1 kHz with no resonance.
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            mode: FilterMode::LowPass,
            cutoff: 1000.0,
            resonance: 0.0,
            sample_rate,
            stages: [0.0; 4],
            g: 0.0,
            feedback_gain: 0.0,
            coeffs_dirty: true,
        };
        filter.update_coefficients();
        filter
    }

    /// Select the output tap.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Current output tap.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Set cutoff in Hz (clamped to 20–12000).
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let cutoff = clamp(cutoff_hz, MIN_CUTOFF, MAX_CUTOFF);
        if cutoff != self.cutoff {
            self.cutoff = cutoff;
            self.coeffs_dirty = true;
        }
    }

    /// Current cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance (clamped to 0–1).
    pub fn set_resonance(&mut self, resonance: f32) {
        let resonance = clamp(resonance, 0.0, 1.0);
        if resonance != self.resonance {
            self.resonance = resonance;
            self.coeffs_dirty = true;
        }
    }

    /// Current resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    fn update_coefficients(&mut self) {
        let normalized = clamp(self.cutoff / self.sample_rate, 0.0, MAX_NORMALIZED_CUTOFF);
        self.g = tanf(PI * normalized);
        self.feedback_gain = self.resonance * FEEDBACK_SCALE;
        self.coeffs_dirty = false;
    }
}

impl Processor for LadderFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        if self.coeffs_dirty {
            self.update_coefficients();
        }
        if !self.stages.iter().all(|s| s.is_finite()) {
            self.stages = [0.0; 4];
        }

        let driven = input - self.stages[3] * self.feedback_gain;

        let mut prev = tanhf(driven);
        for stage in &mut self.stages {
            *stage += self.g * (prev - *stage);
            *stage = flush_denormal(stage.clamp(-STATE_LIMIT, STATE_LIMIT));
            prev = *stage;
        }

        let tap = match self.mode {
            FilterMode::LowPass => self.stages[3],
            FilterMode::BandPass => self.stages[0] - self.stages[3],
            FilterMode::HighPass => driven - self.stages[3],
        };
        let out = tap * (1.0 + RESONANCE_COMPENSATION * self.feedback_gain);

        if out.is_finite() {
            out.clamp(-STATE_LIMIT, STATE_LIMIT)
        } else {
            self.stages = [0.0; 4];
            0.0
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.coeffs_dirty = true;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "ladder: sample rate {sample_rate} Hz, cutoff {} Hz",
            self.cutoff
        );
    }

    fn reset(&mut self) {
        self.stages = [0.0; 4];
    }
}
