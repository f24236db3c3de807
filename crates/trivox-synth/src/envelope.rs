//! Linear ADSR envelope generator.
//!
//! Ramps are linear in level with per-sample rates derived from the stage
//! times. The release rate is computed from the level at note-off, so a
//! release always lasts exactly the configured time no matter where in the
//! envelope the key was lifted.

use trivox_core::clamp;

/// Shortest effective attack in seconds. Faster settings click.
pub const MIN_EFFECTIVE_ATTACK: f32 = 0.005;
/// Shortest attack or decay setting in seconds.
pub const MIN_STAGE_TIME: f32 = 0.001;
/// Longest attack or decay setting in seconds.
pub const MAX_ATTACK_DECAY_TIME: f32 = 2.0;
/// Longest release setting in seconds.
pub const MAX_RELEASE_TIME: f32 = 5.0;

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive, output is zero.
    #[default]
    Idle,
    /// Level ramps up toward 1.0.
    Attack,
    /// Level falls from 1.0 toward the sustain level.
    Decay,
    /// Level holds at the sustain level while the key is down.
    Sustain,
    /// Level falls to zero after note-off.
    Release,
}

/// Linear ADSR envelope generator.
///
/// Output is `level × velocity`, with `level` always in [0, 1].
///
/// ```text
/// Attack:  level += 1 / (max(attack, 5 ms) · sr)      until 1.0
/// Decay:   level -= (1 − sustain) / (decay · sr)      until sustain
/// Sustain: level  = sustain
/// Release: level -= level_at_note_off / (release · sr) until 0.0
/// ```
///
/// ## Parameters
/// - `attack`: Attack time (0.001 to 2.0 s, default 0.01)
/// - `decay`: Decay time (0.001 to 2.0 s, default 0.3)
/// - `sustain`: Sustain level (0.0 to 1.0, default 0.7)
/// - `release`: Release time (0.001 to 5.0 s, default 0.5)
///
/// # Example
///
/// ```rust
/// use trivox_synth::{Envelope, EnvelopeState};
///
/// let mut env = Envelope::new(48000.0);
/// env.set_adsr(0.01, 0.1, 0.7, 0.2);
///
/// env.note_on(1.0);
/// for _ in 0..1000 {
///     let _gain = env.advance();
/// }
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    state: EnvelopeState,
    level: f32,
    velocity: f32,
    sample_rate: f32,

    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Envelope {
    /// Create an idle envelope with default times.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            velocity: 1.0,
            sample_rate,
            attack: 0.01,
            decay: 0.3,
            sustain: 0.7,
            release: 0.5,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        env.recalculate_rates();
        env
    }

    /// Set attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.attack = clamp(seconds, MIN_STAGE_TIME, MAX_ATTACK_DECAY_TIME);
        self.recalculate_rates();
    }

    /// Attack time in seconds.
    pub fn attack(&self) -> f32 {
        self.attack
    }

    /// Set decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.decay = clamp(seconds, MIN_STAGE_TIME, MAX_ATTACK_DECAY_TIME);
        self.recalculate_rates();
    }

    /// Decay time in seconds.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Set sustain level.
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = clamp(level, 0.0, 1.0);
        self.recalculate_rates();
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.release = clamp(seconds, MIN_STAGE_TIME, MAX_RELEASE_TIME);
        self.recalculate_rates();
    }

    /// Release time in seconds.
    pub fn release(&self) -> f32 {
        self.release
    }

    /// Set all four stages at once.
    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack = clamp(attack, MIN_STAGE_TIME, MAX_ATTACK_DECAY_TIME);
        self.decay = clamp(decay, MIN_STAGE_TIME, MAX_ATTACK_DECAY_TIME);
        self.sustain = clamp(sustain, 0.0, 1.0);
        self.release = clamp(release, MIN_STAGE_TIME, MAX_RELEASE_TIME);
        self.recalculate_rates();
    }

    /// Set sample rate. Stage times are kept.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_rates();
    }

    /// Start the attack from the current level.
    ///
    /// The level is not reset, so retriggering a sounding voice does not click.
    pub fn note_on(&mut self, velocity: f32) {
        self.velocity = clamp(velocity, 0.0, 1.0);
        self.state = EnvelopeState::Attack;
    }

    /// Enter the release stage. Ignored while idle.
    pub fn note_off(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
            self.release_rate = self.level_release_rate();
        }
    }

    /// Force idle with zero level.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Current stage.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current level before velocity scaling.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Velocity captured at the last note-on.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Whether the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance one sample and return `level × velocity`.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {}
            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                self.level = self.sustain;
            }
            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }

        self.level * self.velocity
    }

    fn level_release_rate(&self) -> f32 {
        self.level / (self.release * self.sample_rate)
    }

    fn recalculate_rates(&mut self) {
        self.attack_rate = 1.0 / (self.attack.max(MIN_EFFECTIVE_ATTACK) * self.sample_rate);
        self.decay_rate = (1.0 - self.sustain) / (self.decay * self.sample_rate);
        if self.state == EnvelopeState::Release {
            // rescale the remaining ramp to the new release time
            self.release_rate = self.level_release_rate();
        }
    }
}
