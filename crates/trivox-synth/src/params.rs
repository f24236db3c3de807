//! Flat parameter interface.
//!
//! Every control the synth exposes has a [`SynthParam`] id with a stable
//! string name and a [`ParamDescriptor`] giving its range and default.
//! Enumerated controls (waveforms, modes, destinations) are addressed by
//! their index in the matching enum's `ALL` table.
//!
//! [`Patch`] is a complete name → value snapshot. It is the boundary an
//! external preset store talks to: values arriving by name are validated
//! there, and [`Patch::apply_to`] pushes them through the regular broadcast
//! setters.
//!
//! # Example
//!
//! ```rust
//! use trivox_synth::{Patch, SynthParam, VoiceManager};
//!
//! let patch = Patch::from_pairs([
//!     ("osc2_enabled", 1.0),
//!     ("osc2_detune", 7.0),
//!     ("filter_cutoff", 2400.0),
//!     ("lfo1_destination", 2.0), // pitch
//!     ("lfo1_depth", 0.1),
//! ])
//! .unwrap();
//!
//! let mut synth: VoiceManager = VoiceManager::new(48000.0);
//! patch.apply_to(&mut synth);
//! assert_eq!(patch.get(SynthParam::FilterCutoff), 2400.0);
//! ```

use trivox_core::{
    DEFAULT_BPM, FilterMode, LfoWaveform, MAX_BPM, MAX_CUTOFF, MAX_LFO_RATE, MIN_BPM, MIN_CUTOFF,
    MIN_LFO_RATE, NoiseType, ParamDescriptor, ParamUnit, RateMode, SyncDivision,
};

use crate::envelope::{MAX_ATTACK_DECAY_TIME, MAX_RELEASE_TIME, MIN_STAGE_TIME};
use crate::error::ParamError;
use crate::manager::{DEFAULT_UNISON_DETUNE, MAX_UNISON_DETUNE, VoiceManager, VoiceMode};
use crate::oscillator::{MAX_PULSE_WIDTH, MIN_PULSE_WIDTH, OscillatorWaveform};
use crate::voice::{LfoDestination, MAX_DETUNE_CENTS, MAX_DRIVE, MAX_OCTAVE_OFFSET, MIN_DRIVE};

const PARAMS_PER_OSC: usize = 7;
const PARAMS_PER_LFO: usize = 7;
const OSC_BLOCK_END: usize = 3 * PARAMS_PER_OSC;
const LFO_BLOCK_START: usize = SynthParam::Lfo1Waveform as usize;
const LFO_BLOCK_END: usize = LFO_BLOCK_START + 2 * PARAMS_PER_LFO;

/// Identifier for every exposed synth control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SynthParam {
    Osc1Enabled,
    Osc1Waveform,
    Osc1Gain,
    Osc1Detune,
    Osc1Octave,
    Osc1PulseWidth,
    Osc1Drive,
    Osc2Enabled,
    Osc2Waveform,
    Osc2Gain,
    Osc2Detune,
    Osc2Octave,
    Osc2PulseWidth,
    Osc2Drive,
    Osc3Enabled,
    Osc3Waveform,
    Osc3Gain,
    Osc3Detune,
    Osc3Octave,
    Osc3PulseWidth,
    Osc3Drive,
    NoiseEnabled,
    NoiseType,
    NoiseGain,
    FilterMode,
    FilterCutoff,
    FilterResonance,
    EnvAttack,
    EnvDecay,
    EnvSustain,
    EnvRelease,
    Lfo1Waveform,
    Lfo1Rate,
    Lfo1Depth,
    Lfo1Destination,
    Lfo1RateMode,
    Lfo1SyncDivision,
    Lfo1Bpm,
    Lfo2Waveform,
    Lfo2Rate,
    Lfo2Depth,
    Lfo2Destination,
    Lfo2RateMode,
    Lfo2SyncDivision,
    Lfo2Bpm,
    VoiceMode,
    UnisonDetune,
}

impl SynthParam {
    /// Number of parameters.
    pub const COUNT: usize = 47;

    /// Every parameter in index order.
    pub const ALL: [SynthParam; Self::COUNT] = [
        Self::Osc1Enabled,
        Self::Osc1Waveform,
        Self::Osc1Gain,
        Self::Osc1Detune,
        Self::Osc1Octave,
        Self::Osc1PulseWidth,
        Self::Osc1Drive,
        Self::Osc2Enabled,
        Self::Osc2Waveform,
        Self::Osc2Gain,
        Self::Osc2Detune,
        Self::Osc2Octave,
        Self::Osc2PulseWidth,
        Self::Osc2Drive,
        Self::Osc3Enabled,
        Self::Osc3Waveform,
        Self::Osc3Gain,
        Self::Osc3Detune,
        Self::Osc3Octave,
        Self::Osc3PulseWidth,
        Self::Osc3Drive,
        Self::NoiseEnabled,
        Self::NoiseType,
        Self::NoiseGain,
        Self::FilterMode,
        Self::FilterCutoff,
        Self::FilterResonance,
        Self::EnvAttack,
        Self::EnvDecay,
        Self::EnvSustain,
        Self::EnvRelease,
        Self::Lfo1Waveform,
        Self::Lfo1Rate,
        Self::Lfo1Depth,
        Self::Lfo1Destination,
        Self::Lfo1RateMode,
        Self::Lfo1SyncDivision,
        Self::Lfo1Bpm,
        Self::Lfo2Waveform,
        Self::Lfo2Rate,
        Self::Lfo2Depth,
        Self::Lfo2Destination,
        Self::Lfo2RateMode,
        Self::Lfo2SyncDivision,
        Self::Lfo2Bpm,
        Self::VoiceMode,
        Self::UnisonDetune,
    ];

    /// Position in [`ALL`](Self::ALL).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parameter at `index`, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Range, default, and unit.
    #[inline]
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Stable string id, e.g. `"osc2_detune"`.
    pub fn name(self) -> &'static str {
        self.descriptor().string_id
    }

    /// Look up a parameter by string id.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Oscillator or LFO slot this parameter addresses, 0 otherwise.
    fn slot(self) -> usize {
        let i = self.index();
        if i < OSC_BLOCK_END {
            i / PARAMS_PER_OSC
        } else if (LFO_BLOCK_START..LFO_BLOCK_END).contains(&i) {
            (i - LFO_BLOCK_START) / PARAMS_PER_LFO
        } else {
            0
        }
    }
}

const fn waveform_choice(name: &'static str, id: &'static str, default: usize) -> ParamDescriptor {
    ParamDescriptor::choice(name, id, OscillatorWaveform::ALL.len(), default)
}

const fn gain(name: &'static str, id: &'static str, default: f32) -> ParamDescriptor {
    ParamDescriptor::new(name, id, ParamUnit::Ratio, 0.0, 1.0, default)
}

const fn detune(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(name, id, ParamUnit::Cents, -MAX_DETUNE_CENTS, MAX_DETUNE_CENTS, 0.0)
}

const fn octave(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(
        name,
        id,
        ParamUnit::Octaves,
        -(MAX_OCTAVE_OFFSET as f32),
        MAX_OCTAVE_OFFSET as f32,
        0.0,
    )
    .stepped()
}

const fn pulse_width(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(name, id, ParamUnit::Ratio, MIN_PULSE_WIDTH, MAX_PULSE_WIDTH, 0.5)
}

const fn drive(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(name, id, ParamUnit::Ratio, MIN_DRIVE, MAX_DRIVE, MIN_DRIVE)
}

const fn envelope_time(
    name: &'static str,
    id: &'static str,
    max: f32,
    default: f32,
) -> ParamDescriptor {
    ParamDescriptor::new(name, id, ParamUnit::Seconds, MIN_STAGE_TIME, max, default)
}

const fn lfo_rate(name: &'static str, id: &'static str, default: f32) -> ParamDescriptor {
    ParamDescriptor::new(name, id, ParamUnit::Hertz, MIN_LFO_RATE, MAX_LFO_RATE, default)
}

const fn bpm(name: &'static str, id: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(name, id, ParamUnit::Bpm, MIN_BPM, MAX_BPM, DEFAULT_BPM)
}

/// Descriptor table in [`SynthParam::ALL`] order. Defaults form the init patch.
static DESCRIPTORS: [ParamDescriptor; SynthParam::COUNT] = [
    ParamDescriptor::toggle("Osc 1 On", "osc1_enabled", true),
    waveform_choice("Osc 1 Wave", "osc1_waveform", 0),
    gain("Osc 1 Gain", "osc1_gain", 0.5),
    detune("Osc 1 Detune", "osc1_detune"),
    octave("Osc 1 Octave", "osc1_octave"),
    pulse_width("Osc 1 Pulse Width", "osc1_pulse_width"),
    drive("Osc 1 Drive", "osc1_drive"),
    ParamDescriptor::toggle("Osc 2 On", "osc2_enabled", false),
    waveform_choice("Osc 2 Wave", "osc2_waveform", 1),
    gain("Osc 2 Gain", "osc2_gain", 0.33),
    detune("Osc 2 Detune", "osc2_detune"),
    octave("Osc 2 Octave", "osc2_octave"),
    pulse_width("Osc 2 Pulse Width", "osc2_pulse_width"),
    drive("Osc 2 Drive", "osc2_drive"),
    ParamDescriptor::toggle("Osc 3 On", "osc3_enabled", false),
    waveform_choice("Osc 3 Wave", "osc3_waveform", 2),
    gain("Osc 3 Gain", "osc3_gain", 0.33),
    detune("Osc 3 Detune", "osc3_detune"),
    octave("Osc 3 Octave", "osc3_octave"),
    pulse_width("Osc 3 Pulse Width", "osc3_pulse_width"),
    drive("Osc 3 Drive", "osc3_drive"),
    ParamDescriptor::toggle("Noise On", "noise_enabled", false),
    ParamDescriptor::choice("Noise Type", "noise_type", NoiseType::ALL.len(), 0),
    gain("Noise Gain", "noise_gain", 0.0),
    ParamDescriptor::choice("Filter Mode", "filter_mode", FilterMode::ALL.len(), 0),
    ParamDescriptor::new(
        "Filter Cutoff",
        "filter_cutoff",
        ParamUnit::Hertz,
        MIN_CUTOFF,
        MAX_CUTOFF,
        1000.0,
    ),
    gain("Filter Resonance", "filter_resonance", 0.0),
    envelope_time("Attack", "env_attack", MAX_ATTACK_DECAY_TIME, 0.01),
    envelope_time("Decay", "env_decay", MAX_ATTACK_DECAY_TIME, 0.3),
    gain("Sustain", "env_sustain", 0.7),
    envelope_time("Release", "env_release", MAX_RELEASE_TIME, 0.5),
    ParamDescriptor::choice("LFO 1 Wave", "lfo1_waveform", LfoWaveform::ALL.len(), 0),
    lfo_rate("LFO 1 Rate", "lfo1_rate", 2.0),
    gain("LFO 1 Depth", "lfo1_depth", 0.0),
    ParamDescriptor::choice("LFO 1 Target", "lfo1_destination", LfoDestination::ALL.len(), 0),
    ParamDescriptor::choice("LFO 1 Rate Mode", "lfo1_rate_mode", RateMode::ALL.len(), 0),
    ParamDescriptor::choice("LFO 1 Division", "lfo1_sync_division", SyncDivision::ALL.len(), 2),
    bpm("LFO 1 Tempo", "lfo1_bpm"),
    ParamDescriptor::choice("LFO 2 Wave", "lfo2_waveform", LfoWaveform::ALL.len(), 0),
    lfo_rate("LFO 2 Rate", "lfo2_rate", 5.0),
    gain("LFO 2 Depth", "lfo2_depth", 0.0),
    ParamDescriptor::choice("LFO 2 Target", "lfo2_destination", LfoDestination::ALL.len(), 0),
    ParamDescriptor::choice("LFO 2 Rate Mode", "lfo2_rate_mode", RateMode::ALL.len(), 0),
    ParamDescriptor::choice("LFO 2 Division", "lfo2_sync_division", SyncDivision::ALL.len(), 2),
    bpm("LFO 2 Tempo", "lfo2_bpm"),
    ParamDescriptor::choice("Voice Mode", "voice_mode", VoiceMode::ALL.len(), 1),
    ParamDescriptor::new(
        "Unison Detune",
        "unison_detune",
        ParamUnit::Cents,
        0.0,
        MAX_UNISON_DETUNE,
        DEFAULT_UNISON_DETUNE,
    ),
];

impl<const N: usize> VoiceManager<N> {
    /// Set any control by id.
    ///
    /// The value is clamped (and rounded for stepped controls) by the
    /// parameter's descriptor, then routed to the matching broadcast setter.
    pub fn set_param(&mut self, param: SynthParam, value: f32) {
        use SynthParam as P;

        let value = param.descriptor().clamp(value);
        let slot = param.slot();
        let choice = value as usize;
        let on = value >= 0.5;

        match param {
            P::Osc1Enabled | P::Osc2Enabled | P::Osc3Enabled => self.set_osc_enabled(slot, on),
            P::Osc1Waveform | P::Osc2Waveform | P::Osc3Waveform => {
                if let Some(waveform) = OscillatorWaveform::from_index(choice) {
                    self.set_osc_waveform(slot, waveform);
                }
            }
            P::Osc1Gain | P::Osc2Gain | P::Osc3Gain => self.set_osc_gain(slot, value),
            P::Osc1Detune | P::Osc2Detune | P::Osc3Detune => self.set_osc_detune(slot, value),
            P::Osc1Octave | P::Osc2Octave | P::Osc3Octave => {
                self.set_osc_octave(slot, value as i32);
            }
            P::Osc1PulseWidth | P::Osc2PulseWidth | P::Osc3PulseWidth => {
                self.set_osc_pulse_width(slot, value);
            }
            P::Osc1Drive | P::Osc2Drive | P::Osc3Drive => self.set_osc_drive(slot, value),

            P::NoiseEnabled => self.set_noise_enabled(on),
            P::NoiseType => {
                if let Some(noise_type) = NoiseType::from_index(choice) {
                    self.set_noise_type(noise_type);
                }
            }
            P::NoiseGain => self.set_noise_gain(value),

            P::FilterMode => {
                if let Some(mode) = FilterMode::from_index(choice) {
                    self.set_filter_mode(mode);
                }
            }
            P::FilterCutoff => self.set_filter_cutoff(value),
            P::FilterResonance => self.set_filter_resonance(value),

            P::EnvAttack => self.set_attack(value),
            P::EnvDecay => self.set_decay(value),
            P::EnvSustain => self.set_sustain(value),
            P::EnvRelease => self.set_release(value),

            P::Lfo1Waveform | P::Lfo2Waveform => {
                if let Some(waveform) = LfoWaveform::from_index(choice) {
                    self.set_lfo_waveform(slot, waveform);
                }
            }
            P::Lfo1Rate | P::Lfo2Rate => self.set_lfo_rate(slot, value),
            P::Lfo1Depth | P::Lfo2Depth => self.set_lfo_depth(slot, value),
            P::Lfo1Destination | P::Lfo2Destination => {
                if let Some(destination) = LfoDestination::from_index(choice) {
                    self.set_lfo_destination(slot, destination);
                }
            }
            P::Lfo1RateMode | P::Lfo2RateMode => {
                if let Some(mode) = RateMode::from_index(choice) {
                    self.set_lfo_rate_mode(slot, mode);
                }
            }
            P::Lfo1SyncDivision | P::Lfo2SyncDivision => {
                if let Some(division) = SyncDivision::from_index(choice) {
                    self.set_lfo_sync_division(slot, division);
                }
            }
            P::Lfo1Bpm | P::Lfo2Bpm => self.set_lfo_bpm(slot, value),

            P::VoiceMode => {
                if let Some(mode) = VoiceMode::from_index(choice) {
                    self.set_voice_mode(mode);
                }
            }
            P::UnisonDetune => self.set_unison_detune(value),
        }
    }
}

/// A full set of parameter values.
///
/// Every stored value is already clamped by its descriptor.
/// `Patch::default()` is the init sound.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    values: [f32; SynthParam::COUNT],
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            values: core::array::from_fn(|i| DESCRIPTORS[i].default),
        }
    }
}

impl Patch {
    /// Start from the init patch and set each `(name, value)` pair in order.
    ///
    /// Stops at the first unknown name or non-finite value.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut patch = Self::default();
        for (name, value) in pairs {
            patch.set_by_name(name, value)?;
        }
        Ok(patch)
    }

    /// Value of `param`.
    pub fn get(&self, param: SynthParam) -> f32 {
        self.values[param.index()]
    }

    /// Store `value` for `param`, clamped by its descriptor.
    pub fn set(&mut self, param: SynthParam, value: f32) {
        self.values[param.index()] = param.descriptor().clamp(value);
    }

    /// Value by string id.
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        SynthParam::from_name(name).map(|p| self.get(p))
    }

    /// Store a value by string id.
    ///
    /// Out-of-range values are clamped. Unknown names and NaN or infinite
    /// values are rejected and leave the patch unchanged.
    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), ParamError> {
        let param = SynthParam::from_name(name)
            .ok_or_else(|| ParamError::UnknownParameter(name.into()))?;
        if !value.is_finite() {
            return Err(ParamError::NonFinite {
                name: param.name(),
                value,
            });
        }
        self.set(param, value);
        Ok(())
    }

    /// All `(param, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SynthParam, f32)> + '_ {
        SynthParam::ALL.iter().map(move |&p| (p, self.get(p)))
    }

    /// Push every value into `manager`.
    pub fn apply_to<const N: usize>(&self, manager: &mut VoiceManager<N>) {
        for (param, value) in self.iter() {
            manager.set_param(param, value);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(params = SynthParam::COUNT, voices = N, "patch applied");
    }
}
