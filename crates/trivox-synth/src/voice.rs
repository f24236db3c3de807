//! A single synthesizer voice.
//!
//! Signal chain per sample:
//!
//! ```text
//! LFO1, LFO2 ──► modulation (cutoff, resonance, pitch, pulse width, volume)
//!
//! osc1 ─┐
//! osc2 ─┼─ drive ─ gain ─┐
//! osc3 ─┘                ├─► ladder filter ─► × envelope ─► × tremolo ─► out
//! noise ──────── gain ───┘
//! ```
//!
//! Modulation is always recomputed from the stored base values, so an LFO
//! offset never accumulates across samples.

use libm::tanhf;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use trivox_core::{
    FilterMode, LadderFilter, Lfo, LfoWaveform, NoiseGenerator, NoiseType, Processor, RateMode,
    SyncDivision, cents_to_ratio, clamp, midi_to_freq,
};

use crate::envelope::{Envelope, EnvelopeState};
use crate::oscillator::{Oscillator, OscillatorWaveform};

/// Oscillators per voice.
pub const NUM_OSCILLATORS: usize = 3;
/// LFOs per voice.
pub const NUM_LFOS: usize = 2;

/// Vibrato depth at full LFO depth, in cents.
pub const LFO_PITCH_RANGE_CENTS: f32 = 100.0;
/// Cutoff swing at full LFO depth, in Hz.
pub const LFO_CUTOFF_RANGE_HZ: f32 = 6000.0;
/// Resonance swing at full LFO depth.
pub const LFO_RESONANCE_RANGE: f32 = 0.5;
/// Pulse width swing around 0.5 at full LFO depth.
pub const LFO_PULSE_WIDTH_RANGE: f32 = 0.25;

/// Lowest oscillator drive (no saturation).
pub const MIN_DRIVE: f32 = 1.0;
/// Highest oscillator drive.
pub const MAX_DRIVE: f32 = 10.0;
/// Coarse transposition limit in octaves.
pub const MAX_OCTAVE_OFFSET: i32 = 3;
/// Fine detune limit in cents.
pub const MAX_DETUNE_CENTS: f32 = 100.0;

/// Seed used by [`Voice::new`].
pub const DEFAULT_VOICE_SEED: u64 = 0x766f_6963_6500_0000;

const PWM_CENTER: f32 = 0.5;

/// Where an LFO's output is routed inside the voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoDestination {
    /// Not routed.
    #[default]
    None,
    /// Adds up to ±6000 Hz to the filter cutoff.
    FilterCutoff,
    /// Vibrato, up to ±100 cents.
    Pitch,
    /// Pulse width of square oscillators, 0.25 to 0.75.
    PulseWidth,
    /// Adds up to ±0.5 to the filter resonance.
    FilterResonance,
    /// Tremolo after the envelope, gain `0.75 + 0.25 * lfo`.
    ///
    /// The 0.75 center applies whenever this route is selected, so at depth 0
    /// the voice plays at a steady 0.75 gain (about -2.5 dB). Full depth
    /// swings between 0.5 and 1.0.
    Volume,
}

impl LfoDestination {
    /// All destinations in flat-parameter index order.
    pub const ALL: [LfoDestination; 6] = [
        LfoDestination::None,
        LfoDestination::FilterCutoff,
        LfoDestination::Pitch,
        LfoDestination::PulseWidth,
        LfoDestination::FilterResonance,
        LfoDestination::Volume,
    ];

    /// Destination for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Per-slot oscillator controls held by the voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscSettings {
    /// Whether the slot contributes to the mix.
    pub enabled: bool,
    /// Mix gain, 0.0 to 1.0.
    pub gain: f32,
    /// Fine detune, -100 to 100 cents.
    pub detune_cents: f32,
    /// Coarse transposition, -3 to 3 octaves.
    pub octave: i32,
    /// Square duty cycle when no LFO drives pulse width.
    pub pulse_width: f32,
    /// Pre-gain `tanh` drive, 1.0 (clean) to 10.0.
    pub drive: f32,
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            gain: 0.33,
            detune_cents: 0.0,
            octave: 0,
            pulse_width: 0.5,
            drive: MIN_DRIVE,
        }
    }
}

/// One polyphonic voice: three oscillators, noise, ladder filter, ADSR
/// envelope, and two LFOs.
///
/// A voice is *active* while its envelope is not idle and *sounding* while
/// it is active and not releasing. It frees itself (reports no note) on the
/// sample its envelope reaches idle.
///
/// Oscillator and LFO setters take a slot index; out-of-range indices are
/// ignored.
///
/// # Example
///
/// ```rust
/// use trivox_synth::{LfoDestination, OscillatorWaveform, Voice};
///
/// let mut voice = Voice::new(48000.0);
/// voice.set_osc_waveform(0, OscillatorWaveform::Saw);
/// voice.set_filter_cutoff(2000.0);
/// voice.set_lfo_destination(0, LfoDestination::Pitch);
/// voice.set_lfo_depth(0, 0.2);
///
/// voice.note_on(57, 0.8, 0.0, false);
/// for _ in 0..480 {
///     let _sample = voice.process();
/// }
/// voice.note_off();
/// assert!(voice.is_active() && !voice.is_sounding());
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    oscillators: [Oscillator; NUM_OSCILLATORS],
    osc_settings: [OscSettings; NUM_OSCILLATORS],

    noise: NoiseGenerator,
    noise_enabled: bool,
    noise_gain: f32,

    filter: LadderFilter,
    base_cutoff: f32,
    base_resonance: f32,

    envelope: Envelope,

    lfos: [Lfo; NUM_LFOS],
    lfo_destinations: [LfoDestination; NUM_LFOS],

    note: Option<u8>,
    /// Note-ons since this voice was triggered (for stealing)
    age: u32,
    unison_detune: f32,
    /// Last applied vibrato offset in cents
    pitch_mod_cents: f32,

    rng: SmallRng,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Voice {
    /// Create a voice with the default seed.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, DEFAULT_VOICE_SEED)
    }

    /// Create a voice whose noise, S&H, and phase randomization derive
    /// from `seed`.
    ///
    /// Initial state matches the init patch: oscillator 1 is an enabled
    /// sine at gain 0.5, oscillators 2 and 3 are a disabled saw and square.
    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        let mut oscillators: [Oscillator; NUM_OSCILLATORS] =
            core::array::from_fn(|_| Oscillator::new(sample_rate));
        oscillators[1].set_waveform(OscillatorWaveform::Saw);
        oscillators[2].set_waveform(OscillatorWaveform::Square);

        let mut osc_settings = [OscSettings::default(); NUM_OSCILLATORS];
        osc_settings[0].enabled = true;
        osc_settings[0].gain = 0.5;

        let mut lfos = [
            Lfo::with_seed(sample_rate, seed ^ 0x1f0),
            Lfo::with_seed(sample_rate, seed ^ 0x2f0),
        ];
        lfos[0].set_rate(2.0);
        lfos[1].set_rate(5.0);

        let filter = LadderFilter::new(sample_rate);
        let base_cutoff = filter.cutoff();
        let base_resonance = filter.resonance();

        Self {
            oscillators,
            osc_settings,
            noise: NoiseGenerator::with_seed(seed ^ 0xa015e),
            noise_enabled: false,
            noise_gain: 0.0,
            filter,
            base_cutoff,
            base_resonance,
            envelope: Envelope::new(sample_rate),
            lfos,
            lfo_destinations: [LfoDestination::None; NUM_LFOS],
            note: None,
            age: 0,
            unison_detune: 0.0,
            pitch_mod_cents: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Propagate a new sample rate to every component.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for osc in &mut self.oscillators {
            osc.set_sample_rate(sample_rate);
        }
        for lfo in &mut self.lfos {
            lfo.set_sample_rate(sample_rate);
        }
        self.filter.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
    }

    /// Start a note.
    ///
    /// Oscillator phases are zeroed, or randomized when `randomize_phase` is
    /// set (unison). Both LFOs restart from phase zero and the voice age
    /// resets.
    pub fn note_on(
        &mut self,
        note: u8,
        velocity: f32,
        unison_detune_cents: f32,
        randomize_phase: bool,
    ) {
        self.note = Some(note);
        self.unison_detune = unison_detune_cents;
        self.age = 0;

        for osc in &mut self.oscillators {
            if randomize_phase {
                osc.set_random_phase(&mut self.rng);
            } else {
                osc.reset();
            }
        }
        for lfo in &mut self.lfos {
            lfo.reset();
        }

        self.update_frequencies();
        self.envelope.note_on(velocity);
    }

    /// Release the note. The voice stays active until the release ends.
    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    /// Silence immediately and clear all runtime state.
    pub fn reset(&mut self) {
        for osc in &mut self.oscillators {
            osc.reset();
        }
        for lfo in &mut self.lfos {
            lfo.reset();
        }
        self.noise.reset();
        self.filter.reset();
        self.envelope.reset();
        self.note = None;
        self.age = 0;
        self.unison_detune = 0.0;
        self.pitch_mod_cents = 0.0;
    }

    // -- state queries ------------------------------------------------------

    /// Whether the envelope is running (attack through release).
    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Whether the voice is active and not yet released.
    pub fn is_sounding(&self) -> bool {
        self.is_active() && self.envelope.state() != EnvelopeState::Release
    }

    /// Note currently assigned, `None` when free.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Number of note-ons processed by the manager since this voice started.
    pub fn age(&self) -> u32 {
        self.age
    }

    pub(crate) fn increment_age(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Unison detune assigned at note-on, in cents.
    pub fn unison_detune(&self) -> f32 {
        self.unison_detune
    }

    /// Current envelope stage.
    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    /// The voice envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// The voice filter.
    pub fn filter(&self) -> &LadderFilter {
        &self.filter
    }

    /// Oscillator in slot `index`.
    pub fn oscillator(&self, index: usize) -> Option<&Oscillator> {
        self.oscillators.get(index)
    }

    /// Settings for oscillator slot `index`.
    pub fn osc_settings(&self, index: usize) -> Option<&OscSettings> {
        self.osc_settings.get(index)
    }

    /// LFO in slot `index`.
    pub fn lfo(&self, index: usize) -> Option<&Lfo> {
        self.lfos.get(index)
    }

    /// Routing of LFO slot `index`.
    pub fn lfo_destination(&self, index: usize) -> Option<LfoDestination> {
        self.lfo_destinations.get(index).copied()
    }

    // -- oscillators --------------------------------------------------------

    /// Enable or disable an oscillator slot.
    pub fn set_osc_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(settings) = self.osc_settings.get_mut(index) {
            settings.enabled = enabled;
        }
    }

    /// Set an oscillator's waveform.
    pub fn set_osc_waveform(&mut self, index: usize, waveform: OscillatorWaveform) {
        if let Some(osc) = self.oscillators.get_mut(index) {
            osc.set_waveform(waveform);
        }
    }

    /// Set an oscillator's mix gain (0–1).
    pub fn set_osc_gain(&mut self, index: usize, gain: f32) {
        if let Some(settings) = self.osc_settings.get_mut(index) {
            settings.gain = clamp(gain, 0.0, 1.0);
        }
    }

    /// Set an oscillator's fine detune in cents (±100).
    pub fn set_osc_detune(&mut self, index: usize, cents: f32) {
        if let Some(settings) = self.osc_settings.get_mut(index) {
            settings.detune_cents = clamp(cents, -MAX_DETUNE_CENTS, MAX_DETUNE_CENTS);
            self.update_frequencies();
        }
    }

    /// Set an oscillator's octave offset (±3).
    pub fn set_osc_octave(&mut self, index: usize, octave: i32) {
        if let Some(settings) = self.osc_settings.get_mut(index) {
            settings.octave = octave.clamp(-MAX_OCTAVE_OFFSET, MAX_OCTAVE_OFFSET);
            self.update_frequencies();
        }
    }

    /// Set an oscillator's square duty cycle.
    pub fn set_osc_pulse_width(&mut self, index: usize, width: f32) {
        if let (Some(settings), Some(osc)) = (
            self.osc_settings.get_mut(index),
            self.oscillators.get_mut(index),
        ) {
            osc.set_pulse_width(width);
            settings.pulse_width = osc.pulse_width();
        }
    }

    /// Set an oscillator's saturation drive (1–10).
    pub fn set_osc_drive(&mut self, index: usize, drive: f32) {
        if let Some(settings) = self.osc_settings.get_mut(index) {
            settings.drive = clamp(drive, MIN_DRIVE, MAX_DRIVE);
        }
    }

    // -- noise --------------------------------------------------------------

    /// Enable or disable the noise source.
    pub fn set_noise_enabled(&mut self, enabled: bool) {
        self.noise_enabled = enabled;
    }

    /// Set the noise color.
    pub fn set_noise_type(&mut self, noise_type: NoiseType) {
        self.noise.set_noise_type(noise_type);
    }

    /// Set the noise mix gain (0–1).
    pub fn set_noise_gain(&mut self, gain: f32) {
        self.noise_gain = clamp(gain, 0.0, 1.0);
    }

    // -- envelope -----------------------------------------------------------

    /// Set all envelope stages (seconds, seconds, level, seconds).
    pub fn set_envelope(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.envelope.set_adsr(attack, decay, sustain, release);
    }

    /// Set attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.envelope.set_attack(seconds);
    }

    /// Set decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.envelope.set_decay(seconds);
    }

    /// Set sustain level.
    pub fn set_sustain(&mut self, level: f32) {
        self.envelope.set_sustain(level);
    }

    /// Set release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.envelope.set_release(seconds);
    }

    // -- filter -------------------------------------------------------------

    /// Select the filter output tap.
    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter.set_mode(mode);
    }

    /// Set the unmodulated filter cutoff in Hz.
    pub fn set_filter_cutoff(&mut self, cutoff_hz: f32) {
        self.filter.set_cutoff(cutoff_hz);
        self.base_cutoff = self.filter.cutoff();
    }

    /// Set the unmodulated filter resonance.
    pub fn set_filter_resonance(&mut self, resonance: f32) {
        self.filter.set_resonance(resonance);
        self.base_resonance = self.filter.resonance();
    }

    // -- LFOs ---------------------------------------------------------------

    /// Set an LFO's waveform.
    pub fn set_lfo_waveform(&mut self, index: usize, waveform: LfoWaveform) {
        if let Some(lfo) = self.lfos.get_mut(index) {
            lfo.set_waveform(waveform);
        }
    }

    /// Set an LFO's free-running rate in Hz.
    pub fn set_lfo_rate(&mut self, index: usize, rate_hz: f32) {
        if let Some(lfo) = self.lfos.get_mut(index) {
            lfo.set_rate(rate_hz);
        }
    }

    /// Set an LFO's depth (0–1).
    pub fn set_lfo_depth(&mut self, index: usize, depth: f32) {
        if let Some(lfo) = self.lfos.get_mut(index) {
            lfo.set_depth(depth);
        }
    }

    /// Route an LFO.
    pub fn set_lfo_destination(&mut self, index: usize, destination: LfoDestination) {
        if let Some(slot) = self.lfo_destinations.get_mut(index) {
            *slot = destination;
        }
    }

    /// Choose free or tempo-synced rate for an LFO.
    pub fn set_lfo_rate_mode(&mut self, index: usize, mode: RateMode) {
        if let Some(lfo) = self.lfos.get_mut(index) {
            lfo.set_rate_mode(mode);
        }
    }

    /// Set an LFO's sync division.
    pub fn set_lfo_sync_division(&mut self, index: usize, division: SyncDivision) {
        if let Some(lfo) = self.lfos.get_mut(index) {
            lfo.set_sync_division(division);
        }
    }

    /// Set the tempo used by an LFO in sync mode.
    pub fn set_lfo_bpm(&mut self, index: usize, bpm: f32) {
        if let Some(lfo) = self.lfos.get_mut(index) {
            lfo.set_bpm(bpm);
        }
    }

    // -- processing ---------------------------------------------------------

    /// Render one sample. Returns 0.0 while inactive.
    #[inline]
    pub fn process(&mut self) -> f32 {
        if !self.is_active() {
            return 0.0;
        }

        let tremolo = self.apply_modulation();

        let mut mix = 0.0;
        for (osc, settings) in self.oscillators.iter_mut().zip(&self.osc_settings) {
            if settings.enabled {
                let mut sample = osc.advance();
                if settings.drive > MIN_DRIVE {
                    sample = tanhf(sample * settings.drive);
                }
                mix += sample * settings.gain;
            }
        }
        if self.noise_enabled {
            mix += self.noise.advance() * self.noise_gain;
        }

        let filtered = self.filter.process(mix);
        let env = self.envelope.advance();
        if !self.envelope.is_active() {
            self.note = None;
        }

        filtered * env * tremolo
    }

    /// Advance both LFOs and apply their offsets to the base values.
    /// Returns the tremolo gain.
    #[inline]
    fn apply_modulation(&mut self) -> f32 {
        let mut cutoff_offset = 0.0;
        let mut resonance_offset = 0.0;
        let mut pitch_cents = 0.0;
        let mut pulse_width_offset: Option<f32> = None;
        let mut tremolo = 1.0;

        for (lfo, destination) in self.lfos.iter_mut().zip(self.lfo_destinations) {
            let value = lfo.advance();
            match destination {
                LfoDestination::None => {}
                LfoDestination::FilterCutoff => cutoff_offset += value * LFO_CUTOFF_RANGE_HZ,
                LfoDestination::FilterResonance => resonance_offset += value * LFO_RESONANCE_RANGE,
                LfoDestination::Pitch => pitch_cents += value * LFO_PITCH_RANGE_CENTS,
                LfoDestination::PulseWidth => {
                    *pulse_width_offset.get_or_insert(0.0) += value * LFO_PULSE_WIDTH_RANGE;
                }
                LfoDestination::Volume => tremolo *= 0.75 + 0.25 * value,
            }
        }

        // unchanged values leave the filter coefficients cached
        self.filter.set_cutoff(self.base_cutoff + cutoff_offset);
        self.filter.set_resonance(self.base_resonance + resonance_offset);

        if pitch_cents != self.pitch_mod_cents {
            self.pitch_mod_cents = pitch_cents;
            self.update_frequencies();
        }

        for (osc, settings) in self.oscillators.iter_mut().zip(&self.osc_settings) {
            let width =
                pulse_width_offset.map_or(settings.pulse_width, |offset| PWM_CENTER + offset);
            osc.set_pulse_width(width);
        }

        tremolo
    }

    fn update_frequencies(&mut self) {
        let Some(note) = self.note else {
            return;
        };
        let base = midi_to_freq(note);
        for (osc, settings) in self.oscillators.iter_mut().zip(&self.osc_settings) {
            let cents = settings.octave as f32 * 1200.0
                + settings.detune_cents
                + self.unison_detune
                + self.pitch_mod_cents;
            osc.set_frequency(base * cents_to_ratio(cents));
        }
    }
}
