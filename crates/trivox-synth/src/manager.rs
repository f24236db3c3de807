//! Fixed-pool voice allocation.
//!
//! [`VoiceManager`] owns every [`Voice`], routes MIDI note events through the
//! active [`VoiceMode`], broadcasts parameter changes to the whole pool, and
//! sums the voices into one gain-compensated mono output.

use core::cmp::Reverse;

use trivox_core::{FilterMode, LfoWaveform, NoiseType, RateMode, SyncDivision, clamp};

use crate::oscillator::OscillatorWaveform;
use crate::voice::{DEFAULT_VOICE_SEED, LfoDestination, Voice};

/// Default number of voices in the pool.
pub const DEFAULT_VOICE_COUNT: usize = 8;
/// Default unison spread, in cents either side of the played pitch.
pub const DEFAULT_UNISON_DETUNE: f32 = 25.0;
/// Largest unison spread in cents.
pub const MAX_UNISON_DETUNE: f32 = 100.0;

/// Golden-ratio increment used to derive per-voice seeds.
const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Voice allocation policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceMode {
    /// Voice 0 only, retriggered by every note.
    Mono,
    /// One voice per note with oldest-first stealing.
    #[default]
    Poly,
    /// Every voice on the same note, spread in pitch.
    Unison,
}

impl VoiceMode {
    /// All modes in flat-parameter index order.
    pub const ALL: [VoiceMode; 3] = [VoiceMode::Mono, VoiceMode::Poly, VoiceMode::Unison];

    /// Mode for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Fixed gain applied to the summed voices.
    #[inline]
    pub fn output_gain(self) -> f32 {
        match self {
            VoiceMode::Mono => 1.0,
            VoiceMode::Poly => 1.0 / 2.0,
            VoiceMode::Unison => 1.0 / 2.5,
        }
    }
}

/// Polyphonic voice pool.
///
/// ## Allocation
///
/// - **Mono**: voice 0 is retriggered with no detune.
/// - **Poly**: the first idle voice; when none is idle, the oldest voice in
///   its release stage, else the oldest active voice. Age counts note-ons
///   since a voice was triggered.
/// - **Unison**: the pool is silenced, then every voice plays the note with
///   detune spread evenly over ±[`unison_detune`](Self::unison_detune) cents
///   and randomized oscillator phases.
///
/// Switching to a different mode hard-stops every voice.
///
/// # Example
///
/// ```rust
/// use trivox_synth::{VoiceManager, VoiceMode};
///
/// let mut synth: VoiceManager = VoiceManager::new(48000.0);
/// synth.set_voice_mode(VoiceMode::Poly);
///
/// synth.note_on(60, 0.8);
/// synth.note_on(64, 0.8);
/// synth.note_on(67, 0.8);
/// assert_eq!(synth.active_voice_count(), 3);
///
/// let mut block = [0.0f32; 256];
/// synth.process_block(&mut block);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceManager<const N: usize = DEFAULT_VOICE_COUNT> {
    voices: [Voice; N],
    voice_mode: VoiceMode,
    unison_detune: f32,
    sample_rate: f32,
}

impl<const N: usize> Default for VoiceManager<N> {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl<const N: usize> VoiceManager<N> {
    /// Create a pool of `N` voices with the default seed.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, DEFAULT_VOICE_SEED)
    }

    /// Create a pool whose per-voice randomness derives from `seed`.
    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        Self {
            voices: core::array::from_fn(|i| {
                Voice::with_seed(sample_rate, seed.wrapping_add(SEED_STRIDE.wrapping_mul(i as u64)))
            }),
            voice_mode: VoiceMode::default(),
            unison_detune: DEFAULT_UNISON_DETUNE,
            sample_rate,
        }
    }

    /// Set sample rate for all voices.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(voices = N, "voice manager: sample rate {sample_rate} Hz");
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Select the allocation policy. A change of mode silences every voice.
    pub fn set_voice_mode(&mut self, mode: VoiceMode) {
        if mode != self.voice_mode {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = ?self.voice_mode, to = ?mode, "voice mode changed");
            self.voice_mode = mode;
            self.all_sound_off();
        }
    }

    /// Current allocation policy.
    pub fn voice_mode(&self) -> VoiceMode {
        self.voice_mode
    }

    /// Set the unison spread in cents (clamped to 0–100).
    ///
    /// Takes effect at the next unison note-on.
    pub fn set_unison_detune(&mut self, cents: f32) {
        self.unison_detune = clamp(cents, 0.0, MAX_UNISON_DETUNE);
    }

    /// Unison spread in cents.
    pub fn unison_detune(&self) -> f32 {
        self.unison_detune
    }

    /// Number of voices in the pool.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Number of voices whose envelope is running.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Read access to all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Start a note. Notes above 127 are ignored.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if note > 127 || N == 0 {
            return;
        }

        match self.voice_mode {
            VoiceMode::Mono => self.voices[0].note_on(note, velocity, 0.0, false),
            VoiceMode::Poly => {
                let index = self.allocate_voice();
                self.voices[index].note_on(note, velocity, 0.0, false);
            }
            VoiceMode::Unison => {
                self.all_sound_off();
                let spread = self.unison_detune;
                for (i, voice) in self.voices.iter_mut().enumerate() {
                    voice.note_on(note, velocity, unison_offset(i, N, spread), true);
                }
            }
        }

        for voice in &mut self.voices {
            if voice.is_active() {
                voice.increment_age();
            }
        }
    }

    /// Release every active voice playing `note`.
    pub fn note_off(&mut self, note: u8) {
        if note > 127 {
            return;
        }
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == Some(note) {
                voice.note_off();
            }
        }
    }

    /// Release every active voice.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.note_off();
            }
        }
    }

    /// Stop every voice immediately.
    pub fn all_sound_off(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    /// Render one sample: the sum of all voices times the mode's gain.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let mut output = 0.0;
        for voice in &mut self.voices {
            output += voice.process();
        }
        output * self.voice_mode.output_gain()
    }

    /// Fill `buffer` one sample at a time.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
    }

    fn allocate_voice(&self) -> usize {
        if let Some(free) = self.voices.iter().position(|v| !v.is_active()) {
            return free;
        }

        let oldest = |releasing: bool| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_active() && v.is_sounding() != releasing)
                .min_by_key(|(_, v)| Reverse(v.age()))
                .map(|(i, _)| i)
        };

        let index = oldest(true).or_else(|| oldest(false)).unwrap_or(0);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            voice = index,
            stolen_note = ?self.voices[index].note(),
            age = self.voices[index].age(),
            "stealing voice"
        );
        index
    }

    fn for_each_voice(&mut self, mut f: impl FnMut(&mut Voice)) {
        for voice in &mut self.voices {
            f(voice);
        }
    }

    // -- broadcast setters --------------------------------------------------

    /// Enable or disable oscillator slot `index` on every voice.
    pub fn set_osc_enabled(&mut self, index: usize, enabled: bool) {
        self.for_each_voice(|v| v.set_osc_enabled(index, enabled));
    }

    /// Set the waveform of oscillator slot `index`.
    pub fn set_osc_waveform(&mut self, index: usize, waveform: OscillatorWaveform) {
        self.for_each_voice(|v| v.set_osc_waveform(index, waveform));
    }

    /// Set the mix gain of oscillator slot `index`.
    pub fn set_osc_gain(&mut self, index: usize, gain: f32) {
        self.for_each_voice(|v| v.set_osc_gain(index, gain));
    }

    /// Set the fine detune of oscillator slot `index`, in cents.
    pub fn set_osc_detune(&mut self, index: usize, cents: f32) {
        self.for_each_voice(|v| v.set_osc_detune(index, cents));
    }

    /// Set the octave offset of oscillator slot `index`.
    pub fn set_osc_octave(&mut self, index: usize, octave: i32) {
        self.for_each_voice(|v| v.set_osc_octave(index, octave));
    }

    /// Set the pulse width of oscillator slot `index`.
    pub fn set_osc_pulse_width(&mut self, index: usize, width: f32) {
        self.for_each_voice(|v| v.set_osc_pulse_width(index, width));
    }

    /// Set the drive of oscillator slot `index`.
    pub fn set_osc_drive(&mut self, index: usize, drive: f32) {
        self.for_each_voice(|v| v.set_osc_drive(index, drive));
    }

    /// Enable or disable noise.
    pub fn set_noise_enabled(&mut self, enabled: bool) {
        self.for_each_voice(|v| v.set_noise_enabled(enabled));
    }

    /// Set the noise color.
    pub fn set_noise_type(&mut self, noise_type: NoiseType) {
        self.for_each_voice(|v| v.set_noise_type(noise_type));
    }

    /// Set the noise mix gain.
    pub fn set_noise_gain(&mut self, gain: f32) {
        self.for_each_voice(|v| v.set_noise_gain(gain));
    }

    /// Set all envelope stages.
    pub fn set_envelope(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.for_each_voice(|v| v.set_envelope(attack, decay, sustain, release));
    }

    /// Set attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.for_each_voice(|v| v.set_attack(seconds));
    }

    /// Set decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.for_each_voice(|v| v.set_decay(seconds));
    }

    /// Set sustain level.
    pub fn set_sustain(&mut self, level: f32) {
        self.for_each_voice(|v| v.set_sustain(level));
    }

    /// Set release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.for_each_voice(|v| v.set_release(seconds));
    }

    /// Select the filter output tap.
    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.for_each_voice(|v| v.set_filter_mode(mode));
    }

    /// Set the base filter cutoff in Hz.
    pub fn set_filter_cutoff(&mut self, cutoff_hz: f32) {
        self.for_each_voice(|v| v.set_filter_cutoff(cutoff_hz));
    }

    /// Set the base filter resonance.
    pub fn set_filter_resonance(&mut self, resonance: f32) {
        self.for_each_voice(|v| v.set_filter_resonance(resonance));
    }

    /// Set the waveform of LFO slot `index`.
    pub fn set_lfo_waveform(&mut self, index: usize, waveform: LfoWaveform) {
        self.for_each_voice(|v| v.set_lfo_waveform(index, waveform));
    }

    /// Set the free-running rate of LFO slot `index`.
    pub fn set_lfo_rate(&mut self, index: usize, rate_hz: f32) {
        self.for_each_voice(|v| v.set_lfo_rate(index, rate_hz));
    }

    /// Set the depth of LFO slot `index`.
    pub fn set_lfo_depth(&mut self, index: usize, depth: f32) {
        self.for_each_voice(|v| v.set_lfo_depth(index, depth));
    }

    /// Route LFO slot `index`.
    pub fn set_lfo_destination(&mut self, index: usize, destination: LfoDestination) {
        self.for_each_voice(|v| v.set_lfo_destination(index, destination));
    }

    /// Choose free or synced rate for LFO slot `index`.
    pub fn set_lfo_rate_mode(&mut self, index: usize, mode: RateMode) {
        self.for_each_voice(|v| v.set_lfo_rate_mode(index, mode));
    }

    /// Set the sync division of LFO slot `index`.
    pub fn set_lfo_sync_division(&mut self, index: usize, division: SyncDivision) {
        self.for_each_voice(|v| v.set_lfo_sync_division(index, division));
    }

    /// Set the sync tempo of LFO slot `index`.
    pub fn set_lfo_bpm(&mut self, index: usize, bpm: f32) {
        self.for_each_voice(|v| v.set_lfo_bpm(index, bpm));
    }
}

/// Detune for voice `index` of `count`, evenly spaced over ±`spread`.
#[inline]
fn unison_offset(index: usize, count: usize, spread: f32) -> f32 {
    if count < 2 {
        return 0.0;
    }
    -spread + index as f32 * (2.0 * spread) / (count - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeState;

    const SR: f32 = 48000.0;

    #[test]
    fn test_poly_allocates_free_voices_in_order() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        for (i, note) in [60, 64, 67].into_iter().enumerate() {
            vm.note_on(note, 1.0);
            assert_eq!(vm.voices()[i].note(), Some(note));
        }
        assert_eq!(vm.active_voice_count(), 3);
    }

    #[test]
    fn test_ages_count_note_ons() {
        let mut vm: VoiceManager<4> = VoiceManager::new(SR);
        vm.note_on(60, 1.0);
        vm.note_on(62, 1.0);
        vm.note_on(64, 1.0);
        let ages: Vec<u32> = vm.voices().iter().map(Voice::age).collect();
        assert_eq!(ages, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_steals_oldest_active_voice() {
        let mut vm: VoiceManager<4> = VoiceManager::new(SR);
        for note in [60, 62, 64, 65] {
            vm.note_on(note, 1.0);
        }
        vm.note_on(67, 1.0);
        assert_eq!(vm.voices()[0].note(), Some(67));
        vm.note_on(69, 1.0);
        assert_eq!(vm.voices()[1].note(), Some(69));
    }

    #[test]
    fn test_age_tie_steals_lowest_index() {
        let mut vm: VoiceManager<4> = VoiceManager::new(SR);
        for (i, voice) in vm.voices.iter_mut().enumerate() {
            voice.note_on(60 + i as u8, 1.0, 0.0, false);
        }
        assert!(vm.voices().iter().all(|v| v.age() == 0));
        assert_eq!(vm.allocate_voice(), 0);

        vm.voices[3].increment_age();
        vm.voices[1].increment_age();
        assert_eq!(vm.allocate_voice(), 1);
    }

    #[test]
    fn test_prefers_releasing_voice_when_stealing() {
        let mut vm: VoiceManager<4> = VoiceManager::new(SR);
        vm.set_release(2.0);
        for note in [60, 62, 64, 65] {
            vm.note_on(note, 1.0);
        }
        vm.note_off(64);
        assert_eq!(vm.voices()[2].envelope_state(), EnvelopeState::Release);

        vm.note_on(72, 1.0);
        assert_eq!(vm.voices()[2].note(), Some(72));
        assert_eq!(vm.voices()[0].note(), Some(60));
    }

    #[test]
    fn test_oldest_releasing_voice_is_stolen_first() {
        let mut vm: VoiceManager<4> = VoiceManager::new(SR);
        vm.set_release(2.0);
        for note in [60, 62, 64, 65] {
            vm.note_on(note, 1.0);
        }
        vm.note_off(65);
        vm.note_off(62);
        vm.note_on(72, 1.0);
        assert_eq!(vm.voices()[1].note(), Some(72));
        assert_eq!(vm.voices()[3].note(), Some(65));
    }

    #[test]
    fn test_mono_always_uses_voice_zero() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.set_voice_mode(VoiceMode::Mono);
        vm.note_on(60, 1.0);
        vm.note_on(67, 1.0);
        assert_eq!(vm.active_voice_count(), 1);
        assert_eq!(vm.voices()[0].note(), Some(67));
        assert_eq!(vm.voices()[0].unison_detune(), 0.0);

        // releasing the earlier note leaves the newer one sounding
        vm.note_off(60);
        assert!(vm.voices()[0].is_sounding());
    }

    #[test]
    fn test_unison_spread() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.set_voice_mode(VoiceMode::Unison);
        vm.note_on(57, 1.0);
        assert_eq!(vm.active_voice_count(), 8);

        let detunes: Vec<f32> = vm.voices().iter().map(Voice::unison_detune).collect();
        assert!((detunes[0] + 25.0).abs() < 1e-5);
        assert!((detunes[7] - 25.0).abs() < 1e-5);
        for i in 0..8 {
            assert!((detunes[i] + detunes[7 - i]).abs() < 1e-4, "{:?}", detunes);
        }
    }

    #[test]
    fn test_unison_retrigger_replaces_stack() {
        let mut vm: VoiceManager<4> = VoiceManager::new(SR);
        vm.set_voice_mode(VoiceMode::Unison);
        vm.note_on(60, 1.0);
        vm.note_on(64, 1.0);
        assert!(vm.voices().iter().all(|v| v.note() == Some(64)));
    }

    #[test]
    fn test_unison_offset_single_voice() {
        assert_eq!(unison_offset(0, 1, 25.0), 0.0);
        assert_eq!(unison_offset(0, 2, 10.0), -10.0);
        assert_eq!(unison_offset(1, 2, 10.0), 10.0);
    }

    #[test]
    fn test_unison_detune_clamped() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.set_unison_detune(500.0);
        assert_eq!(vm.unison_detune(), MAX_UNISON_DETUNE);
        vm.set_unison_detune(f32::NAN);
        assert_eq!(vm.unison_detune(), 0.0);
    }

    #[test]
    fn test_mode_switch_silences() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.note_on(60, 1.0);
        vm.note_on(64, 1.0);
        vm.set_voice_mode(VoiceMode::Poly);
        assert_eq!(vm.active_voice_count(), 2, "same mode must not silence");

        vm.set_voice_mode(VoiceMode::Unison);
        assert_eq!(vm.active_voice_count(), 0);
        assert_eq!(vm.process(), 0.0);
    }

    #[test]
    fn test_note_off_releases_all_matches() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.note_on(60, 1.0);
        vm.note_on(60, 1.0);
        vm.note_on(62, 1.0);
        vm.note_off(60);
        assert!(!vm.voices()[0].is_sounding());
        assert!(!vm.voices()[1].is_sounding());
        assert!(vm.voices()[2].is_sounding());
    }

    #[test]
    fn test_out_of_range_notes_ignored() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.note_on(128, 1.0);
        vm.note_on(255, 1.0);
        assert_eq!(vm.active_voice_count(), 0);
        vm.note_on(127, 1.0);
        vm.note_off(255);
        assert_eq!(vm.active_voice_count(), 1);
    }

    #[test]
    fn test_all_notes_off_releases() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.note_on(60, 1.0);
        vm.note_on(64, 1.0);
        vm.all_notes_off();
        assert_eq!(vm.active_voice_count(), 2);
        assert!(vm.voices().iter().all(|v| !v.is_sounding()));
    }

    #[test]
    fn test_all_sound_off_stops() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.note_on(60, 1.0);
        vm.note_on(64, 1.0);
        vm.all_sound_off();
        assert_eq!(vm.active_voice_count(), 0);
        assert!(vm.voices().iter().all(|v| v.note().is_none()));
    }

    #[test]
    fn test_output_gain_per_mode() {
        assert_eq!(VoiceMode::Mono.output_gain(), 1.0);
        assert_eq!(VoiceMode::Poly.output_gain(), 0.5);
        assert!((VoiceMode::Unison.output_gain() - 0.4).abs() < 1e-7);
    }

    #[test]
    fn test_poly_output_is_half_the_voice_sum() {
        let mut vm: VoiceManager<2> = VoiceManager::new(SR);
        let mut reference = Voice::with_seed(SR, DEFAULT_VOICE_SEED);
        vm.note_on(69, 1.0);
        reference.note_on(69, 1.0, 0.0, false);
        for _ in 0..1000 {
            let expected = reference.process() * 0.5;
            assert!((vm.process() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_process_block_matches_process() {
        let mut a: VoiceManager = VoiceManager::with_seed(SR, 9);
        let mut b: VoiceManager = VoiceManager::with_seed(SR, 9);
        a.note_on(60, 0.7);
        b.note_on(60, 0.7);
        let mut block = [0.0f32; 512];
        a.process_block(&mut block);
        for &s in &block {
            assert_eq!(s, b.process());
        }
    }

    #[test]
    fn test_broadcast_reaches_every_voice() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.set_osc_gain(1, 0.9);
        vm.set_filter_cutoff(5000.0);
        vm.set_lfo_destination(1, LfoDestination::Volume);
        for voice in vm.voices() {
            assert_eq!(voice.osc_settings(1).unwrap().gain, 0.9);
            assert_eq!(voice.filter().cutoff(), 5000.0);
            assert_eq!(voice.lfo_destination(1), Some(LfoDestination::Volume));
        }
    }

    #[test]
    fn test_voices_freed_after_release() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.set_envelope(0.005, 0.01, 0.5, 0.02);
        vm.note_on(60, 1.0);
        vm.note_on(64, 1.0);
        let mut block = [0.0f32; 1024];
        vm.process_block(&mut block);
        vm.all_notes_off();
        vm.process_block(&mut block);
        vm.process_block(&mut block);
        assert_eq!(vm.active_voice_count(), 0);
    }

    #[test]
    fn test_sample_rate_propagates() {
        let mut vm: VoiceManager = VoiceManager::new(SR);
        vm.set_sample_rate(96000.0);
        assert_eq!(vm.sample_rate(), 96000.0);
        vm.note_on(69, 1.0);
        let mut block = [0.0f32; 256];
        vm.process_block(&mut block);
        assert!(block.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_voice_mode_index_order() {
        assert_eq!(VoiceMode::from_index(0), Some(VoiceMode::Mono));
        assert_eq!(VoiceMode::from_index(1), Some(VoiceMode::Poly));
        assert_eq!(VoiceMode::from_index(2), Some(VoiceMode::Unison));
        assert_eq!(VoiceMode::from_index(3), None);
    }
}
