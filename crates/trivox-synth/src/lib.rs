//! Trivox Synth - Polyphonic subtractive synthesis engine
//!
//! Three band-limited oscillators and a noise source per voice run through a
//! resonant ladder filter and an ADSR envelope, with two routable LFOs. A
//! fixed pool of voices is managed in mono, poly, or unison mode.
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! - [`Oscillator`] - PolyBLEP sine, saw, square, and triangle
//! - [`OscillatorWaveform`] - Waveform selection
//!
//! ```rust
//! use trivox_synth::{Oscillator, OscillatorWaveform};
//!
//! let mut osc = Oscillator::new(48000.0);
//! osc.set_frequency(220.0);
//! osc.set_waveform(OscillatorWaveform::Square);
//! osc.set_pulse_width(0.3);
//!
//! let sample = osc.advance();
//! ```
//!
//! ## Envelopes
//!
//! - [`Envelope`] - Linear ADSR with velocity scaling
//! - [`EnvelopeState`] - Stage tracking
//!
//! ```rust
//! use trivox_synth::{Envelope, EnvelopeState};
//!
//! let mut env = Envelope::new(48000.0);
//! env.set_adsr(0.01, 0.2, 0.6, 0.4);
//! env.note_on(1.0);
//! let level = env.advance();
//! assert_eq!(env.state(), EnvelopeState::Attack);
//! ```
//!
//! ## Voices
//!
//! - [`Voice`] - Oscillators, noise, filter, envelope, and LFO routing
//! - [`LfoDestination`] - LFO routing targets
//! - [`VoiceManager`] - Fixed voice pool with allocation and stealing
//! - [`VoiceMode`] - Mono, poly, or unison
//!
//! ## Parameters
//!
//! - [`SynthParam`] - Typed id and descriptor for every control
//! - [`Patch`] - Name-addressed snapshot of all controls
//! - [`ParamError`] - Rejections at the name-addressed boundary
//!
//! # Example: Poly Pad
//!
//! ```rust
//! use trivox_synth::{LfoDestination, OscillatorWaveform, VoiceManager, VoiceMode};
//!
//! let mut synth: VoiceManager = VoiceManager::new(48000.0);
//! synth.set_voice_mode(VoiceMode::Poly);
//! synth.set_osc_waveform(0, OscillatorWaveform::Saw);
//! synth.set_osc_enabled(1, true);
//! synth.set_osc_detune(1, 8.0);
//! synth.set_filter_cutoff(1800.0);
//! synth.set_filter_resonance(0.3);
//! synth.set_envelope(0.3, 0.5, 0.8, 1.2);
//! synth.set_lfo_destination(0, LfoDestination::FilterCutoff);
//! synth.set_lfo_depth(0, 0.2);
//!
//! for note in [57, 60, 64] {
//!     synth.note_on(note, 0.7);
//! }
//!
//! let mut buffer = [0.0f32; 512];
//! synth.process_block(&mut buffer);
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for error messages).
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! trivox-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod envelope;
pub mod error;
pub mod manager;
pub mod oscillator;
pub mod params;
pub mod voice;

pub use envelope::{Envelope, EnvelopeState};
pub use error::ParamError;
pub use manager::{
    DEFAULT_UNISON_DETUNE, DEFAULT_VOICE_COUNT, MAX_UNISON_DETUNE, VoiceManager, VoiceMode,
};
pub use oscillator::{Oscillator, OscillatorWaveform};
pub use params::{Patch, SynthParam};
pub use voice::{LfoDestination, NUM_LFOS, NUM_OSCILLATORS, OscSettings, Voice};

// Re-export the primitives that appear in this crate's public API.
pub use trivox_core::{FilterMode, LfoWaveform, NoiseType, RateMode, SyncDivision};
