//! Trivox Core - DSP primitives for the trivox synthesizer
//!
//! This crate provides the voice-independent building blocks used by
//! `trivox-synth`. Everything here is designed for real-time use: no heap
//! allocation, locking, or I/O on the audio path.
//!
//! # Components
//!
//! ## Filtering
//!
//! - [`LadderFilter`] - 4-pole resonant ladder with lowpass, bandpass, and highpass taps
//! - [`Processor`] - Sample-at-a-time processing trait
//!
//! ## Modulation
//!
//! - [`Lfo`] - Low-frequency oscillator (5 waveforms, free or tempo-synced)
//! - [`SyncDivision`] - Musical divisions for tempo sync
//!
//! ## Sources
//!
//! - [`NoiseGenerator`] - White, pink, and brown noise
//!
//! ## Utilities
//!
//! - Math functions: [`midi_to_freq`], [`cents_to_ratio`], [`poly_blep`],
//!   [`wrap_phase`], [`lerp`], [`clamp`], [`flush_denormal`]
//! - Parameter metadata: [`ParamDescriptor`], [`ParamUnit`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! trivox-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Logging
//!
//! The optional `tracing` feature emits `debug`-level events on control-path
//! changes. No subscriber is installed by this crate.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod ladder;
pub mod lfo;
pub mod math;
pub mod noise;
pub mod param_info;
pub mod processor;
pub mod tempo;

pub use ladder::{FilterMode, LadderFilter, MAX_CUTOFF, MIN_CUTOFF, STATE_LIMIT};
pub use lfo::{Lfo, LfoWaveform, MAX_LFO_RATE, MIN_LFO_RATE, RateMode};
pub use math::{clamp, cents_to_ratio, flush_denormal, lerp, midi_to_freq, poly_blep, wrap_phase};
pub use noise::{NoiseGenerator, NoiseType};
pub use param_info::{ParamDescriptor, ParamUnit};
pub use processor::Processor;
pub use tempo::{DEFAULT_BPM, MAX_BPM, MIN_BPM, SyncDivision};
