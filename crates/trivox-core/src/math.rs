//! Stateless audio math shared by every trivox component.
//!
//! All functions are allocation-free and `no_std` friendly.
//!
//! # Pitch
//!
//! - [`midi_to_freq`] - Equal-tempered MIDI note to Hz (A4 = 440 Hz)
//! - [`cents_to_ratio`] - Detune in cents to a frequency multiplier
//!
//! # Oscillator support
//!
//! - [`poly_blep`] - Polynomial band-limited step correction
//! - [`wrap_phase`] - Normalize a phase into `[0, 1)`
//!
//! # Utilities
//!
//! - [`lerp`] - Linear interpolation
//! - [`clamp`] - Range limiting that also absorbs NaN
//! - [`flush_denormal`] - Zero out values near the subnormal range

use libm::{floorf, powf};

/// Convert a MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz, 12 notes per octave.
///
/// # Example
/// ```rust
/// use trivox_core::midi_to_freq;
///
/// assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
/// assert!((midi_to_freq(81) - 880.0).abs() < 1e-2);
/// ```
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Convert a detune amount in cents to a frequency ratio.
///
/// 100 cents = 1 semitone, 1200 cents = 1 octave.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    powf(2.0, cents / 1200.0)
}

/// Second-order PolyBLEP residual.
///
/// Returns the correction to subtract from a naive waveform whose
/// discontinuity sits at phase 0. Non-zero only within one sample on either
/// side of the discontinuity:
///
/// ```text
/// t < dt       : n = t/dt        ->  2n - n² - 1
/// t > 1 - dt   : n = (t - 1)/dt  ->  n² + 2n + 1
/// otherwise    : 0
/// ```
///
/// # Arguments
/// * `t` - Phase position in `[0, 1)`
/// * `dt` - Phase increment per sample (frequency / sample rate)
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let n = t / dt;
        n + n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + n + n + 1.0
    } else {
        0.0
    }
}

/// Wrap a phase value into `[0, 1)`.
///
/// Handles negative inputs and values several cycles out of range.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - floorf(phase);
    // -tiny wraps to exactly 1.0 in f32
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Limit `x` to `[min, max]`.
///
/// Unlike [`f32::clamp`], a NaN input maps to `min` so that a bad control
/// value can never poison the audio path.
///
/// # Example
/// ```rust
/// use trivox_core::clamp;
///
/// assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
/// assert_eq!(clamp(f32::NAN, 0.0, 1.0), 0.0);
/// ```
#[inline]
pub fn clamp(x: f32, min: f32, max: f32) -> f32 {
    if x.is_nan() {
        min
    } else if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

/// Flush values below 1e-20 to zero.
///
/// Use in recursive state (filter stages, integrators) that can decay toward
/// the subnormal range.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
