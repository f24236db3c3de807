//! Parameter metadata for host-facing controls.
//!
//! A [`ParamDescriptor`] carries everything an outer layer (plugin wrapper,
//! editor, preset manager) needs to present and validate one control:
//! display name, stable string id, unit, range, default, and whether the
//! value is an enumeration index.
//!
//! # Example
//!
//! ```rust
//! use trivox_core::{ParamDescriptor, ParamUnit};
//!
//! const CUTOFF: ParamDescriptor = ParamDescriptor::new(
//!     "Filter Cutoff",
//!     "filter_cutoff",
//!     ParamUnit::Hertz,
//!     20.0,
//!     12000.0,
//!     1000.0,
//! );
//!
//! assert_eq!(CUTOFF.clamp(50_000.0), 12000.0);
//! assert_eq!(CUTOFF.clamp(f32::NAN), 20.0);
//! ```

use crate::math::clamp;

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Hertz, for cutoff and LFO rate.
    Hertz,
    /// Seconds, for envelope times.
    Seconds,
    /// Cents, for detune.
    Cents,
    /// Octaves, for coarse oscillator transposition.
    Octaves,
    /// Beats per minute.
    Bpm,
    /// Linear gain or a dimensionless amount.
    Ratio,
    /// On/off switch stored as 0.0 or 1.0.
    Toggle,
    /// Index into an enumeration.
    Choice,
}

/// Metadata for one exposed parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Display name (e.g. "Filter Cutoff").
    pub name: &'static str,

    /// Stable identifier used by presets and automation.
    ///
    /// Convention: `"group_param"` (e.g. `"osc1_gain"`, `"env_attack"`).
    pub string_id: &'static str,

    /// Unit for display.
    pub unit: ParamUnit,

    /// Minimum allowed plain value.
    pub min: f32,

    /// Maximum allowed plain value.
    pub max: f32,

    /// Value at initialization.
    pub default: f32,

    /// Whether values snap to integers (toggles and choices).
    pub stepped: bool,
}

impl ParamDescriptor {
    /// Continuous parameter.
    pub const fn new(
        name: &'static str,
        string_id: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            string_id,
            unit,
            min,
            max,
            default,
            stepped: false,
        }
    }

    /// On/off switch.
    pub const fn toggle(name: &'static str, string_id: &'static str, default_on: bool) -> Self {
        Self {
            name,
            string_id,
            unit: ParamUnit::Toggle,
            min: 0.0,
            max: 1.0,
            default: if default_on { 1.0 } else { 0.0 },
            stepped: true,
        }
    }

    /// Enumeration with `count` choices, addressed by index.
    pub const fn choice(
        name: &'static str,
        string_id: &'static str,
        count: usize,
        default: usize,
    ) -> Self {
        Self {
            name,
            string_id,
            unit: ParamUnit::Choice,
            min: 0.0,
            max: (count - 1) as f32,
            default: default as f32,
            stepped: true,
        }
    }

    /// Mark a continuous parameter as integer-stepped.
    pub const fn stepped(mut self) -> Self {
        self.stepped = true;
        self
    }

    /// Clamp a value to the valid range, rounding stepped parameters.
    ///
    /// NaN maps to `min`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        let v = clamp(value, self.min, self.max);
        if self.stepped { libm::roundf(v) } else { v }
    }

    /// Map a plain value to [0, 1].
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }

    /// Map a [0, 1] value back to the plain range.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.clamp(self.min + clamp(normalized, 0.0, 1.0) * (self.max - self.min))
    }
}
