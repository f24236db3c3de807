//! Error types for the parameter boundary.

use alloc::string::String;
use thiserror::Error;

/// Errors raised when ingesting name-addressed parameter values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// No parameter has this string id
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Value is NaN or infinite
    #[error("non-finite value {value} for parameter '{name}'")]
    NonFinite {
        /// String id of the parameter.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
}
