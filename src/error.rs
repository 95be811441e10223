//! Model-level error types shared by banks, controller, engine, and sizing.

use std::error::Error;
use std::fmt;

/// Error raised by bank configuration, the controller, the simulation
/// engine, and the sizing engine.
///
/// Runtime saturation and energy clamping are *not* errors: they are
/// reported through the rejected-power channel of each operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A configuration value violates its constraint (non-positive physical
    /// quantity, out-of-range SoC, non-positive threshold). Fatal to
    /// construction; no partial state is left behind.
    InvalidParameter {
        /// Dotted field path (e.g., `"battery.c"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },
    /// A runtime input (power, current, dt) is non-finite. Aborts the
    /// current step without touching state.
    InvalidInput {
        /// Name of the offending input.
        field: String,
        /// The rejected value.
        value: f64,
    },
}

impl ModelError {
    /// Shorthand for an [`ModelError::InvalidParameter`].
    pub fn parameter(field: &str, message: &str) -> Self {
        Self::InvalidParameter {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Shorthand for an [`ModelError::InvalidInput`].
    pub fn input(field: &str, value: f64) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            value,
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { field, message } => {
                write!(f, "invalid parameter: {field} — {message}")
            }
            Self::InvalidInput { field, value } => {
                write!(f, "invalid input: {field} = {value}")
            }
        }
    }
}

impl Error for ModelError {}
