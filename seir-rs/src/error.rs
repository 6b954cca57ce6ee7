//! Errors raised while building parameter sets or integrating a trajectory.

use std::io;

use thiserror::Error;

use crate::{Real, Time};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A scalar input is out of range or inconsistent with the others. No
    /// partially built object is ever returned alongside this error.
    #[error("invalid parameter `{field}`: {constraint}")]
    InvalidParameter {
        field: &'static str,
        constraint: String,
    },

    /// S + E + I + R drifted away from N by more than the allowed tolerance.
    #[error("population not conserved on day {day}: drift of {drift:e} exceeds tolerance {tolerance:e}")]
    ConservationViolation {
        day: Time,
        drift: Real,
        tolerance: Real,
    },

    /// The adaptive integrator could not meet its tolerance with a usable step.
    #[error("step size underflow on day {day}: h = {step:e}")]
    StepSizeUnderflow { day: Time, step: Real },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, constraint: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field,
            constraint: constraint.into(),
        }
    }
}

/// Fails with [`Error::InvalidParameter`] unless `value` is a finite number.
pub(crate) fn ensure_finite(field: &'static str, value: Real) -> Result<Real> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid(field, format!("must be finite, got {}", value)))
    }
}
