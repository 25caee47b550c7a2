//! Error types for the decay subsystem.

use core::fmt;

/// Result type alias for decay operations.
pub type DecayResult<T> = Result<T, DecayError>;

/// Errors raised while configuring a decay scheduler.
///
/// Epoch advancement and the read accessors are total; only configuration
/// can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayError {
    /// Decay time is negative (other than the disabled sentinel) or too
    /// large to be split into epochs without overflow
    InvalidDecayTime(i64),
    /// Option string entry is not of the form `key:value`, or the value is
    /// not an integer
    MalformedOption,
    /// Option key present without a value
    MissingValue,
}

impl DecayError {
    /// Returns a human-readable description of the error
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDecayTime(_) => "invalid decay time",
            Self::MalformedOption => "malformed decay option",
            Self::MissingValue => "decay option has no value",
        }
    }
}

impl fmt::Display for DecayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDecayTime(ms) => write!(f, "{}: {}ms", self.as_str(), ms),
            _ => f.write_str(self.as_str()),
        }
    }
}
