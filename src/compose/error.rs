//! Configuration errors raised while building the composition.
//!
//! Ticking never fails; everything that can go wrong is caught here, when
//! scales, walks and parts are constructed.

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("scale must contain at least one degree")]
    EmptyScale,

    #[error("scale degree {degree} is outside the octave (0..12)")]
    DegreeOutOfRange { degree: u8 },

    #[error("walk bounds must satisfy lower < upper, got [{lower}, {upper}]")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("walk parameter '{name}' must be finite and non-negative, got {value}")]
    InvalidWalkParameter { name: &'static str, value: f64 },

    #[error("pattern length candidates must be a non-empty list of positive lengths")]
    InvalidPatternLengths,

    #[error("part '{name}': base frequency must be positive, got {frequency}")]
    InvalidBaseFrequency { name: String, frequency: f64 },

    #[error("part '{name}': decay must be finite and non-negative, got {decay}")]
    InvalidDecay { name: String, decay: f64 },

    #[error("composition needs at least one part")]
    NoParts,

    #[error("bpm must be positive, got {0}")]
    InvalidBpm(f64),

    #[error("initial key {0} is outside 0..12")]
    InvalidKey(u8),

    #[error("unknown toggle '{0}' (expected 'percussion' or 'visualEffect')")]
    UnknownToggle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = ConfigError::InvalidBounds { lower: 9.0, upper: 5.0 };
        assert!(err.to_string().contains("[9, 5]"));

        let err = ConfigError::InvalidBaseFrequency { name: "bass".into(), frequency: -1.0 };
        assert!(err.to_string().contains("bass"));
    }
}
