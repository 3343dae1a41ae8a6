// src/error.rs

use std::fmt;

/// Caller input errors. All of them are raised before a generator exists;
/// once constructed, stepping cannot fail.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackError {
    /// Requested track length was negative.
    InvalidLength(i64),
    /// Step length was zero, negative, or not finite.
    InvalidStepLength(f64),
    /// Seed value has no canonical, platform-independent 64-bit form.
    NonDeterministicSeedType(String),
    /// A custom `TurnParams` range cannot be sampled.
    InvalidParams(&'static str),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::InvalidLength(len) => {
                write!(f, "track length must be non-negative, got {}", len)
            }
            TrackError::InvalidStepLength(step) => {
                write!(f, "step length must be a positive finite number, got {}", step)
            }
            TrackError::NonDeterministicSeedType(seed) => {
                write!(f, "seed {:?} cannot be reproduced deterministically; use an integer or a string", seed)
            }
            TrackError::InvalidParams(reason) => write!(f, "invalid turn parameters: {}", reason),
        }
    }
}

impl std::error::Error for TrackError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            TrackError::InvalidLength(-3).to_string(),
            "track length must be non-negative, got -3"
        );
        assert!(TrackError::InvalidStepLength(0.0).to_string().contains("got 0"));
        assert!(TrackError::NonDeterministicSeedType("1.5".into()).to_string().contains("\"1.5\""));
    }
}
