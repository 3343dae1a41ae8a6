// src/seed.rs

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::config::RANDOM_SEED_MAX;
use crate::error::TrackError;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A user-facing seed. Integers and strings both reproduce the same track
/// every time they are given, on every platform.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrackSeed {
    Int(i64),
    Text(String),
}

impl TrackSeed {
    /// Folds the seed into the 64-bit state the generator's RNG starts from.
    pub fn canonical(&self) -> u64 {
        match self {
            TrackSeed::Int(value) => *value as u64,
            TrackSeed::Text(text) => text.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
                (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
            }),
        }
    }

    /// Picks a fresh integer seed in `[0, RANDOM_SEED_MAX]` from the caller's RNG.
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        TrackSeed::Int(rng.gen_range(0..=RANDOM_SEED_MAX))
    }
}

impl From<i64> for TrackSeed {
    fn from(value: i64) -> Self {
        TrackSeed::Int(value)
    }
}

impl From<i32> for TrackSeed {
    fn from(value: i32) -> Self {
        TrackSeed::Int(value.into())
    }
}

impl From<u32> for TrackSeed {
    fn from(value: u32) -> Self {
        TrackSeed::Int(value.into())
    }
}

impl From<&str> for TrackSeed {
    fn from(value: &str) -> Self {
        TrackSeed::Text(value.to_owned())
    }
}

impl From<String> for TrackSeed {
    fn from(value: String) -> Self {
        TrackSeed::Text(value)
    }
}

impl TryFrom<f64> for TrackSeed {
    type Error = TrackError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
        if value.is_finite() && value.fract() == 0.0 && in_range {
            Ok(TrackSeed::Int(value as i64))
        } else {
            Err(TrackError::NonDeterministicSeedType(value.to_string()))
        }
    }
}

impl FromStr for TrackSeed {
    type Err = TrackError;

    /// Integers become `Int`, integral floats like `"42.0"` too. Other numeric
    /// literals are rejected; everything else is taken verbatim as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(TrackSeed::Int(value));
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return TrackSeed::try_from(value)
                .map_err(|_| TrackError::NonDeterministicSeedType(trimmed.to_owned()));
        }
        Ok(TrackSeed::Text(s.to_owned()))
    }
}

impl fmt::Display for TrackSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSeed::Int(value) => write!(f, "{}", value),
            TrackSeed::Text(text) => write!(f, "{}", text),
        }
    }
}
