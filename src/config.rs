// src/config.rs

// Tuning constants for track generation. Angles are in degrees, durations in steps.

use std::ops::Range;

use crate::error::TrackError;
use crate::seed::TrackSeed;

// Defaults for a generation run
pub const DEFAULT_SEED: i64 = 12345;
pub const DEFAULT_STEP_LENGTH: f64 = 10.0;
pub const DEFAULT_NUM_POINTS: i64 = 200;

// Heading limits
pub const INITIAL_HEADING: f64 = 0.0;         // start pointing along +x
pub const BACKTRACK_THRESHOLD: f64 = 120.0;   // beyond this from the initial heading we are going backwards
pub const MAX_CUMULATIVE_TURN: f64 = 120.0;   // cap on total turn away from the initial heading

// Big smooth turns
pub const BIG_TURN_ANGLE: Range<f64> = 20.0..50.0;
pub const BIG_TURN_STEPS: Range<u32> = 15..30;

// Small turns and the decision cadence
pub const SMALL_TURN_ANGLE: Range<f64> = 2.0..15.0;
pub const SMALL_TURN_PROBABILITY: f64 = 0.85;     // otherwise a big turn starts
pub const SIGNIFICANT_TURN_ANGLE: f64 = 0.5;      // small turns below this are not flagged
pub const INITIAL_DECISION_INTERVAL: Range<u32> = 20..50;
pub const DECISION_INTERVAL: Range<u32> = 30..70;

// Per-step heading noise, sampled from [-HEADING_NOISE, HEADING_NOISE)
pub const HEADING_NOISE: f64 = 1.0;
pub const MAX_HEADING_NOISE: f64 = 180.0;

// Smoothing
pub const HEADING_HISTORY_LEN: usize = 5;
pub const SMOOTHING_WINDOW: usize = 3;

// Safety fallback factors applied to a turn that would backtrack
pub const FALLBACK_DAMPED: f64 = 0.3;
pub const FALLBACK_REVERSED: f64 = -0.2;

// Live generation
pub const LIVE_TICK_MS: u64 = 40;
pub const RANDOM_SEED_MAX: i64 = 999_999_999;

/// Every knob of the turn state machine. `Default` reproduces the constants above.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnParams {
    pub big_turn_angle: Range<f64>,
    pub big_turn_steps: Range<u32>,
    pub small_turn_angle: Range<f64>,
    pub small_turn_probability: f64,
    pub significant_turn_angle: f64,
    pub initial_decision_interval: Range<u32>,
    pub decision_interval: Range<u32>,
    pub heading_noise: f64,
    pub backtrack_threshold: f64,
    pub max_cumulative_turn: f64,
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            big_turn_angle: BIG_TURN_ANGLE,
            big_turn_steps: BIG_TURN_STEPS,
            small_turn_angle: SMALL_TURN_ANGLE,
            small_turn_probability: SMALL_TURN_PROBABILITY,
            significant_turn_angle: SIGNIFICANT_TURN_ANGLE,
            initial_decision_interval: INITIAL_DECISION_INTERVAL,
            decision_interval: DECISION_INTERVAL,
            heading_noise: HEADING_NOISE,
            backtrack_threshold: BACKTRACK_THRESHOLD,
            max_cumulative_turn: MAX_CUMULATIVE_TURN,
        }
    }
}

impl TurnParams {
    /// Rejects ranges that `rand` could not sample from and values that would
    /// turn the heading into NaN or infinity once stepping starts.
    pub fn validate(&self) -> Result<(), TrackError> {
        if !finite_range(&self.big_turn_angle) {
            return Err(TrackError::InvalidParams("big_turn_angle must be a finite, non-empty range"));
        }
        if self.big_turn_steps.start == 0 || self.big_turn_steps.is_empty() {
            return Err(TrackError::InvalidParams("big_turn_steps must be a non-empty range above zero"));
        }
        if !finite_range(&self.small_turn_angle) {
            return Err(TrackError::InvalidParams("small_turn_angle must be a finite, non-empty range"));
        }
        if !(0.0..=1.0).contains(&self.small_turn_probability) {
            return Err(TrackError::InvalidParams("small_turn_probability must lie in [0, 1]"));
        }
        if !self.significant_turn_angle.is_finite() {
            return Err(TrackError::InvalidParams("significant_turn_angle must be finite"));
        }
        if self.initial_decision_interval.is_empty() || self.decision_interval.is_empty() {
            return Err(TrackError::InvalidParams("decision intervals must be non-empty"));
        }
        // noise is sampled from [-noise, noise), whose width must stay finite
        if !(self.heading_noise > 0.0 && self.heading_noise <= MAX_HEADING_NOISE) {
            return Err(TrackError::InvalidParams("heading_noise must lie in (0, 180]"));
        }
        let limits = [self.backtrack_threshold, self.max_cumulative_turn];
        if !limits.iter().all(|limit| limit.is_finite() && *limit >= 0.0) {
            return Err(TrackError::InvalidParams("heading limits must be finite and non-negative"));
        }
        Ok(())
    }
}

fn finite_range(range: &Range<f64>) -> bool {
    range.start.is_finite() && range.end.is_finite() && range.start < range.end
}

/// The configuration surface a front end hands to the generator.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackConfig {
    pub seed: TrackSeed,
    pub step_length: f64,
    pub num_points: i64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            seed: TrackSeed::Int(DEFAULT_SEED),
            step_length: DEFAULT_STEP_LENGTH,
            num_points: DEFAULT_NUM_POINTS,
        }
    }
}
