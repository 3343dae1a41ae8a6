// src/generator.rs

use std::collections::VecDeque;

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::angle::{angular_distance, mean_of_last, normalize};
use crate::config::{
    TrackConfig, TurnParams, FALLBACK_DAMPED, FALLBACK_REVERSED, HEADING_HISTORY_LEN,
    INITIAL_HEADING, SMOOTHING_WINDOW,
};
use crate::error::TrackError;
use crate::geometry::Point2;
use crate::seed::TrackSeed;
use crate::track::{Track, TrackSnapshot};

/// Whether the generator is cruising or part-way through a smooth turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnState {
    Straight,
    Turning {
        steps_remaining: u32,
        total_steps: u32,
        increment: f64,
        target: f64,
    },
}

/// Builds a track one point at a time. Every call to [`TrackGenerator::step`]
/// appends exactly one point, `step_length` away from the previous one, and
/// the heading never strays more than the backtrack threshold from where it
/// started.
#[derive(Clone, Debug)]
pub struct TrackGenerator {
    seed: TrackSeed,
    step_length: f64,
    num_points: usize,
    params: TurnParams,
    rng: ChaCha8Rng,

    position: Point2,
    points: Vec<Point2>,
    heading: f64,
    initial_heading: f64,
    heading_history: VecDeque<f64>,
    turn_indices: Vec<usize>,
    turn: TurnState,
    steps_until_next_decision: u32,
}

fn validate_length(num_points: i64) -> Result<usize, TrackError> {
    usize::try_from(num_points).map_err(|_| TrackError::InvalidLength(num_points))
}

impl TrackGenerator {
    pub fn new(seed: impl Into<TrackSeed>, step_length: f64, num_points: i64) -> Result<Self, TrackError> {
        Self::with_params(seed, step_length, num_points, TurnParams::default())
    }

    pub fn from_config(config: &TrackConfig) -> Result<Self, TrackError> {
        Self::new(config.seed.clone(), config.step_length, config.num_points)
    }

    pub fn with_params(
        seed: impl Into<TrackSeed>,
        step_length: f64,
        num_points: i64,
        params: TurnParams,
    ) -> Result<Self, TrackError> {
        if !(step_length.is_finite() && step_length > 0.0) {
            return Err(TrackError::InvalidStepLength(step_length));
        }
        let num_points = validate_length(num_points)?;
        params.validate()?;

        let seed = seed.into();
        let mut rng = ChaCha8Rng::seed_from_u64(seed.canonical());
        let steps_until_next_decision = rng.gen_range(params.initial_decision_interval.clone());

        let mut points = Vec::with_capacity(num_points.min(1 << 16) + 1);
        points.push(Point2::ORIGIN);

        debug!(
            "new track generator: seed={} step_length={} num_points={}",
            seed, step_length, num_points
        );

        Ok(Self {
            seed,
            step_length,
            num_points,
            params,
            rng,
            position: Point2::ORIGIN,
            points,
            heading: INITIAL_HEADING,
            initial_heading: INITIAL_HEADING,
            heading_history: VecDeque::from(vec![INITIAL_HEADING; HEADING_HISTORY_LEN]),
            turn_indices: Vec::new(),
            turn: TurnState::Straight,
            steps_until_next_decision,
        })
    }

    fn smoothed_heading(&self) -> f64 {
        mean_of_last(self.heading_history.iter(), SMOOTHING_WINDOW)
    }

    fn exceeds_backtrack_threshold(&self, candidate: f64) -> bool {
        angular_distance(candidate, self.initial_heading) > self.params.backtrack_threshold
    }

    // Measured from the initial heading for now, which makes it the same test
    // as the threshold above. A running sum of applied turns would separate them.
    fn exceeds_cumulative_cap(&self, candidate: f64) -> bool {
        angular_distance(candidate, self.initial_heading) > self.params.max_cumulative_turn
    }

    /// True if heading along `candidate` would count as doubling back.
    pub fn would_backtrack(&self, candidate: f64) -> bool {
        self.exceeds_backtrack_threshold(candidate) || self.exceeds_cumulative_cap(candidate)
    }

    /// Shrinks a desired heading change until it is safe: the full delta, then
    /// 30% of it, then 20% in the opposite direction, then nothing.
    pub fn safe_turn_angle(&self, desired: f64) -> f64 {
        let fits = |delta: f64| !self.would_backtrack(normalize(self.heading + delta));

        if fits(desired) {
            return desired;
        }
        let damped = desired * FALLBACK_DAMPED;
        if fits(damped) {
            return damped;
        }
        let reversed = desired * FALLBACK_REVERSED;
        if fits(reversed) {
            return reversed;
        }
        0.0
    }

    fn commit_heading(&mut self, heading: f64) {
        self.heading = normalize(heading);
        if self.heading_history.len() == HEADING_HISTORY_LEN {
            self.heading_history.pop_front();
        }
        self.heading_history.push_back(self.heading);
    }

    // Flags the point this step is about to emit.
    fn flag_turn(&mut self) {
        let index = self.points.len();
        if self.turn_indices.last() != Some(&index) {
            self.turn_indices.push(index);
        }
    }

    fn random_sign(&mut self) -> f64 {
        if self.rng.gen::<f64>() < 0.5 {
            1.0
        } else {
            -1.0
        }
    }

    fn begin_big_turn(&mut self) {
        let magnitude = self.rng.gen_range(self.params.big_turn_angle.clone());
        let desired = magnitude * self.random_sign();
        let safe = self.safe_turn_angle(desired);

        let target = normalize(self.heading + safe);
        let total_steps = self.rng.gen_range(self.params.big_turn_steps.clone());
        let increment = normalize(target - self.heading) / total_steps as f64;

        debug!(
            "big turn at point {}: desired {:.2}, applied {:.2} over {} steps",
            self.points.len(),
            desired,
            safe,
            total_steps
        );

        self.turn = TurnState::Turning {
            steps_remaining: total_steps,
            total_steps,
            increment,
            target,
        };
        self.flag_turn();
    }

    fn step_turn(&mut self) {
        let TurnState::Turning { steps_remaining, increment, .. } = self.turn else {
            return;
        };

        if steps_remaining == 0 {
            debug!("turn finished at heading {:.2}", self.heading);
            self.turn = TurnState::Straight;
            return;
        }

        let tentative = self.heading + increment;
        if self.would_backtrack(tentative) {
            debug!(
                "turn cut short at point {} with {} steps left",
                self.points.len(),
                steps_remaining
            );
            self.turn = TurnState::Straight;
            return;
        }

        self.commit_heading(tentative);
        if let TurnState::Turning { steps_remaining, .. } = &mut self.turn {
            *steps_remaining -= 1;
        }
    }

    fn small_turn(&mut self) {
        let magnitude = self.rng.gen_range(self.params.small_turn_angle.clone());
        let desired = magnitude * self.random_sign();
        let safe = self.safe_turn_angle(desired);

        self.commit_heading(self.heading + safe);
        if safe.abs() > self.params.significant_turn_angle {
            debug!("small turn of {:.2} at point {}", safe, self.points.len());
            self.flag_turn();
        }
    }

    fn drift(&mut self) {
        let noise = self.params.heading_noise;
        let proposed = self.smoothed_heading() + self.rng.gen_range(-noise..noise);
        if !self.would_backtrack(proposed) {
            self.commit_heading(proposed);
        }
    }

    /// Advances the track by exactly one point.
    pub fn step(&mut self) {
        if self.is_turning() {
            self.step_turn();
        } else if self.steps_until_next_decision > 0 {
            self.steps_until_next_decision -= 1;
            self.drift();
        } else {
            self.steps_until_next_decision = self.rng.gen_range(self.params.decision_interval.clone());
            if self.rng.gen::<f64>() < self.params.small_turn_probability {
                self.small_turn();
            } else {
                self.begin_big_turn();
            }
        }

        self.position = self.position.advanced(self.heading, self.step_length);
        self.points.push(self.position);
        trace!(
            "point {}: ({:.3}, {:.3}) heading {:.3}",
            self.points.len() - 1,
            self.position.x,
            self.position.y,
            self.heading
        );
    }

    /// Runs `count` more steps and returns everything generated so far.
    pub fn generate_full_track(&mut self, count: i64) -> Result<Track, TrackError> {
        let count = validate_length(count)?;
        for _ in 0..count {
            self.step();
        }
        Ok(self.track())
    }

    /// Steps until `num_points` points beyond the origin exist.
    pub fn run_to_completion(&mut self) -> Track {
        while !self.is_exhausted() {
            self.step();
        }
        self.track()
    }

    pub fn seed(&self) -> &TrackSeed {
        &self.seed
    }

    pub fn step_length(&self) -> f64 {
        self.step_length
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn params(&self) -> &TurnParams {
        &self.params
    }

    pub fn current_position(&self) -> Point2 {
        self.position
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn turn_indices(&self) -> &[usize] {
        &self.turn_indices
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn initial_heading(&self) -> f64 {
        self.initial_heading
    }

    /// Where the current turn is headed; the current heading when not turning.
    pub fn target_heading(&self) -> f64 {
        match self.turn {
            TurnState::Turning { target, .. } => target,
            TurnState::Straight => self.heading,
        }
    }

    pub fn turn_state(&self) -> TurnState {
        self.turn
    }

    pub fn is_turning(&self) -> bool {
        matches!(self.turn, TurnState::Turning { .. })
    }

    pub fn steps_taken(&self) -> usize {
        self.points.len() - 1
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps_taken() >= self.num_points
    }

    /// Whether the most recently emitted point was flagged as a turn.
    pub fn last_step_was_turn(&self) -> bool {
        self.steps_taken() > 0 && self.turn_indices.last() == Some(&(self.points.len() - 1))
    }

    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            position: self.position,
            heading: self.heading,
            steps_taken: self.steps_taken(),
            is_turning: self.is_turning(),
            last_step_was_turn: self.last_step_was_turn(),
        }
    }

    pub fn track(&self) -> Track {
        Track {
            points: self.points.clone(),
            turn_indices: self.turn_indices.clone(),
        }
    }

    pub fn into_track(self) -> Track {
        Track {
            points: self.points,
            turn_indices: self.turn_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> TrackGenerator {
        TrackGenerator::new(12345, 10.0, 200).unwrap()
    }

    #[test]
    fn starts_at_origin_facing_east() {
        let gen = generator();
        assert_eq!(gen.points(), &[Point2::ORIGIN]);
        assert_eq!(gen.heading(), 0.0);
        assert_eq!(gen.turn_state(), TurnState::Straight);
        assert_eq!(gen.heading_history.len(), HEADING_HISTORY_LEN);
        assert!((20..50).contains(&gen.steps_until_next_decision));
    }

    #[test]
    fn rejects_bad_input_before_building_state() {
        assert_eq!(
            TrackGenerator::new(1, 0.0, 10).unwrap_err(),
            TrackError::InvalidStepLength(0.0)
        );
        assert!(matches!(
            TrackGenerator::new(1, f64::NAN, 10),
            Err(TrackError::InvalidStepLength(_))
        ));
        assert_eq!(
            TrackGenerator::new(1, 10.0, -1).unwrap_err(),
            TrackError::InvalidLength(-1)
        );
        assert!(matches!(
            generator().generate_full_track(-5),
            Err(TrackError::InvalidLength(-5))
        ));
    }

    #[test]
    fn backtrack_boundary_is_inclusive() {
        let gen = generator();
        assert!(!gen.would_backtrack(120.0));
        assert!(!gen.would_backtrack(-120.0));
        assert!(gen.would_backtrack(120.001));
        assert!(gen.would_backtrack(-150.0));
        assert!(gen.would_backtrack(180.0));
        // 250 wraps to -110
        assert!(!gen.would_backtrack(250.0));
    }

    #[test]
    fn backtrack_checks_are_currently_redundant() {
        // Both limits measure distance from the initial heading; this pins the
        // redundancy so a future divergence is a deliberate change.
        let gen = generator();
        let mut candidate = -400.0;
        while candidate <= 400.0 {
            assert_eq!(
                gen.exceeds_backtrack_threshold(candidate),
                gen.exceeds_cumulative_cap(candidate),
                "checks disagree at {}",
                candidate
            );
            candidate += 0.25;
        }
    }

    #[test]
    fn safe_turn_angle_passes_safe_turns_through() {
        let gen = generator();
        assert_eq!(gen.safe_turn_angle(35.0), 35.0);
        assert_eq!(gen.safe_turn_angle(-12.5), -12.5);
    }

    #[test]
    fn safe_turn_angle_damps_then_reverses_then_gives_up() {
        let mut gen = generator();

        gen.heading = 100.0;
        assert!((gen.safe_turn_angle(30.0) - 9.0).abs() < 1e-12);

        gen.heading = 119.0;
        assert!((gen.safe_turn_angle(40.0) + 8.0).abs() < 1e-12);

        gen.heading = 150.0;
        assert_eq!(gen.safe_turn_angle(10.0), 0.0);
    }

    #[test]
    fn turn_is_cut_short_instead_of_backtracking() {
        let mut gen = generator();
        gen.heading = 115.0;
        gen.turn = TurnState::Turning {
            steps_remaining: 5,
            total_steps: 5,
            increment: 3.0,
            target: 130.0,
        };

        gen.step_turn();
        assert_eq!(gen.heading(), 118.0);
        assert!(gen.is_turning());

        gen.step_turn();
        assert_eq!(gen.heading(), 118.0);
        assert_eq!(gen.turn_state(), TurnState::Straight);
        assert_eq!(gen.target_heading(), 118.0);
    }

    #[test]
    fn finished_turn_returns_to_straight_without_moving_heading() {
        let mut gen = generator();
        gen.heading = 42.0;
        gen.turn = TurnState::Turning {
            steps_remaining: 0,
            total_steps: 20,
            increment: 2.0,
            target: 42.0,
        };
        gen.step_turn();
        assert_eq!(gen.heading(), 42.0);
        assert!(!gen.is_turning());
    }

    #[test]
    fn big_turn_interpolates_to_its_target() {
        let mut gen = generator();
        gen.begin_big_turn();
        let TurnState::Turning { total_steps, increment, target, steps_remaining } = gen.turn_state() else {
            panic!("big turn did not start");
        };
        assert_eq!(steps_remaining, total_steps);
        assert!((15..30).contains(&total_steps));
        assert!((increment * total_steps as f64 - target).abs() < 1e-9);
        assert!((20.0..50.0).contains(&target.abs()));
        assert_eq!(gen.turn_indices(), &[1]);

        for _ in 0..=total_steps {
            gen.step();
        }
        assert!(!gen.is_turning());
        assert!((gen.heading() - target).abs() < 1e-9);
    }

    #[test]
    fn history_is_bounded() {
        let mut gen = generator();
        for _ in 0..500 {
            gen.step();
            assert_eq!(gen.heading_history.len(), HEADING_HISTORY_LEN);
        }
        assert_eq!(gen.heading_history.back(), Some(&gen.heading()));
    }

    #[test]
    fn chained_big_turns_never_pass_the_cap() {
        let params = TurnParams {
            small_turn_probability: 0.0,
            initial_decision_interval: 0..1,
            decision_interval: 0..1,
            ..TurnParams::default()
        };
        for seed in 0..20 {
            let mut gen = TrackGenerator::with_params(seed, 1.0, 3000, params.clone()).unwrap();
            let mut big_turns = 0;
            for _ in 0..3000 {
                let was_turning = gen.is_turning();
                gen.step();
                if !was_turning && gen.is_turning() {
                    big_turns += 1;
                }
                assert!(gen.heading().abs() <= 120.0, "seed {} heading {}", seed, gen.heading());
            }
            assert!(big_turns > 50, "seed {} only started {} big turns", seed, big_turns);
        }
    }

    #[test]
    fn zero_steps_leaves_only_the_origin() {
        let track = generator().generate_full_track(0).unwrap();
        assert_eq!(track.points, vec![Point2::ORIGIN]);
        assert!(track.turn_indices.is_empty());
    }

    #[test]
    fn live_queries_track_progress() {
        let mut gen = TrackGenerator::new("live", 5.0, 3).unwrap();
        assert!(!gen.last_step_was_turn());
        assert!(!gen.is_exhausted());
        gen.step();
        let snap = gen.snapshot();
        assert_eq!(snap.steps_taken, 1);
        assert_eq!(snap.position, gen.current_position());
        assert_eq!(snap.position, gen.points()[1]);
        let track = gen.run_to_completion();
        assert!(gen.is_exhausted());
        assert_eq!(track.len(), 4);
    }
}
