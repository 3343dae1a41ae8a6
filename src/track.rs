// src/track.rs

use serde::Serialize;

use crate::geometry::Point2;

/// A finished (or partially generated) track: the polyline plus the indices
/// of points where a turn was flagged.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Track {
    pub points: Vec<Point2>,
    pub turn_indices: Vec<usize>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The flagged points, in order, for highlighting.
    pub fn turn_points(&self) -> impl Iterator<Item = Point2> + '_ {
        self.turn_indices.iter().filter_map(|&i| self.points.get(i).copied())
    }

    /// Sum of segment lengths.
    pub fn path_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// Read-only view of a generator after a step, for drivers that poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSnapshot {
    pub position: Point2,
    pub heading: f64,
    pub steps_taken: usize,
    pub is_turning: bool,
    pub last_step_was_turn: bool,
}
