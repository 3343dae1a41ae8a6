// src/lib.rs

pub mod angle;
pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod seed;
pub mod track;

pub use config::{TrackConfig, TurnParams};
pub use error::TrackError;
pub use generator::{TrackGenerator, TurnState};
pub use geometry::Point2;
pub use seed::TrackSeed;
pub use track::{Track, TrackSnapshot};
