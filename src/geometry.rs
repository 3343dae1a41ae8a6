// src/geometry.rs

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use serde::Serialize;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        DVec2::from(*self).distance(DVec2::from(*other))
    }

    /// The point `length` units away along `heading_deg` (0 = +x, counter-clockwise).
    pub fn advanced(&self, heading_deg: f64, length: f64) -> Point2 {
        let rad = heading_deg.to_radians();
        Point2::new(self.x + rad.cos() * length, self.y + rad.sin() * length)
    }
}

impl From<DVec2> for Point2 {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point2> for DVec2 {
    fn from(p: Point2) -> Self {
        DVec2::new(p.x, p.y)
    }
}

impl From<Point2> for (f64, f64) {
    fn from(p: Point2) -> Self {
        (p.x, p.y)
    }
}
