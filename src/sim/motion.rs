//! Vector motion model
//!
//! Straight-line motion inside an axis-aligned box with elastic wall bounces.
//! Positions are the top-left corner of an entity's bounding box.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Play area dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Largest valid top-left corner for an entity of the given size.
    /// Never negative, so a box smaller than the entity pins it to the origin.
    pub fn max_corner(&self, size: f32) -> Vec2 {
        Vec2::new(
            (self.width - size).max(0.0),
            (self.height - size).max(0.0),
        )
    }

    /// Whether an entity of `size` at `pos` lies fully inside
    pub fn contains(&self, pos: Vec2, size: f32) -> bool {
        let max = self.max_corner(size);
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= max.x && pos.y <= max.y
    }
}

/// Advance one entity by one tick.
///
/// Each axis is handled independently: touching or crossing a wall negates
/// that velocity component and clamps the position back into range.
pub fn step(pos: Vec2, vel: Vec2, bounds: Bounds, size: f32) -> (Vec2, Vec2) {
    let max = bounds.max_corner(size);
    let (x, vx) = step_axis(pos.x, vel.x, max.x);
    let (y, vy) = step_axis(pos.y, vel.y, max.y);
    (Vec2::new(x, y), Vec2::new(vx, vy))
}

#[inline]
fn step_axis(p: f32, v: f32, max: f32) -> (f32, f32) {
    let next = p + v;
    if next <= 0.0 || next >= max {
        (next.clamp(0.0, max), -v)
    } else {
        (next, v)
    }
}

/// Velocity with magnitude `speed` in a uniformly random direction
pub fn random_velocity<R: Rng>(rng: &mut R, speed: f32) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

/// Uniformly random top-left corner inside the bounds
pub fn random_position<R: Rng>(rng: &mut R, bounds: Bounds, size: f32) -> Vec2 {
    let max = bounds.max_corner(size);
    Vec2::new(rng.random::<f32>() * max.x, rng.random::<f32>() * max.y)
}
