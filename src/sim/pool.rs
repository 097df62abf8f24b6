//! The four moving shapes
//!
//! Motion runs on its own clock and never looks at the session: shapes keep
//! drifting while idle and between rounds.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::motion::{self, Bounds};
use super::state::ShapeKind;

/// A moving shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: ShapeKind,
    /// Top-left corner of the bounding box
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Owns one entity per [`ShapeKind`], stored in `ShapeKind::ALL` order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapePool {
    entities: Vec<Entity>,
    bounds: Bounds,
    size: f32,
}

impl ShapePool {
    /// Scatter one entity per kind inside `bounds`, each with a random heading
    pub fn new<R: Rng>(bounds: Bounds, size: f32, speed: f32, rng: &mut R) -> Self {
        let entities = ShapeKind::ALL
            .iter()
            .map(|&kind| Entity {
                kind,
                pos: motion::random_position(rng, bounds, size),
                vel: motion::random_velocity(rng, speed),
            })
            .collect();

        Self {
            entities,
            bounds,
            size,
        }
    }

    /// Advance every entity by one motion tick. Entities pass through each other.
    pub fn tick(&mut self) {
        for entity in &mut self.entities {
            (entity.pos, entity.vel) = motion::step(entity.pos, entity.vel, self.bounds, self.size);
        }
    }

    /// Take new container bounds. Positions are left alone; the next tick
    /// clamps anything the shrink left outside.
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Read-only view for rendering and hit-testing
    pub fn snapshot(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, kind: ShapeKind) -> &Entity {
        &self.entities[kind.index()]
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Edge length of each entity's bounding box
    pub fn size(&self) -> f32 {
        self.size
    }
}
