//! Deterministic simulation module
//!
//! All challenge logic lives here. This module must be pure and deterministic:
//! - Virtual time only (no wall clock)
//! - Seeded RNG only
//! - Stable iteration order (entities in `ShapeKind::ALL` order)
//! - No rendering or platform dependencies

pub mod challenge;
pub mod motion;
pub mod pool;
pub mod state;
pub mod timer;

pub use challenge::{ChallengeEvent, Outcome, TimerCommand, Transition, reduce};
pub use motion::{Bounds, random_velocity, step};
pub use pool::{Entity, ShapePool};
pub use state::{ChallengeState, Session, ShapeKind};
pub use timer::{Fired, Scheduler, TimerSlot};
