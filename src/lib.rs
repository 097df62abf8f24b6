//! Goptcha - a moving-shape human verification challenge
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, shape pool, challenge state machine, timers)
//! - `challenge`: Controller that owns a session and talks to the host
//! - `host`: Callbacks the embedding page provides
//! - `shared`: Re-entrant-safe handle for browser event loops
//! - `settings`: Data-driven challenge tuning
//! - `error`: Error taxonomy for handler faults and rejected input

pub mod challenge;
pub mod error;
pub mod host;
pub mod settings;
pub mod shared;
pub mod sim;

pub use challenge::{Challenge, Snapshot};
pub use error::ChallengeError;
pub use host::{ChallengeHost, HostEvent, RecordingHost};
pub use settings::{RuleSet, Settings};
pub use shared::SharedChallenge;

/// Challenge configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Motion clock period
    pub const MOTION_TICK_MS: u32 = 20;
    /// Countdown clock period
    pub const COUNTDOWN_TICK_MS: u32 = 1000;
    /// How long the requested shape name stays on screen after a re-roll
    pub const REVEAL_MS: u32 = 2000;
    /// Most virtual time one `advance` call will simulate
    pub const MAX_ADVANCE_MS: u64 = 10 * 60 * 1000;

    /// Seconds on the clock at the start of a session
    pub const GAME_TIME: u32 = 60;
    /// Correct clicks needed to pass
    pub const REQUIRED_SCORE: u32 = 3;
    /// Attempt cap for the legacy rule set
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Shape speed in pixels per motion tick
    pub const SPEED: f32 = 1.0;
    /// Edge length of a shape's bounding box
    pub const SHAPE_SIZE: f32 = 48.0;

    /// Default play area (600 x 650 minus the 40px header)
    pub const CONTAINER_WIDTH: f32 = 600.0;
    pub const CONTAINER_HEIGHT: f32 = 610.0;
}
