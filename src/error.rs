//! Error types
//!
//! Handler faults stay as `Result`s inside the engine. The controller turns
//! them into `on_challenge_error()` at the host boundary.

use thiserror::Error;

use crate::sim::ChallengeState;

#[derive(Debug, Error)]
pub enum ChallengeError {
    /// A settings value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A click named a shape outside the fixed set
    #[error("unknown shape kind: {0:?}")]
    UnknownShape(String),

    /// Session is playing but has no target to compare against
    #[error("session is {state:?} but no target has been rolled")]
    MissingTarget { state: ChallengeState },

    /// Countdown fired with nothing left on the clock
    #[error("countdown tick with no time remaining")]
    CountdownExhausted,

    /// Settings could not be (de)serialized
    #[error("settings format: {0}")]
    Settings(#[from] serde_json::Error),

    /// Settings file could not be read or written
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
}
