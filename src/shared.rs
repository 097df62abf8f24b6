//! Single-threaded shared handle for event-loop hosts
//!
//! Browser callbacks (timers, DOM listeners, exported functions) all reach the
//! challenge through one cell. Host callbacks are queued while the challenge
//! is borrowed and delivered only after the borrow ends, so a listener that
//! turns around and asks for a snapshot or clicks again finds the cell free.

use std::cell::RefCell;

use crate::challenge::Challenge;
use crate::host::{ChallengeHost, RecordingHost};

/// Cell holding at most one challenge whose callbacks are deferred
pub struct SharedChallenge {
    game: RefCell<Option<Challenge<RecordingHost>>>,
}

impl Default for SharedChallenge {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedChallenge {
    pub const fn new() -> Self {
        Self {
            game: RefCell::new(None),
        }
    }

    /// Replace the held challenge. Callbacks it already queued are dropped.
    pub fn install(&self, challenge: Challenge<RecordingHost>) -> bool {
        match self.game.try_borrow_mut() {
            Ok(mut game) => {
                *game = Some(challenge);
                true
            }
            Err(_) => {
                log::warn!("Challenge busy, install refused");
                false
            }
        }
    }

    pub fn is_installed(&self) -> bool {
        self.game.try_borrow().map(|g| g.is_some()).unwrap_or(true)
    }

    /// Run `f` against the challenge, then hand every callback it produced to
    /// `host`. Returns None when nothing is installed, or when called from
    /// inside `f` itself (the cell is still borrowed then).
    pub fn with<T, H: ChallengeHost>(
        &self,
        host: &mut H,
        f: impl FnOnce(&mut Challenge<RecordingHost>) -> T,
    ) -> Option<T> {
        let (result, events) = {
            let Ok(mut game) = self.game.try_borrow_mut() else {
                log::warn!("Re-entrant challenge access skipped");
                return None;
            };
            let game = game.as_mut()?;
            let result = f(game);
            (result, game.host_mut().drain())
        };

        for event in events {
            event.deliver_to(host);
        }
        Some(result)
    }
}
