//! Host callbacks
//!
//! The embedding page supplies these. Delivery of the verdict to whoever asked
//! for verification is the host's business; an async host should hand the
//! value off (spawn, queue) rather than block inside the callback.

use serde::{Deserialize, Serialize};

pub trait ChallengeHost {
    /// Final verification verdict
    fn on_challenge_response(&mut self, success: bool);
    /// Countdown ran out before the player succeeded
    fn on_challenge_expired(&mut self);
    /// An internal fault interrupted challenge processing
    fn on_challenge_error(&mut self);
}

/// A host callback, as recorded by [`RecordingHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Response { success: bool },
    Expired,
    Error,
}

/// Host that remembers every callback in order
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verdicts delivered so far
    pub fn responses(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Response { success } => Some(*success),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: HostEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    /// Take every recorded callback, leaving the log empty
    pub fn drain(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

impl HostEvent {
    /// Replay this callback on another host
    pub fn deliver_to<H: ChallengeHost + ?Sized>(self, host: &mut H) {
        match self {
            HostEvent::Response { success } => host.on_challenge_response(success),
            HostEvent::Expired => host.on_challenge_expired(),
            HostEvent::Error => host.on_challenge_error(),
        }
    }
}

impl ChallengeHost for RecordingHost {
    fn on_challenge_response(&mut self, success: bool) {
        self.events.push(HostEvent::Response { success });
    }

    fn on_challenge_expired(&mut self) {
        self.events.push(HostEvent::Expired);
    }

    fn on_challenge_error(&mut self) {
        self.events.push(HostEvent::Error);
    }
}
