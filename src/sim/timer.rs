//! Virtual-time scheduler
//!
//! Replaces ambient interval/timeout callbacks with explicit, cancellable
//! slots. Each slot holds at most one armed timer, so arming a slot supersedes
//! whatever was pending there.

use serde::{Deserialize, Serialize};

/// The timers a challenge uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerSlot {
    /// Shape motion, runs for the lifetime of the widget
    Motion,
    /// 1 Hz countdown while playing
    Countdown,
    /// One-shot that hides the target name
    Reveal,
}

impl TimerSlot {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        self as usize
    }

    fn from_index(i: usize) -> Self {
        match i {
            0 => TimerSlot::Motion,
            1 => TimerSlot::Countdown,
            _ => TimerSlot::Reveal,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Armed {
    deadline: u64,
    /// Some for intervals, None for one-shots
    period: Option<u64>,
    /// Caller data handed back on fire (the round for reveal timers)
    tag: u64,
    /// Arming order, breaks deadline ties
    seq: u64,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub slot: TimerSlot,
    /// Virtual time the timer was due, in ms
    pub at: u64,
    pub tag: u64,
}

/// Millisecond clock plus one timer per [`TimerSlot`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: u64,
    slots: [Option<Armed>; TimerSlot::COUNT],
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in ms
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Fire every `period_ms` starting one period from now
    pub fn arm_interval(&mut self, slot: TimerSlot, period_ms: u64) {
        let period = period_ms.max(1);
        self.arm(slot, period, Some(period), 0);
    }

    /// Fire once, `delay_ms` from now, handing back `tag`
    pub fn arm_once(&mut self, slot: TimerSlot, delay_ms: u64, tag: u64) {
        self.arm(slot, delay_ms, None, tag);
    }

    fn arm(&mut self, slot: TimerSlot, delay: u64, period: Option<u64>, tag: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots[slot.index()] = Some(Armed {
            deadline: self.now.saturating_add(delay),
            period,
            tag,
            seq,
        });
    }

    pub fn cancel(&mut self, slot: TimerSlot) {
        self.slots[slot.index()] = None;
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<u64> {
        self.slots.iter().flatten().map(|a| a.deadline).min()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Intervals are re-armed for their next period.
    ///
    /// Call repeatedly: handlers run between pops may arm or cancel timers,
    /// and those changes are honoured by the next pop.
    pub fn pop_due(&mut self, until: u64) -> Option<Fired> {
        let (index, armed) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|a| (i, a)))
            .filter(|(_, a)| a.deadline <= until)
            .min_by_key(|(_, a)| (a.deadline, a.seq))?;

        self.now = self.now.max(armed.deadline);
        // An interval whose next deadline would pass the end of time is dropped
        self.slots[index] = match armed.period.and_then(|p| armed.deadline.checked_add(p)) {
            Some(deadline) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                Some(Armed {
                    deadline,
                    seq,
                    ..armed
                })
            }
            None => None,
        };

        Some(Fired {
            slot: TimerSlot::from_index(index),
            at: armed.deadline,
            tag: armed.tag,
        })
    }

    /// Move the clock forward without firing anything. Only valid once
    /// `pop_due(until)` has returned None.
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}
