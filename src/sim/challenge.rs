//! Challenge state machine
//!
//! A reducer over `(session, event)`. It never touches timers or the host
//! directly: it reports what the caller should do through [`Transition`].
//! Every handler checks its preconditions before mutating, so an `Err` leaves
//! the session exactly as it was.

use rand::Rng;

use super::state::{ChallengeState, Session, ShapeKind};
use crate::error::ChallengeError;
use crate::settings::{RuleSet, Settings};

/// Something that happened to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeEvent {
    /// Start button
    Start,
    /// Player clicked the shape of this kind
    Click(ShapeKind),
    /// One countdown period elapsed
    CountdownTick,
    /// Reveal window for `round` is over
    RevealElapsed { round: u64 },
    /// Throw the session away and go back to Idle
    Restart,
}

/// Verdicts for the host, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Response(bool),
    Expired,
}

/// Timer changes the caller must apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    StartCountdown,
    StopCountdown,
    /// Arm (or re-arm) the reveal timer for this round
    ArmReveal { round: u64 },
    CancelReveal,
}

/// Side effects of one reduced event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub outcomes: Vec<Outcome>,
    pub timers: Vec<TimerCommand>,
}

impl Transition {
    /// Event had no effect
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty() && self.timers.is_empty()
    }
}

/// Apply one event to the session
pub fn reduce<R: Rng>(
    session: &mut Session,
    event: ChallengeEvent,
    settings: &Settings,
    rng: &mut R,
) -> Result<Transition, ChallengeError> {
    match event {
        ChallengeEvent::Start => Ok(start(session, settings, rng)),
        ChallengeEvent::Click(kind) => click(session, kind, settings, rng),
        ChallengeEvent::CountdownTick => countdown(session, settings, rng),
        ChallengeEvent::RevealElapsed { round } => Ok(hide_target(session, round)),
        ChallengeEvent::Restart => Ok(restart(session, settings)),
    }
}

fn start<R: Rng>(session: &mut Session, settings: &Settings, rng: &mut R) -> Transition {
    if session.state != ChallengeState::Idle {
        log::debug!("Start ignored in {:?}", session.state);
        return Transition::none();
    }

    session.state = ChallengeState::Playing;
    session.time_remaining = settings.game_time_secs;
    session.score = 0;
    session.attempts = 1;
    let round = session.roll_target(rng);
    log::info!("Challenge started, target {:?}", session.target);

    Transition {
        outcomes: Vec::new(),
        timers: vec![
            TimerCommand::StartCountdown,
            TimerCommand::ArmReveal { round },
        ],
    }
}

fn click<R: Rng>(
    session: &mut Session,
    kind: ShapeKind,
    settings: &Settings,
    rng: &mut R,
) -> Result<Transition, ChallengeError> {
    if !session.accepts_clicks() {
        log::debug!(
            "Click on {} ignored ({:?}, target visible: {})",
            kind,
            session.state,
            session.target_visible
        );
        return Ok(Transition::none());
    }
    let target = session.target.ok_or(ChallengeError::MissingTarget {
        state: session.state,
    })?;

    if kind == target {
        session.score += 1;
        log::info!("Correct click on {}, score {}", kind, session.score);
        if session.score >= settings.required_score {
            return Ok(finish(session, ChallengeState::Success));
        }
        return Ok(reroll(session, rng));
    }

    log::info!("Wrong click on {} (target {})", kind, target);
    match settings.rules {
        RuleSet::Revised => Ok(reroll(session, rng)),
        RuleSet::Legacy => {
            session.attempts += 1;
            if session.attempts > settings.max_attempts {
                return Ok(finish(session, ChallengeState::Failed));
            }
            Ok(Transition::none())
        }
    }
}

fn countdown<R: Rng>(
    session: &mut Session,
    settings: &Settings,
    rng: &mut R,
) -> Result<Transition, ChallengeError> {
    if session.state != ChallengeState::Playing {
        return Ok(Transition::none());
    }
    if session.time_remaining == 0 {
        return Err(ChallengeError::CountdownExhausted);
    }

    session.time_remaining -= 1;
    if session.time_remaining > 0 {
        return Ok(Transition::none());
    }

    log::info!("Time ran out at score {}", session.score);
    match settings.rules {
        RuleSet::Revised => {
            let mut transition = finish(session, ChallengeState::Failed);
            transition.outcomes.push(Outcome::Expired);
            Ok(transition)
        }
        RuleSet::Legacy => {
            session.attempts += 1;
            if session.attempts > settings.max_attempts {
                let mut transition = finish(session, ChallengeState::Failed);
                transition.outcomes.push(Outcome::Expired);
                return Ok(transition);
            }
            session.score = 0;
            session.time_remaining = settings.game_time_secs;
            let mut transition = reroll(session, rng);
            transition.outcomes.push(Outcome::Expired);
            Ok(transition)
        }
    }
}

fn hide_target(session: &mut Session, round: u64) -> Transition {
    if round == session.round {
        session.target_visible = false;
    } else {
        log::debug!("Stale reveal for round {} (current {})", round, session.round);
    }
    Transition::none()
}

fn restart(session: &mut Session, settings: &Settings) -> Transition {
    // Keep counting rounds so nothing armed for the old session can match
    let round = session.round;
    *session = Session::new(settings.game_time_secs);
    session.round = round;
    log::info!("Challenge reset");

    Transition {
        outcomes: Vec::new(),
        timers: vec![TimerCommand::StopCountdown, TimerCommand::CancelReveal],
    }
}

/// New target, back on screen, fresh reveal window
fn reroll<R: Rng>(session: &mut Session, rng: &mut R) -> Transition {
    let round = session.roll_target(rng);
    Transition {
        outcomes: Vec::new(),
        timers: vec![TimerCommand::ArmReveal { round }],
    }
}

/// Enter a terminal state and stop the clocks
fn finish(session: &mut Session, state: ChallengeState) -> Transition {
    session.state = state;
    session.target_visible = false;
    log::info!("Challenge finished: {:?}", state);

    Transition {
        outcomes: vec![Outcome::Response(state == ChallengeState::Success)],
        timers: vec![TimerCommand::StopCountdown, TimerCommand::CancelReveal],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn settings(rules: RuleSet) -> Settings {
        Settings {
            game_time_secs: 30,
            required_score: 3,
            rules,
            ..Default::default()
        }
    }

    fn playing(settings: &Settings, rng: &mut Pcg32) -> Session {
        let mut session = Session::new(settings.game_time_secs);
        reduce(&mut session, ChallengeEvent::Start, settings, rng).unwrap();
        session.target_visible = false;
        session
    }

    fn wrong(target: ShapeKind) -> ShapeKind {
        ShapeKind::ALL[(target.index() + 1) % ShapeKind::ALL.len()]
    }

    #[test]
    fn test_start_from_idle() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut session = Session::new(settings.game_time_secs);

        let t = reduce(&mut session, ChallengeEvent::Start, &settings, &mut rng).unwrap();
        assert_eq!(session.state, ChallengeState::Playing);
        assert_eq!(session.time_remaining, 30);
        assert!(session.target.is_some());
        assert!(session.target_visible);
        assert_eq!(
            t.timers,
            vec![
                TimerCommand::StartCountdown,
                TimerCommand::ArmReveal { round: 1 }
            ]
        );

        // Second start is a no-op
        let before = session.clone();
        let t = reduce(&mut session, ChallengeEvent::Start, &settings, &mut rng).unwrap();
        assert!(t.is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_click_ignored_while_target_shown() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut session = Session::new(settings.game_time_secs);
        reduce(&mut session, ChallengeEvent::Start, &settings, &mut rng).unwrap();

        let target = session.target.unwrap();
        let before = session.clone();
        let t = reduce(&mut session, ChallengeEvent::Click(target), &settings, &mut rng).unwrap();
        assert!(t.is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_click_ignored_when_idle() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut session = Session::new(settings.game_time_secs);
        let t = reduce(
            &mut session,
            ChallengeEvent::Click(ShapeKind::Circle),
            &settings,
            &mut rng,
        )
        .unwrap();
        assert!(t.is_empty());
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_wrong_click_rerolls_without_scoring() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut session = playing(&settings, &mut rng);

        for _ in 0..20 {
            let round = session.round;
            let target = session.target.unwrap();
            let t = reduce(
                &mut session,
                ChallengeEvent::Click(wrong(target)),
                &settings,
                &mut rng,
            )
            .unwrap();
            assert_eq!(session.score, 0);
            assert_eq!(session.round, round + 1);
            assert!(session.target_visible);
            assert_eq!(t.timers, vec![TimerCommand::ArmReveal { round: round + 1 }]);
            session.target_visible = false;
        }
        assert_eq!(session.state, ChallengeState::Playing);
    }

    #[test]
    fn test_target_wrong_target_sequence() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut session = playing(&settings, &mut rng);
        let mut responses = Vec::new();

        for correct in [true, true, false, true] {
            let target = session.target.unwrap();
            let kind = if correct { target } else { wrong(target) };
            let t = reduce(&mut session, ChallengeEvent::Click(kind), &settings, &mut rng).unwrap();
            responses.extend(t.outcomes);
            session.target_visible = false;
        }

        assert_eq!(session.score, 3);
        assert_eq!(session.state, ChallengeState::Success);
        assert_eq!(responses, vec![Outcome::Response(true)]);
    }

    #[test]
    fn test_success_stops_clocks() {
        let settings = Settings {
            required_score: 1,
            ..settings(RuleSet::Revised)
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut session = playing(&settings, &mut rng);
        let target = session.target.unwrap();

        let t = reduce(&mut session, ChallengeEvent::Click(target), &settings, &mut rng).unwrap();
        assert_eq!(t.outcomes, vec![Outcome::Response(true)]);
        assert_eq!(
            t.timers,
            vec![TimerCommand::StopCountdown, TimerCommand::CancelReveal]
        );

        // Terminal: further input does nothing
        session.target_visible = false;
        let before = session.clone();
        for event in [
            ChallengeEvent::Click(target),
            ChallengeEvent::CountdownTick,
            ChallengeEvent::Start,
        ] {
            assert!(reduce(&mut session, event, &settings, &mut rng).unwrap().is_empty());
        }
        assert_eq!(session, before);
    }

    #[test]
    fn test_timeout_fails_once() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(6);
        let mut session = playing(&settings, &mut rng);
        let mut outcomes = Vec::new();

        for _ in 0..29 {
            let t = reduce(&mut session, ChallengeEvent::CountdownTick, &settings, &mut rng).unwrap();
            assert!(t.outcomes.is_empty());
        }
        assert_eq!(session.time_remaining, 1);

        for _ in 0..5 {
            let t = reduce(&mut session, ChallengeEvent::CountdownTick, &settings, &mut rng).unwrap();
            outcomes.extend(t.outcomes);
        }
        assert_eq!(session.state, ChallengeState::Failed);
        assert_eq!(session.time_remaining, 0);
        assert_eq!(outcomes, vec![Outcome::Response(false), Outcome::Expired]);
    }

    #[test]
    fn test_stale_reveal_ignored() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut session = Session::new(settings.game_time_secs);
        reduce(&mut session, ChallengeEvent::Start, &settings, &mut rng).unwrap();
        assert_eq!(session.round, 1);

        session.roll_target(&mut rng);
        reduce(&mut session, ChallengeEvent::RevealElapsed { round: 1 }, &settings, &mut rng)
            .unwrap();
        assert!(session.target_visible);
        reduce(&mut session, ChallengeEvent::RevealElapsed { round: 2 }, &settings, &mut rng)
            .unwrap();
        assert!(!session.target_visible);
    }

    #[test]
    fn test_missing_target_leaves_session_untouched() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(8);
        let mut session = playing(&settings, &mut rng);
        session.target = None;
        let before = session.clone();

        let result = reduce(
            &mut session,
            ChallengeEvent::Click(ShapeKind::Square),
            &settings,
            &mut rng,
        );
        assert!(matches!(result, Err(ChallengeError::MissingTarget { .. })));
        assert_eq!(session, before);
    }

    #[test]
    fn test_exhausted_countdown_is_a_fault() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(9);
        let mut session = playing(&settings, &mut rng);
        session.time_remaining = 0;
        let before = session.clone();

        let result = reduce(&mut session, ChallengeEvent::CountdownTick, &settings, &mut rng);
        assert!(matches!(result, Err(ChallengeError::CountdownExhausted)));
        assert_eq!(session, before);
    }

    #[test]
    fn test_restart_returns_to_idle() {
        let settings = settings(RuleSet::Revised);
        let mut rng = Pcg32::seed_from_u64(10);
        let mut session = playing(&settings, &mut rng);
        let round = session.round;

        let t = reduce(&mut session, ChallengeEvent::Restart, &settings, &mut rng).unwrap();
        assert_eq!(session.state, ChallengeState::Idle);
        assert_eq!(session.target, None);
        assert_eq!(session.round, round);
        assert_eq!(
            t.timers,
            vec![TimerCommand::StopCountdown, TimerCommand::CancelReveal]
        );
    }

    #[test]
    fn test_legacy_wrong_clicks_cost_attempts() {
        let settings = settings(RuleSet::Legacy);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut session = playing(&settings, &mut rng);
        let target = session.target.unwrap();
        let round = session.round;

        for attempt in 2..=3 {
            let t = reduce(
                &mut session,
                ChallengeEvent::Click(wrong(target)),
                &settings,
                &mut rng,
            )
            .unwrap();
            assert!(t.is_empty());
            assert_eq!(session.attempts, attempt);
            // Target is kept
            assert_eq!(session.target, Some(target));
            assert_eq!(session.round, round);
        }

        let t = reduce(
            &mut session,
            ChallengeEvent::Click(wrong(target)),
            &settings,
            &mut rng,
        )
        .unwrap();
        assert_eq!(session.state, ChallengeState::Failed);
        assert_eq!(t.outcomes, vec![Outcome::Response(false)]);
    }

    #[test]
    fn test_legacy_timeout_resets_round() {
        let settings = settings(RuleSet::Legacy);
        let mut rng = Pcg32::seed_from_u64(12);
        let mut session = playing(&settings, &mut rng);
        let target = session.target.unwrap();
        reduce(&mut session, ChallengeEvent::Click(target), &settings, &mut rng).unwrap();
        assert_eq!(session.score, 1);

        let mut outcomes = Vec::new();
        for _ in 0..30 {
            let t = reduce(&mut session, ChallengeEvent::CountdownTick, &settings, &mut rng).unwrap();
            outcomes.extend(t.outcomes);
        }
        assert_eq!(outcomes, vec![Outcome::Expired]);
        assert_eq!(session.state, ChallengeState::Playing);
        assert_eq!(session.score, 0);
        assert_eq!(session.attempts, 2);
        assert_eq!(session.time_remaining, 30);

        // Two more timeouts exhaust the attempts
        outcomes.clear();
        for _ in 0..60 {
            let t = reduce(&mut session, ChallengeEvent::CountdownTick, &settings, &mut rng).unwrap();
            outcomes.extend(t.outcomes);
        }
        assert_eq!(session.state, ChallengeState::Failed);
        assert_eq!(
            outcomes,
            vec![
                Outcome::Expired,
                Outcome::Response(false),
                Outcome::Expired
            ]
        );
    }
}
