//! Challenge controller
//!
//! Single owner of the shape pool, the session, the timers and the host.
//! Fired timers and player input become [`ChallengeEvent`]s for the reducer;
//! the resulting [`Transition`] is applied here, which is the only place the
//! host gets called.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_ADVANCE_MS;
use crate::error::ChallengeError;
use crate::host::ChallengeHost;
use crate::settings::{RuleSet, Settings};
use crate::sim::{
    Bounds, ChallengeEvent, ChallengeState, Entity, Outcome, Scheduler, Session, ShapeKind,
    ShapePool, TimerCommand, TimerSlot, Transition, reduce,
};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: ChallengeState,
    pub score: u32,
    pub required_score: u32,
    pub attempts: u32,
    pub max_attempts: u32,
    pub time_remaining: u32,
    pub target: Option<ShapeKind>,
    /// Show the target name instead of the shapes
    pub target_visible: bool,
    pub bounds: Bounds,
    pub shape_size: f32,
    pub entities: Vec<Entity>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, ChallengeError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct Challenge<H: ChallengeHost> {
    settings: Settings,
    session: Session,
    pool: ShapePool,
    scheduler: Scheduler,
    rng: Pcg32,
    host: H,
}

impl<H: ChallengeHost> Challenge<H> {
    /// Create a challenge seeded from entropy
    pub fn new(settings: Settings, host: H) -> Result<Self, ChallengeError> {
        Self::with_seed(settings, rand::random(), host)
    }

    /// Create a challenge with a fixed seed (reproducible shapes and targets)
    pub fn with_seed(settings: Settings, seed: u64, host: H) -> Result<Self, ChallengeError> {
        settings.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let pool = ShapePool::new(
            settings.container(),
            settings.shape_size,
            settings.speed,
            &mut rng,
        );

        // Shapes drift for the widget's whole lifetime, session or not
        let mut scheduler = Scheduler::new();
        scheduler.arm_interval(TimerSlot::Motion, u64::from(settings.motion_tick_ms));

        log::info!(
            "Challenge ready: seed {}, {:?} rules, {}s, {} to pass",
            seed,
            settings.rules,
            settings.game_time_secs,
            settings.required_score
        );

        Ok(Self {
            session: Session::new(settings.game_time_secs),
            settings,
            pool,
            scheduler,
            rng,
            host,
        })
    }

    /// Begin a session (only from Idle)
    pub fn start(&mut self) {
        self.dispatch(ChallengeEvent::Start);
    }

    /// Abandon the current session and return to Idle
    pub fn restart(&mut self) {
        self.dispatch(ChallengeEvent::Restart);
    }

    /// The player clicked the shape of this kind
    pub fn handle_click(&mut self, kind: ShapeKind) {
        self.dispatch(ChallengeEvent::Click(kind));
    }

    /// Click reported by shape name. Names outside the fixed set are rejected
    /// without touching the session.
    pub fn handle_click_name(&mut self, name: &str) -> Result<(), ChallengeError> {
        let kind = name
            .parse::<ShapeKind>()
            .inspect_err(|e| log::warn!("Rejected click: {}", e))?;
        self.handle_click(kind);
        Ok(())
    }

    /// Container size changed. Shapes are not moved; the next motion tick
    /// clamps any that ended up outside.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        log::debug!("Resize to {}x{}", width, height);
        self.pool.resize(Bounds::new(width, height));
    }

    /// Run every timer due within the next `ms` milliseconds, in order.
    /// A single call covers at most `MAX_ADVANCE_MS`; a host that fell
    /// further behind (suspended tab, bogus delta) only catches up that far.
    pub fn advance(&mut self, ms: u64) {
        if ms > MAX_ADVANCE_MS {
            log::warn!("Clamping advance of {}ms to {}ms", ms, MAX_ADVANCE_MS);
        }
        let until = self.scheduler.now().saturating_add(ms.min(MAX_ADVANCE_MS));
        while let Some(fired) = self.scheduler.pop_due(until) {
            match fired.slot {
                TimerSlot::Motion => self.pool.tick(),
                TimerSlot::Countdown => self.dispatch(ChallengeEvent::CountdownTick),
                TimerSlot::Reveal => {
                    self.dispatch(ChallengeEvent::RevealElapsed { round: fired.tag })
                }
            }
        }
        self.scheduler.settle(until);
    }

    /// Switch rule sets. Only allowed between sessions; returns false
    /// (and changes nothing) while a session is running or finished.
    pub fn set_rules(&mut self, rules: RuleSet) -> bool {
        if self.session.state != ChallengeState::Idle {
            log::warn!("Rule change to {} refused in {:?}", rules.as_str(), self.session.state);
            return false;
        }
        log::info!("Rules set to {}", rules.as_str());
        self.settings.rules = rules;
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.session.state,
            score: self.session.score,
            required_score: self.settings.required_score,
            attempts: self.session.attempts,
            max_attempts: self.settings.max_attempts,
            time_remaining: self.session.time_remaining,
            target: self.session.target,
            target_visible: self.session.target_visible,
            bounds: self.pool.bounds(),
            shape_size: self.pool.size(),
            entities: self.pool.snapshot().to_vec(),
        }
    }

    /// Reduce one event and apply its effects. Faults stop here.
    fn dispatch(&mut self, event: ChallengeEvent) {
        match reduce(&mut self.session, event, &self.settings, &mut self.rng) {
            Ok(transition) => self.apply(transition),
            Err(e) => {
                log::error!("Challenge handler failed on {:?}: {}", event, e);
                self.host.on_challenge_error();
            }
        }
    }

    fn apply(&mut self, transition: Transition) {
        // Timers first so no countdown is left armed when the host hears the verdict
        for command in transition.timers {
            match command {
                TimerCommand::StartCountdown => self.scheduler.arm_interval(
                    TimerSlot::Countdown,
                    u64::from(self.settings.countdown_tick_ms),
                ),
                TimerCommand::StopCountdown => self.scheduler.cancel(TimerSlot::Countdown),
                TimerCommand::ArmReveal { round } => self.scheduler.arm_once(
                    TimerSlot::Reveal,
                    u64::from(self.settings.reveal_ms),
                    round,
                ),
                TimerCommand::CancelReveal => self.scheduler.cancel(TimerSlot::Reveal),
            }
        }

        for outcome in transition.outcomes {
            match outcome {
                Outcome::Response(success) => self.host.on_challenge_response(success),
                Outcome::Expired => self.host.on_challenge_expired(),
            }
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access (for testing)
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn pool(&self) -> &ShapePool {
        &self.pool
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}
