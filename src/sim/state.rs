//! Challenge session state and core simulation types
//!
//! Everything a renderer needs to draw the HUD lives on [`Session`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ChallengeError;

/// The closed set of shapes in play. Exactly one entity exists per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Triangle,
    Square,
    Circle,
    Rectangle,
}

impl ShapeKind {
    /// All kinds in stable iteration order
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Triangle,
        ShapeKind::Square,
        ShapeKind::Circle,
        ShapeKind::Rectangle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Triangle => "triangle",
            ShapeKind::Square => "square",
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
        }
    }

    /// Position in [`ShapeKind::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Uniform pick over all kinds; independent of any previous pick
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShapeKind {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "triangle" => Ok(ShapeKind::Triangle),
            "square" => Ok(ShapeKind::Square),
            "circle" => Ok(ShapeKind::Circle),
            "rectangle" => Ok(ShapeKind::Rectangle),
            _ => Err(ChallengeError::UnknownShape(s.to_string())),
        }
    }
}

/// Which region of the widget is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeState {
    /// Waiting for the start button
    #[default]
    Idle,
    /// Countdown running, clicks accepted
    Playing,
    /// Required score reached
    Success,
    /// Out of time (or out of attempts under the legacy rules)
    Failed,
}

impl ChallengeState {
    /// Success and Failed end the session; only a restart leaves them
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengeState::Success | ChallengeState::Failed)
    }
}

/// One run of the challenge, from Idle to a terminal state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub state: ChallengeState,
    /// Seconds left on the countdown
    pub time_remaining: u32,
    /// Correct clicks so far
    pub score: u32,
    /// Current attempt number, starting at 1
    pub attempts: u32,
    /// Shape the player must click
    pub target: Option<ShapeKind>,
    /// Target name is on screen and shapes are hidden
    pub target_visible: bool,
    /// Re-roll counter; tags reveal timers so a stale one is recognisable
    pub round: u64,
}

impl Session {
    pub fn new(game_time: u32) -> Self {
        Self {
            state: ChallengeState::Idle,
            time_remaining: game_time,
            score: 0,
            attempts: 1,
            target: None,
            target_visible: false,
            round: 0,
        }
    }

    /// Pick a fresh target and put it on screen. Returns the new round.
    pub fn roll_target<R: Rng>(&mut self, rng: &mut R) -> u64 {
        self.target = Some(ShapeKind::random(rng));
        self.target_visible = true;
        self.round += 1;
        self.round
    }

    /// Shapes can be clicked only while playing and the target name is hidden
    pub fn accepts_clicks(&self) -> bool {
        self.state == ChallengeState::Playing && !self.target_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_shape_kind_parse() {
        assert_eq!("circle".parse::<ShapeKind>().unwrap(), ShapeKind::Circle);
        assert_eq!(" Square ".parse::<ShapeKind>().unwrap(), ShapeKind::Square);
        assert!(matches!(
            "hexagon".parse::<ShapeKind>(),
            Err(ChallengeError::UnknownShape(name)) if name == "hexagon"
        ));
    }

    #[test]
    fn test_shape_kind_index_matches_all() {
        for (i, kind) in ShapeKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_random_covers_every_kind() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[ShapeKind::random(&mut rng).index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_roll_target_bumps_round() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut session = Session::new(60);
        assert_eq!(session.roll_target(&mut rng), 1);
        assert_eq!(session.roll_target(&mut rng), 2);
        assert!(session.target.is_some());
        assert!(session.target_visible);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ChallengeState::Playing).unwrap();
        assert_eq!(json, "\"playing\"");
        let kind: ShapeKind = serde_json::from_str("\"triangle\"").unwrap();
        assert_eq!(kind, ShapeKind::Triangle);
    }
}
