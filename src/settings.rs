//! Challenge settings
//!
//! Persisted in LocalStorage on the web, read from a JSON file on native.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ChallengeError;
use crate::sim::Bounds;

/// Which set of game rules a session follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    /// Every click re-rolls the target; timeout fails the session outright
    #[default]
    Revised,
    /// Wrong clicks cost an attempt; timeout costs an attempt and restarts the clock
    Legacy,
}

impl RuleSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSet::Revised => "revised",
            RuleSet::Legacy => "legacy",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "revised" => Some(RuleSet::Revised),
            "legacy" => Some(RuleSet::Legacy),
            _ => None,
        }
    }
}

/// Challenge tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Session ===
    /// Seconds on the countdown
    pub game_time_secs: u32,
    /// Correct clicks needed to pass
    pub required_score: u32,
    /// Attempt cap (legacy rules only)
    pub max_attempts: u32,
    pub rules: RuleSet,

    // === Motion ===
    /// Pixels per motion tick
    pub speed: f32,
    /// Shape bounding box edge, pixels
    pub shape_size: f32,
    /// Initial play area
    pub container_width: f32,
    pub container_height: f32,

    // === Clocks ===
    pub motion_tick_ms: u32,
    pub countdown_tick_ms: u32,
    /// How long the target name stays up after each re-roll
    pub reveal_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_time_secs: GAME_TIME,
            required_score: REQUIRED_SCORE,
            max_attempts: MAX_ATTEMPTS,
            rules: RuleSet::Revised,

            speed: SPEED,
            shape_size: SHAPE_SIZE,
            container_width: CONTAINER_WIDTH,
            container_height: CONTAINER_HEIGHT,

            motion_tick_ms: MOTION_TICK_MS,
            countdown_tick_ms: COUNTDOWN_TICK_MS,
            reveal_ms: REVEAL_MS,
        }
    }
}

impl Settings {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ChallengeError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ChallengeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ChallengeError> {
        if self.game_time_secs == 0 {
            return Err(ChallengeError::InvalidConfig("game_time_secs must be positive"));
        }
        if self.required_score == 0 {
            return Err(ChallengeError::InvalidConfig("required_score must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(ChallengeError::InvalidConfig("max_attempts must be positive"));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ChallengeError::InvalidConfig("speed must be a positive number"));
        }
        if !(self.shape_size.is_finite() && self.shape_size > 0.0) {
            return Err(ChallengeError::InvalidConfig("shape_size must be a positive number"));
        }
        if !(self.container_width.is_finite() && self.container_width > 0.0)
            || !(self.container_height.is_finite() && self.container_height > 0.0)
        {
            return Err(ChallengeError::InvalidConfig("container size must be positive"));
        }
        if self.motion_tick_ms == 0 || self.countdown_tick_ms == 0 || self.reveal_ms == 0 {
            return Err(ChallengeError::InvalidConfig("clock periods must be positive"));
        }
        Ok(())
    }

    pub fn container(&self) -> Bounds {
        Bounds::new(self.container_width, self.container_height)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "goptcha_settings";

    /// Environment variable naming a JSON settings file (native only)
    pub const SETTINGS_ENV: &'static str = "GOPTCHA_SETTINGS";

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Option<web_sys::Storage> {
        match web_sys::window()?.local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("LocalStorage unavailable: {:?}", e);
                None
            }
        }
    }

    /// Stored settings, or defaults when nothing usable is stored (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = Self::storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());
        match stored.map(|json| Self::from_json(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded {} settings from LocalStorage", settings.rules.as_str());
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Persist to LocalStorage (WASM only). Failures are logged, not fatal.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = Self::storage() else {
            return;
        };
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode settings: {}", e);
                return;
            }
        };
        match storage.set_item(Self::STORAGE_KEY, &json) {
            Ok(()) => log::info!("Stored {} settings", self.rules.as_str()),
            Err(e) => log::warn!("Failed to store settings: {:?}", e),
        }
    }

    /// Load from the file named by `GOPTCHA_SETTINGS`, or defaults when unset
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let path = std::env::var(Self::SETTINGS_ENV).ok();
        Self::load_or_default(path.as_deref().map(std::path::Path::new))
    }

    /// Settings from `path`; defaults when there is no path or the file is
    /// missing or rejected
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: Option<&std::path::Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, ChallengeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ChallengeError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Write to the file named by `GOPTCHA_SETTINGS`; no-op when unset
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        let Ok(path) = std::env::var(Self::SETTINGS_ENV) else {
            return;
        };
        match self.save_to(std::path::Path::new(&path)) {
            Ok(()) => log::info!("Settings saved to {}", path),
            Err(e) => log::warn!("Failed to save settings to {}: {}", path, e),
        }
    }
}
