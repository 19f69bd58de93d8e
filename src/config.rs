//! Simulation configuration
//!
//! Loaded once at startup and never mutated afterwards. The driver shares it
//! as `Arc<SimConfig>` and hands `&SimConfig` to every per-tick call.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::constants::{arena, centrifuge, dash, escalation, physics, round, timing};
use crate::game::modifiers::{default_modifier_table, Modifier};

/// Path of an optional JSON config file
pub const CONFIG_PATH_ENV: &str = "ARENA_CONFIG";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fixed-timestep driver settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub fixed_step_ms: f64,
    pub max_frame_ms: f64,
    pub max_ticks_per_frame: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fixed_step_ms: timing::FIXED_STEP_MS,
            max_frame_ms: timing::MAX_FRAME_MS,
            max_ticks_per_frame: timing::MAX_TICKS_PER_FRAME,
        }
    }
}

/// Actor body and movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub player_radius: f64,
    pub player_mass: f64,
    pub max_speed: f64,
    pub acceleration: f64,
    pub friction: f64,
    pub dash_friction: f64,
    pub bounce: f64,
    pub push_force: f64,
    pub idle_speed: f64,
    pub spawn_radius_fraction: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            player_radius: physics::PLAYER_RADIUS,
            player_mass: physics::PLAYER_MASS,
            max_speed: physics::MAX_SPEED,
            acceleration: physics::ACCELERATION,
            friction: physics::FRICTION,
            dash_friction: physics::DASH_FRICTION,
            bounce: physics::BOUNCE,
            push_force: physics::PUSH_FORCE,
            idle_speed: physics::IDLE_SPEED,
            spawn_radius_fraction: physics::SPAWN_RADIUS_FRACTION,
        }
    }
}

/// Dash timing and boost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashConfig {
    pub duration_ms: f64,
    pub cooldown_ms: f64,
    pub speed_multiplier: f64,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            duration_ms: dash::DURATION_MS,
            cooldown_ms: dash::COOLDOWN_MS,
            speed_multiplier: dash::SPEED_MULTIPLIER,
        }
    }
}

/// Round/match lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoundConfig {
    pub wins_to_match: u32,
    pub countdown_secs: u32,
    pub round_end_delay_ms: f64,
    pub match_end_delay_ms: f64,
    pub no_modifier_chance: f64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            wins_to_match: round::WINS_TO_MATCH,
            countdown_secs: round::COUNTDOWN_SECS,
            round_end_delay_ms: round::ROUND_END_DELAY_MS,
            match_end_delay_ms: round::MATCH_END_DELAY_MS,
            no_modifier_chance: round::NO_MODIFIER_CHANCE,
        }
    }
}

/// Time-driven escalation thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EscalationConfig {
    pub ramp_start_ms: f64,
    pub ramp_duration_ms: f64,
    pub base_multiplier: f64,
    pub max_multiplier: f64,
    pub instability_start_ms: f64,
    pub chaos_ramp_ms: f64,
    pub chaos_max_force: f64,
    pub final_countdown_start_ms: f64,
    pub final_countdown_duration_ms: f64,
    pub idle_threshold_ms: f64,
    pub idle_push_force: f64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            ramp_start_ms: escalation::RAMP_START_MS,
            ramp_duration_ms: escalation::RAMP_DURATION_MS,
            base_multiplier: escalation::BASE_MULTIPLIER,
            max_multiplier: escalation::MAX_MULTIPLIER,
            instability_start_ms: escalation::INSTABILITY_START_MS,
            chaos_ramp_ms: escalation::CHAOS_RAMP_MS,
            chaos_max_force: escalation::CHAOS_MAX_FORCE,
            final_countdown_start_ms: escalation::FINAL_COUNTDOWN_START_MS,
            final_countdown_duration_ms: escalation::FINAL_COUNTDOWN_DURATION_MS,
            idle_threshold_ms: escalation::IDLE_THRESHOLD_MS,
            idle_push_force: escalation::IDLE_PUSH_FORCE,
        }
    }
}

/// Rectangular arena, shrink and sudden death
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
    pub shrink_start_ms: f64,
    pub shrink_duration_ms: f64,
    pub min_size_percent: f64,
    pub sudden_death_start_ms: f64,
    pub sudden_death_max_alive: usize,
    pub sudden_death_shrink_multiplier: f64,
    pub sudden_death_pull: f64,
    pub sudden_death_pull_falloff: f64,
    pub sudden_death_max_pull_multiplier: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: arena::WIDTH,
            height: arena::HEIGHT,
            shrink_start_ms: arena::SHRINK_START_MS,
            shrink_duration_ms: arena::SHRINK_DURATION_MS,
            min_size_percent: arena::MIN_SIZE_PERCENT,
            sudden_death_start_ms: arena::SUDDEN_DEATH_START_MS,
            sudden_death_max_alive: arena::SUDDEN_DEATH_MAX_ALIVE,
            sudden_death_shrink_multiplier: arena::SUDDEN_DEATH_SHRINK_MULTIPLIER,
            sudden_death_pull: arena::SUDDEN_DEATH_PULL,
            sudden_death_pull_falloff: arena::SUDDEN_DEATH_PULL_FALLOFF,
            sudden_death_max_pull_multiplier: arena::SUDDEN_DEATH_MAX_PULL_MULTIPLIER,
        }
    }
}

/// Circular centrifuge finale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CentrifugeConfig {
    pub enabled: bool,
    pub start_ms: f64,
    pub min_radius: f64,
    pub shrink_per_tick: f64,
    pub spin_accel: f64,
    pub max_spin: f64,
    pub force_ramp: f64,
    pub max_force: f64,
    pub spin_coupling: f64,
}

impl Default for CentrifugeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_ms: centrifuge::START_MS,
            min_radius: centrifuge::MIN_RADIUS,
            shrink_per_tick: centrifuge::SHRINK_PER_TICK,
            spin_accel: centrifuge::SPIN_ACCEL,
            max_spin: centrifuge::MAX_SPIN,
            force_ramp: centrifuge::FORCE_RAMP,
            max_force: centrifuge::MAX_FORCE,
            spin_coupling: centrifuge::SPIN_COUPLING,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub timing: TimingConfig,
    pub physics: PhysicsConfig,
    pub dash: DashConfig,
    pub round: RoundConfig,
    pub escalation: EscalationConfig,
    pub arena: ArenaConfig,
    pub centrifuge: CentrifugeConfig,
    pub modifiers: Vec<Modifier>,
    /// Seed for modifier selection; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            physics: PhysicsConfig::default(),
            dash: DashConfig::default(),
            round: RoundConfig::default(),
            escalation: EscalationConfig::default(),
            arena: ArenaConfig::default(),
            centrifuge: CentrifugeConfig::default(),
            modifiers: default_modifier_table(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Load config from the optional JSON file and environment, falling back
    /// to defaults for anything missing or invalid
    pub fn load_or_default() -> Self {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => match Self::from_json_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("{}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Err(e) = config.apply_env(false) {
            tracing::warn!("{}", e);
        }

        if let Err(e) = config.validate() {
            tracing::warn!("{}, using defaults", e);
            return Self::default();
        }

        config
    }

    /// Like `load_or_default`, but any bad input is an error
    pub fn from_env_strict() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_json_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(true)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    fn apply_env(&mut self, strict: bool) -> Result<(), ConfigError> {
        if let Some(wins) = env_override::<u32>("ARENA_WINS_TO_MATCH", strict)? {
            if wins > 0 {
                self.round.wins_to_match = wins;
            } else if strict {
                return Err(ConfigError::Invalid("ARENA_WINS_TO_MATCH must be > 0".into()));
            } else {
                tracing::warn!("ARENA_WINS_TO_MATCH must be > 0, using default");
            }
        }

        if let Some(secs) = env_override::<u32>("ARENA_COUNTDOWN_SECS", strict)? {
            self.round.countdown_secs = secs;
        }

        if let Some(seed) = env_override::<u64>("ARENA_SEED", strict)? {
            self.seed = Some(seed);
        }

        if let Some(width) = env_override::<f64>("ARENA_WIDTH", strict)? {
            self.arena.width = width;
        }

        if let Some(height) = env_override::<f64>("ARENA_HEIGHT", strict)? {
            self.arena.height = height;
        }

        Ok(())
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        let e = &self.escalation;
        let a = &self.arena;

        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.timing.fixed_step_ms > 0.0) {
            return invalid("fixed_step_ms must be > 0");
        }
        if self.timing.max_ticks_per_frame == 0 {
            return invalid("max_ticks_per_frame must be at least 1");
        }
        if !(p.player_radius > 0.0) || !(p.player_mass > 0.0) {
            return invalid("player radius and mass must be > 0");
        }
        if !(p.max_speed > 0.0) || p.acceleration < 0.0 {
            return invalid("max_speed must be > 0 and acceleration >= 0");
        }
        if !(p.friction > 0.0 && p.friction <= 1.0) || !(p.dash_friction > 0.0 && p.dash_friction <= 1.0) {
            return invalid("friction values must be in (0, 1]");
        }
        if self.dash.duration_ms <= 0.0 || self.dash.cooldown_ms < 0.0 || self.dash.speed_multiplier <= 0.0 {
            return invalid("dash duration and speed multiplier must be > 0, cooldown >= 0");
        }
        if self.round.wins_to_match == 0 {
            return invalid("wins_to_match must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.round.no_modifier_chance) {
            return invalid("no_modifier_chance must be in [0, 1]");
        }
        if !(a.width > 0.0) || !(a.height > 0.0) {
            return invalid("arena width and height must be > 0");
        }
        if !(a.min_size_percent > 0.0 && a.min_size_percent <= 1.0) {
            return invalid("min_size_percent must be in (0, 1]");
        }
        if a.shrink_duration_ms <= 0.0 || e.ramp_duration_ms <= 0.0 || e.chaos_ramp_ms <= 0.0 {
            return invalid("shrink, ramp and chaos durations must be > 0");
        }
        if e.ramp_start_ms > e.instability_start_ms {
            return invalid("ramp_start_ms must not exceed instability_start_ms");
        }
        if e.final_countdown_start_ms < e.ramp_start_ms {
            return invalid("final_countdown_start_ms must not precede ramp_start_ms");
        }
        if e.final_countdown_duration_ms < 0.0 {
            return invalid("final_countdown_duration_ms must be >= 0");
        }
        if self.centrifuge.min_radius <= 0.0 {
            return invalid("centrifuge min_radius must be > 0");
        }
        for modifier in &self.modifiers {
            if !modifier.effects.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "modifier '{}' has a non-positive multiplier",
                    modifier.name
                )));
            }
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(key: &'static str, strict: bool) -> Result<Option<T>, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(_) if strict => Err(ConfigError::InvalidEnv { key, value: raw }),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.round.wins_to_match, 3);
        assert_eq!(config.round.countdown_secs, 3);
        assert!(!config.modifiers.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "round": { "wins_to_match": 5 }, "arena": { "width": 1000.0 }, "seed": 7 }"#,
        )
        .unwrap();
        assert_eq!(config.round.wins_to_match, 5);
        assert_eq!(config.round.countdown_secs, 3);
        assert_eq!(config.arena.width, 1000.0);
        assert_eq!(config.arena.height, 600.0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_wins() {
        let mut config = SimConfig::default();
        config.round.wins_to_match = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_friction() {
        let mut config = SimConfig::default();
        config.physics.friction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let mut config = SimConfig::default();
        config.escalation.final_countdown_start_ms = 1000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_modifier() {
        let mut config = SimConfig::default();
        config.modifiers[0].effects.speed = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default() {
        let config = SimConfig::load_or_default();
        assert!(config.validate().is_ok());
    }
}
