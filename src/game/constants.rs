//! Default tuning values
//!
//! These seed `SimConfig::default()`. Physics quantities are per fixed tick,
//! timers are milliseconds of simulation time.

/// Simulation timing
pub mod timing {
    /// Simulation tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Fixed step in milliseconds
    pub const FIXED_STEP_MS: f64 = 1000.0 / TICK_RATE as f64;
    /// Largest frame delta accepted by the driver (longer frames are clamped)
    pub const MAX_FRAME_MS: f64 = 250.0;
    /// Maximum catch-up ticks per rendered frame
    pub const MAX_TICKS_PER_FRAME: u32 = 8;
}

/// Actor body and movement constants
pub mod physics {
    /// Collision radius of every actor
    pub const PLAYER_RADIUS: f64 = 20.0;
    /// Mass of every actor
    pub const PLAYER_MASS: f64 = 1.0;
    /// Maximum speed (units per tick) while not dashing
    pub const MAX_SPEED: f64 = 8.0;
    /// Acceleration applied per tick from full movement input
    pub const ACCELERATION: f64 = 0.6;
    /// Fraction of velocity retained per tick
    pub const FRICTION: f64 = 0.92;
    /// Velocity retention while dashing (less drag)
    pub const DASH_FRICTION: f64 = 0.98;
    /// Lower clamp for the effective friction after modifiers
    pub const MIN_FRICTION: f64 = 0.85;
    /// Upper clamp for the effective friction after modifiers
    pub const MAX_FRICTION: f64 = 0.995;
    /// Coefficient of restitution for actor/actor collisions
    pub const BOUNCE: f64 = 0.9;
    /// Base collision impulse multiplier
    pub const PUSH_FORCE: f64 = 1.4;
    /// Below this speed an actor counts as standing still
    pub const IDLE_SPEED: f64 = 0.5;
    /// Spawn ring radius as a fraction of the arena's half extent
    pub const SPAWN_RADIUS_FRACTION: f64 = 0.55;
}

/// Dash constants
pub mod dash {
    /// Dash length in milliseconds
    pub const DURATION_MS: f64 = 180.0;
    /// Time between dashes in milliseconds
    pub const COOLDOWN_MS: f64 = 1200.0;
    /// Dash speed relative to `physics::MAX_SPEED`
    pub const SPEED_MULTIPLIER: f64 = 2.4;
}

/// Round and match lifecycle
pub mod round {
    /// Round wins required to take the match
    pub const WINS_TO_MATCH: u32 = 3;
    /// Countdown before each round, in whole seconds
    pub const COUNTDOWN_SECS: u32 = 3;
    /// Length of one countdown step
    pub const COUNTDOWN_STEP_MS: f64 = 1000.0;
    /// Pause after a round ends
    pub const ROUND_END_DELAY_MS: f64 = 2500.0;
    /// Minimum time on the match-end screen before a restart is accepted
    pub const MATCH_END_DELAY_MS: f64 = 1500.0;
    /// Chance that a round after the first plays without a modifier
    pub const NO_MODIFIER_CHANCE: f64 = 0.4;
}

/// Time-driven escalation
pub mod escalation {
    /// Damage multiplier ramp start
    pub const RAMP_START_MS: f64 = 15_000.0;
    /// Damage multiplier ramp length
    pub const RAMP_DURATION_MS: f64 = 30_000.0;
    /// Damage multiplier before the ramp
    pub const BASE_MULTIPLIER: f64 = 1.0;
    /// Damage multiplier once the ramp completes
    pub const MAX_MULTIPLIER: f64 = 2.5;
    /// Chaos field activation time
    pub const INSTABILITY_START_MS: f64 = 40_000.0;
    /// Time for the chaos field to reach full strength
    pub const CHAOS_RAMP_MS: f64 = 5000.0;
    /// Chaos field strength cap (velocity added per tick)
    pub const CHAOS_MAX_FORCE: f64 = 0.35;
    /// Final countdown start
    pub const FINAL_COUNTDOWN_START_MS: f64 = 60_000.0;
    /// Final countdown length
    pub const FINAL_COUNTDOWN_DURATION_MS: f64 = 10_000.0;
    /// Idle time before the idle push kicks in
    pub const IDLE_THRESHOLD_MS: f64 = 5000.0;
    /// Outward push applied to idle actors each tick
    pub const IDLE_PUSH_FORCE: f64 = 0.12;
}

/// Rectangular arena and sudden death
pub mod arena {
    /// Arena width
    pub const WIDTH: f64 = 800.0;
    /// Arena height
    pub const HEIGHT: f64 = 600.0;
    /// Round time at which shrinking starts
    pub const SHRINK_START_MS: f64 = 20_000.0;
    /// Time for a full shrink at normal speed
    pub const SHRINK_DURATION_MS: f64 = 40_000.0;
    /// Smallest arena extent as a fraction of the original
    pub const MIN_SIZE_PERCENT: f64 = 0.45;
    /// Round time after which sudden death can trigger
    pub const SUDDEN_DEATH_START_MS: f64 = 30_000.0;
    /// Alive count at or below which sudden death can trigger
    pub const SUDDEN_DEATH_MAX_ALIVE: usize = 2;
    /// Shrink speed while sudden death is active
    pub const SUDDEN_DEATH_SHRINK_MULTIPLIER: f64 = 5.0;
    /// Base centripetal pull per tick
    pub const SUDDEN_DEATH_PULL: f64 = 0.05;
    /// Distance over which the pull multiplier grows by one
    pub const SUDDEN_DEATH_PULL_FALLOFF: f64 = 100.0;
    /// Cap on the distance-based pull multiplier
    pub const SUDDEN_DEATH_MAX_PULL_MULTIPLIER: f64 = 3.0;
}

/// Circular centrifuge finale
pub mod centrifuge {
    /// Round time at which the centrifuge can activate
    pub const START_MS: f64 = 50_000.0;
    /// Smallest circle radius
    pub const MIN_RADIUS: f64 = 140.0;
    /// Radius lost per tick
    pub const SHRINK_PER_TICK: f64 = 0.08;
    /// Rotation speed gained per tick (radians/tick²)
    pub const SPIN_ACCEL: f64 = 0.0002;
    /// Rotation speed cap (radians/tick)
    pub const MAX_SPIN: f64 = 0.04;
    /// Outward force gained per tick
    pub const FORCE_RAMP: f64 = 0.002;
    /// Outward force cap
    pub const MAX_FORCE: f64 = 0.3;
    /// Fraction of the floor's surface speed transferred to actors
    pub const SPIN_COUPLING: f64 = 0.05;
}

/// Bot input tuning
pub mod ai {
    /// Time between bot decisions in milliseconds
    pub const DECISION_INTERVAL_MS: f64 = 250.0;
    /// Distance at which a bot tries to dash into its target
    pub const DASH_RANGE: f64 = 140.0;
    /// Fraction of the arena half extent beyond which bots head back to center
    pub const EDGE_CAUTION: f64 = 0.8;
}

/// Maximum simultaneous actors
pub const MAX_ACTORS: usize = 4;
