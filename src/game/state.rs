//! Simulation state definitions
//!
//! Actors and the arena are peers owned by the driver; the round manager
//! reads and drives them through explicit calls each tick.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::{ArenaConfig, CentrifugeConfig, PhysicsConfig, SimConfig};
use crate::game::constants::MAX_ACTORS;
use crate::game::modifiers::RoundModifiers;
use crate::util::vec2::Vec2;

/// Actor identifier (slot index, 0..MAX_ACTORS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u8);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Actor list sized for the maximum actor count
pub type Actors = SmallVec<[Actor; MAX_ACTORS]>;

/// Per-tick input from the input collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorInput {
    /// Expected pre-normalized (magnitude <= 1); used as-is
    pub movement: Vec2,
    /// Dash along `movement` if possible
    pub dash_requested: bool,
}

impl ActorInput {
    pub fn new(movement: Vec2, dash_requested: bool) -> Self {
        Self {
            movement,
            dash_requested,
        }
    }
}

/// A player-controlled body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Palette index for the renderer
    pub color_index: u8,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
    pub mass: f64,
    pub alive: bool,
    pub is_dashing: bool,
    /// Remaining dash time (ms); > 0 whenever `is_dashing`
    pub dash_time_remaining: f64,
    /// Remaining cooldown before the next dash (ms)
    pub dash_cooldown: f64,
    /// Direction of the last nonzero movement input
    pub last_move_direction: Vec2,
    /// Time spent below the idle speed (ms)
    pub idle_time: f64,
    pub is_idle: bool,
    /// Round wins this match; survives `reset`
    pub wins: u32,
    pub spawn_position: Vec2,
    /// Round time of elimination, for the ghost render window
    pub eliminated_at: Option<f64>,
}

impl Actor {
    pub fn new(id: ActorId, spawn_position: Vec2, physics: &PhysicsConfig) -> Self {
        Self {
            id,
            color_index: id.0,
            position: spawn_position,
            velocity: Vec2::ZERO,
            radius: physics.player_radius,
            mass: physics.player_mass,
            alive: true,
            is_dashing: false,
            dash_time_remaining: 0.0,
            dash_cooldown: 0.0,
            last_move_direction: Vec2::RIGHT,
            idle_time: 0.0,
            is_idle: false,
            wins: 0,
            spawn_position,
            eliminated_at: None,
        }
    }

    /// Reinitialize for a new round, keeping `wins`
    pub fn reset(&mut self) {
        self.position = self.spawn_position;
        self.velocity = Vec2::ZERO;
        self.alive = true;
        self.is_dashing = false;
        self.dash_time_remaining = 0.0;
        self.dash_cooldown = 0.0;
        self.last_move_direction = Vec2::RIGHT;
        self.idle_time = 0.0;
        self.is_idle = false;
        self.eliminated_at = None;
    }

    /// Knock the actor out; no-op if already eliminated
    pub fn eliminate(&mut self, now_ms: f64) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.velocity = Vec2::ZERO;
        self.is_dashing = false;
        self.dash_time_remaining = 0.0;
        self.eliminated_at = Some(now_ms);
    }

    pub fn can_dash(&self) -> bool {
        self.alive && !self.is_dashing && self.dash_cooldown <= 0.0
    }

    /// Start a dash along `direction`. Returns false (and changes nothing)
    /// when a dash is not possible or `direction` is zero.
    pub fn start_dash(&mut self, direction: Vec2, config: &SimConfig, speed_modifier: f64) -> bool {
        if !self.can_dash() || direction.is_zero() {
            return false;
        }
        let dir = direction.normalize();
        self.is_dashing = true;
        self.dash_time_remaining = config.dash.duration_ms;
        self.dash_cooldown = config.dash.cooldown_ms;
        self.velocity = dir * (config.physics.max_speed * config.dash.speed_multiplier * speed_modifier);
        self.last_move_direction = dir;
        self.idle_time = 0.0;
        self.is_idle = false;
        true
    }
}

/// Axis-aligned rectangle in arena coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn from_center(center: Vec2, half_width: f64, half_height: f64) -> Self {
        Self {
            left: center.x - half_width,
            right: center.x + half_width,
            top: center.y - half_height,
            bottom: center.y + half_height,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Active boundary topology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryShape {
    Rect(Bounds),
    Circle { center: Vec2, radius: f64 },
}

impl BoundaryShape {
    /// Any part of the body crosses the boundary
    pub fn is_out_of_bounds(&self, pos: Vec2, radius: f64) -> bool {
        match *self {
            BoundaryShape::Rect(b) => {
                pos.x - radius < b.left
                    || pos.x + radius > b.right
                    || pos.y - radius < b.top
                    || pos.y + radius > b.bottom
            }
            BoundaryShape::Circle { center, radius: r } => pos.distance_to(center) + radius > r,
        }
    }

    /// The whole body is past the boundary
    pub fn is_eliminated(&self, pos: Vec2, radius: f64) -> bool {
        match *self {
            BoundaryShape::Rect(b) => {
                pos.x + radius < b.left
                    || pos.x - radius > b.right
                    || pos.y + radius < b.top
                    || pos.y - radius > b.bottom
            }
            BoundaryShape::Circle { center, radius: r } => pos.distance_to(center) - radius > r,
        }
    }
}

/// Circular finale state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centrifuge {
    pub radius: f64,
    /// Floor rotation (radians), for rendering
    pub rotation: f64,
    /// Rotation speed (radians/tick)
    pub speed: f64,
    /// Outward force at the rim
    pub force: f64,
}

/// Arena geometry and round-scoped escalation flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub bounds: Bounds,
    pub original_bounds: Bounds,
    pub center: Vec2,
    pub min_size_percent: f64,
    /// 0.0 (full size) ..= 1.0 (shrink floor)
    pub shrink_progress: f64,
    pub is_shrinking: bool,
    pub sudden_death_active: bool,
    pub sudden_death_started_at: Option<f64>,
    /// Present while centrifuge mode is active
    pub centrifuge: Option<Centrifuge>,
    /// Centrifuge already used this round
    pub centrifuge_used: bool,
    pub arena_scale: f64,
    pub shrink_speed_multiplier: f64,
}

impl Arena {
    pub fn new(config: &ArenaConfig) -> Self {
        let original_bounds = Bounds {
            left: 0.0,
            right: config.width,
            top: 0.0,
            bottom: config.height,
        };
        Self {
            bounds: original_bounds,
            original_bounds,
            center: Vec2::new(config.width / 2.0, config.height / 2.0),
            min_size_percent: config.min_size_percent,
            shrink_progress: 0.0,
            is_shrinking: false,
            sudden_death_active: false,
            sudden_death_started_at: None,
            centrifuge: None,
            centrifuge_used: false,
            arena_scale: 1.0,
            shrink_speed_multiplier: 1.0,
        }
    }

    /// Restore original bounds and clear every round-scoped flag, modifiers included
    pub fn reset(&mut self) {
        self.shrink_progress = 0.0;
        self.is_shrinking = false;
        self.sudden_death_active = false;
        self.sudden_death_started_at = None;
        self.centrifuge = None;
        self.centrifuge_used = false;
        self.arena_scale = 1.0;
        self.shrink_speed_multiplier = 1.0;
        self.recompute_bounds();
    }

    /// Apply the round's arena-scale and shrink-speed effects
    pub fn apply_modifiers(&mut self, modifiers: &RoundModifiers) {
        self.arena_scale = modifiers.arena_scale;
        self.shrink_speed_multiplier = modifiers.shrink_speed;
        self.recompute_bounds();
    }

    /// Current extent factor relative to the original bounds
    pub fn scale_factor(&self) -> f64 {
        let shrink = 1.0 - self.shrink_progress.clamp(0.0, 1.0) * (1.0 - self.min_size_percent);
        shrink * self.arena_scale
    }

    /// Rebuild `bounds` around the fixed center
    pub fn recompute_bounds(&mut self) {
        let factor = self.scale_factor();
        self.bounds = Bounds::from_center(
            self.center,
            self.original_bounds.width() / 2.0 * factor,
            self.original_bounds.height() / 2.0 * factor,
        );
    }

    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    pub fn is_centrifuge(&self) -> bool {
        self.centrifuge.is_some()
    }

    pub fn shape(&self) -> BoundaryShape {
        match self.centrifuge {
            Some(c) => BoundaryShape::Circle {
                center: self.center,
                radius: c.radius,
            },
            None => BoundaryShape::Rect(self.bounds),
        }
    }

    pub fn is_out_of_bounds(&self, pos: Vec2, radius: f64) -> bool {
        self.shape().is_out_of_bounds(pos, radius)
    }

    pub fn is_eliminated(&self, pos: Vec2, radius: f64) -> bool {
        self.shape().is_eliminated(pos, radius)
    }

    pub fn distance_from_center(&self, pos: Vec2) -> f64 {
        pos.distance_to(self.center)
    }

    /// Switch to the circular topology. At most once per round, never during
    /// sudden death. Returns whether the switch happened.
    pub fn activate_centrifuge(&mut self, config: &CentrifugeConfig) -> bool {
        if self.centrifuge.is_some() || self.centrifuge_used || self.sudden_death_active {
            return false;
        }
        let radius = (self.bounds.width().min(self.bounds.height()) / 2.0).max(config.min_radius);
        self.centrifuge = Some(Centrifuge {
            radius,
            rotation: 0.0,
            speed: 0.0,
            force: 0.0,
        });
        self.centrifuge_used = true;
        true
    }

    /// Evenly spaced spawn points on a ring around the center, first slot on the left
    pub fn spawn_points(&self, count: usize, ring_fraction: f64) -> SmallVec<[Vec2; MAX_ACTORS]> {
        let ring = self.original_bounds.width().min(self.original_bounds.height()) / 2.0 * ring_fraction;
        (0..count)
            .map(|i| {
                let angle = std::f64::consts::PI + std::f64::consts::TAU * i as f64 / count.max(1) as f64;
                self.center + Vec2::from_angle(angle) * ring
            })
            .collect()
    }
}

/// Round/match lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RoundPhase {
    /// Before the match starts
    #[default]
    Waiting,
    /// Counting down to the next round
    Countdown,
    /// Round in progress
    Playing,
    /// Round decided, short pause before the next countdown
    RoundEnd,
    /// Match decided; terminal until restart
    MatchEnd,
}
