//! Environmental forces
//!
//! Layered on top of actor physics once per playing tick: the sudden-death
//! pull, the centrifuge push and spin, the chaos field and the idle push.
//! All of them add directly to velocity.

use crate::config::{ArenaConfig, CentrifugeConfig, SimConfig};
use crate::game::state::{Actor, Arena, Centrifuge};
use crate::util::vec2::Vec2;

/// Round-level inputs to the force model for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceContext {
    pub round_time_ms: f64,
    /// Current chaos field strength; 0.0 while instability is off
    pub chaos_intensity: f64,
}

/// Apply every active environmental force to the living actors
pub fn apply_environment(actors: &mut [Actor], arena: &Arena, ctx: &ForceContext, config: &SimConfig) {
    for actor in actors.iter_mut().filter(|a| a.alive) {
        let mut force = Vec2::ZERO;

        if arena.sudden_death_active {
            force += sudden_death_pull(actor.position, arena.center, &config.arena);
        }

        if let Some(centrifuge) = &arena.centrifuge {
            force += centrifuge_force(actor.position, arena.center, centrifuge, &config.centrifuge);
        }

        if ctx.chaos_intensity > 0.0 {
            force += chaos_force(ctx.round_time_ms, actor.position, ctx.chaos_intensity);
        }

        if actor.is_idle {
            force += idle_push(actor.position, arena.center, config.escalation.idle_push_force);
        }

        actor.velocity += force;
    }
}

/// Centripetal pull toward the center, growing with distance up to a cap
pub fn sudden_death_pull(position: Vec2, center: Vec2, config: &ArenaConfig) -> Vec2 {
    let offset = center - position;
    let distance = offset.magnitude();
    if distance == 0.0 {
        return Vec2::ZERO;
    }
    let multiplier = (distance / config.sudden_death_pull_falloff).min(config.sudden_death_max_pull_multiplier);
    offset.normalize() * (config.sudden_death_pull * multiplier)
}

/// Outward fling plus tangential drag from the spinning floor
pub fn centrifuge_force(position: Vec2, center: Vec2, centrifuge: &Centrifuge, config: &CentrifugeConfig) -> Vec2 {
    let offset = position - center;
    let distance = offset.magnitude();
    if distance == 0.0 || centrifuge.radius <= 0.0 {
        return Vec2::ZERO;
    }
    let outward = offset.normalize();
    let push = outward * (centrifuge.force * distance / centrifuge.radius);
    let spin = outward.perpendicular() * (centrifuge.speed * distance * config.spin_coupling);
    push + spin
}

/// Chaos field strength `elapsed_ms` after instability latched
pub fn chaos_intensity(elapsed_ms: f64, ramp_ms: f64, max_force: f64) -> f64 {
    if elapsed_ms <= 0.0 {
        return 0.0;
    }
    if ramp_ms <= 0.0 {
        return max_force;
    }
    (elapsed_ms / ramp_ms).min(1.0) * max_force
}

/// Deterministic swirl: a pure function of time and position with
/// magnitude exactly `intensity`
pub fn chaos_force(round_time_ms: f64, position: Vec2, intensity: f64) -> Vec2 {
    let t = round_time_ms / 1000.0;
    let angle = (t * 1.3 + position.x * 0.011).sin() * std::f64::consts::PI
        + (t * 0.7 + position.y * 0.013).cos() * std::f64::consts::PI;
    Vec2::from_angle(angle) * intensity
}

/// Push away from the center; an actor parked exactly on it goes right
pub fn idle_push(position: Vec2, center: Vec2, force: f64) -> Vec2 {
    let offset = position - center;
    let direction = if offset.is_zero() { Vec2::RIGHT } else { offset.normalize() };
    direction * force
}
