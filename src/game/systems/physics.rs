//! Per-actor movement: dash timers, input acceleration, friction, speed clamp,
//! integration and idle tracking.
//!
//! Velocities are in units per tick and are added to the position once per
//! tick; `dt_ms` only drives the timers.

use crate::config::SimConfig;
use crate::game::constants::physics::{MAX_FRICTION, MIN_FRICTION};
use crate::game::modifiers::RoundModifiers;
use crate::game::state::{Actor, ActorInput};

/// Per-tick velocity retention after modifiers, always within
/// `[MIN_FRICTION, MAX_FRICTION]`
pub fn effective_friction(base: f64, multiplier: f64) -> f64 {
    let friction = base * multiplier;
    if friction.is_nan() {
        return MIN_FRICTION;
    }
    friction.clamp(MIN_FRICTION, MAX_FRICTION)
}

/// Speed cap for the actor's current state
pub fn max_speed(actor: &Actor, modifiers: &RoundModifiers, config: &SimConfig) -> f64 {
    let base = config.physics.max_speed * modifiers.speed;
    if actor.is_dashing {
        base * config.dash.speed_multiplier
    } else {
        base
    }
}

/// Advance one actor by one tick. Eliminated actors are left untouched.
pub fn update_actor(
    actor: &mut Actor,
    input: &ActorInput,
    modifiers: &RoundModifiers,
    config: &SimConfig,
    dt_ms: f64,
) {
    if !actor.alive {
        return;
    }

    if actor.dash_cooldown > 0.0 {
        actor.dash_cooldown = (actor.dash_cooldown - dt_ms).max(0.0);
    }

    if input.dash_requested {
        // Rejected silently when on cooldown or without a direction
        actor.start_dash(input.movement, config, modifiers.speed);
    }

    if actor.is_dashing {
        actor.dash_time_remaining -= dt_ms;
        if actor.dash_time_remaining <= 0.0 {
            actor.is_dashing = false;
            actor.dash_time_remaining = 0.0;
        }
    }

    // Dashes lock the direction; only normal movement steers
    if !actor.is_dashing && input.movement.magnitude_squared() > 0.0 {
        actor.velocity += input.movement * (config.physics.acceleration * modifiers.speed);
        actor.last_move_direction = input.movement.normalize();
    }

    let base_friction = if actor.is_dashing {
        config.physics.dash_friction
    } else {
        config.physics.friction
    };
    actor.velocity *= effective_friction(base_friction, modifiers.friction);
    actor.velocity = actor.velocity.limit(max_speed(actor, modifiers, config));

    actor.position += actor.velocity;

    update_idle(actor, config, dt_ms);
}

fn update_idle(actor: &mut Actor, config: &SimConfig, dt_ms: f64) {
    if actor.velocity.magnitude() < config.physics.idle_speed {
        actor.idle_time += dt_ms;
        if actor.idle_time >= config.escalation.idle_threshold_ms {
            actor.is_idle = true;
        }
    } else {
        actor.idle_time = 0.0;
        actor.is_idle = false;
    }
}
