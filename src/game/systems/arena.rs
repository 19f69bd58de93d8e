//! Arena evolution
//!
//! Runs once per playing tick: latches sudden death, advances the linear
//! shrink, or evolves the centrifuge circle when that mode is active.

use tracing::debug;

use crate::config::SimConfig;
use crate::game::events::SimEvent;
use crate::game::state::{Arena, Centrifuge};

/// Advance arena shape for one playing tick
pub fn update(
    arena: &mut Arena,
    config: &SimConfig,
    round: u32,
    round_time_ms: f64,
    alive_count: usize,
    dt_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    if let Some(centrifuge) = arena.centrifuge.as_mut() {
        evolve_centrifuge(centrifuge, config);
        return;
    }

    let cfg = &config.arena;

    if !arena.sudden_death_active
        && alive_count <= cfg.sudden_death_max_alive
        && round_time_ms >= cfg.sudden_death_start_ms
    {
        arena.sudden_death_active = true;
        arena.sudden_death_started_at = Some(round_time_ms);
        debug!("Sudden death in round {} at {:.0}ms", round, round_time_ms);
        events.push(SimEvent::SuddenDeathStarted { round });
    }

    if round_time_ms >= cfg.shrink_start_ms {
        arena.is_shrinking = true;
        let speed = if arena.sudden_death_active {
            cfg.sudden_death_shrink_multiplier
        } else {
            arena.shrink_speed_multiplier
        };
        arena.shrink_progress = (arena.shrink_progress + dt_ms * speed / cfg.shrink_duration_ms).min(1.0);
    }

    arena.recompute_bounds();
}

/// Ramp spin and outward force, shrink the circle toward its floor
fn evolve_centrifuge(centrifuge: &mut Centrifuge, config: &SimConfig) {
    let cfg = &config.centrifuge;
    centrifuge.speed = (centrifuge.speed + cfg.spin_accel).min(cfg.max_spin);
    centrifuge.rotation = (centrifuge.rotation + centrifuge.speed) % std::f64::consts::TAU;
    centrifuge.force = (centrifuge.force + cfg.force_ramp).min(cfg.max_force);
    centrifuge.radius = (centrifuge.radius - cfg.shrink_per_tick).max(cfg.min_radius);
}
