//! Read-only view of the simulation for renderers and tooling

use serde::{Deserialize, Serialize};

use crate::game::modifiers::RoundModifiers;
use crate::game::round::RoundManager;
use crate::game::state::{Actor, ActorId, Arena, BoundaryShape, RoundPhase};
use crate::util::vec2::Vec2;

/// Everything a renderer needs after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub tick: u64,
    pub sim_time_ms: f64,
    pub actors: Vec<ActorSnapshot>,
    pub arena: ArenaSnapshot,
    pub round: RoundSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub color_index: u8,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
    pub alive: bool,
    pub is_dashing: bool,
    pub is_idle: bool,
    pub wins: u32,
    #[serde(default)]
    pub eliminated_at: Option<f64>,
}

impl From<&Actor> for ActorSnapshot {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            color_index: actor.color_index,
            position: actor.position,
            velocity: actor.velocity,
            radius: actor.radius,
            alive: actor.alive,
            is_dashing: actor.is_dashing,
            is_idle: actor.is_idle,
            wins: actor.wins,
            eliminated_at: actor.eliminated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub shape: BoundaryShape,
    pub center: Vec2,
    pub shrink_progress: f64,
    pub is_shrinking: bool,
    pub sudden_death: bool,
    /// Floor rotation while the centrifuge is spinning
    #[serde(default)]
    pub centrifuge_rotation: Option<f64>,
}

impl From<&Arena> for ArenaSnapshot {
    fn from(arena: &Arena) -> Self {
        Self {
            shape: arena.shape(),
            center: arena.center,
            shrink_progress: arena.shrink_progress,
            is_shrinking: arena.is_shrinking,
            sudden_death: arena.sudden_death_active,
            centrifuge_rotation: arena.centrifuge.map(|c| c.rotation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub current_round: u32,
    pub round_time_ms: f64,
    pub damage_multiplier: f64,
    pub modifier: Option<String>,
    pub modifiers: RoundModifiers,
    pub countdown: Option<u32>,
    pub final_countdown: Option<u32>,
    pub instability: bool,
    pub round_winner: Option<ActorId>,
    pub winner: Option<ActorId>,
}

impl From<&RoundManager> for RoundSnapshot {
    fn from(round: &RoundManager) -> Self {
        Self {
            phase: round.phase(),
            current_round: round.current_round(),
            round_time_ms: round.round_time_ms(),
            damage_multiplier: round.damage_multiplier(),
            modifier: round.current_modifier().map(|m| m.name.clone()),
            modifiers: *round.modifiers(),
            countdown: round.countdown_value(),
            final_countdown: round.final_countdown_value(),
            instability: round.instability_active(),
            round_winner: round.round_winner(),
            winner: round.winner(),
        }
    }
}

impl SimSnapshot {
    pub fn capture(tick: u64, sim_time_ms: f64, actors: &[Actor], arena: &Arena, round: &RoundManager) -> Self {
        Self {
            tick,
            sim_time_ms,
            actors: actors.iter().map(ActorSnapshot::from).collect(),
            arena: ArenaSnapshot::from(arena),
            round: RoundSnapshot::from(round),
        }
    }

    pub fn alive_count(&self) -> usize {
        self.actors.iter().filter(|a| a.alive).count()
    }
}
