//! Bot input source
//!
//! Stands in for the input collaborator on headless runs and benches. Each
//! bot re-decides on a jittered timer and steers every tick from that
//! decision: chase the nearest opponent, circle the center, or head back
//! inside when close to the edge.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::constants::ai::{DASH_RANGE, DECISION_INTERVAL_MS, EDGE_CAUTION};
use crate::game::game_loop::{InputSource, TickView};
use crate::game::state::{Actor, ActorId, ActorInput, BoundaryShape};
use crate::util::vec2::Vec2;

/// AI behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiBehavior {
    /// Run at the nearest living opponent
    Chase,
    /// Strafe around the center
    Circle,
    /// Get away from the edge
    Recenter,
}

/// AI personality traits
#[derive(Debug, Clone)]
pub struct AiPersonality {
    /// How likely to pick a chase (0.0-1.0)
    pub aggression: f64,
    /// How likely to dash when in range (0.0-1.0)
    pub dash_eagerness: f64,
    /// Edge proximity that triggers a retreat
    pub caution: f64,
}

impl AiPersonality {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            aggression: rng.gen_range(0.5..0.95),
            dash_eagerness: rng.gen_range(0.3..0.9),
            caution: EDGE_CAUTION * rng.gen_range(0.9..1.1),
        }
    }
}

impl Default for AiPersonality {
    fn default() -> Self {
        Self {
            aggression: 0.75,
            dash_eagerness: 0.6,
            caution: EDGE_CAUTION,
        }
    }
}

/// AI state for a bot
#[derive(Debug, Clone)]
pub struct AiState {
    pub behavior: AiBehavior,
    pub target_id: Option<ActorId>,
    pub decision_timer: f64,
    pub wants_dash: bool,
    /// Orbit direction for `Circle` (+1 or -1)
    pub spin: f64,
    pub personality: AiPersonality,
}

impl AiState {
    pub fn new(personality: AiPersonality) -> Self {
        Self {
            behavior: AiBehavior::Circle,
            target_id: None,
            decision_timer: 0.0,
            wants_dash: false,
            spin: 1.0,
            personality,
        }
    }
}

/// Drives every actor it is asked about with simple bot logic
pub struct BotInputs {
    states: HashMap<ActorId, AiState>,
    rng: StdRng,
}

impl BotInputs {
    pub fn new(seed: u64) -> Self {
        Self {
            states: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Register a bot with a fixed personality; unknown actors get a random one
    pub fn register(&mut self, actor_id: ActorId, personality: AiPersonality) {
        self.states.insert(actor_id, AiState::new(personality));
    }

    pub fn get(&self, actor_id: ActorId) -> Option<&AiState> {
        self.states.get(&actor_id)
    }
}

impl InputSource for BotInputs {
    fn input_for(&mut self, actor: &Actor, view: &TickView<'_>) -> ActorInput {
        if !actor.alive {
            return ActorInput::default();
        }

        let rng = &mut self.rng;
        let ai = self
            .states
            .entry(actor.id)
            .or_insert_with(|| AiState::new(AiPersonality::random(&mut *rng)));

        ai.decision_timer -= view.dt_ms;
        if ai.decision_timer <= 0.0 {
            ai.decision_timer = DECISION_INTERVAL_MS * (1.0 + rng.gen_range(-0.2..0.2));
            decide_behavior(ai, actor, view, rng);
        }

        execute_behavior(ai, actor, view)
    }
}

/// How close `pos` is to the boundary: 0.0 at the center, 1.0 on the edge
pub fn edge_proximity(shape: &BoundaryShape, pos: Vec2) -> f64 {
    match *shape {
        BoundaryShape::Rect(b) => {
            let cx = (b.left + b.right) / 2.0;
            let cy = (b.top + b.bottom) / 2.0;
            let px = (pos.x - cx).abs() / (b.width() / 2.0);
            let py = (pos.y - cy).abs() / (b.height() / 2.0);
            px.max(py)
        }
        BoundaryShape::Circle { center, radius } => pos.distance_to(center) / radius,
    }
}

fn nearest_opponent<'a>(actor: &Actor, actors: &'a [Actor]) -> Option<(&'a Actor, f64)> {
    actors
        .iter()
        .filter(|other| other.alive && other.id != actor.id)
        .map(|other| (other, actor.position.distance_to(other.position)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

fn decide_behavior(ai: &mut AiState, actor: &Actor, view: &TickView<'_>, rng: &mut StdRng) {
    ai.wants_dash = false;

    let shape = view.arena.shape();
    if edge_proximity(&shape, actor.position) > ai.personality.caution {
        ai.behavior = AiBehavior::Recenter;
        ai.target_id = None;
        return;
    }

    if let Some((target, distance)) = nearest_opponent(actor, view.actors) {
        if rng.gen::<f64>() < ai.personality.aggression {
            ai.behavior = AiBehavior::Chase;
            ai.target_id = Some(target.id);
            ai.wants_dash = distance < DASH_RANGE && rng.gen::<f64>() < ai.personality.dash_eagerness;
            return;
        }
    }

    ai.behavior = AiBehavior::Circle;
    ai.target_id = None;
    if rng.gen_bool(0.2) {
        ai.spin = -ai.spin;
    }
}

fn execute_behavior(ai: &mut AiState, actor: &Actor, view: &TickView<'_>) -> ActorInput {
    let to_center = view.arena.center - actor.position;

    let movement = match ai.behavior {
        AiBehavior::Recenter => to_center.normalize(),
        AiBehavior::Circle => {
            let tangent = to_center.perpendicular().normalize() * ai.spin;
            (tangent + to_center.normalize() * 0.3).normalize()
        }
        AiBehavior::Chase => {
            let target = ai
                .target_id
                .and_then(|id| view.actors.iter().find(|a| a.id == id && a.alive));
            match target {
                Some(t) => {
                    // Lead the target a little
                    let predicted = t.position + t.velocity * 4.0;
                    (predicted - actor.position).normalize()
                }
                None => {
                    ai.behavior = AiBehavior::Circle;
                    to_center.normalize()
                }
            }
        }
    };

    let dash_requested = ai.wants_dash && actor.can_dash() && !movement.is_zero();
    if dash_requested {
        ai.wants_dash = false;
    }

    ActorInput::new(movement, dash_requested)
}
