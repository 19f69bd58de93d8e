//! Fixed-timestep driver
//!
//! Accumulates scaled frame time and runs whole simulation ticks. Each tick
//! runs in a fixed order: round state, arena shape, input and physics,
//! environmental forces, collisions, eliminations, round end. Events
//! collected during a frame are published once the frame's ticks are done.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::config::SimConfig;
use crate::game::constants::MAX_ACTORS;
use crate::game::events::{EventBus, RoundEndReason, SimEvent};
use crate::game::match_result::{determine_result, MatchResult};
use crate::game::round::RoundManager;
use crate::game::snapshot::SimSnapshot;
use crate::game::state::{Actor, ActorId, ActorInput, Actors, Arena, RoundPhase};
use crate::game::systems::{arena as arena_system, collision, forces, physics};

/// Fewest actors a match can run with
pub const MIN_ACTORS: usize = 2;

/// What an input source may look at when producing a tick's input
#[derive(Debug, Clone, Copy)]
pub struct TickView<'a> {
    pub actors: &'a [Actor],
    pub arena: &'a Arena,
    pub round_time_ms: f64,
    pub dt_ms: f64,
}

/// Supplies one input per actor per tick
pub trait InputSource {
    /// Called once per tick before any `input_for`
    fn begin_tick(&mut self) {}

    fn input_for(&mut self, actor: &Actor, view: &TickView<'_>) -> ActorInput;
}

/// Scales real frame time before it reaches the accumulator
pub trait TimeScale {
    fn scale(&mut self, real_ms: f64) -> f64;

    /// Sees every published event, e.g. to react to knockouts
    fn observe(&mut self, _event: &SimEvent) {}
}

impl TimeScale for f64 {
    fn scale(&mut self, real_ms: f64) -> f64 {
        real_ms * *self
    }
}

/// Runs time at `factor` for `duration_ms` of real time after a knockout
#[derive(Debug, Clone)]
pub struct SlowMotion {
    pub factor: f64,
    pub duration_ms: f64,
    remaining_ms: f64,
}

impl SlowMotion {
    pub fn new(factor: f64, duration_ms: f64) -> Self {
        Self {
            factor,
            duration_ms,
            remaining_ms: 0.0,
        }
    }

    pub fn trigger(&mut self) {
        self.remaining_ms = self.duration_ms;
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }
}

impl TimeScale for SlowMotion {
    fn scale(&mut self, real_ms: f64) -> f64 {
        if self.remaining_ms <= 0.0 {
            return real_ms;
        }
        self.remaining_ms -= real_ms;
        real_ms * self.factor
    }

    fn observe(&mut self, event: &SimEvent) {
        if let SimEvent::RoundEnded {
            reason: RoundEndReason::Knockout,
            ..
        } = event
        {
            self.trigger();
        }
    }
}

/// Latest input per actor, fed by pollers through a channel or `set`.
/// Dash requests are presses: each one is delivered to a single tick.
#[derive(Debug, Default)]
pub struct HeldInputs {
    held: [ActorInput; MAX_ACTORS],
    updates: Option<Receiver<(ActorId, ActorInput)>>,
}

impl HeldInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Held inputs plus the sender pollers push updates into
    pub fn channel() -> (Self, Sender<(ActorId, ActorInput)>) {
        let (sender, receiver) = unbounded();
        let inputs = Self {
            held: Default::default(),
            updates: Some(receiver),
        };
        (inputs, sender)
    }

    pub fn set(&mut self, actor: ActorId, input: ActorInput) {
        if let Some(slot) = self.held.get_mut(actor.0 as usize) {
            // A pending press survives a later movement-only update
            let dash = slot.dash_requested || input.dash_requested;
            *slot = ActorInput { dash_requested: dash, ..input };
        }
    }
}

impl InputSource for HeldInputs {
    fn begin_tick(&mut self) {
        let updates: Vec<_> = match &self.updates {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };
        for (actor, input) in updates {
            self.set(actor, input);
        }
    }

    fn input_for(&mut self, actor: &Actor, _view: &TickView<'_>) -> ActorInput {
        match self.held.get_mut(actor.id.0 as usize) {
            Some(slot) => {
                let input = *slot;
                slot.dash_requested = false;
                input
            }
            None => ActorInput::default(),
        }
    }
}

/// Owns the whole simulation and advances it frame by frame
pub struct GameLoop {
    config: Arc<SimConfig>,
    actors: Actors,
    arena: Arena,
    round: RoundManager,
    accumulator_ms: f64,
    sim_time_ms: f64,
    tick: u64,
    rng: StdRng,
    bus: EventBus,
    pending: Vec<SimEvent>,
    input: Box<dyn InputSource + Send>,
    time_scale: Box<dyn TimeScale + Send>,
}

impl GameLoop {
    pub fn new(config: Arc<SimConfig>, actor_count: usize) -> Self {
        let count = actor_count.clamp(MIN_ACTORS, MAX_ACTORS);
        if count != actor_count {
            warn!("Actor count {} out of range, using {}", actor_count, count);
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let arena = Arena::new(&config.arena);
        let mut spawns = arena.spawn_points(count, config.physics.spawn_radius_fraction);
        spawns.shuffle(&mut rng);
        let actors = spawns
            .into_iter()
            .enumerate()
            .map(|(i, spawn)| Actor::new(ActorId(i as u8), spawn, &config.physics))
            .collect();

        Self {
            config,
            actors,
            arena,
            round: RoundManager::new(),
            accumulator_ms: 0.0,
            sim_time_ms: 0.0,
            tick: 0,
            rng,
            bus: EventBus::new(),
            pending: Vec::new(),
            input: Box::new(HeldInputs::new()),
            time_scale: Box::new(1.0_f64),
        }
    }

    pub fn set_input_source(&mut self, input: Box<dyn InputSource + Send>) {
        self.input = input;
    }

    pub fn set_time_scale(&mut self, time_scale: Box<dyn TimeScale + Send>) {
        self.time_scale = time_scale;
    }

    /// Listen to every published event
    pub fn subscribe(&mut self) -> Receiver<SimEvent> {
        self.bus.subscribe()
    }

    /// External start signal
    pub fn start(&mut self) -> Vec<SimEvent> {
        self.round
            .start(&mut self.actors, &mut self.arena, &self.config, &mut self.pending);
        self.flush()
    }

    /// External restart signal; honored once the match-end delay has passed
    pub fn restart(&mut self) -> Option<Vec<SimEvent>> {
        if !self
            .round
            .restart(&mut self.actors, &mut self.arena, &self.config, &mut self.pending)
        {
            return None;
        }
        self.accumulator_ms = 0.0;
        Some(self.flush())
    }

    /// Feed one rendering frame of real time. Runs zero or more ticks and
    /// returns the events they produced.
    pub fn frame(&mut self, real_delta_ms: f64) -> Vec<SimEvent> {
        let timing = &self.config.timing;
        let delta = if real_delta_ms.is_finite() {
            real_delta_ms.clamp(0.0, timing.max_frame_ms)
        } else {
            0.0
        };
        let scaled = self.time_scale.scale(delta);
        if scaled.is_finite() && scaled > 0.0 {
            self.accumulator_ms += scaled;
        }

        let step = timing.fixed_step_ms;
        let max_ticks = timing.max_ticks_per_frame.max(1);
        let mut ticks = 0;
        while self.accumulator_ms >= step && ticks < max_ticks {
            self.run_tick();
            self.accumulator_ms -= step;
            ticks += 1;
        }

        if self.accumulator_ms >= step {
            warn!(
                dropped_ms = self.accumulator_ms,
                max_ticks, "Simulation falling behind, dropping backlog"
            );
            self.accumulator_ms = 0.0;
        }

        self.flush()
    }

    /// Run exactly one tick regardless of the accumulator
    pub fn step(&mut self) -> Vec<SimEvent> {
        self.run_tick();
        self.flush()
    }

    fn flush(&mut self) -> Vec<SimEvent> {
        let events = std::mem::take(&mut self.pending);
        for event in &events {
            self.time_scale.observe(event);
        }
        self.bus.publish(&events);
        events
    }

    fn run_tick(&mut self) {
        let dt = self.config.timing.fixed_step_ms;
        let config = &*self.config;
        let events = &mut self.pending;

        self.round
            .update(dt, &mut self.actors, &mut self.arena, config, &mut self.rng, events);

        let phase = self.round.phase();
        let playing = phase == RoundPhase::Playing;
        let round_no = self.round.current_round();
        let round_time = self.round.round_time_ms();

        if playing {
            let alive = self.actors.iter().filter(|a| a.alive).count();
            arena_system::update(&mut self.arena, config, round_no, round_time, alive, dt, events);
        }

        if playing || phase == RoundPhase::RoundEnd {
            self.input.begin_tick();
            let inputs: SmallVec<[ActorInput; MAX_ACTORS]> = {
                let view = TickView {
                    actors: &self.actors,
                    arena: &self.arena,
                    round_time_ms: round_time,
                    dt_ms: dt,
                };
                self.actors
                    .iter()
                    .map(|actor| self.input.input_for(actor, &view))
                    .collect()
            };

            let mods = *self.round.modifiers();
            for (actor, input) in self.actors.iter_mut().zip(inputs.iter()) {
                physics::update_actor(actor, input, &mods, config, dt);
            }

            if playing {
                forces::apply_environment(&mut self.actors, &self.arena, &self.round.force_context(config), config);
            }

            let restitution = config.physics.bounce * mods.bounce;
            let push = config.physics.push_force * mods.push * self.round.damage_multiplier();
            collision::resolve_all(&mut self.actors, restitution, push, events);

            if playing {
                let knocked = collision::check_eliminations(&mut self.actors, &self.arena, round_time, round_no, events);
                if knocked > 0 {
                    debug!("{} knocked out on tick {}", knocked, self.tick);
                }
                self.round.check_round_end(&mut self.actors, events);
            }
        }

        self.sim_time_ms += dt;
        self.tick += 1;
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot::capture(self.tick, self.sim_time_ms, &self.actors, &self.arena, &self.round)
    }

    pub fn result(&self) -> MatchResult {
        determine_result(&self.actors, &self.round)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn round(&self) -> &RoundManager {
        &self.round
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn sim_time_ms(&self) -> f64 {
        self.sim_time_ms
    }
}
