//! Round and match lifecycle
//!
//! `RoundManager` owns the phase machine (waiting, countdown, playing, round
//! end, match end) and the time-driven escalation inside a round: the damage
//! ramp, the chaos latch, the centrifuge trigger and the final countdown that
//! force-ends a round nobody managed to finish.

use rand::Rng;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::game::constants::round::COUNTDOWN_STEP_MS;
use crate::game::events::{RoundEndReason, SimEvent};
use crate::game::modifiers::{select_modifier, Modifier, RoundModifiers};
use crate::game::state::{Actor, ActorId, Arena, RoundPhase};
use crate::game::systems::forces::{self, ForceContext};

#[derive(Debug, Clone)]
pub struct RoundManager {
    phase: RoundPhase,
    current_round: u32,
    /// Time spent in `Playing` this round (ms)
    round_time_ms: f64,
    /// Time spent in the current non-playing phase (ms)
    phase_time_ms: f64,
    countdown_value: u32,
    damage_multiplier: f64,
    instability_started_at: Option<f64>,
    final_countdown_started_at: Option<f64>,
    final_countdown_value: u32,
    current_modifier: Option<Modifier>,
    modifiers: RoundModifiers,
    winner: Option<ActorId>,
    round_winner: Option<ActorId>,
    round_end_reason: Option<RoundEndReason>,
}

impl Default for RoundManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundManager {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Waiting,
            current_round: 0,
            round_time_ms: 0.0,
            phase_time_ms: 0.0,
            countdown_value: 0,
            damage_multiplier: 1.0,
            instability_started_at: None,
            final_countdown_started_at: None,
            final_countdown_value: 0,
            current_modifier: None,
            modifiers: RoundModifiers::NEUTRAL,
            winner: None,
            round_winner: None,
            round_end_reason: None,
        }
    }

    /// Leave `Waiting` and start the first countdown. Ignored in any other phase.
    pub fn start(&mut self, actors: &mut [Actor], arena: &mut Arena, config: &SimConfig, events: &mut Vec<SimEvent>) -> bool {
        if self.phase != RoundPhase::Waiting {
            return false;
        }
        info!("Match starting with {} actors", actors.len());
        self.enter_countdown(actors, arena, config, events);
        true
    }

    pub fn can_restart(&self, config: &SimConfig) -> bool {
        self.phase == RoundPhase::MatchEnd && self.phase_time_ms >= config.round.match_end_delay_ms
    }

    /// Start a fresh match from `MatchEnd` once the end delay has elapsed
    pub fn restart(&mut self, actors: &mut [Actor], arena: &mut Arena, config: &SimConfig, events: &mut Vec<SimEvent>) -> bool {
        if !self.can_restart(config) {
            return false;
        }
        for actor in actors.iter_mut() {
            actor.wins = 0;
        }
        self.current_round = 0;
        self.winner = None;
        info!("Match restarting");
        self.enter_countdown(actors, arena, config, events);
        true
    }

    /// Advance the phase machine by one fixed step
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f64,
        actors: &mut [Actor],
        arena: &mut Arena,
        config: &SimConfig,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) {
        match self.phase {
            RoundPhase::Waiting => {}
            RoundPhase::Countdown => {
                self.phase_time_ms += dt_ms;
                let remaining = config.round.countdown_secs as f64 * COUNTDOWN_STEP_MS - self.phase_time_ms;
                if remaining <= 0.0 {
                    self.begin_round(arena, config, rng, events);
                } else {
                    let value = (remaining / COUNTDOWN_STEP_MS).ceil() as u32;
                    if value != self.countdown_value {
                        self.countdown_value = value;
                        events.push(SimEvent::CountdownTick { value });
                    }
                }
            }
            RoundPhase::Playing => self.update_playing(dt_ms, actors, arena, config, events),
            RoundPhase::RoundEnd => {
                self.phase_time_ms += dt_ms;
                if self.phase_time_ms >= config.round.round_end_delay_ms {
                    self.finish_round_end(actors, arena, config, events);
                }
            }
            RoundPhase::MatchEnd => {
                self.phase_time_ms += dt_ms;
            }
        }
    }

    /// End the round by knockout when at most one actor is left.
    /// Returns whether the round ended.
    pub fn check_round_end(&mut self, actors: &mut [Actor], events: &mut Vec<SimEvent>) -> bool {
        if self.phase != RoundPhase::Playing {
            return false;
        }
        let mut alive = actors.iter().filter(|a| a.alive);
        let survivor = match (alive.next(), alive.next()) {
            (_, Some(_)) => return false,
            (Some(a), None) => Some(a.id),
            (None, None) => None,
        };
        self.end_round(survivor, RoundEndReason::Knockout, actors, events);
        true
    }

    /// Keep only the living actor nearest the arena center and end the round
    /// on timeout. Distance ties go to the lower id.
    pub fn force_end(&mut self, actors: &mut [Actor], arena: &Arena, events: &mut Vec<SimEvent>) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        let survivor = actors
            .iter()
            .filter(|a| a.alive)
            .fold(None::<(ActorId, f64)>, |best, a| {
                let d = arena.distance_from_center(a.position);
                match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((a.id, d)),
                }
            })
            .map(|(id, _)| id);

        for actor in actors.iter_mut().filter(|a| a.alive && Some(a.id) != survivor) {
            actor.eliminate(self.round_time_ms);
            events.push(SimEvent::ActorEliminated {
                actor: actor.id,
                round: self.current_round,
            });
        }
        self.end_round(survivor, RoundEndReason::Timeout, actors, events);
    }

    fn update_playing(&mut self, dt_ms: f64, actors: &mut [Actor], arena: &mut Arena, config: &SimConfig, events: &mut Vec<SimEvent>) {
        self.round_time_ms += dt_ms;
        let t = self.round_time_ms;
        let esc = &config.escalation;

        self.damage_multiplier = damage_ramp(t, esc.ramp_start_ms, esc.ramp_duration_ms, esc.base_multiplier, esc.max_multiplier);

        if self.instability_started_at.is_none() && t >= esc.instability_start_ms {
            self.instability_started_at = Some(t);
            debug!("Instability in round {} at {:.0}ms", self.current_round, t);
            events.push(SimEvent::EscalationTriggered { round: self.current_round });
        }

        let alive = actors.iter().filter(|a| a.alive).count();
        if config.centrifuge.enabled
            && !arena.centrifuge_used
            && t >= config.centrifuge.start_ms
            && alive > config.arena.sudden_death_max_alive
            && arena.activate_centrifuge(&config.centrifuge)
        {
            let radius = arena.centrifuge.map(|c| c.radius).unwrap_or_default();
            info!("Centrifuge in round {} (radius {:.0})", self.current_round, radius);
            events.push(SimEvent::CentrifugeActivated {
                round: self.current_round,
                radius,
            });
        }

        if self.final_countdown_started_at.is_none() && t >= esc.final_countdown_start_ms {
            self.final_countdown_started_at = Some(t);
            debug!("Final countdown in round {}", self.current_round);
        }
        if let Some(started) = self.final_countdown_started_at {
            let remaining = esc.final_countdown_duration_ms - (t - started);
            if remaining <= 0.0 {
                self.final_countdown_value = 0;
                self.force_end(actors, arena, events);
                return;
            }
            let seconds_left = (remaining / COUNTDOWN_STEP_MS).ceil() as u32;
            if seconds_left != self.final_countdown_value {
                self.final_countdown_value = seconds_left;
                events.push(SimEvent::FinalCountdownTick { seconds_left });
            }
        }
    }

    fn enter_countdown(&mut self, actors: &mut [Actor], arena: &mut Arena, config: &SimConfig, events: &mut Vec<SimEvent>) {
        for actor in actors.iter_mut() {
            actor.reset();
        }
        arena.reset();

        self.phase = RoundPhase::Countdown;
        self.phase_time_ms = 0.0;
        self.round_time_ms = 0.0;
        self.damage_multiplier = config.escalation.base_multiplier;
        self.instability_started_at = None;
        self.final_countdown_started_at = None;
        self.final_countdown_value = 0;
        self.current_modifier = None;
        self.modifiers = RoundModifiers::NEUTRAL;
        self.round_winner = None;
        self.round_end_reason = None;

        self.countdown_value = config.round.countdown_secs;
        if self.countdown_value > 0 {
            events.push(SimEvent::CountdownTick { value: self.countdown_value });
        }
    }

    fn begin_round<R: Rng + ?Sized>(&mut self, arena: &mut Arena, config: &SimConfig, rng: &mut R, events: &mut Vec<SimEvent>) {
        self.current_round += 1;
        self.phase = RoundPhase::Playing;
        self.phase_time_ms = 0.0;
        self.round_time_ms = 0.0;
        self.countdown_value = 0;

        // The opening round is always played straight
        self.current_modifier = if self.current_round > 1 {
            select_modifier(rng, &config.modifiers, config.round.no_modifier_chance)
        } else {
            None
        };
        self.modifiers = self
            .current_modifier
            .as_ref()
            .map(|m| m.effects)
            .unwrap_or(RoundModifiers::NEUTRAL);
        arena.apply_modifiers(&self.modifiers);

        let name = self.current_modifier.as_ref().map(|m| m.name.clone());
        info!(
            "Round {} started{}",
            self.current_round,
            name.as_deref().map(|n| format!(" with modifier {}", n)).unwrap_or_default()
        );
        events.push(SimEvent::RoundStarted {
            round: self.current_round,
            modifier: name,
        });
        if let Some(m) = &self.current_modifier {
            events.push(SimEvent::ModifierAnnounced {
                name: m.name.clone(),
                description: m.description.clone(),
            });
        }
    }

    fn end_round(&mut self, winner: Option<ActorId>, reason: RoundEndReason, actors: &mut [Actor], events: &mut Vec<SimEvent>) {
        if let Some(actor) = winner.and_then(|id| actors.iter_mut().find(|a| a.id == id)) {
            actor.wins += 1;
        }
        self.phase = RoundPhase::RoundEnd;
        self.phase_time_ms = 0.0;
        self.round_winner = winner;
        self.round_end_reason = Some(reason);

        match winner {
            Some(id) => info!("Round {} won by {} ({:?})", self.current_round, id, reason),
            None => info!("Round {} ended in a draw ({:?})", self.current_round, reason),
        }
        events.push(SimEvent::RoundEnded {
            winner,
            round: self.current_round,
            reason,
        });
    }

    fn finish_round_end(&mut self, actors: &mut [Actor], arena: &mut Arena, config: &SimConfig, events: &mut Vec<SimEvent>) {
        let champion = actors
            .iter()
            .filter(|a| a.wins >= config.round.wins_to_match)
            .max_by(|a, b| a.wins.cmp(&b.wins).then_with(|| b.id.cmp(&a.id)))
            .map(|a| a.id);

        match champion {
            Some(id) => {
                self.phase = RoundPhase::MatchEnd;
                self.phase_time_ms = 0.0;
                self.winner = Some(id);
                info!("Match won by {} after {} rounds", id, self.current_round);
                events.push(SimEvent::MatchEnded { winner: id });
            }
            None => self.enter_countdown(actors, arena, config, events),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn round_time_ms(&self) -> f64 {
        self.round_time_ms
    }

    pub fn damage_multiplier(&self) -> f64 {
        self.damage_multiplier
    }

    pub fn modifiers(&self) -> &RoundModifiers {
        &self.modifiers
    }

    pub fn current_modifier(&self) -> Option<&Modifier> {
        self.current_modifier.as_ref()
    }

    /// Whole seconds left on the pre-round countdown
    pub fn countdown_value(&self) -> Option<u32> {
        (self.phase == RoundPhase::Countdown).then_some(self.countdown_value)
    }

    /// Whole seconds left before the round is force-ended
    pub fn final_countdown_value(&self) -> Option<u32> {
        match (self.phase, self.final_countdown_started_at) {
            (RoundPhase::Playing, Some(_)) => Some(self.final_countdown_value),
            _ => None,
        }
    }

    pub fn instability_active(&self) -> bool {
        self.instability_started_at.is_some()
    }

    pub fn winner(&self) -> Option<ActorId> {
        self.winner
    }

    pub fn round_winner(&self) -> Option<ActorId> {
        self.round_winner
    }

    pub fn round_end_reason(&self) -> Option<RoundEndReason> {
        self.round_end_reason
    }

    pub fn chaos_intensity(&self, config: &SimConfig) -> f64 {
        match self.instability_started_at {
            Some(started) => forces::chaos_intensity(
                self.round_time_ms - started,
                config.escalation.chaos_ramp_ms,
                config.escalation.chaos_max_force,
            ),
            None => 0.0,
        }
    }

    pub fn force_context(&self, config: &SimConfig) -> ForceContext {
        ForceContext {
            round_time_ms: self.round_time_ms,
            chaos_intensity: self.chaos_intensity(config),
        }
    }
}

/// Linear ramp from `base` to `max` over `[start, start + duration]`
pub fn damage_ramp(round_time_ms: f64, start_ms: f64, duration_ms: f64, base: f64, max: f64) -> f64 {
    if round_time_ms <= start_ms {
        return base;
    }
    if duration_ms <= 0.0 {
        return max;
    }
    let t = ((round_time_ms - start_ms) / duration_ms).min(1.0);
    base + (max - base) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::timing::FIXED_STEP_MS as DT;
    use crate::game::state::Actors;
    use crate::util::vec2::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        config: SimConfig,
        actors: Actors,
        arena: Arena,
        round: RoundManager,
        rng: StdRng,
        events: Vec<SimEvent>,
    }

    impl Fixture {
        fn new(count: usize, config: SimConfig) -> Self {
            let arena = Arena::new(&config.arena);
            let actors = arena
                .spawn_points(count, config.physics.spawn_radius_fraction)
                .into_iter()
                .enumerate()
                .map(|(i, p)| Actor::new(ActorId(i as u8), p, &config.physics))
                .collect();
            Self {
                config,
                actors,
                arena,
                round: RoundManager::new(),
                rng: StdRng::seed_from_u64(7),
                events: Vec::new(),
            }
        }

        fn tick(&mut self) {
            self.round.update(DT, &mut self.actors, &mut self.arena, &self.config, &mut self.rng, &mut self.events);
        }

        fn run_ms(&mut self, ms: f64) {
            let ticks = (ms / DT).ceil() as usize;
            for _ in 0..ticks {
                self.tick();
            }
        }

        /// Start and run through the countdown into round play
        fn start_playing(&mut self) {
            assert!(self.round.start(&mut self.actors, &mut self.arena, &self.config, &mut self.events));
            self.run_ms(self.config.round.countdown_secs as f64 * COUNTDOWN_STEP_MS + DT);
            assert_eq!(self.round.phase(), RoundPhase::Playing);
            self.events.clear();
        }

        fn check_end(&mut self) -> bool {
            self.round.check_round_end(&mut self.actors, &mut self.events)
        }
    }

    #[test]
    fn test_new_is_waiting() {
        let round = RoundManager::new();
        assert_eq!(round.phase(), RoundPhase::Waiting);
        assert_eq!(round.current_round(), 0);
        assert_eq!(round.winner(), None);
    }

    #[test]
    fn test_waiting_ignores_updates() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.run_ms(10_000.0);
        assert_eq!(f.round.phase(), RoundPhase::Waiting);
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_countdown_ticks_then_round_starts() {
        let mut f = Fixture::new(2, SimConfig::default());
        assert!(f.round.start(&mut f.actors, &mut f.arena, &f.config, &mut f.events));
        assert!(!f.round.start(&mut f.actors, &mut f.arena, &f.config, &mut f.events));
        assert_eq!(f.round.countdown_value(), Some(3));

        f.run_ms(3000.0 + DT);

        assert_eq!(
            f.events,
            vec![
                SimEvent::CountdownTick { value: 3 },
                SimEvent::CountdownTick { value: 2 },
                SimEvent::CountdownTick { value: 1 },
                SimEvent::RoundStarted { round: 1, modifier: None },
            ]
        );
        assert_eq!(f.round.phase(), RoundPhase::Playing);
        assert_eq!(f.round.current_round(), 1);
        assert_eq!(f.round.countdown_value(), None);
    }

    #[test]
    fn test_countdown_value_changes_once_per_step() {
        let mut f = Fixture::new(2, SimConfig::default());
        assert!(f.round.start(&mut f.actors, &mut f.arena, &f.config, &mut f.events));
        f.events.clear();

        let ticks_per_step = (COUNTDOWN_STEP_MS / DT).round() as usize;

        // Two ticks short of one step: still showing the first value
        for _ in 0..ticks_per_step - 2 {
            f.tick();
        }
        assert_eq!(f.round.countdown_value(), Some(3));
        assert!(f.events.is_empty());

        for _ in 0..3 {
            f.tick();
        }
        assert_eq!(f.round.countdown_value(), Some(2));
        assert_eq!(f.events, vec![SimEvent::CountdownTick { value: 2 }]);
    }

    #[test]
    fn test_zero_countdown_starts_on_first_update() {
        let mut config = SimConfig::default();
        config.round.countdown_secs = 0;
        let mut f = Fixture::new(2, config);
        f.round.start(&mut f.actors, &mut f.arena, &f.config, &mut f.events);
        assert!(f.events.is_empty());
        f.tick();
        assert_eq!(f.round.phase(), RoundPhase::Playing);
    }

    #[test]
    fn test_first_round_has_no_modifier_later_rounds_can() {
        let mut config = SimConfig::default();
        config.round.no_modifier_chance = 0.0;
        config.round.wins_to_match = 5;
        let mut f = Fixture::new(2, config);
        f.start_playing();
        assert!(f.round.current_modifier().is_none());
        assert_eq!(*f.round.modifiers(), RoundModifiers::NEUTRAL);

        f.actors[1].eliminate(0.0);
        assert!(f.check_end());
        f.run_ms(f.config.round.round_end_delay_ms + DT);
        assert_eq!(f.round.phase(), RoundPhase::Countdown);
        f.events.clear();
        f.run_ms(3000.0 + DT);

        assert_eq!(f.round.current_round(), 2);
        let modifier = f.round.current_modifier().cloned().unwrap();
        assert_eq!(*f.round.modifiers(), modifier.effects);
        assert_eq!(f.arena.arena_scale, modifier.effects.arena_scale);
        assert!(f.events.contains(&SimEvent::ModifierAnnounced {
            name: modifier.name.clone(),
            description: modifier.description.clone(),
        }));
    }

    #[test]
    fn test_damage_ramp() {
        assert_eq!(damage_ramp(0.0, 15_000.0, 30_000.0, 1.0, 2.5), 1.0);
        assert!((damage_ramp(30_000.0, 15_000.0, 30_000.0, 1.0, 2.5) - 1.75).abs() < 1e-12);
        assert_eq!(damage_ramp(100_000.0, 15_000.0, 30_000.0, 1.0, 2.5), 2.5);
        assert_eq!(damage_ramp(20_000.0, 15_000.0, 0.0, 1.0, 2.5), 2.5);
    }

    #[test]
    fn test_damage_multiplier_follows_round_time() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.start_playing();
        assert_eq!(f.round.damage_multiplier(), 1.0);
        f.run_ms(50_000.0);
        assert_eq!(f.round.damage_multiplier(), f.config.escalation.max_multiplier);
    }

    #[test]
    fn test_knockout_awards_win() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.start_playing();
        assert!(!f.check_end());

        f.actors[0].eliminate(f.round.round_time_ms());
        assert!(f.check_end());

        assert_eq!(f.round.phase(), RoundPhase::RoundEnd);
        assert_eq!(f.round.round_winner(), Some(ActorId(1)));
        assert_eq!(f.round.round_end_reason(), Some(RoundEndReason::Knockout));
        assert_eq!(f.actors[1].wins, 1);
        assert_eq!(
            f.events,
            vec![SimEvent::RoundEnded {
                winner: Some(ActorId(1)),
                round: 1,
                reason: RoundEndReason::Knockout
            }]
        );
        // Only once per round
        assert!(!f.check_end());
    }

    #[test]
    fn test_two_of_three_eliminated_same_tick() {
        let mut f = Fixture::new(3, SimConfig::default());
        f.start_playing();
        f.actors[0].eliminate(1.0);
        f.actors[2].eliminate(1.0);
        assert!(f.check_end());
        assert_eq!(f.round.round_winner(), Some(ActorId(1)));
        assert_eq!(f.round.round_end_reason(), Some(RoundEndReason::Knockout));
        assert_eq!(f.actors[1].wins, 1);
        assert_eq!(f.actors[0].wins + f.actors[2].wins, 0);
    }

    #[test]
    fn test_simultaneous_knockout_is_draw() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.start_playing();
        for a in f.actors.iter_mut() {
            a.eliminate(1.0);
        }
        assert!(f.check_end());
        assert_eq!(f.round.round_winner(), None);
        assert!(f.actors.iter().all(|a| a.wins == 0));
        assert!(matches!(f.events[0], SimEvent::RoundEnded { winner: None, .. }));
    }

    #[test]
    fn test_instability_latches_once() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.start_playing();
        f.run_ms(f.config.escalation.instability_start_ms - 100.0);
        assert!(!f.round.instability_active());
        assert_eq!(f.round.chaos_intensity(&f.config), 0.0);

        f.run_ms(10_000.0);
        assert!(f.round.instability_active());
        let triggered = f
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::EscalationTriggered { .. }))
            .count();
        assert_eq!(triggered, 1);
        assert_eq!(f.round.chaos_intensity(&f.config), f.config.escalation.chaos_max_force);
    }

    #[test]
    fn test_centrifuge_needs_more_than_two_alive() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.start_playing();
        f.run_ms(f.config.centrifuge.start_ms + 1000.0);
        assert!(!f.arena.is_centrifuge());

        let mut f = Fixture::new(3, SimConfig::default());
        f.start_playing();
        f.run_ms(f.config.centrifuge.start_ms + 1000.0);
        assert!(f.arena.is_centrifuge());
        let activations = f
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::CentrifugeActivated { round: 1, .. }))
            .count();
        assert_eq!(activations, 1);
    }

    #[test]
    fn test_centrifuge_can_be_disabled() {
        let mut config = SimConfig::default();
        config.centrifuge.enabled = false;
        let mut f = Fixture::new(4, config);
        f.start_playing();
        f.run_ms(f.config.centrifuge.start_ms + 1000.0);
        assert!(!f.arena.is_centrifuge());
    }

    #[test]
    fn test_final_countdown_forces_timeout() {
        let mut f = Fixture::new(3, SimConfig::default());
        f.start_playing();
        // Actor 2 sits closest to the center
        f.actors[2].position = f.arena.center + Vec2::new(10.0, 0.0);

        let esc = f.config.escalation.clone();
        f.run_ms(esc.final_countdown_start_ms + 1.0);
        assert_eq!(f.round.final_countdown_value(), Some(10));

        f.run_ms(esc.final_countdown_duration_ms + DT);

        assert_eq!(f.round.phase(), RoundPhase::RoundEnd);
        assert_eq!(f.round.round_winner(), Some(ActorId(2)));
        assert_eq!(f.round.round_end_reason(), Some(RoundEndReason::Timeout));
        assert!(!f.actors[0].alive && !f.actors[1].alive && f.actors[2].alive);

        let ticks: Vec<u32> = f
            .events
            .iter()
            .filter_map(|e| match e {
                SimEvent::FinalCountdownTick { seconds_left } => Some(*seconds_left),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, (1..=10).rev().collect::<Vec<_>>());
        assert!(f.events.contains(&SimEvent::RoundEnded {
            winner: Some(ActorId(2)),
            round: 1,
            reason: RoundEndReason::Timeout,
        }));
    }

    #[test]
    fn test_round_always_ends_by_deadline() {
        let mut f = Fixture::new(4, SimConfig::default());
        f.start_playing();
        let deadline = f.config.escalation.final_countdown_start_ms + f.config.escalation.final_countdown_duration_ms;
        f.run_ms(deadline + 2.0 * DT);
        assert_ne!(f.round.phase(), RoundPhase::Playing);
        assert_eq!(f.actors.iter().filter(|a| a.alive).count(), 1);
    }

    #[test]
    fn test_force_end_tie_goes_to_lower_id() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.start_playing();
        f.actors[0].position = f.arena.center + Vec2::new(-50.0, 0.0);
        f.actors[1].position = f.arena.center + Vec2::new(50.0, 0.0);
        f.round.force_end(&mut f.actors, &f.arena, &mut f.events);
        assert_eq!(f.round.round_winner(), Some(ActorId(0)));
    }

    #[test]
    fn test_next_round_resets_state_keeps_wins() {
        let mut f = Fixture::new(2, SimConfig::default());
        f.start_playing();
        f.run_ms(35_000.0);
        f.arena.sudden_death_active = true;
        f.actors[0].position = Vec2::new(-500.0, 0.0);
        f.actors[0].eliminate(f.round.round_time_ms());
        f.check_end();

        f.run_ms(f.config.round.round_end_delay_ms + DT);

        assert_eq!(f.round.phase(), RoundPhase::Countdown);
        assert!(f.actors.iter().all(|a| a.alive));
        assert_eq!(f.actors[0].position, f.actors[0].spawn_position);
        assert_eq!(f.actors[1].wins, 1);
        assert!(!f.arena.sudden_death_active);
        assert_eq!(f.round.round_time_ms(), 0.0);
        assert_eq!(f.round.damage_multiplier(), f.config.escalation.base_multiplier);
        assert!(!f.round.instability_active());
    }

    #[test]
    fn test_match_end_and_restart_gate() {
        let mut config = SimConfig::default();
        config.round.wins_to_match = 1;
        let mut f = Fixture::new(2, config);
        f.start_playing();
        f.actors[1].eliminate(1.0);
        f.check_end();
        f.run_ms(f.config.round.round_end_delay_ms + DT);

        assert_eq!(f.round.phase(), RoundPhase::MatchEnd);
        assert_eq!(f.round.winner(), Some(ActorId(0)));
        assert!(f.events.contains(&SimEvent::MatchEnded { winner: ActorId(0) }));

        // Further updates keep the match ended
        f.run_ms(100.0);
        assert_eq!(f.round.phase(), RoundPhase::MatchEnd);
        assert!(!f.round.restart(&mut f.actors, &mut f.arena, &f.config, &mut f.events));

        f.run_ms(f.config.round.match_end_delay_ms);
        assert!(f.round.restart(&mut f.actors, &mut f.arena, &f.config, &mut f.events));
        assert_eq!(f.round.phase(), RoundPhase::Countdown);
        assert_eq!(f.round.current_round(), 0);
        assert_eq!(f.round.winner(), None);
        assert!(f.actors.iter().all(|a| a.wins == 0 && a.alive));
    }

    #[test]
    fn test_wins_never_exceed_rounds() {
        let mut config = SimConfig::default();
        config.round.wins_to_match = 2;
        let mut f = Fixture::new(3, config);
        f.start_playing();
        for _ in 0..200_000 {
            if f.round.phase() == RoundPhase::MatchEnd {
                break;
            }
            f.tick();
            f.check_end();
        }
        assert_eq!(f.round.phase(), RoundPhase::MatchEnd);
        let total: u32 = f.actors.iter().map(|a| a.wins).sum();
        assert!(total <= f.round.current_round());
        assert!(f.actors.iter().any(|a| a.wins == 2));
    }
}
