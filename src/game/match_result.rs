//! Match result and standings
//!
//! Computes the standings table for a finished (or in-progress) match.

use serde::{Deserialize, Serialize};

use crate::game::round::RoundManager;
use crate::game::state::{Actor, ActorId, RoundPhase};

/// Match result information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Set only once the match has ended
    pub winner: Option<ActorId>,
    pub standings: Vec<Standing>,
    pub rounds_played: u32,
    pub complete: bool,
}

/// One actor's line in the standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub actor: ActorId,
    pub rank: u32,
    pub wins: u32,
    pub alive: bool,
}

/// Rank actors by wins, then survival, then id
pub fn determine_result(actors: &[Actor], round: &RoundManager) -> MatchResult {
    let mut standings: Vec<Standing> = actors
        .iter()
        .map(|a| Standing {
            actor: a.id,
            rank: 0,
            wins: a.wins,
            alive: a.alive,
        })
        .collect();

    // Sort by: wins (desc), alive (desc), id (asc)
    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.alive.cmp(&a.alive))
            .then_with(|| a.actor.cmp(&b.actor))
    });

    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = (i + 1) as u32;
    }

    let rounds_played = match round.phase() {
        RoundPhase::Playing => round.current_round().saturating_sub(1),
        _ => round.current_round(),
    };

    MatchResult {
        winner: round.winner(),
        standings,
        rounds_played,
        complete: round.phase() == RoundPhase::MatchEnd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::util::vec2::Vec2;

    fn create_actor(id: u8, wins: u32, alive: bool) -> Actor {
        let mut a = Actor::new(ActorId(id), Vec2::ZERO, &PhysicsConfig::default());
        a.wins = wins;
        if !alive {
            a.eliminate(0.0);
        }
        a
    }

    #[test]
    fn test_ranking_order() {
        let actors = vec![
            create_actor(0, 1, false),
            create_actor(1, 2, false),
            create_actor(2, 1, true),
            create_actor(3, 0, true),
        ];

        let result = determine_result(&actors, &RoundManager::new());

        let order: Vec<ActorId> = result.standings.iter().map(|s| s.actor).collect();
        assert_eq!(order, vec![ActorId(1), ActorId(2), ActorId(0), ActorId(3)]);
        assert_eq!(result.standings[0].rank, 1);
        assert_eq!(result.standings[3].rank, 4);
    }

    #[test]
    fn test_ties_break_by_id() {
        let actors = vec![create_actor(2, 1, true), create_actor(0, 1, true)];
        let result = determine_result(&actors, &RoundManager::new());
        assert_eq!(result.standings[0].actor, ActorId(0));
    }

    #[test]
    fn test_unfinished_match_has_no_winner() {
        let actors = vec![create_actor(0, 2, true), create_actor(1, 0, true)];
        let result = determine_result(&actors, &RoundManager::new());
        assert!(result.winner.is_none());
        assert!(!result.complete);
        assert_eq!(result.rounds_played, 0);
    }
}
