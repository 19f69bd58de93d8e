//! Actor-actor collision and boundary eliminations
//!
//! Circles are separated along the contact normal in proportion to their
//! inverse mass, then an impulse is applied if they are still approaching.

use tracing::debug;

use crate::game::events::SimEvent;
use crate::game::state::{Actor, Arena};
use crate::util::vec2::Vec2;

/// Check if two circles overlap
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f64, pos_b: Vec2, radius_b: f64) -> bool {
    let min_dist = radius_a + radius_b;
    pos_a.distance_squared_to(pos_b) < min_dist * min_dist
}

/// Resolve one pair. Returns `None` when the pair does not touch, otherwise
/// the impulse magnitude applied (0.0 for bodies already separating).
///
/// `push` scales the impulse on top of restitution; it carries the round's
/// push modifier and the damage multiplier.
pub fn resolve_collision(a: &mut Actor, b: &mut Actor, restitution: f64, push: f64) -> Option<f64> {
    if !a.alive || !b.alive || !circles_overlap(a.position, a.radius, b.position, b.radius) {
        return None;
    }

    let delta = b.position - a.position;
    let distance = delta.magnitude();
    // Coincident centers: pick a fixed axis so the pair still separates
    let normal = if distance > 0.0 { delta * (1.0 / distance) } else { Vec2::RIGHT };

    let inv_a = 1.0 / a.mass;
    let inv_b = 1.0 / b.mass;
    let inv_total = inv_a + inv_b;

    let overlap = a.radius + b.radius - distance;
    a.position -= normal * (overlap * inv_a / inv_total);
    b.position += normal * (overlap * inv_b / inv_total);

    let approach = (b.velocity - a.velocity).dot(normal);
    if approach >= 0.0 {
        return Some(0.0);
    }

    let impulse = -(1.0 + restitution) * approach / inv_total * push;
    a.velocity -= normal * (impulse * inv_a);
    b.velocity += normal * (impulse * inv_b);

    Some(impulse)
}

/// Resolve every living pair once, in index order
pub fn resolve_all(actors: &mut [Actor], restitution: f64, push: f64, events: &mut Vec<SimEvent>) {
    for i in 0..actors.len() {
        let (head, tail) = actors.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if let Some(impact) = resolve_collision(a, b, restitution, push) {
                if impact > 0.0 {
                    events.push(SimEvent::ActorsCollided {
                        a: a.id,
                        b: b.id,
                        impact,
                    });
                }
            }
        }
    }
}

/// Eliminate every living actor that is completely outside the arena.
/// Returns how many were knocked out this call.
pub fn check_eliminations(
    actors: &mut [Actor],
    arena: &Arena,
    now_ms: f64,
    round: u32,
    events: &mut Vec<SimEvent>,
) -> usize {
    let shape = arena.shape();
    let mut eliminated = 0;
    for actor in actors.iter_mut().filter(|a| a.alive) {
        if shape.is_eliminated(actor.position, actor.radius) {
            actor.eliminate(now_ms);
            debug!("{} eliminated in round {}", actor.id, round);
            events.push(SimEvent::ActorEliminated { actor: actor.id, round });
            eliminated += 1;
        }
    }
    eliminated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::state::ActorId;
    use proptest::prelude::*;

    fn actor(id: u8, x: f64, y: f64) -> Actor {
        Actor::new(ActorId(id), Vec2::new(x, y), &SimConfig::default().physics)
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0));
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(25.0, 0.0), 10.0));
    }

    #[test]
    fn test_resting_overlap_separates_without_velocity() {
        let mut a = actor(0, 100.0, 100.0);
        let mut b = actor(1, 100.0 + a.radius * 2.0 - 1.0, 100.0);

        let result = resolve_collision(&mut a, &mut b, 0.9, 1.4);

        assert_eq!(result, Some(0.0));
        let gap = a.position.distance_to(b.position);
        assert!((gap - (a.radius + b.radius)).abs() < 1e-9);
        assert_eq!(a.velocity, Vec2::ZERO);
        assert_eq!(b.velocity, Vec2::ZERO);
        // Equal masses split the correction evenly
        assert!((a.position.x - 99.5).abs() < 1e-9);
    }

    #[test]
    fn test_head_on_collision_bounces() {
        let mut a = actor(0, 100.0, 100.0);
        let mut b = actor(1, 135.0, 100.0);
        a.velocity = Vec2::new(3.0, 0.0);
        b.velocity = Vec2::new(-3.0, 0.0);

        let impact = resolve_collision(&mut a, &mut b, 1.0, 1.0).unwrap();

        assert!(impact > 0.0);
        assert!(a.velocity.x < 0.0);
        assert!(b.velocity.x > 0.0);
        // Momentum is conserved for equal masses with push 1.0
        assert!((a.velocity.x + b.velocity.x).abs() < 1e-9);
    }

    #[test]
    fn test_push_scales_impulse() {
        let mut a1 = actor(0, 100.0, 100.0);
        let mut b1 = actor(1, 135.0, 100.0);
        a1.velocity = Vec2::new(2.0, 0.0);
        let (mut a2, mut b2) = (a1.clone(), b1.clone());

        let base = resolve_collision(&mut a1, &mut b1, 0.9, 1.0).unwrap();
        let boosted = resolve_collision(&mut a2, &mut b2, 0.9, 2.0).unwrap();
        assert!((boosted - base * 2.0).abs() < 1e-9);
        assert!(b2.velocity.x > b1.velocity.x);
    }

    #[test]
    fn test_separating_pair_gets_no_impulse() {
        let mut a = actor(0, 100.0, 100.0);
        let mut b = actor(1, 130.0, 100.0);
        a.velocity = Vec2::new(-1.0, 0.0);
        b.velocity = Vec2::new(1.0, 0.0);
        assert_eq!(resolve_collision(&mut a, &mut b, 0.9, 1.4), Some(0.0));
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_heavier_actor_moves_less() {
        let mut a = actor(0, 100.0, 100.0);
        let mut b = actor(1, 130.0, 100.0);
        a.mass = 3.0;
        resolve_collision(&mut a, &mut b, 0.9, 1.0);
        let moved_a = 100.0 - a.position.x;
        let moved_b = b.position.x - 130.0;
        assert!((moved_b - moved_a * 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_centers_separate() {
        let mut a = actor(0, 100.0, 100.0);
        let mut b = actor(1, 100.0, 100.0);
        resolve_collision(&mut a, &mut b, 0.9, 1.0);
        assert!((a.position.distance_to(b.position) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_dead_actor_does_not_collide() {
        let mut a = actor(0, 100.0, 100.0);
        let mut b = actor(1, 110.0, 100.0);
        b.eliminate(0.0);
        assert_eq!(resolve_collision(&mut a, &mut b, 0.9, 1.4), None);
        assert_eq!(b.position, Vec2::new(110.0, 100.0));
    }

    #[test]
    fn test_resolve_all_emits_only_for_impacts() {
        let mut actors = vec![actor(0, 100.0, 100.0), actor(1, 135.0, 100.0), actor(2, 600.0, 400.0)];
        actors[0].velocity = Vec2::new(4.0, 0.0);
        let mut events = Vec::new();

        resolve_all(&mut actors, 0.9, 1.4, &mut events);

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            SimEvent::ActorsCollided { a: ActorId(0), b: ActorId(1), impact } if impact > 0.0
        ));
    }

    #[test]
    fn test_check_eliminations_is_strict() {
        let config = SimConfig::default();
        let arena = Arena::new(&config.arena);
        let mut actors = vec![
            actor(0, -25.0, 300.0),
            actor(1, 5.0, 300.0),
            actor(2, 400.0, 300.0),
        ];
        let mut events = Vec::new();

        let count = check_eliminations(&mut actors, &arena, 1234.0, 2, &mut events);

        assert_eq!(count, 1);
        assert!(!actors[0].alive);
        assert_eq!(actors[0].eliminated_at, Some(1234.0));
        assert!(actors[1].alive && actors[2].alive);
        assert_eq!(events, vec![SimEvent::ActorEliminated { actor: ActorId(0), round: 2 }]);

        // Already eliminated actors are not reported twice
        assert_eq!(check_eliminations(&mut actors, &arena, 1300.0, 2, &mut events), 0);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_check_eliminations_uses_circle_in_centrifuge() {
        let config = SimConfig::default();
        let mut arena = Arena::new(&config.arena);
        assert!(arena.activate_centrifuge(&config.centrifuge));
        // Inside the rectangle corner but far outside the circle
        let mut actors = vec![actor(0, 30.0, 30.0)];
        let mut events = Vec::new();
        assert_eq!(check_eliminations(&mut actors, &arena, 0.0, 1, &mut events), 1);
    }

    proptest! {
        #[test]
        fn resolved_pair_never_overlaps(
            dx in -39.0f64..39.0,
            dy in -39.0f64..39.0,
            vax in -10.0f64..10.0,
            vbx in -10.0f64..10.0,
            mass in 0.5f64..4.0,
        ) {
            let mut a = actor(0, 400.0, 300.0);
            let mut b = actor(1, 400.0 + dx, 300.0 + dy);
            a.mass = mass;
            a.velocity = Vec2::new(vax, 0.0);
            b.velocity = Vec2::new(vbx, 0.0);
            resolve_collision(&mut a, &mut b, 0.9, 1.4);
            prop_assert!(a.position.distance_to(b.position) >= a.radius + b.radius - 1e-6);
        }
    }
}
