//! Round modifiers
//!
//! A modifier is a named, round-scoped rule variation. Its effects are
//! collected into one `RoundModifiers` value that the driver passes down
//! every tick.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Multipliers in effect for the current round (all 1.0 when neutral)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundModifiers {
    /// Scales per-tick velocity retention (clamped downstream)
    pub friction: f64,
    /// Scales acceleration, max speed and dash speed
    pub speed: f64,
    /// Scales collision impulses
    pub push: f64,
    /// Scales collision restitution
    pub bounce: f64,
    /// Scales arena extents
    pub arena_scale: f64,
    /// Scales shrink speed
    pub shrink_speed: f64,
}

impl Default for RoundModifiers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl RoundModifiers {
    pub const NEUTRAL: RoundModifiers = RoundModifiers {
        friction: 1.0,
        speed: 1.0,
        push: 1.0,
        bounce: 1.0,
        arena_scale: 1.0,
        shrink_speed: 1.0,
    };

    /// All multipliers finite and positive
    pub fn is_valid(&self) -> bool {
        [
            self.friction,
            self.speed,
            self.push,
            self.bounce,
            self.arena_scale,
            self.shrink_speed,
        ]
        .iter()
        .all(|m| m.is_finite() && *m > 0.0)
    }
}

/// A named entry in the modifier table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: RoundModifiers,
}

impl Modifier {
    fn new(name: &str, description: &str, effects: RoundModifiers) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            effects,
        }
    }
}

/// Built-in modifier table
pub fn default_modifier_table() -> Vec<Modifier> {
    let n = RoundModifiers::NEUTRAL;
    vec![
        Modifier::new("Ice Rink", "Almost no friction", RoundModifiers { friction: 1.06, ..n }),
        Modifier::new("Mud", "Heavy drag", RoundModifiers { friction: 0.95, ..n }),
        Modifier::new("Heavy Hitters", "Collisions hit much harder", RoundModifiers { push: 1.6, ..n }),
        Modifier::new("Turbo", "Everyone moves faster", RoundModifiers { speed: 1.35, ..n }),
        Modifier::new("Rubber", "Extra bouncy collisions", RoundModifiers { bounce: 1.5, ..n }),
        Modifier::new("Tiny Arena", "The arena starts smaller", RoundModifiers { arena_scale: 0.75, ..n }),
        Modifier::new("Closing In", "The arena shrinks twice as fast", RoundModifiers { shrink_speed: 2.0, ..n }),
    ]
}

/// Pick the modifier for a round: `no_modifier_chance` of none, otherwise a
/// uniform pick from `table`
pub fn select_modifier<R: Rng + ?Sized>(
    rng: &mut R,
    table: &[Modifier],
    no_modifier_chance: f64,
) -> Option<Modifier> {
    if table.is_empty() || rng.gen_bool(no_modifier_chance.clamp(0.0, 1.0)) {
        return None;
    }
    let index = rng.gen_range(0..table.len());
    Some(table[index].clone())
}
