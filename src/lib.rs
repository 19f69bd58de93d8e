//! Knockout Arena simulation library
//!
//! Deterministic fixed-timestep core for a local multiplayer knockout game:
//! actors shove each other out of an arena that shrinks, spins and pulls
//! until only one is left.
//!
//! Rendering and device input are left to collaborators; they plug in
//! through [`game::game_loop::InputSource`], [`game::game_loop::TimeScale`],
//! [`game::snapshot::SimSnapshot`] and the event channels handed out by
//! [`game::game_loop::GameLoop::subscribe`].

pub mod config;
pub mod game;
pub mod util;
