use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use knockout_arena::config::SimConfig;
use knockout_arena::game::constants::MAX_ACTORS;
use knockout_arena::game::events::SimEvent;
use knockout_arena::game::game_loop::{GameLoop, SlowMotion};
use knockout_arena::game::state::RoundPhase;
use knockout_arena::game::systems::ai::BotInputs;

/// Upper bound on frames for one headless match (one simulated hour)
const MAX_FRAMES: u64 = 60 * 60 * 60;

/// Headless match runner: bots on every slot, standings and final snapshot
/// printed as JSON.
///
/// Usage: `knockout-arena [ACTORS] [--strict]`
fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Knockout Arena v{}", env!("CARGO_PKG_VERSION"));

    let mut actor_count = MAX_ACTORS;
    let mut strict = false;
    for arg in std::env::args().skip(1) {
        if arg == "--strict" {
            strict = true;
        } else {
            actor_count = arg
                .parse()
                .with_context(|| format!("invalid actor count {:?}", arg))?;
        }
    }

    let config = if strict {
        SimConfig::from_env_strict().context("loading simulation config")?
    } else {
        SimConfig::load_or_default()
    };
    let frame_ms = config.timing.fixed_step_ms;
    let bot_seed = config.seed.unwrap_or_else(rand::random);
    info!(
        "Configuration loaded: {}x{} arena, first to {} wins, bot seed {}",
        config.arena.width, config.arena.height, config.round.wins_to_match, bot_seed
    );

    let mut game = GameLoop::new(Arc::new(config), actor_count);
    game.set_input_source(Box::new(BotInputs::new(bot_seed)));
    game.set_time_scale(Box::new(SlowMotion::new(0.3, 800.0)));
    let events = game.subscribe();

    game.start();
    let mut frames = 0;
    while game.phase() != RoundPhase::MatchEnd && frames < MAX_FRAMES {
        game.frame(frame_ms);
        frames += 1;
    }

    let (mut collisions, mut knockouts) = (0u32, 0u32);
    for event in events.try_iter() {
        match event {
            SimEvent::ActorsCollided { .. } => collisions += 1,
            SimEvent::ActorEliminated { .. } => knockouts += 1,
            _ => {}
        }
    }
    info!(
        "Simulated {} ticks ({:.1}s): {} collisions, {} knockouts",
        game.tick(),
        game.sim_time_ms() / 1000.0,
        collisions,
        knockouts
    );

    if game.phase() != RoundPhase::MatchEnd {
        anyhow::bail!("match did not finish within {} frames", MAX_FRAMES);
    }

    println!("{}", serde_json::to_string_pretty(&game.result())?);
    println!("{}", serde_json::to_string_pretty(&game.snapshot())?);

    Ok(())
}
