//! Headless demo: an autopilot plays a seeded run and prints the minimap
//! at every level it reaches.
//!
//! Usage: `maze-crawler [seed] [levels] [config-dir]`. Log verbosity follows
//! `RUST_LOG` (default `maze_crawler=info`).

use std::env;
use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use maze_crawler::combat::TurnOutcome;
use maze_crawler::config::EffectDescriptor;
use maze_crawler::view::minimap::{render_minimap, to_plain_text};
use maze_crawler::world::Facing;
use maze_crawler::{CrawlError, GameConfig, Mode, Session};

const DEFAULT_SEED: u64 = 7;
const DEFAULT_LEVELS: u32 = 3;
/// Upper bound on autopilot decisions per run.
const ACTION_BUDGET: usize = 20_000;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("maze_crawler=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn facing_toward(from: (usize, usize), to: (usize, usize)) -> Option<Facing> {
    match (to.0 as i64 - from.0 as i64, to.1 as i64 - from.1 as i64) {
        (0, -1) => Some(Facing::North),
        (1, 0) => Some(Facing::East),
        (0, 1) => Some(Facing::South),
        (-1, 0) => Some(Facing::West),
        _ => None,
    }
}

fn player_cell(session: &Session) -> (usize, usize) {
    let (x, y) = session.pose().cell();
    (x.max(0) as usize, y.max(0) as usize)
}

/// Next cell to walk to: the boss while it seals the exit, then loose
/// items, then the exit. Falls back to the nearest enemy when everything
/// else is walled off by monsters.
fn next_step(session: &Session) -> Option<(usize, usize)> {
    let level = session.level();
    let here = player_cell(session);

    let mut goals: Vec<(usize, usize)> = Vec::new();
    if let Some(boss) = level.active_boss() {
        goals.push((boss.x, boss.y));
    }
    goals.extend(level.items.iter().filter(|s| s.active).map(|s| (s.x, s.y)));
    goals.push(level.grid.exit());

    let first_hop = |goal| level.route(here, goal).and_then(|p| p.first().copied());
    goals.into_iter().find_map(first_hop).or_else(|| {
        level
            .enemies
            .iter()
            .filter(|s| s.active)
            .filter_map(|s| level.route(here, (s.x, s.y)))
            .min_by_key(Vec::len)
            .and_then(|p| p.first().copied())
    })
}

/// Heal when low, spend mp on damage while it lasts, otherwise swing.
fn fight(session: &mut Session) -> Result<TurnOutcome, CrawlError> {
    let player = session.player();
    if player.hp * 3 <= player.max_hp {
        let potion = player
            .inventory
            .iter()
            .position(|i| matches!(i.item.effect, EffectDescriptor::Heal { .. }));
        if let Some(index) = potion {
            return session.use_item(index);
        }
    }
    let skill = player.skills.iter().position(|s| {
        s.mp_cost <= player.mp
            && matches!(
                s.effect,
                EffectDescriptor::Damage { .. } | EffectDescriptor::MultiTarget { .. }
            )
    });
    match skill {
        Some(index) => session.cast_skill(index),
        None => session.attack(),
    }
}

fn print_level(session: &Session) {
    let level = session.level();
    println!(
        "── level {} ({}x{}) ──",
        level.number,
        level.grid.size(),
        level.grid.size()
    );
    println!(
        "{}",
        to_plain_text(&render_minimap(level, session.pose()))
    );
}

fn run(session: &mut Session, levels: u32) -> Result<(), CrawlError> {
    print_level(session);
    for _ in 0..ACTION_BUDGET {
        if session.is_over() {
            return Ok(());
        }
        if *session.mode() != Mode::Exploring {
            fight(session)?;
            continue;
        }

        let here = player_cell(session);
        if session.level().active_item_at(here.0, here.1).is_some() {
            session.pickup()?;
        }
        if session.level().grid.exit() == here && !session.level().exit_blocked() {
            if session.level().number >= levels {
                return Ok(());
            }
            session.advance_level()?;
            print_level(session);
            continue;
        }

        let Some(next) = next_step(session) else {
            tracing::warn!(level = session.level().number, "autopilot is stuck");
            return Ok(());
        };
        if let Some(facing) = facing_toward(here, next) {
            session.step(facing)?;
        }
    }
    tracing::warn!("action budget exhausted");
    Ok(())
}

fn main() {
    init_tracing();

    let mut args = env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    let levels = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LEVELS);
    let config = match args.next() {
        Some(dir) => GameConfig::from_dir(Path::new(&dir)),
        None => GameConfig::default(),
    };

    let mut session = Session::new(config, seed);
    if let Err(e) = run(&mut session, levels) {
        tracing::error!(error = %e, "autopilot stopped");
    }

    let player = session.player();
    println!();
    for line in session.messages().iter().rev().take(8).rev() {
        println!("  {}", line);
    }
    println!(
        "level {} · hp {}/{} · mp {}/{} · exp {}{}",
        session.level().number,
        player.hp,
        player.max_hp,
        player.mp,
        player.max_mp,
        player.experience,
        if session.is_over() { " · defeated" } else { "" }
    );
}
