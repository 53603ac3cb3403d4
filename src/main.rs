#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::path::PathBuf;

#[cfg(feature = "std")]
use anyhow::Context;
#[cfg(feature = "std")]
use broadside::{init_logging, persistence, prelude::*};
#[cfg(feature = "std")]
use clap::{Parser, Subcommand};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Auto-play a game, the player's side driven by the same strategy as
    /// the computer, and print a JSON summary.
    Sim {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "JSON file with game rules")]
        config: Option<PathBuf>,
        #[arg(long, help = "Override the board size from the rules")]
        board_size: Option<usize>,
        #[arg(long, help = "Stop once this many turns have been played")]
        max_turns: Option<u32>,
        #[arg(long, help = "Write the final state to this file")]
        save: Option<PathBuf>,
        #[arg(long, help = "Save in the binary format instead of JSON")]
        binary: bool,
    },
    /// Load a save file and print what the player can see of it.
    Inspect { path: PathBuf },
}

#[cfg(feature = "std")]
fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sim {
            seed,
            config,
            board_size,
            max_turns,
            save,
            binary,
        } => {
            let mut rules = match config {
                Some(path) => GameConfig::from_json_file(path)?,
                None => GameConfig::default(),
            };
            if let Some(size) = board_size {
                rules.board_size = size;
            }
            let seed = seed.unwrap_or_else(rand::random);
            let session = simulate(rules, seed, max_turns)?;

            if let Some(path) = save {
                let format = if binary {
                    SaveFormat::Binary
                } else {
                    SaveFormat::Json
                };
                persistence::save_to_path(&session, &path, format)?;
            }

            let summary = json!({
                "seed": seed,
                "phase": session.phase(),
                "turnsElapsed": session.turns_elapsed(),
                "winner": session.winner(),
                "playerSunkenShips": session.sunk_ships(Actor::Player),
                "cpuSunkenShips": session.sunk_ships(Actor::Cpu),
            });
            println!("{}", serde_json::to_string(&summary)?);
        }
        Commands::Inspect { path } => {
            let session = persistence::load_from_path(&path)?;
            let view = persistence::player_view(&session);
            let report = json!({
                "seed": session.seed(),
                "winner": session.winner(),
                "view": view,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
fn simulate(rules: GameConfig, seed: u64, max_turns: Option<u32>) -> anyhow::Result<GameSession> {
    let mut session = GameSession::new_game(rules, seed)?;
    session.place_player_fleet_randomly()?;
    session.start()?;

    let mut pilot = AiPlayer::new();
    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(1));
    while session.phase() == Phase::InProgress
        && max_turns.map_or(true, |limit| session.turns_elapsed() < limit)
    {
        if session.is_player_turn() {
            let view = session.enemy_view();
            let remaining = session.board(Actor::Cpu).remaining_ship_lengths();
            let target = pilot
                .select_target(&mut rng, &view, &remaining)
                .context("no open cell left to fire at")?;
            let result = session.fire(Actor::Player, target)?;
            pilot.handle_shot_result(target, result);
        } else {
            let turn = session.play_cpu_turn()?;
            log::debug!("cpu turn: {:?}", turn);
        }
    }
    Ok(session)
}
