//! Heist AI runner
//!
//! Plays AI turns on a board (the built-in demo heist or a JSON map), feeds
//! every executed action through the rules advisor and prints the game log.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use heist_tactics::advisor::{AdvisorConfig, AdvisorEntry, AdvisorEvent, RulesAdvisor};
use heist_tactics::ai::{ActionResult, Difficulty, DifficultyProfile, GameLogEntry, HeuristicPlanner, RecordingEmitters};
use heist_tactics::core::config::{config, set_config, EngineConfig};
use heist_tactics::core::error::Result;
use heist_tactics::core::types::PlayerNumber;
use heist_tactics::data::tables::{load_tables, set_tables, tables};
use heist_tactics::game::{calculate_team_vp, compute_alert_level, demo_scenario, load_map, TurnState};
use heist_tactics::spatial::GridType;

/// Heist AI - run AI turns and audit them with the rules advisor
#[derive(Parser, Debug)]
#[command(name = "heist-ai")]
#[command(about = "Run heuristic AI turns on a Heist City board and report rule advisories")]
struct Args {
    /// Difficulty preset (easy, normal, hard) or path to a difficulty TOML file
    #[arg(long, default_value = "normal")]
    difficulty: String,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Grid topology: hex or square
    #[arg(long, default_value = "hex")]
    grid: String,

    /// Board saved as JSON (defaults to the built-in demo heist)
    #[arg(long)]
    map: Option<PathBuf>,

    /// Domain tables override (TOML)
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Engine config override (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advisor display config (TOML)
    #[arg(long)]
    advisor: Option<PathBuf>,

    /// Only let the AI play this seat; by default it plays both
    #[arg(long)]
    player: Option<PlayerNumber>,

    /// Number of turns to play
    #[arg(long, default_value_t = 1)]
    turns: u32,

    /// Scenario alert modifier
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    alert_modifier: i32,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct TurnReport {
    turn: u32,
    alert_level: u32,
    log: Vec<GameLogEntry>,
    results: Vec<ActionResult>,
    advisories: Vec<AdvisorEntry>,
}

#[derive(Serialize)]
struct RunReport {
    seed: u64,
    difficulty: String,
    turns: Vec<TurnReport>,
    victory_points: BTreeMap<PlayerNumber, u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heist_tactics=info")))
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        let loaded = EngineConfig::load(path)?;
        if set_config(loaded).is_err() {
            tracing::warn!("Engine config already initialized, ignoring {}", path.display());
        }
    }
    if let Some(path) = &args.tables {
        let loaded = load_tables(path)?;
        if set_tables(loaded).is_err() {
            tracing::warn!("Domain tables already initialized, ignoring {}", path.display());
        }
    }

    let grid = GridType::from_str(&args.grid)?;
    let profile = if args.difficulty.ends_with(".toml") {
        DifficultyProfile::load(&PathBuf::from(&args.difficulty))?
    } else {
        DifficultyProfile::preset(Difficulty::from_str(&args.difficulty)?)
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut map = match &args.map {
        Some(path) => load_map(path)?,
        None => demo_scenario(tables()),
    };
    let mut turn = TurnState::new(&map);

    let mut advisor = RulesAdvisor::new(grid);
    if let Some(path) = &args.advisor {
        advisor.set_config(AdvisorConfig::load(path)?);
    }

    let seats: Vec<PlayerNumber> = match args.player {
        Some(p) => vec![p],
        None => vec![1, 2],
    };

    tracing::info!(
        seed,
        difficulty = %profile.name,
        grid = ?grid,
        "Starting heist"
    );

    let mut ai = HeuristicPlanner::with_seed(profile.clone(), seed);
    let mut reports = Vec::new();

    for _ in 0..args.turns.min(config().max_turns) {
        let mut emitters = RecordingEmitters::default();
        let mut results = Vec::new();
        let mut advisories = Vec::new();

        for &player in &seats {
            let taken = ai.take_turn(&mut map, &mut turn, grid, player, args.alert_modifier, &mut emitters);
            advisories.extend(advisor.observe_results(&taken, &map));
            results.extend(taken);
        }

        let ended = turn.clone();
        turn.advance_turn(&map);
        let alert = compute_alert_level(&map, args.alert_modifier, config());
        advisories.extend(advisor.on_event(
            &AdvisorEvent::TurnPassed {
                ended: ended.clone(),
                next: Some(turn.clone()),
                alert_shown: Some(alert.level),
                alert_modifier: args.alert_modifier,
            },
            &map,
        ));

        reports.push(TurnReport {
            turn: ended.turn_number,
            alert_level: alert.level,
            log: emitters.log,
            results,
            advisories,
        });
    }

    let victory_points: BTreeMap<PlayerNumber, u32> = [1, 2]
        .into_iter()
        .map(|p| (p, calculate_team_vp(&map, p)))
        .collect();

    let report = RunReport {
        seed,
        difficulty: profile.name.clone(),
        turns: reports,
        victory_points,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report, advisor.config()),
    }

    Ok(())
}

fn print_text(report: &RunReport, advisor_config: &AdvisorConfig) {
    println!("=== HEIST (seed {}, {}) ===", report.seed, report.difficulty);
    for turn in &report.turns {
        println!();
        println!("--- Turn {} (alert level {}) ---", turn.turn, turn.alert_level);
        for line in &turn.log {
            match (&line.action_name, &line.target_name) {
                (Some(action), Some(target)) => {
                    println!("  {}: {} -> {}: {}", line.character_name, action, target, line.result)
                }
                (Some(action), None) => println!("  {}: {}: {}", line.character_name, action, line.result),
                (None, _) => println!("  {} plans to {}", line.character_name, line.result),
            }
        }
        let shown: Vec<_> = turn
            .advisories
            .iter()
            .filter(|e| heist_tactics::advisor::should_show(e, advisor_config))
            .collect();
        if !shown.is_empty() {
            println!("  Advisories:");
            for entry in shown {
                println!("    {}", entry);
            }
        }
    }
    println!();
    for (player, vp) in &report.victory_points {
        println!("Player {}: {} VP", player, vp);
    }
}
