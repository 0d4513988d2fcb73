//! Self-play command - random games with invariant checks
//!
//! Plays games where each side picks a uniformly random legal action index,
//! checking engine invariants after every ply. Any violation is reported
//! with the game seed so it can be replayed.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), play_game()
//! - Level 3: step(), check_invariants()
//! - Level 4: create_rng(), outcome_name(), print_summary()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use hive_core::{
    action_from_index, index_of_action, legal_action_indices, legal_action_vector, GameState,
    GameStatus, Piece, Player, ACTION_SPACE_SIZE,
};

// ============================================================================
// CONFIGURATION (Level 4)
// ============================================================================

/// Self-play run configuration
#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    /// Number of games
    pub games: usize,
    /// Plies after which a game is abandoned as unfinished
    pub max_turns: usize,
    /// Base seed; game `i` uses `seed + i` (None = random)
    pub seed: Option<u64>,
    /// Check invariants after every ply
    pub check_invariants: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            games: 20,
            max_turns: 200,
            seed: None,
            check_invariants: true,
        }
    }
}

impl SelfPlayConfig {
    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_checks(mut self, check_invariants: bool) -> Self {
        self.check_invariants = check_invariants;
        self
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// One finished (or abandoned) game
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub seed: u64,
    pub outcome: GameStatus,
    pub turns: usize,
    pub passes: usize,
    pub violations: Vec<String>,
}

/// Totals over a self-play run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelfPlayReport {
    pub games: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub unfinished: usize,
    pub total_turns: usize,
    pub violations: Vec<String>,
    pub records: Vec<GameRecord>,
}

impl SelfPlayReport {
    fn from_records(records: Vec<GameRecord>) -> Self {
        let count = |status: GameStatus| records.iter().filter(|r| r.outcome == status).count();
        let violations = records
            .iter()
            .flat_map(|r| r.violations.iter().map(move |v| format!("seed {}: {}", r.seed, v)))
            .collect();
        Self {
            games: records.len(),
            white_wins: count(GameStatus::WhiteWins),
            black_wins: count(GameStatus::BlackWins),
            draws: count(GameStatus::Draw),
            unfinished: count(GameStatus::Unfinished),
            total_turns: records.iter().map(|r| r.turns).sum(),
            violations,
            records,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SelfPlayArgs {
    /// Number of games to play
    #[arg(long, default_value = "20")]
    pub games: usize,

    /// Abandon a game after this many plies
    #[arg(long, default_value = "200")]
    pub max_turns: usize,

    /// Skip the per-ply invariant checks
    #[arg(long)]
    pub no_checks: bool,

    /// Write the full report as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run self-play command
pub fn run(args: SelfPlayArgs, seed: Option<u64>) -> Result<()> {
    let mut config = SelfPlayConfig::default()
        .with_games(args.games)
        .with_max_turns(args.max_turns)
        .with_checks(!args.no_checks);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    tracing::info!(
        "Starting self-play: {} games, max {} turns, seed {:?}",
        config.games,
        config.max_turns,
        config.seed
    );

    let progress = ProgressBar::new(config.games as u64);
    progress.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} games",
    )?);

    let report = play_games(&config, &progress);
    progress.finish_and_clear();

    print_summary(&report);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    if !report.is_clean() {
        anyhow::bail!("{} invariant violations", report.violations.len());
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play `config.games` games in parallel. Records come back in game order.
pub fn play_games(config: &SelfPlayConfig, progress: &ProgressBar) -> SelfPlayReport {
    let base_seed = config.seed.unwrap_or_else(rand::random);
    let records: Vec<GameRecord> = (0..config.games as u64)
        .into_par_iter()
        .map(|i| {
            let record = play_game(base_seed.wrapping_add(i), config);
            progress.inc(1);
            record
        })
        .collect();
    SelfPlayReport::from_records(records)
}

/// Play one game to the end or to the turn limit
pub fn play_game(seed: u64, config: &SelfPlayConfig) -> GameRecord {
    let mut rng = create_rng(Some(seed));
    let mut state = GameState::new();
    let mut record = GameRecord {
        seed,
        outcome: GameStatus::Unfinished,
        turns: 0,
        passes: 0,
        violations: Vec::new(),
    };

    while record.turns < config.max_turns && !state.is_over() {
        match step(&mut state, &mut rng) {
            Ok(passed) => {
                record.turns += 1;
                if passed {
                    record.passes += 1;
                }
            }
            Err(violation) => {
                record.violations.push(format!("turn {}: {}", record.turns, violation));
                break;
            }
        }
        if config.check_invariants {
            let turn = record.turns;
            record.violations.extend(
                check_invariants(&state)
                    .into_iter()
                    .map(|v| format!("turn {turn}: {v}")),
            );
            if !record.violations.is_empty() {
                break;
            }
        }
    }

    record.outcome = state.is_terminal();
    tracing::debug!(seed, outcome = ?record.outcome, turns = record.turns, "game finished");
    record
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one random ply. Returns whether it was a pass.
fn step(state: &mut GameState, rng: &mut ChaCha8Rng) -> std::result::Result<bool, String> {
    let indices = legal_action_indices(state);
    if indices.is_empty() {
        state
            .pass_turn()
            .map_err(|e| format!("no indexed action but pass refused: {e}"))?;
        return Ok(true);
    }
    let index = indices[rng.gen_range(0..indices.len())];
    let action =
        action_from_index(state, index).map_err(|e| format!("index {index} is set but: {e}"))?;
    state
        .apply_action(action)
        .map_err(|e| format!("decoded {action} was refused: {e}"))?;
    Ok(false)
}

/// Engine invariants that must hold in every reachable state
pub fn check_invariants(state: &GameState) -> Vec<String> {
    let mut violations = Vec::new();

    if !state.board().is_connected() {
        violations.push("hive is split".to_string());
    }

    let vector = legal_action_vector(state);
    if vector.len() != ACTION_SPACE_SIZE {
        violations.push(format!("action vector has length {}", vector.len()));
    }

    for index in legal_action_indices(state) {
        match action_from_index(state, index) {
            Ok(action) => match index_of_action(state, action) {
                Ok(back) if back == index => {}
                Ok(back) => {
                    violations.push(format!("{action} decoded from {index} encodes as {back}"))
                }
                Err(e) => {
                    violations.push(format!("{action} decoded from {index} fails to encode: {e}"))
                }
            },
            Err(e) => violations.push(format!("set index {index} fails to decode: {e}")),
        }
    }

    for color in [Player::White, Player::Black] {
        let placed = state.played_pieces(color);
        if placed.len() == 1 && placed[0] == Piece::queen(color) {
            violations.push(format!("{color} opened with the queen"));
        }
        if placed.len() >= 4 && state.queen_position(color).is_none() {
            violations.push(format!("{color} has {} pieces down but no queen", placed.len()));
        }
    }

    violations
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn outcome_name(status: GameStatus) -> &'static str {
    match status {
        GameStatus::WhiteWins => "white wins",
        GameStatus::BlackWins => "black wins",
        GameStatus::Draw => "draw",
        GameStatus::Unfinished => "unfinished",
    }
}

fn print_summary(report: &SelfPlayReport) {
    println!("\n=== Self-play Results ===");
    println!("Games:      {}", report.games);
    println!("White wins: {}", report.white_wins);
    println!("Black wins: {}", report.black_wins);
    println!("Draws:      {}", report.draws);
    println!("Unfinished: {}", report.unfinished);
    if report.games > 0 {
        println!(
            "Avg turns:  {:.1}",
            report.total_turns as f64 / report.games as f64
        );
    }
    for record in report.records.iter().filter(|r| r.outcome != GameStatus::Unfinished) {
        tracing::debug!(
            "seed {}: {} after {} turns",
            record.seed,
            outcome_name(record.outcome),
            record.turns
        );
    }
    if report.is_clean() {
        println!("Invariants: ok");
    } else {
        println!("Invariants: {} violations", report.violations.len());
        for violation in &report.violations {
            println!("  {violation}");
        }
    }
}
