//! Perft command - count leaf nodes of the action tree
//!
//! Walks every legal action index to a fixed depth. The counts pin down the
//! move generator and the codec together: any change in either shows up as a
//! different number.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_start(), perft(), perft_parallel()
//! - Level 3: children()
//! - Level 4: formatting

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;

use hive_core::{action_from_index, legal_action_indices, GameState, Snapshot};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PerftArgs {
    /// Search depth in plies
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Split the root across worker threads
    #[arg(long)]
    pub parallel: bool,

    /// Start from a saved snapshot instead of the empty board
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run perft command
pub fn run(args: PerftArgs) -> Result<()> {
    let start = load_start(&args)?;

    tracing::info!(
        "Starting perft: depth={}, parallel={}",
        args.depth,
        args.parallel
    );

    for depth in 1..=args.depth {
        let timer = Instant::now();
        let nodes = if args.parallel {
            perft_parallel(&start, depth)
        } else {
            perft(&start, depth)
        };
        println!(
            "depth {:>2}: {:>12} nodes  ({:.2?})",
            depth,
            nodes,
            timer.elapsed()
        );
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_start(args: &PerftArgs) -> Result<GameState> {
    match &args.from {
        Some(path) => {
            let snapshot = Snapshot::load(path)?;
            snapshot
                .into_state()
                .with_context(|| format!("Invalid snapshot: {}", path.display()))
        }
        None => Ok(GameState::new()),
    }
}

/// Leaf nodes `depth` plies below `state`.
///
/// A mover with no legal index passes, which counts as a ply. Finished games
/// are dead ends and contribute nothing.
pub fn perft(state: &GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    children(state)
        .iter()
        .map(|child| perft(child, depth - 1))
        .sum()
}

/// Same count as [`perft`], with the root's children spread over rayon workers
pub fn perft_parallel(state: &GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    children(state)
        .par_iter()
        .map(|child| perft(child, depth - 1))
        .sum()
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Successor states, one per legal index (or the pass, if there is none)
fn children(state: &GameState) -> Vec<GameState> {
    if state.is_over() {
        return Vec::new();
    }
    let indices = legal_action_indices(state);
    if indices.is_empty() {
        let mut passed = state.clone();
        return match passed.pass_turn() {
            Ok(()) => vec![passed],
            Err(_) => Vec::new(),
        };
    }
    indices
        .into_iter()
        .filter_map(|index| {
            let action = action_from_index(state, index).ok()?;
            let mut child = state.clone();
            child.apply_action(action).ok()?;
            Some(child)
        })
        .collect()
}
