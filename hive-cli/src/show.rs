//! Show command - render a saved position
//!
//! Prints the board, the game status and every legal action index with the
//! action it decodes to.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hive_core::{action_from_index, canonical_adjacency, legal_action_indices, state_key, Snapshot};

use crate::render::render;

#[derive(Args)]
pub struct ShowArgs {
    /// Snapshot JSON file
    pub file: PathBuf,

    /// Also print the canonical adjacency key
    #[arg(long)]
    pub key: bool,
}

/// Run show command
pub fn run(args: ShowArgs) -> Result<()> {
    let snapshot = Snapshot::load(&args.file)?;
    let state = snapshot
        .into_state()
        .with_context(|| format!("Invalid snapshot: {}", args.file.display()))?;

    println!("{}\n", render(state.board()));
    println!("To move: {}", state.current_player());
    println!("Status:  {:?}", state.is_terminal());

    if args.key {
        println!("Key:     {}", state_key(&canonical_adjacency(&state)));
    }

    let indices = legal_action_indices(&state);
    println!("\n{} legal action indices", indices.len());
    for index in indices {
        let action = action_from_index(&state, index)?;
        println!("  {:>4}  {}", index, action);
    }

    Ok(())
}
