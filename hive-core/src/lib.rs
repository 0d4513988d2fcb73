//! Hive Core - Rules engine
//!
//! This crate decides every question of legality for the board game Hive:
//! - Hex geometry (unbounded grid, axial coordinates)
//! - Pieces, the tile-stack board and the one-hive rule
//! - Per-kind movement and the full action generator
//! - The fixed-size action codec used by search and learning code
//! - Adjacency-matrix and JSON snapshot interchange formats

pub mod hex;
pub mod pieces;
pub mod error;
pub mod board;
pub mod moves;
pub mod validation;
pub mod game;
pub mod codec;
pub mod representation;
pub mod snapshot;

// Re-exports for convenient access
pub use hex::{Hex, DIRECTIONS, ORIGIN};
pub use pieces::{all_pieces, roster, Piece, PieceKind, Player, PIECES_PER_COLOR};
pub use error::{HiveError, Rejection, Result};
pub use board::Board;
pub use game::{Action, GameState, GameStatus};
pub use codec::{
    action_from_index, index_of_action, legal_action_indices, legal_action_vector,
    ACTION_SPACE_SIZE,
};
pub use representation::{
    adjacency_matrix, canonical_adjacency, from_adjacency, rotated, state_key, symmetries,
    AdjacencyMatrix,
};
pub use snapshot::Snapshot;
