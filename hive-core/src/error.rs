//! Error types

use crate::hex::Hex;
use crate::pieces::{Piece, Player};
use std::fmt;

pub type Result<T> = std::result::Result<T, HiveError>;

/// Why a placement or movement was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The game already has a result
    GameOver,
    /// The piece belongs to the player who is not on turn
    WrongColor,
    /// Queens may not open a player's placements
    QueenOnFirstPlacement,
    /// Three pieces are down without the queen; the queen must come next
    QueenRequired,
    /// Nothing may move before its owner's queen is on the board
    QueenNotPlaced,
    /// Placing a piece that is already on the board
    AlreadyPlaced,
    /// Moving a piece that is not on the board
    NotPlaced,
    /// The target hex is occupied
    Occupied,
    /// The placement would not touch the hive
    Detached,
    /// The placement would touch an opposing piece
    TouchesOpponent,
    /// Source and target are the same hex
    SameCell,
    /// Lifting the piece would split the hive
    BreaksHive,
    /// Another piece sits on top of this one
    Covered,
    /// The piece cannot reach the target
    Unreachable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::GameOver => "the game is over",
            Rejection::WrongColor => "not this player's piece",
            Rejection::QueenOnFirstPlacement => "queen may not be the first placement",
            Rejection::QueenRequired => "queen must be placed by the fourth placement",
            Rejection::QueenNotPlaced => "queen is not on the board yet",
            Rejection::AlreadyPlaced => "piece is already on the board",
            Rejection::NotPlaced => "piece is not on the board",
            Rejection::Occupied => "target is occupied",
            Rejection::Detached => "target does not touch the hive",
            Rejection::TouchesOpponent => "target touches an opposing piece",
            Rejection::SameCell => "target is the current cell",
            Rejection::BreaksHive => "moving would split the hive",
            Rejection::Covered => "piece is covered",
            Rejection::Unreachable => "piece cannot reach the target",
        };
        f.write_str(text)
    }
}

/// Errors raised by the engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HiveError {
    #[error("unrecognized piece: {0:?}")]
    InvalidPiece(String),

    #[error("invalid placement of {piece} at {target}: {reason}")]
    InvalidPlacement {
        piece: Piece,
        target: Hex,
        reason: Rejection,
    },

    #[error("invalid movement of {piece} to {target}: {reason}")]
    InvalidMovement {
        piece: Piece,
        target: Hex,
        reason: Rejection,
    },

    #[error("action index {index} out of range: {detail}")]
    ActionIndexOutOfRange { index: usize, detail: &'static str },

    #[error("{piece} to {target} is legal but has no action index")]
    Unindexed { piece: Piece, target: Hex },

    #[error("malformed state: {0}")]
    MalformedState(String),

    #[error("{0} cannot pass while a legal action exists")]
    PassNotAllowed(Player),
}

impl HiveError {
    /// The rejection reason for placement and movement errors
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            HiveError::InvalidPlacement { reason, .. } | HiveError::InvalidMovement { reason, .. } => {
                Some(*reason)
            }
            _ => None,
        }
    }
}
