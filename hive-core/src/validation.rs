//! Legality gates
//!
//! These functions decide whether a single placement or movement is allowed.
//! They answer with a `Rejection` and leave wrapping it into a `HiveError`
//! to the caller, which knows whether the attempt was a place or a move.

use crate::board::Board;
use crate::error::Rejection;
use crate::hex::Hex;
use crate::moves;
use crate::pieces::{Piece, PieceKind, Player};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Placements a player may make before the queen has to come down
const QUEEN_DEADLINE: usize = 3;

/// Pieces on the board below which placements may touch either color
const FREE_TOUCH_LIMIT: usize = 2;

/// True if vacating the top of `hex` keeps the hive in one piece.
///
/// Only the top piece is lifted. A stack never disconnects anything because
/// the hex stays occupied.
pub fn validate_one_hive(board: &mut Board, hex: Hex) -> bool {
    if board.height(hex) > 1 {
        return true;
    }
    let Some(lifted) = board.lift(hex) else {
        return true;
    };

    let neighbours = lifted.occupied_neighbours(hex);
    let Some((&start, rest)) = neighbours.split_first() else {
        return true;
    };
    if rest.is_empty() {
        return true;
    }

    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::from([start]);
    visited.insert(start);
    while let Some(cell) = queue.pop_front() {
        for nb in lifted.occupied_neighbours(cell) {
            if visited.insert(nb) {
                queue.push_back(nb);
            }
        }
        if rest.iter().all(|nb| visited.contains(nb)) {
            return true;
        }
    }
    false
}

/// Turn-order and queen-timing gate shared by placements and movements
pub fn validate_turn(
    board: &Board,
    mover: Player,
    piece: Piece,
    is_move: bool,
) -> Result<(), Rejection> {
    if piece.color != mover {
        return Err(Rejection::WrongColor);
    }
    let queen_down = board.is_placed(Piece::queen(mover));
    if is_move {
        if !queen_down {
            return Err(Rejection::QueenNotPlaced);
        }
        return Ok(());
    }

    let placed = board.count_of(mover);
    if piece.kind == PieceKind::Queen && placed == 0 {
        return Err(Rejection::QueenOnFirstPlacement);
    }
    if piece.kind != PieceKind::Queen && placed >= QUEEN_DEADLINE && !queen_down {
        return Err(Rejection::QueenRequired);
    }
    Ok(())
}

/// Full placement gate: turn order, then the target hex
pub fn validate_place(
    board: &Board,
    mover: Player,
    piece: Piece,
    target: Hex,
) -> Result<(), Rejection> {
    if board.is_placed(piece) {
        return Err(Rejection::AlreadyPlaced);
    }
    validate_turn(board, mover, piece, false)?;
    check_place_target(board, mover, target)
}

/// Target-hex part of the placement gate
pub(crate) fn check_place_target(board: &Board, mover: Player, target: Hex) -> Result<(), Rejection> {
    if !board.is_free(target) {
        return Err(Rejection::Occupied);
    }
    if board.is_empty() {
        return Ok(());
    }

    let neighbours = board.occupied_neighbours(target);
    if neighbours.is_empty() {
        return Err(Rejection::Detached);
    }
    if board.piece_count() >= FREE_TOUCH_LIMIT
        && neighbours
            .iter()
            .any(|&nb| board.top(nb).is_some_and(|p| p.color != mover))
    {
        return Err(Rejection::TouchesOpponent);
    }
    Ok(())
}

/// Full movement gate.
///
/// Takes the board mutably for the simulated removals; it is unchanged on
/// return whatever the outcome.
pub fn validate_move(
    board: &mut Board,
    mover: Player,
    piece: Piece,
    target: Hex,
) -> Result<(), Rejection> {
    let from = check_can_move(board, mover, piece)?;
    if from == target {
        return Err(Rejection::SameCell);
    }
    if !moves::destinations(board, from).contains(&target) {
        return Err(Rejection::Unreachable);
    }
    Ok(())
}

/// Every movement condition that does not depend on the target.
/// Returns the piece's hex when it may move at all.
pub(crate) fn check_can_move(
    board: &mut Board,
    mover: Player,
    piece: Piece,
) -> Result<Hex, Rejection> {
    let from = board.position(piece).ok_or(Rejection::NotPlaced)?;
    validate_turn(board, mover, piece, true)?;
    if !board.is_exposed(piece) {
        return Err(Rejection::Covered);
    }
    if !validate_one_hive(board, from) {
        return Err(Rejection::BreaksHive);
    }
    Ok(from)
}
