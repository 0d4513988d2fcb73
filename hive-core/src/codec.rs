//! Fixed-size action-space codec
//!
//! Every action a player can take maps to an index in a vector whose length
//! never changes:
//!
//! ```text
//! | initial (10) | placement (11 * 10 * 6 = 660) | movement (216) |
//! ```
//!
//! - Initial: one bit per non-queen roster piece, for the mover's very first
//!   placement. All six replies to a lone piece are symmetric, so only the
//!   west one is exposed.
//! - Placement: bit `p * 60 + a * 6 + d` places roster piece `p` in direction
//!   `d` of roster piece `a`, where `a` counts the roster with `p` left out.
//!   When several reference/direction pairs name one hex, only the lowest
//!   index is set.
//! - Movement: one block per roster piece, sized by kind. See
//!   [`moves::move_slots`] for the meaning of a slot.
//!
//! Decoding recomputes only the block the index falls in.

use crate::board::Board;
use crate::error::{HiveError, Result};
use crate::game::{Action, GameState};
use crate::hex::{Hex, ORIGIN, WEST};
use crate::moves;
use crate::pieces::{roster, Piece, PieceKind, Player, PIECES_PER_COLOR};
use crate::validation;
use rustc_hash::FxHashSet;

// ============================================================================
// LAYOUT
// ============================================================================

/// Placement directions per reference piece
const DIRECTION_COUNT: usize = 6;

/// Bits per piece in the placement segment
const PLACEMENT_BLOCK: usize = (PIECES_PER_COLOR - 1) * DIRECTION_COUNT;

/// Movement block size per roster piece
const MOVE_BLOCK_SIZES: [usize; PIECES_PER_COLOR] = [
    50, 50, 50, // A1 A2 A3
    6, 6,       // B1 B2
    6, 6, 6,    // G1 G2 G3
    6,          // Q1
    15, 15,     // S1 S2
];

const fn block_offsets() -> [usize; PIECES_PER_COLOR + 1] {
    let mut offsets = [0; PIECES_PER_COLOR + 1];
    let mut i = 0;
    while i < PIECES_PER_COLOR {
        offsets[i + 1] = offsets[i] + MOVE_BLOCK_SIZES[i];
        i += 1;
    }
    offsets
}

/// Start of each roster piece's movement block, relative to the segment
const MOVE_BLOCK_OFFSETS: [usize; PIECES_PER_COLOR + 1] = block_offsets();

pub const INITIAL_SEGMENT_LEN: usize = PIECES_PER_COLOR - 1;
pub const PLACEMENT_SEGMENT_LEN: usize = PIECES_PER_COLOR * PLACEMENT_BLOCK;
pub const MOVEMENT_SEGMENT_LEN: usize = MOVE_BLOCK_OFFSETS[PIECES_PER_COLOR];

pub const PLACEMENT_OFFSET: usize = INITIAL_SEGMENT_LEN;
pub const MOVEMENT_OFFSET: usize = PLACEMENT_OFFSET + PLACEMENT_SEGMENT_LEN;

/// Length of the action vector
pub const ACTION_SPACE_SIZE: usize = MOVEMENT_OFFSET + MOVEMENT_SEGMENT_LEN;

/// Where an index points
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Initial(usize),
    Placement { piece: usize, offset: usize },
    Movement { piece: usize, offset: usize },
}

fn locate(index: usize) -> Result<Slot> {
    if index < PLACEMENT_OFFSET {
        return Ok(Slot::Initial(index));
    }
    if index < MOVEMENT_OFFSET {
        let rel = index - PLACEMENT_OFFSET;
        return Ok(Slot::Placement {
            piece: rel / PLACEMENT_BLOCK,
            offset: rel % PLACEMENT_BLOCK,
        });
    }
    if index < ACTION_SPACE_SIZE {
        let rel = index - MOVEMENT_OFFSET;
        let piece = (0..PIECES_PER_COLOR)
            .rfind(|&p| MOVE_BLOCK_OFFSETS[p] <= rel)
            .unwrap_or(0);
        return Ok(Slot::Movement {
            piece,
            offset: rel - MOVE_BLOCK_OFFSETS[piece],
        });
    }
    Err(HiveError::ActionIndexOutOfRange {
        index,
        detail: "past the end of the action vector",
    })
}

/// Roster pieces that may open a player's placements, in roster order
fn opening_pieces(color: Player) -> impl Iterator<Item = Piece> {
    roster(color)
        .into_iter()
        .filter(|p| p.kind != PieceKind::Queen)
}

/// Roster index of the reference piece `a` for placing roster piece `p`
fn reference_index(piece: usize, a: usize) -> usize {
    if a < piece {
        a
    } else {
        a + 1
    }
}

// ============================================================================
// BLOCKS
// ============================================================================

/// Target of the initial segment, when it is the active one
fn initial_target(state: &GameState) -> Option<Hex> {
    let board = state.board();
    if state.is_over() || board.count_of(state.current_player()) > 0 || board.piece_count() > 1 {
        return None;
    }
    Some(match board.occupied().next() {
        Some(hex) => hex.neighbour(WEST),
        None => ORIGIN,
    })
}

/// Targets of set bits in one piece's placement block
fn placement_block(state: &GameState, p: usize) -> [Option<Hex>; PLACEMENT_BLOCK] {
    let mut block = [None; PLACEMENT_BLOCK];
    let board = state.board();
    let mover = state.current_player();
    let pieces = roster(mover);
    let piece = pieces[p];

    if state.is_over()
        || board.is_placed(piece)
        || validation::validate_turn(board, mover, piece, false).is_err()
    {
        return block;
    }

    let mut seen = FxHashSet::default();
    for a in 0..PIECES_PER_COLOR - 1 {
        let Some(at) = board.position(pieces[reference_index(p, a)]) else {
            continue;
        };
        for direction in 0..DIRECTION_COUNT {
            let target = at.neighbour(direction);
            if !seen.insert(target) {
                continue;
            }
            if validation::check_place_target(board, mover, target).is_ok() {
                block[a * DIRECTION_COUNT + direction] = Some(target);
            }
        }
    }
    block
}

/// Targets of one piece's movement block, computed on `scratch`
fn movement_block(state: &GameState, scratch: &mut Board, p: usize) -> Vec<Option<Hex>> {
    let size = MOVE_BLOCK_SIZES[p];
    if state.is_over() {
        return vec![None; size];
    }
    let piece = roster(state.current_player())[p];
    match validation::check_can_move(scratch, state.current_player(), piece) {
        Ok(from) => moves::move_slots(scratch, from),
        Err(_) => vec![None; size],
    }
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Indices of every set bit, ascending
pub fn legal_action_indices(state: &GameState) -> Vec<usize> {
    let mut indices = Vec::new();
    if state.is_over() {
        return indices;
    }
    let board = state.board();
    let mover = state.current_player();

    if let Some(target) = initial_target(state) {
        for (i, piece) in opening_pieces(mover).enumerate() {
            if validation::validate_place(board, mover, piece, target).is_ok() {
                indices.push(i);
            }
        }
    }

    for p in 0..PIECES_PER_COLOR {
        let base = PLACEMENT_OFFSET + p * PLACEMENT_BLOCK;
        for (offset, cell) in placement_block(state, p).iter().enumerate() {
            if cell.is_some() {
                indices.push(base + offset);
            }
        }
    }

    let mut scratch = board.clone();
    for p in 0..PIECES_PER_COLOR {
        let base = MOVEMENT_OFFSET + MOVE_BLOCK_OFFSETS[p];
        for (offset, cell) in movement_block(state, &mut scratch, p).iter().enumerate() {
            if cell.is_some() {
                indices.push(base + offset);
            }
        }
    }

    indices
}

/// The legality mask: `1` at every legal index, `0` elsewhere
pub fn legal_action_vector(state: &GameState) -> Vec<u8> {
    let mut vector = vec![0; ACTION_SPACE_SIZE];
    for index in legal_action_indices(state) {
        vector[index] = 1;
    }
    vector
}

/// Decode an index into the action it stands for in this state
pub fn action_from_index(state: &GameState, index: usize) -> Result<Action> {
    let not_set = || HiveError::ActionIndexOutOfRange {
        index,
        detail: "bit is not set in this state",
    };
    let mover = state.current_player();
    let pieces = roster(mover);

    match locate(index)? {
        Slot::Initial(i) => {
            let target = initial_target(state).ok_or_else(not_set)?;
            let piece = opening_pieces(mover).nth(i).ok_or_else(not_set)?;
            validation::validate_place(state.board(), mover, piece, target).map_err(|_| not_set())?;
            Ok(Action::new(piece, target))
        }
        Slot::Placement { piece, offset } => placement_block(state, piece)[offset]
            .map(|target| Action::new(pieces[piece], target))
            .ok_or_else(not_set),
        Slot::Movement { piece, offset } => {
            let mut scratch = state.board().clone();
            movement_block(state, &mut scratch, piece)
                .get(offset)
                .copied()
                .flatten()
                .map(|target| Action::new(pieces[piece], target))
                .ok_or_else(not_set)
        }
    }
}

/// Encode a legal action. Inverse of [`action_from_index`].
pub fn index_of_action(state: &GameState, action: Action) -> Result<usize> {
    state.check_action(action)?;
    let Action { piece, target } = action;
    let unindexed = || HiveError::Unindexed { piece, target };
    let p = piece
        .roster_index()
        .ok_or_else(|| HiveError::InvalidPiece(piece.to_string()))?;

    if state.board().is_placed(piece) {
        let mut scratch = state.board().clone();
        return movement_block(state, &mut scratch, p)
            .iter()
            .position(|cell| *cell == Some(target))
            .map(|offset| MOVEMENT_OFFSET + MOVE_BLOCK_OFFSETS[p] + offset)
            .ok_or_else(unindexed);
    }

    if let Some(opening) = initial_target(state) {
        if opening != target {
            return Err(unindexed());
        }
        return opening_pieces(piece.color)
            .position(|candidate| candidate == piece)
            .ok_or_else(unindexed);
    }

    placement_block(state, p)
        .iter()
        .position(|cell| *cell == Some(target))
        .map(|offset| PLACEMENT_OFFSET + p * PLACEMENT_BLOCK + offset)
        .ok_or_else(unindexed)
}
