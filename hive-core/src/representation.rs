//! Adjacency-matrix interchange format
//!
//! Rows and columns follow the 22 piece names in sorted order (`bA1` ..
//! `wS2`). Cell `(i, j)` describes where piece `j` is seen from piece `i`:
//!
//! | value | meaning |
//! |---|---|
//! | 0 | either piece is off the board |
//! | 1..=6 | `j` is in direction `value - 1` of `i` |
//! | 7 | `i` is below `j` in one stack |
//! | 8 | `i` is above `j` in one stack |
//! | 9 | both on the board, not adjacent (also the diagonal of a placed piece) |
//!
//! The matrix carries no absolute coordinates, so a board rebuilt from it
//! matches the encoded one up to translation.

use crate::board::Board;
use crate::error::{HiveError, Result};
use crate::game::GameState;
use crate::hex::{Hex, ORIGIN};
use crate::pieces::{all_pieces, Piece, Player, PIECES_PER_COLOR};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Index;

/// Rows (and columns) of the matrix
pub const MATRIX_SIZE: usize = 2 * PIECES_PER_COLOR;

const UNRELATED: u8 = 0;
const BELOW: u8 = 7;
const ABOVE: u8 = 8;
const NOT_ADJACENT: u8 = 9;

/// Pairwise spatial relations of all 22 pieces
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjacencyMatrix([[u8; MATRIX_SIZE]; MATRIX_SIZE]);

impl AdjacencyMatrix {
    /// The matrix of an empty board
    pub const fn empty() -> Self {
        Self([[UNRELATED; MATRIX_SIZE]; MATRIX_SIZE])
    }

    pub const fn from_rows(rows: [[u8; MATRIX_SIZE]; MATRIX_SIZE]) -> Self {
        Self(rows)
    }

    pub fn rows(&self) -> &[[u8; MATRIX_SIZE]; MATRIX_SIZE] {
        &self.0
    }

    /// Row-major values
    pub fn flatten(&self) -> Vec<u8> {
        self.0.iter().flatten().copied().collect()
    }

    fn is_placed(&self, i: usize) -> bool {
        self.0[i][i] == NOT_ADJACENT
    }
}

impl Index<(usize, usize)> for AdjacencyMatrix {
    type Output = u8;

    fn index(&self, (i, j): (usize, usize)) -> &u8 {
        &self.0[i][j]
    }
}

// ============================================================================
// ENCODING
// ============================================================================

/// The matrix of a state's board
pub fn adjacency_matrix(state: &GameState) -> AdjacencyMatrix {
    board_matrix(state.board())
}

fn board_matrix(board: &Board) -> AdjacencyMatrix {
    let names = all_pieces();
    let mut rows = [[UNRELATED; MATRIX_SIZE]; MATRIX_SIZE];
    for (i, &a) in names.iter().enumerate() {
        for (j, &b) in names.iter().enumerate() {
            rows[i][j] = relation(board, a, b);
        }
    }
    AdjacencyMatrix(rows)
}

fn relation(board: &Board, a: Piece, b: Piece) -> u8 {
    let (Some(ha), Some(hb)) = (board.position(a), board.position(b)) else {
        return UNRELATED;
    };
    if a == b {
        return NOT_ADJACENT;
    }
    if ha == hb {
        let stack = board.tile_content(ha);
        let level = |p: Piece| stack.iter().position(|q| *q == p);
        return if level(a) < level(b) { BELOW } else { ABOVE };
    }
    match ha.direction_to(hb) {
        Some(direction) => direction as u8 + 1,
        None => NOT_ADJACENT,
    }
}

/// The matrix seen by the player to move: colors are swapped when black is
/// on turn, so the mover always occupies the white rows.
pub fn canonical_adjacency(state: &GameState) -> AdjacencyMatrix {
    let matrix = adjacency_matrix(state);
    match state.current_player() {
        Player::White => matrix,
        Player::Black => swap_colors(&matrix),
    }
}

fn swap_colors(matrix: &AdjacencyMatrix) -> AdjacencyMatrix {
    // Sorted names put every black piece exactly one roster ahead of its
    // white twin.
    let twin = |i: usize| (i + PIECES_PER_COLOR) % MATRIX_SIZE;
    let mut rows = [[UNRELATED; MATRIX_SIZE]; MATRIX_SIZE];
    for (i, row) in rows.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = matrix.0[twin(i)][twin(j)];
        }
    }
    AdjacencyMatrix(rows)
}

/// The board turned one direction step clockwise
pub fn rotated(matrix: &AdjacencyMatrix) -> AdjacencyMatrix {
    let mut rows = matrix.0;
    for cell in rows.iter_mut().flatten() {
        if (1..=6).contains(cell) {
            *cell = *cell % 6 + 1;
        }
    }
    AdjacencyMatrix(rows)
}

/// The five non-trivial rotations of a board
pub fn symmetries(matrix: &AdjacencyMatrix) -> Vec<AdjacencyMatrix> {
    let mut out = Vec::with_capacity(5);
    let mut current = rotated(matrix);
    for _ in 0..5 {
        let next = rotated(&current);
        out.push(current);
        current = next;
    }
    out
}

/// Hashable text key for transposition tables
pub fn state_key(matrix: &AdjacencyMatrix) -> String {
    matrix
        .flatten()
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// DECODING
// ============================================================================

/// Rebuild a state from its matrix.
///
/// Stacks are grouped first, then laid out breadth-first from the first
/// placed piece, which lands on the origin.
pub fn from_adjacency(matrix: &AdjacencyMatrix, current_player: Player) -> Result<GameState> {
    if let Some(bad) = matrix.flatten().into_iter().find(|v| *v > NOT_ADJACENT) {
        return Err(HiveError::MalformedState(format!("unknown relation value {bad}")));
    }
    let names = all_pieces();
    let stacks = group_stacks(matrix);

    let mut hexes: Vec<Option<Hex>> = vec![None; stacks.len()];
    let mut queue = VecDeque::new();
    if !stacks.is_empty() {
        hexes[0] = Some(ORIGIN);
        queue.push_back(0);
    }
    while let Some(g) = queue.pop_front() {
        let Some(here) = hexes[g] else { continue };
        let from = stacks[g][0];
        for k in 0..stacks.len() {
            if hexes[k].is_some() {
                continue;
            }
            let value = matrix.0[from][stacks[k][0]];
            if !(1..=6).contains(&value) {
                continue;
            }
            let there = here.neighbour(value as usize - 1);
            if hexes.contains(&Some(there)) {
                return Err(HiveError::MalformedState(format!(
                    "two stacks claim {there}"
                )));
            }
            hexes[k] = Some(there);
            queue.push_back(k);
        }
    }

    let mut board = Board::new();
    for (stack, hex) in stacks.iter().zip(&hexes) {
        let Some(hex) = *hex else {
            let stranded: Vec<String> = stack.iter().map(|&i| names[i].to_string()).collect();
            return Err(HiveError::MalformedState(format!(
                "{} not connected to the hive",
                stranded.join(" ")
            )));
        };
        for &i in stack {
            board.move_or_place(names[i], hex);
        }
    }

    if let Some((piece, hex)) = board.misplaced_climber() {
        return Err(HiveError::MalformedState(format!(
            "{piece} is stacked at {hex} but is not a beetle"
        )));
    }
    if board_matrix(&board) != *matrix {
        return Err(HiveError::MalformedState(
            "relations do not describe a consistent board".to_string(),
        ));
    }
    Ok(GameState::from_board(board, current_player))
}

/// Placed pieces grouped by shared hex, each group bottom first
fn group_stacks(matrix: &AdjacencyMatrix) -> Vec<Vec<usize>> {
    let mut assigned = [false; MATRIX_SIZE];
    let mut stacks = Vec::new();
    for i in (0..MATRIX_SIZE).filter(|&i| matrix.is_placed(i)) {
        if assigned[i] {
            continue;
        }
        let mut stack: Vec<usize> = (0..MATRIX_SIZE)
            .filter(|&j| j == i || (!assigned[j] && matches!(matrix.0[i][j], BELOW | ABOVE)))
            .collect();
        let height = |x: usize| stack.iter().filter(|&&y| matrix.0[x][y] == ABOVE).count();
        let heights: Vec<usize> = stack.iter().map(|&x| height(x)).collect();
        let mut order: Vec<usize> = (0..stack.len()).collect();
        order.sort_by_key(|&k| heights[k]);
        stack = order.into_iter().map(|k| stack[k]).collect();
        for &x in &stack {
            assigned[x] = true;
        }
        stacks.push(stack);
    }
    stacks
}

impl GameState {
    /// See [`from_adjacency`]
    pub fn from_adjacency(matrix: &AdjacencyMatrix, current_player: Player) -> Result<Self> {
        from_adjacency(matrix, current_player)
    }

    pub fn adjacency_matrix(&self) -> AdjacencyMatrix {
        adjacency_matrix(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn piece(name: &str) -> Piece {
        name.parse().unwrap()
    }

    fn index(name: &str) -> usize {
        all_pieces().iter().position(|p| *p == piece(name)).unwrap()
    }

    fn state_of(layout: &[(&str, i32, i32)], player: Player) -> GameState {
        let mut board = Board::new();
        for &(name, x, y) in layout {
            board.move_or_place(piece(name), Hex::new(x, y));
        }
        GameState::from_board(board, player)
    }

    /// Positions relative to the first placed piece in sorted name order
    fn relative(state: &GameState) -> Vec<(Piece, Hex, usize)> {
        let board = state.board();
        let anchor = all_pieces()
            .into_iter()
            .find_map(|p| board.position(p))
            .unwrap_or(ORIGIN);
        let mut out: Vec<_> = board
            .placed()
            .map(|(p, hex)| {
                let level = board.tile_content(hex).iter().position(|q| *q == p).unwrap();
                (p, hex - anchor, level)
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_relations() {
        let state = state_of(
            &[("wQ1", 0, 0), ("bQ1", 1, 0), ("wB1", 1, 0), ("bA1", 3, 0)],
            Player::White,
        );
        let m = adjacency_matrix(&state);
        let (wq, bq, wb, ba) = (index("wQ1"), index("bQ1"), index("wB1"), index("bA1"));
        assert_eq!(m[(wq, bq)], 4, "east is direction 3");
        assert_eq!(m[(bq, wq)], 1, "west is direction 0");
        assert_eq!(m[(wq, wb)], 4, "applies to the whole stack");
        assert_eq!(m[(bq, wb)], BELOW);
        assert_eq!(m[(wb, bq)], ABOVE);
        assert_eq!(m[(wq, ba)], NOT_ADJACENT);
        assert_eq!(m[(wq, wq)], NOT_ADJACENT);
        assert_eq!(m[(index("wA1"), wq)], UNRELATED);
        assert_eq!(m[(index("wA1"), index("wA1"))], UNRELATED);
    }

    #[test]
    fn test_round_trip_translates_to_origin() {
        let state = state_of(
            &[
                ("wS1", 4, 4),
                ("bS1", 5, 4),
                ("wQ1", 3, 5),
                ("bQ1", 5, 5),
                ("bB1", 5, 5),
                ("wA1", 3, 4),
            ],
            Player::Black,
        );
        let matrix = adjacency_matrix(&state);
        let rebuilt = from_adjacency(&matrix, Player::Black).unwrap();
        assert_eq!(rebuilt.current_player(), Player::Black);
        assert_eq!(relative(&rebuilt), relative(&state));
        assert_eq!(adjacency_matrix(&rebuilt), matrix);
        // bA1..bS2 are all off the board, so bB1 is the first name placed
        assert_eq!(rebuilt.board().tile_content(ORIGIN), &[piece("bQ1"), piece("bB1")]);
    }

    #[test]
    fn test_lone_piece_and_empty_board() {
        let lone = state_of(&[("wG2", 7, -3)], Player::Black);
        let rebuilt = from_adjacency(&adjacency_matrix(&lone), Player::Black).unwrap();
        assert_eq!(rebuilt.board().tile_content(ORIGIN), &[piece("wG2")]);

        let empty = from_adjacency(&AdjacencyMatrix::empty(), Player::White).unwrap();
        assert_eq!(empty, GameState::new());
    }

    #[test]
    fn test_malformed_matrices() {
        let mut rows = [[0u8; MATRIX_SIZE]; MATRIX_SIZE];
        let (a, b) = (index("wA1"), index("bA1"));
        rows[a][a] = 9;
        rows[b][b] = 9;
        rows[a][b] = 9;
        rows[b][a] = 9;
        let err = from_adjacency(&AdjacencyMatrix::from_rows(rows), Player::White).unwrap_err();
        assert!(matches!(err, HiveError::MalformedState(_)), "two islands: {err}");

        // Adjacent one way, unrelated the other
        rows[a][b] = 4;
        let err = from_adjacency(&AdjacencyMatrix::from_rows(rows), Player::White).unwrap_err();
        assert!(matches!(err, HiveError::MalformedState(_)), "asymmetric: {err}");

        rows[b][a] = 1;
        assert!(from_adjacency(&AdjacencyMatrix::from_rows(rows), Player::White).is_ok());

        rows[0][5] = 12;
        assert!(from_adjacency(&AdjacencyMatrix::from_rows(rows), Player::White).is_err());
    }

    #[test]
    fn test_only_beetles_stack() {
        let mut rows = [[0u8; MATRIX_SIZE]; MATRIX_SIZE];
        let (wq, bq) = (index("wQ1"), index("bQ1"));
        rows[wq][wq] = NOT_ADJACENT;
        rows[bq][bq] = NOT_ADJACENT;
        rows[wq][bq] = BELOW;
        rows[bq][wq] = ABOVE;
        let err = from_adjacency(&AdjacencyMatrix::from_rows(rows), Player::White).unwrap_err();
        assert!(matches!(err, HiveError::MalformedState(_)), "queen on queen: {err}");

        // The same stack with a beetle on top is fine
        let wb = index("wB1");
        rows[bq] = [0; MATRIX_SIZE];
        rows[wq][bq] = UNRELATED;
        rows[wb][wb] = NOT_ADJACENT;
        rows[wq][wb] = BELOW;
        rows[wb][wq] = ABOVE;
        let rebuilt = from_adjacency(&AdjacencyMatrix::from_rows(rows), Player::White).unwrap();
        assert_eq!(rebuilt.board().tile_content(ORIGIN), &[piece("wQ1"), piece("wB1")]);
    }

    #[test]
    fn test_canonical_swaps_colors_for_black() {
        let state = state_of(&[("wS1", 0, 0), ("bA1", 1, 0)], Player::Black);
        let canonical = canonical_adjacency(&state);
        // bA1 now sits in wA1's rows, wS1 in bS1's
        assert_eq!(canonical[(index("wA1"), index("bS1"))], 1);
        assert_eq!(canonical[(index("bS1"), index("wA1"))], 4);
        assert_eq!(canonical[(index("bA1"), index("wS1"))], 0);

        let white_view = GameState::from_board(state.board().clone(), Player::White);
        assert_eq!(canonical_adjacency(&white_view), adjacency_matrix(&white_view));
    }

    #[test]
    fn test_rotations() {
        let state = state_of(
            &[("wS1", 0, 0), ("bS1", 1, 0), ("wQ1", -1, 1), ("bA1", 2, -1)],
            Player::White,
        );
        let matrix = adjacency_matrix(&state);
        let all = symmetries(&matrix);
        assert_eq!(all.len(), 5);
        assert_eq!(rotated(&all[4]), matrix, "six turns is a full circle");
        assert!(all.iter().all(|m| *m != matrix));

        // Rotating the matrix agrees with rotating every hex
        let mut turned = Board::new();
        for (p, hex) in state.board().placed() {
            turned.move_or_place(p, hex.rotated());
        }
        assert_eq!(board_matrix(&turned), all[0]);
    }

    #[test]
    fn test_state_key() {
        let key = state_key(&AdjacencyMatrix::empty());
        assert_eq!(key.split(',').count(), MATRIX_SIZE * MATRIX_SIZE);
        let state = state_of(&[("wS1", 0, 0)], Player::White);
        assert_ne!(state_key(&adjacency_matrix(&state)), key);
    }
}
