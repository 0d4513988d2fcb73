//! Tile-stack board
//!
//! The board maps each occupied hex to the stack of pieces on it, bottom
//! first. Empty hexes are never stored. A position cache answers "where is
//! this piece" and is updated by every mutation that touches the map.

use crate::hex::Hex;
use crate::pieces::{Piece, PieceKind, Player};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::ops::Deref;

/// Sparse tile map with stacking
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    tiles: FxHashMap<Hex, Vec<Piece>>,
    positions: FxHashMap<Piece, Hex>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Pieces on a hex, bottom to top (empty if unoccupied)
    pub fn tile_content(&self, hex: Hex) -> &[Piece] {
        self.tiles.get(&hex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The exposed piece of a hex
    pub fn top(&self, hex: Hex) -> Option<Piece> {
        self.tiles.get(&hex).and_then(|stack| stack.last().copied())
    }

    pub fn height(&self, hex: Hex) -> usize {
        self.tile_content(hex).len()
    }

    pub fn is_free(&self, hex: Hex) -> bool {
        !self.tiles.contains_key(&hex)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Where a piece stands, if it is on the board
    pub fn position(&self, piece: Piece) -> Option<Hex> {
        self.positions.get(&piece).copied()
    }

    pub fn is_placed(&self, piece: Piece) -> bool {
        self.positions.contains_key(&piece)
    }

    /// True if no other piece sits on top of this one
    pub fn is_exposed(&self, piece: Piece) -> bool {
        self.position(piece)
            .is_some_and(|hex| self.top(hex) == Some(piece))
    }

    /// Number of pieces on the board
    pub fn piece_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of pieces a player has on the board
    pub fn count_of(&self, color: Player) -> usize {
        self.positions.keys().filter(|p| p.color == color).count()
    }

    /// Occupied hexes in no particular order
    pub fn occupied(&self) -> impl Iterator<Item = Hex> + '_ {
        self.tiles.keys().copied()
    }

    /// Occupied hexes with their stacks, sorted by hex
    pub fn tiles(&self) -> Vec<(Hex, &[Piece])> {
        let mut tiles: Vec<_> = self
            .tiles
            .iter()
            .map(|(&hex, stack)| (hex, stack.as_slice()))
            .collect();
        tiles.sort_by_key(|&(hex, _)| hex);
        tiles
    }

    /// Placed pieces with their hexes
    pub fn placed(&self) -> impl Iterator<Item = (Piece, Hex)> + '_ {
        self.positions.iter().map(|(&piece, &hex)| (piece, hex))
    }

    /// Occupied neighbours of a hex, clockwise from west
    pub fn occupied_neighbours(&self, hex: Hex) -> Vec<Hex> {
        hex.neighbours()
            .into_iter()
            .filter(|nb| !self.is_free(*nb))
            .collect()
    }

    /// True if the occupied hexes form a single connected group
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.tiles.keys().next().copied() else {
            return true;
        };
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(hex) = queue.pop_front() {
            for nb in self.occupied_neighbours(hex) {
                if visited.insert(nb) {
                    queue.push_back(nb);
                }
            }
        }
        visited.len() == self.tiles.len()
    }

    /// First piece found resting on another piece without being a beetle
    pub fn misplaced_climber(&self) -> Option<(Piece, Hex)> {
        self.tiles().into_iter().find_map(|(hex, stack)| {
            stack
                .iter()
                .skip(1)
                .find(|p| p.kind != PieceKind::Beetle)
                .map(|&p| (p, hex))
        })
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Put a piece on top of `target`, taking it off its current hex first
    /// if it is already on the board.
    pub fn move_or_place(&mut self, piece: Piece, target: Hex) {
        if let Some(from) = self.position(piece) {
            if let Some(stack) = self.tiles.get_mut(&from) {
                stack.retain(|p| *p != piece);
                if stack.is_empty() {
                    self.tiles.remove(&from);
                }
            }
        }
        self.push(target, piece);
    }

    /// Temporarily take the top piece off `hex`.
    ///
    /// The piece goes back when the returned guard is dropped, so the board
    /// is restored on every exit path of whatever inspects it meanwhile.
    pub fn lift(&mut self, hex: Hex) -> Option<Lifted<'_>> {
        let piece = self.pop(hex)?;
        Some(Lifted {
            board: self,
            hex,
            piece,
        })
    }

    fn push(&mut self, hex: Hex, piece: Piece) {
        self.tiles.entry(hex).or_default().push(piece);
        self.positions.insert(piece, hex);
    }

    fn pop(&mut self, hex: Hex) -> Option<Piece> {
        let stack = self.tiles.get_mut(&hex)?;
        let piece = stack.pop()?;
        if stack.is_empty() {
            self.tiles.remove(&hex);
        }
        self.positions.remove(&piece);
        Some(piece)
    }
}

/// A board with one piece held in the air
pub struct Lifted<'a> {
    board: &'a mut Board,
    hex: Hex,
    piece: Piece,
}

impl Lifted<'_> {
    pub fn piece(&self) -> Piece {
        self.piece
    }
}

impl Deref for Lifted<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        &*self.board
    }
}

impl Drop for Lifted<'_> {
    fn drop(&mut self) {
        self.board.push(self.hex, self.piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{EAST, ORIGIN};

    fn piece(name: &str) -> Piece {
        name.parse().unwrap()
    }

    #[test]
    fn test_place_and_query() {
        let mut board = Board::new();
        assert!(board.is_empty());
        assert!(board.tile_content(ORIGIN).is_empty());

        board.move_or_place(piece("wS1"), ORIGIN);
        board.move_or_place(piece("bS1"), ORIGIN.neighbour(EAST));

        assert_eq!(board.tile_content(ORIGIN), &[piece("wS1")]);
        assert_eq!(board.position(piece("bS1")), Some(Hex::new(1, 0)));
        assert_eq!(board.occupied_neighbours(ORIGIN), vec![Hex::new(1, 0)]);
        assert!(board.is_free(Hex::new(-1, 0)));
        assert_eq!(board.count_of(Player::White), 1);
        assert_eq!(board.piece_count(), 2);
    }

    #[test]
    fn test_stacking_and_moving_off() {
        let mut board = Board::new();
        let beetle = Piece::new(Player::Black, PieceKind::Beetle, 1);
        board.move_or_place(piece("wQ1"), ORIGIN);
        board.move_or_place(beetle, Hex::new(1, 0));

        board.move_or_place(beetle, ORIGIN);
        assert_eq!(board.tile_content(ORIGIN), &[piece("wQ1"), beetle]);
        assert!(board.is_free(Hex::new(1, 0)), "vacated hexes are removed");
        assert!(!board.is_exposed(piece("wQ1")));
        assert_eq!(board.top(ORIGIN), Some(beetle));

        board.move_or_place(beetle, Hex::new(0, 1));
        assert_eq!(board.tile_content(ORIGIN), &[piece("wQ1")]);
        assert_eq!(board.position(beetle), Some(Hex::new(0, 1)));
    }

    #[test]
    fn test_lift_restores_on_drop() {
        let mut board = Board::new();
        board.move_or_place(piece("wQ1"), ORIGIN);
        board.move_or_place(piece("wB1"), ORIGIN);
        let before = board.clone();

        {
            let lifted = board.lift(ORIGIN).unwrap();
            assert_eq!(lifted.piece(), piece("wB1"));
            assert_eq!(lifted.tile_content(ORIGIN), &[piece("wQ1")]);
            assert!(!lifted.is_placed(piece("wB1")));
        }
        assert_eq!(board, before);

        {
            let _outer = board.lift(ORIGIN).unwrap();
        }
        assert_eq!(board, before);
        assert!(board.lift(Hex::new(5, 5)).is_none());
    }

    #[test]
    fn test_only_beetles_climb() {
        let mut board = Board::new();
        board.move_or_place(piece("wQ1"), ORIGIN);
        board.move_or_place(piece("bB1"), ORIGIN);
        board.move_or_place(piece("wB2"), ORIGIN);
        assert_eq!(board.misplaced_climber(), None);

        board.move_or_place(piece("bA1"), ORIGIN);
        assert_eq!(board.misplaced_climber(), Some((piece("bA1"), ORIGIN)));
    }

    #[test]
    fn test_connectivity() {
        let mut board = Board::new();
        assert!(board.is_connected());
        board.move_or_place(piece("wA1"), ORIGIN);
        board.move_or_place(piece("bA1"), Hex::new(1, 0));
        assert!(board.is_connected());
        board.move_or_place(piece("wA2"), Hex::new(3, 0));
        assert!(!board.is_connected());
        board.move_or_place(piece("bA2"), Hex::new(2, 0));
        assert!(board.is_connected());
    }
}
