//! Game state, turn order and the full action generator

use crate::board::Board;
use crate::codec;
use crate::error::{HiveError, Rejection, Result};
use crate::hex::{Hex, ORIGIN};
use crate::moves;
use crate::pieces::{roster, Piece, Player};
use crate::validation;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Outcome of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Unfinished,
    WhiteWins,
    BlackWins,
    Draw,
}

/// A placement or movement: put `piece` on `target`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Action {
    pub piece: Piece,
    pub target: Hex,
}

impl Action {
    pub const fn new(piece: Piece, target: Hex) -> Self {
        Self { piece, target }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.piece, self.target)
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to explore)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board, white to move
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Player::White,
        }
    }

    /// Wrap an existing board. The board is taken as is; loaders check it.
    pub fn from_board(board: Board, current_player: Player) -> Self {
        Self {
            board,
            current_player,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A player's pieces on the board, in roster order
    pub fn played_pieces(&self, color: Player) -> Vec<Piece> {
        roster(color)
            .into_iter()
            .filter(|p| self.board.is_placed(*p))
            .collect()
    }

    /// A player's pieces still in hand, in roster order
    pub fn unplayed_pieces(&self, color: Player) -> Vec<Piece> {
        roster(color)
            .into_iter()
            .filter(|p| !self.board.is_placed(*p))
            .collect()
    }

    pub fn queen_position(&self, color: Player) -> Option<Hex> {
        self.board.position(Piece::queen(color))
    }

    /// Which queen, if any, is fully surrounded
    pub fn is_terminal(&self) -> GameStatus {
        match (self.queen_surrounded(Player::White), self.queen_surrounded(Player::Black)) {
            (true, true) => GameStatus::Draw,
            (true, false) => GameStatus::BlackWins,
            (false, true) => GameStatus::WhiteWins,
            (false, false) => GameStatus::Unfinished,
        }
    }

    pub fn is_over(&self) -> bool {
        self.is_terminal() != GameStatus::Unfinished
    }

    fn queen_surrounded(&self, color: Player) -> bool {
        self.queen_position(color).is_some_and(|hex| {
            hex.neighbours()
                .iter()
                .all(|nb| !self.board.is_free(*nb))
        })
    }

    // ========================================================================
    // LEGALITY
    // ========================================================================

    /// Check a placement without performing it
    pub fn check_place(&self, piece: Piece, target: Hex) -> Result<()> {
        check_identity(piece)?;
        self.place_rejection(piece, target)
            .map_err(|reason| HiveError::InvalidPlacement { piece, target, reason })
    }

    /// Check a movement without performing it
    pub fn check_move(&self, piece: Piece, target: Hex) -> Result<()> {
        check_identity(piece)?;
        let outcome = if self.is_over() {
            Err(Rejection::GameOver)
        } else {
            let mut scratch = self.board.clone();
            validation::validate_move(&mut scratch, self.current_player, piece, target)
        };
        outcome.map_err(|reason| HiveError::InvalidMovement { piece, target, reason })
    }

    /// Check an action: a movement if the piece is on the board, else a placement
    pub fn check_action(&self, action: Action) -> Result<()> {
        if self.board.is_placed(action.piece) {
            self.check_move(action.piece, action.target)
        } else {
            self.check_place(action.piece, action.target)
        }
    }

    fn place_rejection(&self, piece: Piece, target: Hex) -> std::result::Result<(), Rejection> {
        if self.is_over() {
            return Err(Rejection::GameOver);
        }
        validation::validate_place(&self.board, self.current_player, piece, target)
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Play an action and hand the turn over
    pub fn apply(&mut self, piece: Piece, target: Hex) -> Result<()> {
        if self.board.is_placed(piece) {
            self.move_piece(piece, target)
        } else {
            self.place(piece, target)
        }
    }

    pub fn apply_action(&mut self, action: Action) -> Result<()> {
        self.apply(action.piece, action.target)
    }

    /// Put an unplayed piece on the board
    pub fn place(&mut self, piece: Piece, target: Hex) -> Result<()> {
        check_identity(piece)?;
        if let Err(reason) = self.place_rejection(piece, target) {
            tracing::debug!(%piece, %target, %reason, "placement rejected");
            return Err(HiveError::InvalidPlacement { piece, target, reason });
        }
        self.board.move_or_place(piece, target);
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    /// Move a piece that is already on the board
    pub fn move_piece(&mut self, piece: Piece, target: Hex) -> Result<()> {
        check_identity(piece)?;
        let outcome = if self.is_over() {
            Err(Rejection::GameOver)
        } else {
            validation::validate_move(&mut self.board, self.current_player, piece, target)
        };
        if let Err(reason) = outcome {
            tracing::debug!(%piece, %target, %reason, "movement rejected");
            return Err(HiveError::InvalidMovement { piece, target, reason });
        }
        self.board.move_or_place(piece, target);
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    /// Hand the turn over without acting. Only allowed when nothing else is.
    pub fn pass_turn(&mut self) -> Result<()> {
        if self.is_over() || self.has_legal_action() {
            tracing::debug!(player = %self.current_player, "pass rejected");
            return Err(HiveError::PassNotAllowed(self.current_player));
        }
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    // ========================================================================
    // ACTION GENERATION
    // ========================================================================

    /// Sorted legal targets of one piece on the board. Empty if the piece
    /// may not move at all (wrong turn, queen missing, covered, pinned).
    pub fn destinations(&self, piece: Piece) -> Vec<Hex> {
        if self.is_over() {
            return Vec::new();
        }
        let mut scratch = self.board.clone();
        match validation::check_can_move(&mut scratch, self.current_player, piece) {
            Ok(from) => moves::destinations(&mut scratch, from),
            Err(_) => Vec::new(),
        }
    }

    /// Every distinct legal action, sorted by piece then target.
    ///
    /// Opening placements are not reduced by symmetry: on an empty board the
    /// only cell offered is the origin, after that every free cell counts.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.is_over() {
            return Vec::new();
        }
        let mover = self.current_player;
        let mut actions = Vec::new();

        let in_hand: Vec<Piece> = self
            .unplayed_pieces(mover)
            .into_iter()
            .filter(|p| validation::validate_turn(&self.board, mover, *p, false).is_ok())
            .collect();
        if !in_hand.is_empty() {
            let cells = self.placement_cells();
            for piece in in_hand {
                actions.extend(cells.iter().map(|&cell| Action::new(piece, cell)));
            }
        }

        let mut scratch = self.board.clone();
        for piece in self.played_pieces(mover) {
            let Ok(from) = validation::check_can_move(&mut scratch, mover, piece) else {
                continue;
            };
            actions.extend(
                moves::destinations(&mut scratch, from)
                    .into_iter()
                    .map(|target| Action::new(piece, target)),
            );
        }

        actions.sort();
        actions
    }

    /// One action per set bit of the action vector, in index order
    pub fn legal_actions_reduced(&self) -> Vec<Action> {
        codec::legal_action_indices(self)
            .into_iter()
            .filter_map(|index| codec::action_from_index(self, index).ok())
            .collect()
    }

    pub fn has_legal_action(&self) -> bool {
        !self.legal_actions().is_empty()
    }

    /// Sorted cells the mover may place on
    fn placement_cells(&self) -> Vec<Hex> {
        if self.board.is_empty() {
            return vec![ORIGIN];
        }
        let candidates: FxHashSet<Hex> = self
            .board
            .occupied()
            .flat_map(|hex| hex.neighbours())
            .filter(|hex| self.board.is_free(*hex))
            .collect();
        let mut cells: Vec<Hex> = candidates
            .into_iter()
            .filter(|&hex| validation::check_place_target(&self.board, self.current_player, hex).is_ok())
            .collect();
        cells.sort();
        cells
    }
}

/// Only the 22 roster pieces exist
fn check_identity(piece: Piece) -> Result<()> {
    if piece.in_roster() {
        Ok(())
    } else {
        tracing::debug!(%piece, "piece outside the roster");
        Err(HiveError::InvalidPiece(piece.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceKind;

    fn piece(name: &str) -> Piece {
        name.parse().unwrap()
    }

    fn play(state: &mut GameState, moves: &[(&str, i32, i32)]) {
        for &(name, x, y) in moves {
            state
                .apply(piece(name), Hex::new(x, y))
                .unwrap_or_else(|e| panic!("{name} to ({x},{y}): {e}"));
        }
    }

    #[test]
    fn test_new_game() {
        let state = GameState::new();
        assert_eq!(state.current_player(), Player::White);
        assert!(state.board().is_empty());
        assert_eq!(state.unplayed_pieces(Player::White).len(), 11);
        assert_eq!(state.is_terminal(), GameStatus::Unfinished);

        let actions = state.legal_actions();
        // every non-queen piece at the origin
        assert_eq!(actions.len(), 10);
        assert!(actions.iter().all(|a| a.target == ORIGIN));
        assert!(actions.iter().all(|a| a.piece.kind != PieceKind::Queen));
    }

    #[test]
    fn test_apply_flips_player() {
        let mut state = GameState::new();
        play(&mut state, &[("wS1", 0, 0)]);
        assert_eq!(state.current_player(), Player::Black);
        assert_eq!(state.played_pieces(Player::White), vec![piece("wS1")]);

        let err = state.apply(piece("wS2"), Hex::new(-1, 0)).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::WrongColor));
        assert_eq!(state.current_player(), Player::Black, "rejected action keeps the turn");
    }

    #[test]
    fn test_second_player_opening() {
        let mut state = GameState::new();
        play(&mut state, &[("wS1", 0, 0)]);
        let actions = state.legal_actions();
        assert_eq!(actions.len(), 60, "six cells times ten non-queen pieces");
        assert!(actions.iter().all(|a| a.target.is_adjacent(ORIGIN)));
    }

    #[test]
    fn test_queen_deadline() {
        let mut state = GameState::new();
        play(
            &mut state,
            &[
                ("wA1", 0, 0),
                ("bA1", 1, 0),
                ("wA2", -1, 0),
                ("bQ1", 2, 0),
                ("wA3", -2, 0),
                ("bA2", 3, 0),
            ],
        );
        let actions = state.legal_actions();
        assert!(!actions.is_empty());
        assert!(actions.iter().all(|a| a.piece == piece("wQ1")));

        let err = state.apply(piece("wS1"), Hex::new(-3, 0)).unwrap_err();
        assert!(matches!(
            err,
            HiveError::InvalidPlacement { reason: Rejection::QueenRequired, .. }
        ));
    }

    #[test]
    fn test_no_move_before_queen() {
        let mut state = GameState::new();
        play(&mut state, &[("wA1", 0, 0), ("bA1", 1, 0), ("wA2", -1, 0), ("bA2", 2, 0)]);
        let err = state.apply(piece("wA1"), Hex::new(0, 1)).unwrap_err();
        assert!(matches!(
            err,
            HiveError::InvalidMovement { reason: Rejection::QueenNotPlaced, .. }
        ));
        assert!(state.destinations(piece("wA2")).is_empty());
    }

    #[test]
    fn test_movement_applies() {
        let mut state = GameState::new();
        play(
            &mut state,
            &[("wS1", 0, 0), ("bS1", 1, 0), ("wQ1", -1, 0), ("bQ1", 2, 0)],
        );
        // wQ1 slides along wS1
        assert_eq!(
            state.destinations(piece("wQ1")),
            vec![Hex::new(-1, 1), Hex::new(0, -1)]
        );
        play(&mut state, &[("wQ1", 0, -1)]);
        assert_eq!(state.board().position(piece("wQ1")), Some(Hex::new(0, -1)));
        assert!(state.board().is_free(Hex::new(-1, 0)));
        assert_eq!(state.current_player(), Player::Black);
    }

    #[test]
    fn test_pieces_outside_roster_rejected() {
        let mut state = GameState::new();
        play(&mut state, &[("wS1", 0, 0), ("bS1", 1, 0)]);
        let before = state.clone();

        for number in [0, 4, 5] {
            let ant = Piece::new(Player::White, PieceKind::Ant, number);
            let name = ant.to_string();
            assert_eq!(
                state.apply(ant, Hex::new(-1, 0)),
                Err(HiveError::InvalidPiece(name.clone()))
            );
            assert_eq!(
                state.check_action(Action::new(ant, Hex::new(-1, 0))),
                Err(HiveError::InvalidPiece(name))
            );
        }
        assert_eq!(state, before);
        assert_eq!(state.board().count_of(Player::White), 1);
    }

    #[test]
    fn test_surrounded_queen_ends_game() {
        let mut board = Board::new();
        board.move_or_place(piece("bQ1"), ORIGIN);
        let ring = ["wA1", "wA2", "wA3", "wB1", "wB2", "wG1"];
        for (direction, name) in ring.iter().enumerate() {
            board.move_or_place(piece(name), ORIGIN.neighbour(direction));
        }
        board.move_or_place(piece("wQ1"), Hex::new(-2, 0));
        let state = GameState::from_board(board, Player::Black);
        assert_eq!(state.is_terminal(), GameStatus::WhiteWins);
        assert!(state.legal_actions().is_empty());

        let mut state = state;
        let err = state.apply(piece("bA1"), Hex::new(3, 3)).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::GameOver));
        assert_eq!(state.pass_turn(), Err(HiveError::PassNotAllowed(Player::Black)));
    }

    #[test]
    fn test_pass_only_when_stuck() {
        let mut state = GameState::new();
        assert_eq!(state.pass_turn(), Err(HiveError::PassNotAllowed(Player::White)));

        // bQ1 sits in a five-sided pocket whose opening is a closed gate, and
        // the only free cell next to it also touches white.
        let mut board = Board::new();
        board.move_or_place(piece("bQ1"), ORIGIN);
        for (direction, name) in ["wA1", "wA2", "wA3", "wB1", "wB2"].iter().enumerate() {
            board.move_or_place(piece(name), ORIGIN.neighbour(direction));
        }
        board.move_or_place(piece("wQ1"), Hex::new(-2, 0));
        let mut state = GameState::from_board(board, Player::Black);
        assert_eq!(state.is_terminal(), GameStatus::Unfinished);
        assert!(state.legal_actions().is_empty());

        state.pass_turn().unwrap();
        assert_eq!(state.current_player(), Player::White);
        assert!(state.has_legal_action());
    }
}
