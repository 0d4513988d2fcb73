//! Piece identities and the per-color roster
//!
//! A piece is a value: two pieces with the same color, kind and number are
//! the same piece. Where a piece stands is a property of the board, not of
//! the piece.

use crate::error::HiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pieces each player starts with
pub const PIECES_PER_COLOR: usize = 11;

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Player {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Player::White => 'w',
            Player::Black => 'b',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'w' => Some(Player::White),
            'b' => Some(Player::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "white"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// Piece kind. Declaration order is alphabetical by letter, which is the
/// order of the roster and of every codec segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Ant,
    Beetle,
    Grasshopper,
    Queen,
    Spider,
}

/// Kind and count of every piece in one player's roster
pub static KINDS: [(PieceKind, u8); 5] = [
    (PieceKind::Ant, 3),
    (PieceKind::Beetle, 2),
    (PieceKind::Grasshopper, 3),
    (PieceKind::Queen, 1),
    (PieceKind::Spider, 2),
];

impl PieceKind {
    pub fn letter(self) -> char {
        match self {
            PieceKind::Ant => 'A',
            PieceKind::Beetle => 'B',
            PieceKind::Grasshopper => 'G',
            PieceKind::Queen => 'Q',
            PieceKind::Spider => 'S',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'A' => Some(PieceKind::Ant),
            'B' => Some(PieceKind::Beetle),
            'G' => Some(PieceKind::Grasshopper),
            'Q' => Some(PieceKind::Queen),
            'S' => Some(PieceKind::Spider),
            _ => None,
        }
    }

    /// How many of this kind each player owns
    pub fn count(self) -> u8 {
        KINDS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|&(_, count)| count)
            .unwrap_or(0)
    }

    /// Size of this kind's block in the movement segment of the action vector
    pub const fn move_vector_size(self) -> usize {
        match self {
            PieceKind::Ant => 50,
            PieceKind::Spider => 15,
            PieceKind::Beetle | PieceKind::Grasshopper | PieceKind::Queen => 6,
        }
    }
}

/// A piece identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Piece {
    pub color: Player,
    pub kind: PieceKind,
    pub number: u8,
}

impl Piece {
    pub const fn new(color: Player, kind: PieceKind, number: u8) -> Self {
        Self { color, kind, number }
    }

    pub const fn queen(color: Player) -> Self {
        Self::new(color, PieceKind::Queen, 1)
    }

    /// True if this identity belongs to a player's starting roster
    pub fn in_roster(&self) -> bool {
        (1..=self.kind.count()).contains(&self.number)
    }

    /// Position of this piece in its color's roster. None for identities
    /// outside the roster.
    pub fn roster_index(&self) -> Option<usize> {
        if !self.in_roster() {
            return None;
        }
        let before: usize = KINDS
            .iter()
            .take_while(|(kind, _)| *kind != self.kind)
            .map(|&(_, count)| count as usize)
            .sum();
        Some(before + self.number as usize - 1)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.color.letter(), self.kind.letter(), self.number)
    }
}

impl FromStr for Piece {
    type Err = HiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HiveError::InvalidPiece(s.to_string());
        let mut chars = s.chars();
        let (Some(c), Some(k), Some(n), None) =
            (chars.next(), chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };
        let color = Player::from_letter(c).ok_or_else(invalid)?;
        let kind = PieceKind::from_letter(k).ok_or_else(invalid)?;
        let number = n.to_digit(10).ok_or_else(invalid)? as u8;
        let piece = Piece::new(color, kind, number);
        if !piece.in_roster() {
            return Err(invalid());
        }
        Ok(piece)
    }
}

impl TryFrom<String> for Piece {
    type Error = HiveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Piece> for String {
    fn from(piece: Piece) -> String {
        piece.to_string()
    }
}

/// One player's full roster in canonical order
pub fn roster(color: Player) -> [Piece; PIECES_PER_COLOR] {
    let mut pieces = [Piece::queen(color); PIECES_PER_COLOR];
    let mut i = 0;
    for &(kind, count) in &KINDS {
        for number in 1..=count {
            pieces[i] = Piece::new(color, kind, number);
            i += 1;
        }
    }
    pieces
}

/// All 22 pieces sorted by name (black before white)
pub fn all_pieces() -> Vec<Piece> {
    let mut pieces: Vec<Piece> = roster(Player::Black)
        .into_iter()
        .chain(roster(Player::White))
        .collect();
    pieces.sort_by_key(|p| p.to_string());
    pieces
}
