//! Hex grid geometry with axial coordinates
//!
//! The grid is unbounded. Directions are indexed clockwise starting west,
//! which is also the order `neighbours()` returns them in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub x: i32,
    pub y: i32,
}

/// Where the first piece of a game goes
pub const ORIGIN: Hex = Hex::new(0, 0);

/// Direction vectors in axial coordinates (dx, dy)
/// Index: 0=W, 1=NW, 2=NE, 3=E, 4=SE, 5=SW
pub const DIRECTIONS: [(i32, i32); 6] = [
    (-1, 0),  // W
    (0, -1),  // NW
    (1, -1),  // NE
    (1, 0),   // E
    (0, 1),   // SE
    (-1, 1),  // SW
];

pub const WEST: usize = 0;
pub const EAST: usize = 3;

impl Hex {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Get neighbour in direction (0-5)
    pub fn neighbour(&self, direction: usize) -> Hex {
        let (dx, dy) = DIRECTIONS[direction % 6];
        Hex::new(self.x + dx, self.y + dy)
    }

    /// All six neighbours, clockwise from west
    pub fn neighbours(&self) -> [Hex; 6] {
        std::array::from_fn(|direction| self.neighbour(direction))
    }

    /// Direction index from `self` to an adjacent hex
    pub fn direction_to(&self, other: Hex) -> Option<usize> {
        let delta = (other.x - self.x, other.y - self.y);
        DIRECTIONS.iter().position(|&d| d == delta)
    }

    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.direction_to(other).is_some()
    }

    /// The two hexes adjacent to both `self` and its neighbour in `direction`
    pub fn flanks(&self, direction: usize) -> [Hex; 2] {
        [
            self.neighbour((direction + 5) % 6),
            self.neighbour((direction + 1) % 6),
        ]
    }

    /// Rotate one direction step clockwise around the origin
    pub fn rotated(&self) -> Hex {
        // cube (x, y, z) -> (-y, -z, -x), with z = -x - y
        Hex::new(-self.y, self.x + self.y)
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, other: Hex) -> Hex {
        Hex::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Hex {
    type Output = Hex;

    fn sub(self, other: Hex) -> Hex {
        Hex::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Error returned when a hex key is not of the form `(x,y)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseHexError(pub String);

impl fmt::Display for ParseHexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse hex from {:?}", self.0)
    }
}

impl std::error::Error for ParseHexError {}

impl FromStr for Hex {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHexError(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let (x, y) = inner.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(Hex::new(x, y))
    }
}
