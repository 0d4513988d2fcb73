//! Per-kind movement generation
//!
//! Every generator works on a board with the moving piece lifted off its
//! hex, so the piece never blocks its own path. `destinations` and
//! `move_slots` do the lifting; the guard puts the piece back on return.

use crate::board::Board;
use crate::hex::Hex;
use crate::pieces::PieceKind;
use rustc_hash::FxHashSet;

/// Hops a spider must travel
const SPIDER_HOPS: usize = 3;

/// Where a piece can go, in the shape its codec block uses
#[derive(Clone, Debug, PartialEq, Eq)]
enum Reach {
    /// One optional destination per direction (queen, beetle, grasshopper)
    ByDirection([Option<Hex>; 6]),
    /// Destinations in sorted order (spider, ant)
    Listed(Vec<Hex>),
}

/// Empty neighbours of `hex` reachable by a single slide.
///
/// A slide into a neighbour is allowed when exactly one of the two hexes
/// flanking that edge is occupied: two occupied flanks form a gate too narrow
/// to pass, two empty flanks would leave the hive.
pub fn slide_moves(board: &Board, hex: Hex) -> Vec<Hex> {
    (0..6).filter_map(|direction| slide_target(board, hex, direction)).collect()
}

fn slide_target(board: &Board, hex: Hex, direction: usize) -> Option<Hex> {
    let target = hex.neighbour(direction);
    if !board.is_free(target) {
        return None;
    }
    let [left, right] = hex.flanks(direction);
    (board.is_free(left) != board.is_free(right)).then_some(target)
}

/// Sorted legal destinations of the top piece on `from`
pub fn destinations(board: &mut Board, from: Hex) -> Vec<Hex> {
    let Some(lifted) = board.lift(from) else {
        return Vec::new();
    };
    let mut cells: Vec<Hex> = match reach(&lifted, from, lifted.piece().kind) {
        Reach::ByDirection(slots) => slots.into_iter().flatten().collect(),
        Reach::Listed(cells) => cells,
    };
    cells.sort();
    cells.dedup();
    cells
}

/// Fixed-size destination slots of the top piece on `from`.
///
/// The result always has the kind's move-vector size. Slot `i` holds the
/// destination that bit `i` of the piece's codec block stands for.
pub fn move_slots(board: &mut Board, from: Hex) -> Vec<Option<Hex>> {
    let Some(lifted) = board.lift(from) else {
        return Vec::new();
    };
    let piece = lifted.piece();
    let size = piece.kind.move_vector_size();
    match reach(&lifted, from, piece.kind) {
        Reach::ByDirection(slots) => slots.to_vec(),
        Reach::Listed(cells) => {
            if cells.len() > size {
                tracing::warn!(
                    "{} at {} has {} destinations, only {} fit its action block",
                    piece,
                    from,
                    cells.len(),
                    size
                );
            }
            let mut slots: Vec<Option<Hex>> = cells.into_iter().take(size).map(Some).collect();
            slots.resize(size, None);
            slots
        }
    }
}

fn reach(view: &Board, from: Hex, kind: PieceKind) -> Reach {
    match kind {
        PieceKind::Queen => Reach::ByDirection(queen_moves(view, from)),
        PieceKind::Beetle => Reach::ByDirection(beetle_moves(view, from)),
        PieceKind::Grasshopper => Reach::ByDirection(grasshopper_moves(view, from)),
        PieceKind::Spider => Reach::Listed(spider_moves(view, from)),
        PieceKind::Ant => Reach::Listed(ant_moves(view, from)),
    }
}

// ============================================================================
// GENERATORS (moving piece already lifted)
// ============================================================================

fn queen_moves(view: &Board, from: Hex) -> [Option<Hex>; 6] {
    std::array::from_fn(|direction| slide_target(view, from, direction))
}

fn beetle_moves(view: &Board, from: Hex) -> [Option<Hex>; 6] {
    // Something left underneath: the beetle is up on the hive
    let on_top = !view.is_free(from);
    std::array::from_fn(|direction| {
        let target = from.neighbour(direction);
        if on_top || !view.is_free(target) {
            Some(target)
        } else {
            slide_target(view, from, direction)
        }
    })
}

fn grasshopper_moves(view: &Board, from: Hex) -> [Option<Hex>; 6] {
    std::array::from_fn(|direction| {
        let mut cell = from.neighbour(direction);
        if view.is_free(cell) {
            return None;
        }
        while !view.is_free(cell) {
            cell = cell.neighbour(direction);
        }
        Some(cell)
    })
}

fn spider_moves(view: &Board, from: Hex) -> Vec<Hex> {
    let mut visited = FxHashSet::default();
    visited.insert(from);
    let mut frontier = vec![from];

    for _ in 0..SPIDER_HOPS {
        let mut next = FxHashSet::default();
        for &cell in &frontier {
            next.extend(slide_moves(view, cell));
        }
        next.retain(|cell| !visited.contains(cell));
        visited.extend(next.iter().copied());
        frontier = next.into_iter().collect();
    }

    frontier.sort();
    frontier
}

fn ant_moves(view: &Board, from: Hex) -> Vec<Hex> {
    let mut visited = FxHashSet::default();
    visited.insert(from);
    let mut frontier = vec![from];

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &cell in &frontier {
            for target in slide_moves(view, cell) {
                if visited.insert(target) {
                    next.push(target);
                }
            }
        }
        frontier = next;
    }

    visited.remove(&from);
    let mut cells: Vec<Hex> = visited.into_iter().collect();
    cells.sort();
    cells
}
