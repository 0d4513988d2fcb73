//! ASCII board rendering
//!
//! Each row is one `y`; a hex sits at text column `2 * (2x + y)` so that
//! neighbours in adjacent rows interleave. Only the top piece of a stack is
//! drawn, with full stacks listed underneath.

use hive_core::{Board, Piece};

const CELL_WIDTH: usize = 3;

/// Render the board as text
pub fn render(board: &Board) -> String {
    let tiles = board.tiles();
    if tiles.is_empty() {
        return "(empty board)".to_string();
    }

    let column = |x: i32, y: i32| 2 * x + y;
    let min_col = tiles.iter().map(|(h, _)| column(h.x, h.y)).min().unwrap_or(0);
    let min_row = tiles.iter().map(|(h, _)| h.y).min().unwrap_or(0);
    let max_row = tiles.iter().map(|(h, _)| h.y).max().unwrap_or(0);

    let mut lines = Vec::new();
    for row in min_row..=max_row {
        let mut line: Vec<char> = Vec::new();
        for (hex, stack) in tiles.iter().filter(|(h, _)| h.y == row) {
            let Some(top) = stack.last() else { continue };
            let offset = (column(hex.x, hex.y) - min_col) as usize * 2;
            if line.len() < offset + CELL_WIDTH {
                line.resize(offset + CELL_WIDTH, ' ');
            }
            for (i, c) in top.to_string().chars().take(CELL_WIDTH).enumerate() {
                line[offset + i] = c;
            }
        }
        lines.push(line.into_iter().collect::<String>().trim_end().to_string());
    }

    let stacks: Vec<String> = tiles
        .iter()
        .filter(|(_, stack)| stack.len() > 1)
        .map(|(hex, stack)| {
            let names: Vec<String> = stack.iter().map(Piece::to_string).collect();
            format!("  {}: {}", hex, names.join(" "))
        })
        .collect();
    if !stacks.is_empty() {
        lines.push(String::new());
        lines.push("stacks (bottom to top):".to_string());
        lines.extend(stacks);
    }

    lines.join("\n")
}
