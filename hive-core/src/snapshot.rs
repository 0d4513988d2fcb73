//! Saved positions
//!
//! ```json
//! { "current_player": "w", "tiles": { "(0,0)": ["wS1"], "(1,0)": ["bQ1", "wB1"] } }
//! ```
//!
//! Stacks are listed bottom to top.

use crate::board::Board;
use crate::error::{HiveError, Result};
use crate::game::GameState;
use crate::hex::Hex;
use crate::pieces::{Piece, Player};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_player: Player,
    pub tiles: BTreeMap<String, Vec<String>>,
}

impl Snapshot {
    pub fn from_state(state: &GameState) -> Self {
        let tiles = state
            .board()
            .tiles()
            .into_iter()
            .map(|(hex, stack)| (hex.to_string(), stack.iter().map(Piece::to_string).collect()))
            .collect();
        Self {
            current_player: state.current_player(),
            tiles,
        }
    }

    /// Rebuild the state, checking that the tiles describe a legal board
    pub fn into_state(&self) -> Result<GameState> {
        let mut board = Board::new();
        for (key, names) in &self.tiles {
            let hex = key
                .parse::<Hex>()
                .map_err(|e| HiveError::MalformedState(e.to_string()))?;
            if !board.is_free(hex) {
                return Err(HiveError::MalformedState(format!("{key:?} repeats {hex}")));
            }
            if names.is_empty() {
                return Err(HiveError::MalformedState(format!("empty stack at {hex}")));
            }
            for name in names {
                let piece: Piece = name.parse()?;
                if board.is_placed(piece) {
                    return Err(HiveError::MalformedState(format!("{piece} appears twice")));
                }
                board.move_or_place(piece, hex);
            }
        }
        if let Some((piece, hex)) = board.misplaced_climber() {
            return Err(HiveError::MalformedState(format!(
                "{piece} is stacked at {hex} but is not a beetle"
            )));
        }
        if !board.is_connected() {
            return Err(HiveError::MalformedState("hive is split".to_string()));
        }
        Ok(GameState::from_board(board, self.current_player))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GameState {
        let mut state = GameState::new();
        for (name, x, y) in [("wS1", 0, 0), ("bS1", 1, 0), ("wQ1", -1, 0), ("bQ1", 2, 0)] {
            state.apply(name.parse().unwrap(), Hex::new(x, y)).unwrap();
        }
        state
    }

    #[test]
    fn test_round_trip() {
        let state = sample();
        let snapshot = Snapshot::from_state(&state);
        assert_eq!(snapshot.current_player, Player::White);
        assert_eq!(snapshot.tiles["(-1,0)"], vec!["wQ1".to_string()]);
        assert_eq!(snapshot.into_state().unwrap(), state);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"current_player":"b","tiles":{"(0,0)":["wQ1","bB1"],"(1,0)":["bQ1"]}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let state = snapshot.into_state().unwrap();
        assert_eq!(state.current_player(), Player::Black);
        assert_eq!(
            state.board().tile_content(Hex::new(0, 0)),
            &["wQ1".parse::<Piece>().unwrap(), "bB1".parse::<Piece>().unwrap()]
        );
        assert_eq!(serde_json::to_string(&Snapshot::from_state(&state)).unwrap(), json);
    }

    #[test]
    fn test_rejects_bad_snapshots() {
        let bad = |json: &str| {
            serde_json::from_str::<Snapshot>(json)
                .unwrap()
                .into_state()
                .unwrap_err()
        };
        assert_eq!(
            bad(r#"{"current_player":"w","tiles":{"(0,0)":["wZ1"]}}"#),
            HiveError::InvalidPiece("wZ1".to_string())
        );
        for json in [
            r#"{"current_player":"w","tiles":{"0,0":["wA1"]}}"#,
            r#"{"current_player":"w","tiles":{"(0,0)":[]}}"#,
            r#"{"current_player":"w","tiles":{"(0,0)":["wA1"],"(1,0)":["wA1"]}}"#,
            r#"{"current_player":"w","tiles":{"(0,0)":["wA1"],"(2,0)":["bA1"]}}"#,
            r#"{"current_player":"w","tiles":{"(0,0)":["wQ1","bQ1"],"(1,0)":["wA1"]}}"#,
            r#"{"current_player":"w","tiles":{"(0,0)":["wA1"],"( 0,0)":["bA1"]}}"#,
        ] {
            assert!(matches!(bad(json), HiveError::MalformedState(_)), "{json}");
        }
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("hive-snapshot-{}.json", std::process::id()));
        let snapshot = Snapshot::from_state(&sample());
        snapshot.save(&path).unwrap();
        assert_eq!(Snapshot::load(&path).unwrap(), snapshot);
        std::fs::remove_file(&path).unwrap();
        assert!(Snapshot::load(&path).is_err());
    }
}
