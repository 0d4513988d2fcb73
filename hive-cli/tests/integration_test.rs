//! Integration tests for the verification drivers

use hive_cli::{perft, perft_parallel, play_games, render, SelfPlayConfig};
use hive_core::{Board, GameState, Hex, Player, Snapshot};
use indicatif::ProgressBar;
use pretty_assertions::assert_eq;

fn mid_game(player: Player) -> GameState {
    let mut board = Board::new();
    for (name, x, y) in [
        ("wS1", 0, 0),
        ("bS1", 1, 0),
        ("wQ1", -1, 1),
        ("bQ1", 1, 1),
        ("wS2", 0, -1),
        ("bG1", 2, 0),
        ("wB1", -1, -1),
        ("bA1", 0, 2),
        ("wG1", -2, 0),
        ("bB1", 2, -1),
    ] {
        board.move_or_place(name.parse().unwrap(), Hex::new(x, y));
    }
    GameState::from_board(board, player)
}

#[test]
fn test_perft_from_empty_board() {
    let state = GameState::new();
    assert_eq!(perft(&state, 1), 10);
    assert_eq!(perft(&state, 2), 100);
    assert_eq!(perft(&state, 3), 3000);
    assert_eq!(perft_parallel(&state, 3), 3000);
}

#[test]
fn test_perft_mid_game() {
    assert_eq!(perft(&mid_game(Player::White), 1), 57);
    assert_eq!(perft(&mid_game(Player::Black), 1), 72);
}

#[test]
fn test_perft_from_snapshot() {
    let state = mid_game(Player::White);
    let restored = Snapshot::from_state(&state).into_state().unwrap();
    assert_eq!(perft(&restored, 2), perft_parallel(&state, 2));
}

#[test]
fn test_selfplay_is_deterministic() {
    let config = SelfPlayConfig::default()
        .with_games(4)
        .with_max_turns(60)
        .with_seed(42);
    let first = play_games(&config, &ProgressBar::hidden());
    let second = play_games(&config, &ProgressBar::hidden());
    assert_eq!(first, second);

    let seeds: Vec<u64> = first.records.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, vec![42, 43, 44, 45]);
}

#[test]
fn test_selfplay_keeps_invariants() {
    let config = SelfPlayConfig::default()
        .with_games(6)
        .with_max_turns(80)
        .with_seed(2024);
    let report = play_games(&config, &ProgressBar::hidden());
    assert!(report.is_clean(), "{:#?}", report.violations);
    assert_eq!(report.games, 6);
    assert_eq!(
        report.white_wins + report.black_wins + report.draws + report.unfinished,
        6
    );
    assert!(report.records.iter().all(|r| r.turns <= 80));
}

#[test]
fn test_render_mid_game() {
    let text = render(mid_game(Player::White).board());
    assert_eq!(text.lines().count(), 4);
    for name in ["wS1", "bS1", "wQ1", "bQ1", "wB1", "bB1", "bA1"] {
        assert!(text.contains(name), "{name} missing from\n{text}");
    }
}
