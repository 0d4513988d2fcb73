//! Hive CLI - engine verification drivers
//!
//! Commands:
//! - perft: count leaf nodes of the action tree
//! - selfplay: random games with invariant checks
//! - show: render a saved snapshot with its legal actions

pub mod perft;
pub mod render;
pub mod selfplay;
pub mod show;

pub use perft::{perft, perft_parallel};
pub use render::render;
pub use selfplay::{play_games, SelfPlayConfig, SelfPlayReport};
