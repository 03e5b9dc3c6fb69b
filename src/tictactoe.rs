//! Tic-Tac-Toe board, state-key codec and outcome detection

pub mod board;
pub mod game;
pub mod lines;

pub use board::{BoardState, Cell, Player};
pub use game::GameOutcome;
pub use lines::{LineAnalyzer, WINNING_LINES};
