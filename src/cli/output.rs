//! Output formatting for CLI

use crate::tictactoe::{BoardState, Cell, GameOutcome, Player};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Format a share as a percentage with one decimal
pub fn format_percent(count: usize, total: usize) -> String {
    if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", count as f64 * 100.0 / total as f64)
    }
}

/// Board as a 3x3 grid; empty cells show their index so they can be typed.
pub fn render_board(board: &BoardState) -> String {
    let rows: Vec<String> = board
        .cells
        .chunks(3)
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, &cell)| match cell {
                    Cell::Empty => (row * 3 + col).to_string(),
                    mark => mark.to_char().to_string(),
                })
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .map(|row| format!(" {row}"))
        .collect();
    rows.join("\n---+---+---\n")
}

/// Announcement for the end of an interactive game
pub fn describe_outcome(outcome: GameOutcome, agent_mark: Player) -> &'static str {
    match outcome.winner() {
        Some(winner) if winner == agent_mark => "AI wins!",
        Some(_) => "Human wins!",
        None => "It's a tie!",
    }
}
