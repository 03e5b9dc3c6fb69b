//! Winning line analysis for Tic-Tac-Toe

use super::{Cell, Player};

/// Winning line indices on the 3x3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Utility for analyzing winning lines in Tic-Tac-Toe
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if a player has won by having three in a row
    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        let target = player.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// First line (rows, then columns, then diagonals) holding three equal marks
    pub fn winning_line(cells: &[Cell; 9]) -> Option<[usize; 3]> {
        WINNING_LINES.iter().copied().find(|&[a, b, c]| {
            cells[a] != Cell::Empty && cells[a] == cells[b] && cells[b] == cells[c]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_won_horizontal() {
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::X;
        cells[1] = Cell::X;
        cells[2] = Cell::X;

        assert!(LineAnalyzer::has_won(&cells, Player::X));
        assert!(!LineAnalyzer::has_won(&cells, Player::O));
    }

    #[test]
    fn test_has_won_vertical() {
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::O;
        cells[3] = Cell::O;
        cells[6] = Cell::O;

        assert!(LineAnalyzer::has_won(&cells, Player::O));
        assert!(!LineAnalyzer::has_won(&cells, Player::X));
    }

    #[test]
    fn test_winning_line_diagonal() {
        let mut cells = [Cell::Empty; 9];
        cells[2] = Cell::O;
        cells[4] = Cell::O;
        cells[6] = Cell::O;

        assert_eq!(LineAnalyzer::winning_line(&cells), Some([2, 4, 6]));
    }

    #[test]
    fn test_winning_line_ignores_empty_lines() {
        let cells = [Cell::Empty; 9];
        assert_eq!(LineAnalyzer::winning_line(&cells), None);
    }
}
