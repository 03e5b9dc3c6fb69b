//! Board state representation and the state-key codec

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{game::GameOutcome, lines::LineAnalyzer};
use crate::identifiers::StateKey;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '_' | '-' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    /// Base-3 digit used by the state key encoding.
    pub fn digit(self) -> u32 {
        match self {
            Cell::Empty => 0,
            Cell::X => 1,
            Cell::O => 2,
        }
    }

    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
            Cell::Empty => None,
        }
    }
}

/// Owner of a mark. X is the agent's mark in interactive play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell().to_char())
    }
}

/// The nine cells of a board, indexed row-major from the top left.
///
/// Whose turn it is lives with the caller (trainer episode or match
/// controller), so two boards are equal exactly when their cells are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
}

impl BoardState {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Create a board from a string representation.
    ///
    /// The string must contain 9 cell characters once whitespace is removed;
    /// `.`, `_` or `-` mark an empty cell.
    ///
    /// # Errors
    ///
    /// Returns error if fewer than 9 characters remain or any character is
    /// not a valid cell.
    pub fn from_string(s: &str) -> Result<Self, crate::Error> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() < 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: s.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().take(9).enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: s.to_string(),
            })?;
        }

        Ok(BoardState { cells })
    }

    /// Get cell at position (0-8), or `None` off the board
    pub fn get(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    /// Check if a position is on the board and empty
    pub fn is_empty(&self, pos: usize) -> bool {
        pos < 9 && self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Count the number of occupied cells on the board.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Empty).count()
    }

    /// Place `player`'s mark on `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPosition`] for `pos >= 9` and
    /// [`crate::Error::InvalidMove`] for an occupied cell. The board is left
    /// unchanged in both cases.
    pub fn place(&mut self, pos: usize, player: Player) -> Result<(), crate::Error> {
        if pos >= 9 {
            return Err(crate::Error::InvalidPosition { position: pos });
        }
        if self.cells[pos] != Cell::Empty {
            return Err(crate::Error::InvalidMove { position: pos });
        }
        self.cells[pos] = player.to_cell();
        Ok(())
    }

    /// Board that would result from `player` marking `pos`
    #[must_use = "with_move returns a new board state; the original is unchanged"]
    pub fn with_move(&self, pos: usize, player: Player) -> Result<BoardState, crate::Error> {
        let mut next = *self;
        next.place(pos, player)?;
        Ok(next)
    }

    /// Base-3 positional encoding: `sum(digit(cell_i) * 3^i)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tictactoe_td::tictactoe::BoardState;
    ///
    /// assert_eq!(BoardState::new().encode().value(), 0);
    /// // X in the centre: 1 * 3^4
    /// let board = BoardState::from_string("....X....").unwrap();
    /// assert_eq!(board.encode().value(), 81);
    /// ```
    pub fn encode(&self) -> StateKey {
        let value = self
            .cells
            .iter()
            .rev()
            .fold(0u32, |acc, cell| acc * 3 + cell.digit());
        StateKey::from_raw(value)
    }

    /// Get the owner of the first completed line, if any
    pub fn winner(&self) -> Option<Player> {
        LineAnalyzer::winning_line(&self.cells).and_then(|line| self.cells[line[0]].to_player())
    }

    /// Terminal outcome of the board, or `None` while the game continues.
    ///
    /// A completed line takes priority; a full board with no line is a tie.
    pub fn detect_winner(&self) -> Option<GameOutcome> {
        if let Some(winner) = self.winner() {
            Some(GameOutcome::Win(winner))
        } else if self.is_full() {
            Some(GameOutcome::Tie)
        } else {
            None
        }
    }

    /// Check if the game is over (win or tie)
    pub fn is_terminal(&self) -> bool {
        self.detect_winner().is_some()
    }

    /// Swap X and O pieces on the board.
    #[must_use = "swap_players returns a new board state; the original is unchanged"]
    pub fn swap_players(&self) -> Self {
        let mut swapped = *self;
        for cell in &mut swapped.cells {
            *cell = match cell {
                Cell::X => Cell::O,
                Cell::O => Cell::X,
                Cell::Empty => Cell::Empty,
            };
        }
        swapped
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1) % 3 == 0 && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let board = BoardState::new();
        for i in 0..9 {
            assert_eq!(board.cells[i], Cell::Empty);
        }
        assert_eq!(board.detect_winner(), None);
    }

    #[test]
    fn test_place() {
        let mut board = BoardState::new();
        board.place(4, Player::X).unwrap();
        assert_eq!(board.cells[4], Cell::X);

        let result = board.place(4, Player::O);
        assert!(result.unwrap_err().to_string().contains("occupied"));
        assert_eq!(board.cells[4], Cell::X);

        assert!(matches!(
            board.place(9, Player::O),
            Err(crate::Error::InvalidPosition { position: 9 })
        ));
    }

    #[test]
    fn test_with_move_leaves_original_untouched() {
        let board = BoardState::new();
        let next = board.with_move(0, Player::O).unwrap();
        assert_eq!(board, BoardState::new());
        assert_eq!(next.cells[0], Cell::O);
    }

    #[test]
    fn test_get_off_board_is_none() {
        let board = BoardState::from_string("X........").unwrap();
        assert_eq!(board.get(0), Some(Cell::X));
        assert_eq!(board.get(8), Some(Cell::Empty));
        assert_eq!(board.get(9), None);
    }

    #[test]
    fn test_encode_positional_weights() {
        let board = BoardState::from_string("XO.......").unwrap();
        assert_eq!(board.encode().value(), 1 + 2 * 3);

        let board = BoardState::from_string("........O").unwrap();
        assert_eq!(board.encode().value(), 2 * 6561);

        let full_o = BoardState::from_string("OOOOOOOOO").unwrap();
        assert_eq!(full_o.encode().value(), 19_682);
    }

    #[test]
    fn test_win_detection_horizontal() {
        let board = BoardState::from_string("XXX OO. ...").unwrap();
        assert_eq!(board.detect_winner(), Some(GameOutcome::Win(Player::X)));
    }

    #[test]
    fn test_win_detection_vertical() {
        let board = BoardState::from_string("XO. XO. .O.").unwrap();
        assert_eq!(board.detect_winner(), Some(GameOutcome::Win(Player::O)));
    }

    #[test]
    fn test_win_detection_anti_diagonal() {
        let board = BoardState::from_string("O.X OX. X..").unwrap();
        assert_eq!(board.detect_winner(), Some(GameOutcome::Win(Player::X)));
    }

    #[test]
    fn test_tie_detection() {
        let board = BoardState::from_string("XOX XOO OXX").unwrap();
        assert_eq!(board.winner(), None);
        assert_eq!(board.detect_winner(), Some(GameOutcome::Tie));
    }

    #[test]
    fn test_full_board_with_line_is_a_win() {
        let board = BoardState::from_string("XXX OOX OXO").unwrap();
        assert!(board.is_full());
        assert_eq!(board.detect_winner(), Some(GameOutcome::Win(Player::X)));
    }

    #[test]
    fn test_from_string() {
        let board = BoardState::from_string("XOX......").unwrap();
        assert_eq!(board.cells[0], Cell::X);
        assert_eq!(board.cells[1], Cell::O);
        assert_eq!(board.cells[2], Cell::X);

        assert!(BoardState::from_string("XO").is_err());
        assert!(BoardState::from_string("XOZ......").is_err());
    }

    #[test]
    fn test_display() {
        let board = BoardState::from_string("XOX.O.X..").unwrap();
        assert_eq!(format!("{board}"), "XOX\n.O.\nX..");
    }

    #[test]
    fn test_empty_positions() {
        let mut board = BoardState::new();
        assert_eq!(board.empty_positions().len(), 9);

        board.place(4, Player::X).unwrap();
        let empty = board.empty_positions();
        assert_eq!(empty, vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(board.occupied_count(), 1);
    }
}
