//! Properties of the board codec over the full 3^9 state space.

use std::collections::HashSet;

use tictactoe_td::{
    identifiers::{STATE_SPACE_SIZE, StateKey},
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Board whose cell `i` holds base-3 digit `i` of `raw`
fn board_from_index(raw: u32) -> BoardState {
    let text: String = StateKey::new(raw)
        .unwrap()
        .digits()
        .iter()
        .map(|digit| match digit {
            0 => '.',
            1 => 'X',
            _ => 'O',
        })
        .collect();
    BoardState::from_string(&text).unwrap()
}

fn all_boards() -> impl Iterator<Item = BoardState> {
    (0..STATE_SPACE_SIZE).map(board_from_index)
}

#[test]
fn test_encoding_is_injective_over_all_boards() {
    let mut seen = HashSet::new();
    for (index, board) in all_boards().enumerate() {
        let key = board.encode();
        assert_eq!(key.value() as usize, index);
        assert!(seen.insert(key), "duplicate key {key}");
    }
    assert_eq!(seen.len(), STATE_SPACE_SIZE as usize);
}

#[test]
fn test_winner_detection_is_symmetric_under_relabelling() {
    for board in all_boards() {
        let swapped = board.swap_players();
        assert_eq!(
            swapped.detect_winner(),
            board.detect_winner().map(GameOutcome::swap_players),
            "asymmetric outcome for\n{board}"
        );
        assert_eq!(swapped.encode(), board.encode().swap_marks());
    }
}

#[test]
fn test_full_board_without_line_is_tie() {
    let mut ties = 0;
    for board in all_boards().filter(BoardState::is_full) {
        if board.winner().is_none() {
            assert_eq!(board.detect_winner(), Some(GameOutcome::Tie));
            ties += 1;
        } else {
            assert!(matches!(board.detect_winner(), Some(GameOutcome::Win(_))));
        }
    }
    assert!(ties > 0);
}

#[test]
fn test_partial_board_without_line_is_undecided() {
    let board = BoardState::from_string("O.O .X. ..X").unwrap();
    assert_eq!(board.detect_winner(), None);

    let board = BoardState::from_string("XOX OXO ...").unwrap();
    assert_eq!(board.detect_winner(), None);
    assert!(!board.is_terminal());
}

#[test]
fn test_both_players_reachable_as_winners() {
    let x_wins = all_boards()
        .filter(|board| board.winner() == Some(Player::X))
        .count();
    let o_wins = all_boards()
        .filter(|board| board.winner() == Some(Player::O))
        .count();
    assert_eq!(x_wins, o_wins);
    assert!(x_wins > 0);
}
