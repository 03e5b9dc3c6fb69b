//! Game outcomes and the terminal reward convention

use serde::{Deserialize, Serialize};

use super::board::Player;

/// Reward fed to the winner's trajectory
pub const WIN_REWARD: f64 = 1.0;
/// Reward fed to the loser's trajectory
pub const LOSS_REWARD: f64 = -1.0;
/// Reward fed to both trajectories on a tie
pub const TIE_REWARD: f64 = 0.5;

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Tie,
}

impl GameOutcome {
    /// Swap the winner perspective (X ↔ O).
    pub fn swap_players(self) -> Self {
        match self {
            GameOutcome::Win(player) => GameOutcome::Win(player.opponent()),
            GameOutcome::Tie => GameOutcome::Tie,
        }
    }

    /// Terminal reward for the side playing `role`
    ///
    /// # Examples
    ///
    /// ```
    /// use tictactoe_td::tictactoe::{GameOutcome, Player};
    ///
    /// assert_eq!(GameOutcome::Win(Player::X).reward_for(Player::X), 1.0);
    /// assert_eq!(GameOutcome::Win(Player::X).reward_for(Player::O), -1.0);
    /// assert_eq!(GameOutcome::Tie.reward_for(Player::O), 0.5);
    /// ```
    pub fn reward_for(self, role: Player) -> f64 {
        match self {
            GameOutcome::Win(winner) if winner == role => WIN_REWARD,
            GameOutcome::Win(_) => LOSS_REWARD,
            GameOutcome::Tie => TIE_REWARD,
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(player),
            GameOutcome::Tie => None,
        }
    }
}
