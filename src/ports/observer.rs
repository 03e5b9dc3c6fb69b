//! Observer port - callbacks from training and interactive play
//!
//! The core reports progress and game events through this trait so that
//! rendering (progress bars, a terminal board, logs) stays outside of it.

use crate::{
    Result,
    identifiers::ModelId,
    tictactoe::{BoardState, GameOutcome},
};

/// Observer trait for training runs and matches
///
/// Every method has a no-op default, so an observer only overrides the
/// events it cares about. Returned errors abort the run that emitted them.
///
/// # Event Sequence
///
/// During self-play training:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_end(episode, outcome, moves)`
///    - `on_training_progress(fraction)`
///    - `on_training_episode(episode)` - Every report interval
/// 3. `on_training_end()` - Once at the end
///
/// During a match, `on_board_changed` follows every placed mark,
/// `on_game_over` follows the final one and `on_model_switched` follows a
/// loss-triggered model reload.
///
/// # Examples
///
/// ```
/// use tictactoe_td::{ports::Observer, tictactoe::GameOutcome};
///
/// struct TieCounter {
///     ties: usize,
/// }
///
/// impl Observer for TieCounter {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         outcome: GameOutcome,
///         _moves: usize,
///     ) -> tictactoe_td::Result<()> {
///         if outcome == GameOutcome::Tie {
///             self.ties += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first episode.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after every episode with `(episode + 1) / total_episodes`.
    fn on_training_progress(&mut self, _fraction: f64) -> Result<()> {
        Ok(())
    }

    /// Called with the 1-based episode counter every report interval.
    fn on_training_episode(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a self-play episode reaches a terminal board.
    ///
    /// # Parameters
    ///
    /// * `episode` - Index of the episode (0-based)
    /// * `outcome` - Terminal outcome; X is the first trainer seat
    /// * `moves` - Marks placed during the episode
    fn on_episode_end(&mut self, _episode: usize, _outcome: GameOutcome, _moves: usize) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode, before the model is persisted.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called after any mark is placed during a match.
    fn on_board_changed(&mut self, _board: &BoardState) -> Result<()> {
        Ok(())
    }

    /// Called when a match reaches a terminal board.
    fn on_game_over(&mut self, _outcome: GameOutcome) -> Result<()> {
        Ok(())
    }

    /// Called after the losing agent was replaced by another model.
    fn on_model_switched(&mut self, _from: ModelId, _to: ModelId) -> Result<()> {
        Ok(())
    }
}
