//! Interactive match between a trained agent and a human

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    identifiers::ModelId,
    ports::Observer,
    td_learning::{Agent, TRAINED_EPSILON},
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Settings for interactive play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Update and persist the agent's table after every game
    pub learn_from_games: bool,

    /// Human wins after which the agent is replaced by another model
    pub max_losses: u32,

    /// Model ids searched past the current one before wrapping to the first
    pub switch_lookahead: u32,

    /// Exploration rate of a model loaded by a switch
    pub epsilon: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            learn_from_games: false,
            max_losses: 7,
            switch_lookahead: 3,
            epsilon: TRAINED_EPSILON,
        }
    }
}

impl MatchConfig {
    pub fn with_learning(mut self, enabled: bool) -> Self {
        self.learn_from_games = enabled;
        self
    }

    pub fn with_max_losses(mut self, max_losses: u32) -> Self {
        self.max_losses = max_losses;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::InvalidConfiguration {
                message: format!("play.epsilon must be within [0, 1], got {}", self.epsilon),
            });
        }
        if self.max_losses == 0 {
            return Err(Error::InvalidConfiguration {
                message: "play.max_losses must be positive".to_string(),
            });
        }
        if self.switch_lookahead == 0 {
            return Err(Error::InvalidConfiguration {
                message: "play.switch_lookahead must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Phase of the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    AwaitingHumanMove,
    GameOver(GameOutcome),
}

/// Why a human move was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutOfRange,
    Occupied,
    GameOver,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutOfRange => write!(f, "cell must be between 0 and 8"),
            Rejection::Occupied => write!(f, "cell is already taken"),
            Rejection::GameOver => write!(f, "the game is over"),
        }
    }
}

/// Result of [`MatchController::apply_human_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResponse {
    /// Nothing changed
    Rejected(Rejection),

    /// The agent answered and the game goes on
    AgentMoved { position: usize },

    /// The game ended, either on the human's move (`agent_move` is `None`)
    /// or on the agent's reply
    Finished {
        outcome: GameOutcome,
        agent_move: Option<usize>,
    },
}

/// Drives games between one agent (X) and a human (O).
///
/// The agent opens every game. Its trajectory holds the board after every
/// mark, its own and the human's. Unsaved table updates are flushed by
/// [`MatchController::close`], or on drop as a last resort.
pub struct MatchController {
    agent: Agent,
    config: MatchConfig,
    board: BoardState,
    state: MatchState,
    observers: Vec<Box<dyn Observer>>,
}

impl MatchController {
    /// Create a controller and play the agent's opening move
    pub fn new(agent: Agent, config: MatchConfig) -> Result<Self> {
        Self::with_observers(agent, config, Vec::new())
    }

    /// Create a controller reporting to `observers` and play the opening move.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the agent does not
    /// play X, or an observer fails.
    pub fn with_observers(
        agent: Agent,
        config: MatchConfig,
        observers: Vec<Box<dyn Observer>>,
    ) -> Result<Self> {
        config.validate()?;
        if agent.mark() != Player::X {
            return Err(Error::InvalidConfiguration {
                message: format!("interactive agent must play X, got {}", agent.mark()),
            });
        }

        let mut controller = Self {
            agent,
            config,
            board: BoardState::new(),
            state: MatchState::AwaitingHumanMove,
            observers,
        };
        controller.new_game()?;
        Ok(controller)
    }

    fn human_mark(&self) -> Player {
        self.agent.mark().opponent()
    }

    /// Clear the board and the trajectory, then play the agent's opening move
    pub fn new_game(&mut self) -> Result<()> {
        self.board = BoardState::new();
        self.state = MatchState::AwaitingHumanMove;
        self.agent.clear_trajectory();
        self.play_agent_move()?;
        Ok(())
    }

    /// Mark `position` for the human and let the agent answer.
    ///
    /// Out-of-range and occupied cells, and any move after the game ended,
    /// are rejected without touching the board.
    ///
    /// # Errors
    ///
    /// Returns an error if an observer fails or a learning update cannot be
    /// saved.
    pub fn apply_human_move(&mut self, position: usize) -> Result<MoveResponse> {
        if let Some(rejection) = self.check_human_move(position) {
            log::debug!("Rejected human move {position}: {rejection}");
            return Ok(MoveResponse::Rejected(rejection));
        }

        let human = self.human_mark();
        self.board.place(position, human)?;
        self.agent.record(self.board.encode());
        self.notify_board_changed()?;

        if let Some(outcome) = self.board.detect_winner() {
            self.finish(outcome)?;
            return Ok(MoveResponse::Finished {
                outcome,
                agent_move: None,
            });
        }

        let agent_move = self.play_agent_move()?;
        if let Some(outcome) = self.board.detect_winner() {
            self.finish(outcome)?;
            return Ok(MoveResponse::Finished {
                outcome,
                agent_move: Some(agent_move),
            });
        }

        Ok(MoveResponse::AgentMoved {
            position: agent_move,
        })
    }

    fn check_human_move(&self, position: usize) -> Option<Rejection> {
        if matches!(self.state, MatchState::GameOver(_)) {
            Some(Rejection::GameOver)
        } else if position >= 9 {
            Some(Rejection::OutOfRange)
        } else if !self.board.is_empty(position) {
            Some(Rejection::Occupied)
        } else {
            None
        }
    }

    fn play_agent_move(&mut self) -> Result<usize> {
        let position = self.agent.select_move(&self.board)?;
        let mark = self.agent.mark();
        self.board.place(position, mark)?;
        self.agent.record(self.board.encode());
        self.notify_board_changed()?;
        Ok(position)
    }

    fn notify_board_changed(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_board_changed(&self.board)?;
        }
        Ok(())
    }

    fn finish(&mut self, outcome: GameOutcome) -> Result<()> {
        self.state = MatchState::GameOver(outcome);
        log::info!("Game over against model {}: {outcome:?}", self.agent.model_id());
        for observer in &mut self.observers {
            observer.on_game_over(outcome)?;
        }

        if !self.config.learn_from_games {
            self.agent.clear_trajectory();
            return Ok(());
        }

        let reward = outcome.reward_for(self.agent.mark());
        self.agent.learn(reward)?;
        if outcome.winner() == Some(self.human_mark()) {
            let losses = self.agent.record_loss();
            if losses >= self.config.max_losses {
                self.switch_model()?;
            }
        } else {
            self.agent.reset_losses();
        }
        Ok(())
    }

    /// Model a loss-triggered switch moves to.
    ///
    /// Searches upwards from the current id for a persisted table and falls
    /// back to the first model once `switch_lookahead` ids have been tried.
    pub fn next_model_id(&self) -> ModelId {
        let current = self.agent.model_id();
        let store = self.agent.store();
        let limit = current.value().saturating_add(self.config.switch_lookahead);

        let mut candidate = current.next();
        while !store.exists(candidate) {
            candidate = candidate.next();
            if candidate.value() > limit {
                return ModelId::FIRST;
            }
        }
        candidate
    }

    /// Replace the agent with the next available model and reset the loss
    /// counter.
    ///
    /// # Errors
    ///
    /// Returns an error if unsaved updates cannot be flushed or the next
    /// table cannot be loaded.
    pub fn switch_model(&mut self) -> Result<ModelId> {
        let from = self.agent.model_id();
        let to = self.next_model_id();

        let mut agent = Agent::load(Arc::clone(self.agent.store()), to, self.config.epsilon)?;
        if let Some(seed) = self.agent.rng_seed() {
            agent.set_rng_seed(seed.wrapping_add(1));
        }
        self.replace_agent(agent)?;

        log::info!("Switched from model {from} to model {to}");
        for observer in &mut self.observers {
            observer.on_model_switched(from, to)?;
        }
        Ok(to)
    }

    /// Swap in another agent, flushing the current one first.
    ///
    /// The game in progress is left as is; call [`MatchController::new_game`]
    /// to let the new agent open.
    pub fn replace_agent(&mut self, agent: Agent) -> Result<()> {
        if agent.mark() != Player::X {
            return Err(Error::InvalidConfiguration {
                message: format!("interactive agent must play X, got {}", agent.mark()),
            });
        }
        self.flush()?;
        self.agent = agent;
        self.agent.reset_losses();
        Ok(())
    }

    /// Save the agent's table if it holds unsaved updates
    pub fn flush(&mut self) -> Result<()> {
        if self.agent.is_dirty() {
            self.agent.save()?;
        }
        Ok(())
    }

    /// Flush unsaved updates and end the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be saved.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }
}

impl Drop for MatchController {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::error!(
                "Failed to save value table {} on shutdown: {e}",
                self.agent.model_id()
            );
        }
    }
}
