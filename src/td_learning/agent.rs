//! Epsilon-greedy agent over a tabular value function
//!
//! The agent owns its value table, the trajectory of states reached during
//! the current game and the random source used for exploration.

use std::{fmt, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::{DISCOUNT_FACTOR, ValueTable, build_rng};
use crate::{
    error::{Error, Result},
    identifiers::{ModelId, StateKey},
    ports::ValueTableRepository,
    tictactoe::{BoardState, Player},
};

/// Learning agent bound to one persisted model.
pub struct Agent {
    model_id: ModelId,
    mark: Player,
    epsilon: f64,
    table: ValueTable,
    trajectory: Vec<StateKey>,
    losses: u32,
    dirty: bool,
    store: Arc<dyn ValueTableRepository>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl Agent {
    /// Create an agent playing X with the given table.
    ///
    /// # Arguments
    ///
    /// * `model_id` - Model the table is saved under
    /// * `epsilon` - Probability of a uniformly random move
    /// * `table` - Initial value estimates
    /// * `store` - Where `learn` and `save` persist the table
    pub fn new(
        model_id: ModelId,
        epsilon: f64,
        table: ValueTable,
        store: Arc<dyn ValueTableRepository>,
    ) -> Self {
        Self {
            model_id,
            mark: Player::X,
            epsilon,
            table,
            trajectory: Vec::new(),
            losses: 0,
            dirty: false,
            store,
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    /// Create an agent from the table persisted for `model_id`.
    ///
    /// A model with no persisted table starts from an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted table cannot be read.
    pub fn load(
        store: Arc<dyn ValueTableRepository>,
        model_id: ModelId,
        epsilon: f64,
    ) -> Result<Self> {
        let table = store.load(model_id)?;
        log::info!(
            "Loaded {} states from value table {}",
            table.len(),
            model_id
        );
        Ok(Self::new(model_id, epsilon, table, store))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_rng_seed(seed);
        self
    }

    /// Play with `mark` instead of X
    pub fn with_mark(mut self, mark: Player) -> Self {
        self.mark = mark;
        self
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// Choose a cell for this agent's mark.
    ///
    /// With probability ε the move is uniform over empty cells. Otherwise
    /// every empty cell is tried in ascending order and the one whose
    /// resulting state has the strictly greatest value wins, so ties go to
    /// the lowest index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValidMoves`] if the board has no empty cell.
    pub fn select_move(&mut self, board: &BoardState) -> Result<usize> {
        let legal = board.empty_positions();
        if legal.is_empty() {
            return Err(Error::NoValidMoves);
        }

        if self.rng.random::<f64>() < self.epsilon {
            return self.random_move(&legal);
        }

        match self.greedy_move(board, &legal) {
            Some(position) => Ok(position),
            None => self.random_move(&legal),
        }
    }

    fn random_move(&mut self, legal: &[usize]) -> Result<usize> {
        legal
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::NoValidMoves)
    }

    fn greedy_move(&self, board: &BoardState, legal: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &position in legal {
            let Ok(next) = board.with_move(position, self.mark) else {
                continue;
            };
            let value = self.table.get(next.encode());
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((position, value));
            }
        }
        best.map(|(position, _)| position)
    }

    /// Append a reached state to the current trajectory
    pub fn record(&mut self, key: StateKey) {
        self.trajectory.push(key);
    }

    /// Drop the current trajectory without learning from it
    pub fn clear_trajectory(&mut self) {
        self.trajectory.clear();
    }

    /// Backward discounted update over the trajectory, in memory only.
    ///
    /// States are visited newest first; the reward is multiplied by γ after
    /// each state. The trajectory is cleared afterwards.
    pub fn apply_update(&mut self, reward: f64) {
        let mut target = reward;
        for &key in self.trajectory.iter().rev() {
            self.table.td_update(key, target);
            target *= DISCOUNT_FACTOR;
        }
        if !self.trajectory.is_empty() {
            self.dirty = true;
        }
        self.trajectory.clear();
    }

    /// Learn from a finished game and persist the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be saved. The in-memory update
    /// has already been applied and is kept.
    pub fn learn(&mut self, reward: f64) -> Result<()> {
        self.apply_update(reward);
        self.save()
    }

    /// Persist the table under this agent's model id.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot write the table.
    pub fn save(&mut self) -> Result<()> {
        self.store.save(self.model_id, &self.table)?;
        self.dirty = false;
        log::debug!(
            "Saved {} states to value table {}",
            self.table.len(),
            self.model_id
        );
        Ok(())
    }

    /// Re-express the table from `mark`'s point of view and play as `mark`.
    pub fn adopt_mark(&mut self, mark: Player) {
        if self.mark != mark {
            self.table = self.table.relabeled();
            self.mark = mark;
            self.trajectory.clear();
            self.dirty = true;
        }
    }

    pub fn model_id(&self) -> ModelId {
        self.model_id
    }

    pub fn mark(&self) -> Player {
        self.mark
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// Repository this agent loads from and saves to
    pub fn store(&self) -> &Arc<dyn ValueTableRepository> {
        &self.store
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// States recorded since the last update, oldest first
    pub fn trajectory(&self) -> &[StateKey] {
        &self.trajectory
    }

    /// Consecutive losses against a human
    pub fn losses(&self) -> u32 {
        self.losses
    }

    /// Count one more loss and return the new total
    pub fn record_loss(&mut self) -> u32 {
        self.losses += 1;
        self.losses
    }

    pub fn reset_losses(&mut self) {
        self.losses = 0;
    }

    /// Whether the table holds updates that were not saved yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("model_id", &self.model_id)
            .field("mark", &self.mark)
            .field("epsilon", &self.epsilon)
            .field("table_size", &self.table.len())
            .field("trajectory", &self.trajectory)
            .field("losses", &self.losses)
            .field("dirty", &self.dirty)
            .field("rng_seed", &self.rng_seed)
            .finish()
    }
}
