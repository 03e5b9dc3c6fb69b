//! Self-play training between two fresh agents

use std::{fmt, sync::Arc};

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    identifiers::ModelId,
    ports::{Observer, ValueTableRepository},
    td_learning::{Agent, INITIAL_EPSILON, TRAINED_EPSILON, build_rng},
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of self-play episodes
    pub episodes: usize,

    /// Exploration rate both agents start with
    pub initial_epsilon: f64,

    /// Exploration rate the promoted agent is handed over with
    pub trained_epsilon: f64,

    /// Probability that the first seat opens an episode
    pub first_mover_probability: f64,

    /// Episodes between `on_training_episode` reports
    pub episode_report_interval: usize,

    /// Random seed
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 100_000,
            initial_epsilon: INITIAL_EPSILON,
            trained_epsilon: TRAINED_EPSILON,
            first_mover_probability: 0.7,
            episode_report_interval: 100,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_first_mover_probability(mut self, probability: f64) -> Self {
        self.first_mover_probability = probability;
        self
    }

    /// Check probabilities lie in `[0, 1]` and the report interval is positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("initial_epsilon", self.initial_epsilon),
            ("trained_epsilon", self.trained_epsilon),
            ("first_mover_probability", self.first_mover_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("training.{name} must be within [0, 1], got {value}"),
                });
            }
        }
        if self.episode_report_interval == 0 {
            return Err(Error::InvalidConfiguration {
                message: "training.episode_report_interval must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// One of the two self-play agents.
///
/// The first seat always plays X and the second O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    AgentOne,
    AgentTwo,
}

impl Seat {
    pub fn mark(self) -> Player {
        match self {
            Seat::AgentOne => Player::X,
            Seat::AgentTwo => Player::O,
        }
    }

    pub fn from_mark(mark: Player) -> Self {
        match mark {
            Player::X => Seat::AgentOne,
            Player::O => Seat::AgentTwo,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Seat::AgentOne => Seat::AgentTwo,
            Seat::AgentTwo => Seat::AgentOne,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::AgentOne => write!(f, "Agent 1"),
            Seat::AgentTwo => write!(f, "Agent 2"),
        }
    }
}

/// Episode outcomes counted per seat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTally {
    pub agent_one: usize,
    pub agent_two: usize,
    pub ties: usize,
}

impl WinTally {
    pub fn record(&mut self, outcome: GameOutcome) {
        match outcome.winner().map(Seat::from_mark) {
            Some(Seat::AgentOne) => self.agent_one += 1,
            Some(Seat::AgentTwo) => self.agent_two += 1,
            None => self.ties += 1,
        }
    }

    pub fn wins(&self, seat: Seat) -> usize {
        match seat {
            Seat::AgentOne => self.agent_one,
            Seat::AgentTwo => self.agent_two,
        }
    }

    pub fn total(&self) -> usize {
        self.agent_one + self.agent_two + self.ties
    }

    /// Seat with more wins; an even count favours the first seat
    pub fn leader(&self) -> Seat {
        if self.agent_one >= self.agent_two {
            Seat::AgentOne
        } else {
            Seat::AgentTwo
        }
    }
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Model the promoted table was saved under
    pub model_id: ModelId,

    /// Episodes played
    pub episodes: usize,

    /// Outcomes per seat
    pub tally: WinTally,

    /// Seat whose table became the model
    pub promoted: Seat,

    /// States in the promoted table
    pub table_size: usize,
}

impl TrainingReport {
    /// Save report to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load report from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

/// Promoted agent together with the run that produced it
#[derive(Debug)]
pub struct TrainedModel {
    pub agent: Agent,
    pub report: TrainingReport,
}

/// Trains a model by letting two agents play each other.
///
/// Both agents start from the table stored under the target model id (empty
/// for a new id) and learn in memory after every episode. Only the agent
/// with more wins is persisted, from X's point of view.
pub struct SelfPlayTrainer {
    config: TrainingConfig,
    store: Arc<dyn ValueTableRepository>,
    observers: Vec<Box<dyn Observer>>,
    rng: StdRng,
}

impl SelfPlayTrainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig, store: Arc<dyn ValueTableRepository>) -> Self {
        let rng = build_rng(config.seed.map(|seed| seed.wrapping_add(2)));
        Self {
            config,
            store,
            observers: Vec::new(),
            rng,
        }
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `model_id` with the configured number of episodes
    pub fn run(&mut self, model_id: ModelId) -> Result<TrainedModel> {
        self.train(model_id, self.config.episodes)
    }

    /// Play `episodes` self-play games and persist the stronger agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the starting table
    /// cannot be loaded, an observer fails or the promoted table cannot be
    /// saved.
    pub fn train(&mut self, model_id: ModelId, episodes: usize) -> Result<TrainedModel> {
        self.config.validate()?;

        let epsilon = self.config.initial_epsilon;
        let mut agent_one =
            Agent::load(Arc::clone(&self.store), model_id, epsilon)?.with_mark(Seat::AgentOne.mark());
        let mut agent_two =
            Agent::load(Arc::clone(&self.store), model_id, epsilon)?.with_mark(Seat::AgentTwo.mark());
        if let Some(seed) = self.config.seed {
            agent_one.set_rng_seed(seed);
            agent_two.set_rng_seed(seed.wrapping_add(1));
        }

        log::info!("Training model {model_id} for {episodes} episodes");
        for observer in &mut self.observers {
            observer.on_training_start(episodes)?;
        }

        let mut tally = WinTally::default();
        for episode in 0..episodes {
            let (outcome, moves) = self.play_episode(&mut agent_one, &mut agent_two)?;
            tally.record(outcome);

            let completed = episode + 1;
            let fraction = completed as f64 / episodes as f64;
            let report_due = completed % self.config.episode_report_interval == 0;
            for observer in &mut self.observers {
                observer.on_episode_end(episode, outcome, moves)?;
                observer.on_training_progress(fraction)?;
                if report_due {
                    observer.on_training_episode(completed)?;
                }
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let promoted = tally.leader();
        let mut agent = match promoted {
            Seat::AgentOne => agent_one,
            Seat::AgentTwo => agent_two,
        };
        agent.adopt_mark(Player::X);
        agent.set_epsilon(self.config.trained_epsilon);
        agent.save()?;

        log::info!(
            "Promoted {promoted} as model {model_id}: {} wins, {} losses, {} ties, {} states",
            tally.wins(promoted),
            tally.wins(promoted.other()),
            tally.ties,
            agent.table().len()
        );

        let report = TrainingReport {
            model_id,
            episodes,
            tally,
            promoted,
            table_size: agent.table().len(),
        };
        Ok(TrainedModel { agent, report })
    }

    /// Play one episode and update the agent that made the final move.
    ///
    /// Returns the outcome and the number of marks placed.
    fn play_episode(
        &mut self,
        agent_one: &mut Agent,
        agent_two: &mut Agent,
    ) -> Result<(GameOutcome, usize)> {
        agent_one.clear_trajectory();
        agent_two.clear_trajectory();

        let mut board = BoardState::new();
        let mut seat = if self.rng.random::<f64>() < self.config.first_mover_probability {
            Seat::AgentOne
        } else {
            Seat::AgentTwo
        };
        let mut moves = 0;

        loop {
            let mover = match seat {
                Seat::AgentOne => &mut *agent_one,
                Seat::AgentTwo => &mut *agent_two,
            };
            let position = mover.select_move(&board)?;
            board.place(position, mover.mark())?;
            mover.record(board.encode());
            moves += 1;

            if let Some(outcome) = board.detect_winner() {
                mover.apply_update(outcome.reward_for(mover.mark()));
                match seat.other() {
                    Seat::AgentOne => agent_one.clear_trajectory(),
                    Seat::AgentTwo => agent_two.clear_trajectory(),
                }
                return Ok((outcome, moves));
            }

            seat = seat.other();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;

    fn trainer(config: TrainingConfig) -> (SelfPlayTrainer, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let trainer = SelfPlayTrainer::new(config, Arc::new(repo.clone()));
        (trainer, repo)
    }

    #[test]
    fn test_training_config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.episodes, 100_000);
        assert_eq!(config.initial_epsilon, 1.0);
        assert_eq!(config.trained_epsilon, 0.1);
        assert_eq!(config.first_mover_probability, 0.7);
        assert_eq!(config.episode_report_interval, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let config = TrainingConfig::default().with_first_mover_probability(1.5);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_tally_leader_favours_first_seat_on_even_count() {
        let mut tally = WinTally::default();
        tally.record(GameOutcome::Win(Player::X));
        tally.record(GameOutcome::Win(Player::O));
        tally.record(GameOutcome::Tie);
        assert_eq!(tally.leader(), Seat::AgentOne);
        assert_eq!(tally.total(), 3);

        tally.record(GameOutcome::Win(Player::O));
        assert_eq!(tally.leader(), Seat::AgentTwo);
    }

    #[test]
    fn test_train_persists_one_model() {
        let (mut trainer, repo) = trainer(TrainingConfig::default().with_seed(42));
        let trained = trainer.train(ModelId::FIRST, 10).unwrap();

        assert_eq!(repo.count(), 1);
        assert_eq!(trained.report.episodes, 10);
        assert_eq!(trained.report.tally.total(), 10);
        assert!(trained.report.table_size > 0);
        assert_eq!(trained.agent.mark(), Player::X);
        assert_eq!(trained.agent.epsilon(), 0.1);
        assert!(!trained.agent.is_dirty());
        assert_eq!(&repo.load(ModelId::FIRST).unwrap(), trained.agent.table());
    }

    #[test]
    fn test_train_is_reproducible_with_seed() {
        let (mut first, _) = trainer(TrainingConfig::default().with_seed(7));
        let (mut second, _) = trainer(TrainingConfig::default().with_seed(7));

        let a = first.train(ModelId::FIRST, 50).unwrap();
        let b = second.train(ModelId::FIRST, 50).unwrap();
        assert_eq!(a.report, b.report);
        assert_eq!(a.agent.table(), b.agent.table());
    }

    #[test]
    fn test_second_seat_promotion_is_relabeled() {
        // The second seat always opens and, at ε = 1, tends to win more
        let config = TrainingConfig::default()
            .with_seed(3)
            .with_first_mover_probability(0.0);
        let (mut trainer, repo) = trainer(config);
        let trained = trainer.train(ModelId::FIRST, 200).unwrap();

        assert_eq!(trained.report.promoted, Seat::AgentTwo);
        // O opens every episode, so a one-mark board in X's view holds a single X
        let stored = repo.load(ModelId::FIRST).unwrap();
        let single_mark_keys: Vec<_> = stored
            .iter()
            .map(|(key, _)| key.digits())
            .filter(|digits| digits.iter().filter(|&&d| d != 0).count() == 1)
            .collect();
        assert!(!single_mark_keys.is_empty());
        assert!(single_mark_keys.iter().all(|digits| digits.contains(&1)));
    }

    #[test]
    fn test_report_save_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        let report = TrainingReport {
            model_id: ModelId::new(2).unwrap(),
            episodes: 10,
            tally: WinTally {
                agent_one: 6,
                agent_two: 3,
                ties: 1,
            },
            promoted: Seat::AgentOne,
            table_size: 40,
        };

        report.save(&path).unwrap();
        assert_eq!(TrainingReport::load(&path).unwrap(), report);
    }
}
