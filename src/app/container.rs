//! Dependency injection container for the engine.
//!
//! The container owns the value table repository and the configuration and
//! hands them to trainers, agents and match controllers.

use std::sync::Arc;

use super::config::EngineConfig;
use crate::{
    Result,
    adapters::CsvRepository,
    identifiers::ModelId,
    pipeline::{MatchController, SelfPlayTrainer, TrainedModel},
    ports::{Observer, ValueTableRepository},
    td_learning::Agent,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use tictactoe_td::app::{App, EngineConfig};
///
/// let app = App::from_config(EngineConfig::default().with_model_dir("models"));
/// if !app.has_trained_models()? {
///     app.train_new_model(Vec::new())?;
/// }
/// # Ok::<(), tictactoe_td::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use tictactoe_td::adapters::InMemoryRepository;
/// use tictactoe_td::app::App;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// assert!(!app.has_trained_models()?);
/// # Ok::<(), tictactoe_td::Error>(())
/// ```
pub struct App {
    /// Repository for value table persistence
    repository: Arc<dyn ValueTableRepository>,
    /// Engine settings
    config: EngineConfig,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create an app with default settings, storing models in `models/`.
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// Create an app storing CSV tables in the configured model directory.
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            repository: Arc::new(CsvRepository::new(config.model_dir.clone())),
            default_seed: config.seed,
            config,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the value table repository.
    pub fn repository(&self) -> Arc<dyn ValueTableRepository> {
        Arc::clone(&self.repository)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether at least one model has been persisted.
    pub fn has_trained_models(&self) -> Result<bool> {
        Ok(!self.repository.model_ids()?.is_empty())
    }

    /// Ids of all persisted models.
    pub fn model_ids(&self) -> Result<Vec<ModelId>> {
        self.repository.model_ids()
    }

    /// Train a model under the smallest free model id.
    ///
    /// # Arguments
    ///
    /// * `observers` - Receive progress and episode events
    pub fn train_new_model(&self, observers: Vec<Box<dyn Observer>>) -> Result<TrainedModel> {
        let model_id = self.repository.next_free_id()?;
        self.train_model(model_id, observers)
    }

    /// Train `model_id` with the configured number of episodes.
    pub fn train_model(
        &self,
        model_id: ModelId,
        observers: Vec<Box<dyn Observer>>,
    ) -> Result<TrainedModel> {
        let mut training = self.config.training.clone();
        training.seed = training.seed.or(self.default_seed);

        let mut trainer = SelfPlayTrainer::new(training, self.repository());
        for observer in observers {
            trainer = trainer.with_observer(observer);
        }
        trainer.run(model_id)
    }

    /// Load the agent for `model_id` with the play exploration rate.
    ///
    /// A model without a table loads as an untrained agent.
    pub fn load_agent(&self, model_id: ModelId) -> Result<Agent> {
        let agent = Agent::load(self.repository(), model_id, self.config.play.epsilon)?;
        Ok(match self.default_seed {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        })
    }

    /// Start an interactive match; the agent's opening move is already played.
    pub fn start_match(
        &self,
        agent: Agent,
        observers: Vec<Box<dyn Observer>>,
    ) -> Result<MatchController> {
        MatchController::with_observers(agent, self.config.play.clone(), observers)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    repository: Option<Arc<dyn ValueTableRepository>>,
    config: EngineConfig,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            repository: None,
            config: EngineConfig::default(),
            default_seed: None,
        }
    }

    /// Set a custom value table repository.
    pub fn with_repository<R: ValueTableRepository + 'static>(mut self, repo: R) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a default random seed for all agents and trainers.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses a `CsvRepository` on the
    /// configured model directory.
    pub fn build(self) -> App {
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(CsvRepository::new(self.config.model_dir.clone())));
        App {
            repository,
            default_seed: self.default_seed.or(self.config.seed),
            config: self.config,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
