//! Self-play temporal difference learning for Tic-Tac-Toe
//!
//! This crate provides:
//! - A board codec mapping every board to a base-3 state key
//! - Tabular value functions persisted as one CSV file per model
//! - Epsilon-greedy agents that learn from finished games with a backward
//!   discounted TD(0) update
//! - A self-play trainer that promotes the stronger of two agents
//! - A match controller for games against a human, with optional learning
//!   and loss-triggered model switching
//!
//! # Example
//!
//! ```
//! use tictactoe_td::adapters::InMemoryRepository;
//! use tictactoe_td::app::{App, EngineConfig};
//! use tictactoe_td::pipeline::MoveResponse;
//!
//! let app = App::for_testing()
//!     .with_repository(InMemoryRepository::new())
//!     .with_config(EngineConfig::default().with_episodes(200))
//!     .with_default_seed(7)
//!     .build();
//!
//! let trained = app.train_new_model(Vec::new())?;
//! let agent = app.load_agent(trained.report.model_id)?;
//! let mut game = app.start_match(agent, Vec::new())?;
//!
//! let free = game.board().empty_positions()[0];
//! let response = game.apply_human_move(free)?;
//! assert!(!matches!(response, MoveResponse::Rejected(_)));
//! # Ok::<(), tictactoe_td::Error>(())
//! ```

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod identifiers;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod td_learning;
pub mod tictactoe;

pub use error::{Error, Result};
pub use identifiers::{ModelId, StateKey};
