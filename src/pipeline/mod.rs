//! Training and play pipelines
//!
//! This module provides:
//! - Self-play training of a new model
//! - Interactive matches between a model and a human
//! - Observers reporting on both

pub mod match_controller;
pub mod observers;
pub mod self_play;

pub use match_controller::{MatchConfig, MatchController, MatchState, MoveResponse, Rejection};
pub use observers::{LogObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use self_play::{
    Seat, SelfPlayTrainer, TrainedModel, TrainingConfig, TrainingReport, WinTally,
};

pub use crate::ports::Observer;
