//! Observer implementations for training runs and matches
//!
//! Observers allow composable reporting without coupling the trainer or the
//! match controller to a particular output.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::self_play::{Seat, WinTally};
use crate::{
    Result,
    identifiers::ModelId,
    ports::Observer,
    tictactoe::{BoardState, GameOutcome},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    tally: WinTally,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            tally: WinTally::default(),
        }
    }

    fn message(&self) -> String {
        format!(
            "A1:{} A2:{} T:{}",
            self.tally.agent_one, self.tally.agent_two, self.tally.ties
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, outcome: GameOutcome, _moves: usize) -> Result<()> {
        self.tally.record(outcome);
        Ok(())
    }

    fn on_training_progress(&mut self, fraction: f64) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            let len = pb.length().unwrap_or(0);
            pb.set_position((fraction * len as f64).round() as u64);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Reports training milestones and match events through the `log` facade
#[derive(Debug, Default)]
pub struct LogObserver {
    total_episodes: usize,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for LogObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.total_episodes = total_episodes;
        Ok(())
    }

    fn on_training_episode(&mut self, episode: usize) -> Result<()> {
        log::info!("Episode {episode}/{}", self.total_episodes);
        Ok(())
    }

    fn on_board_changed(&mut self, board: &BoardState) -> Result<()> {
        log::trace!("Board {}", board.encode());
        Ok(())
    }

    fn on_game_over(&mut self, outcome: GameOutcome) -> Result<()> {
        match outcome.winner() {
            Some(winner) => log::info!("{winner} wins"),
            None => log::info!("Tie"),
        }
        Ok(())
    }

    fn on_model_switched(&mut self, from: ModelId, to: ModelId) -> Result<()> {
        log::info!("Model {from} replaced by model {to}");
        Ok(())
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub tally: WinTally,
    pub agent_one_win_rate: f64,
    pub agent_two_win_rate: f64,
    pub tie_rate: f64,
    pub avg_episode_length: f64,
}

#[derive(Debug, Default)]
struct Metrics {
    tally: WinTally,
    move_counts: Vec<usize>,
}

/// Metrics observer - Tracks per-seat results and episode lengths
///
/// Clones share the same counters, so a clone can be handed to a trainer
/// and the original queried afterwards.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    metrics: Arc<Mutex<Metrics>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    fn metrics(&self) -> MutexGuard<'_, Metrics> {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Share of episodes won by `seat`
    pub fn win_rate(&self, seat: Seat) -> f64 {
        let metrics = self.metrics();
        rate(metrics.tally.wins(seat), metrics.tally.total())
    }

    pub fn tie_rate(&self) -> f64 {
        let metrics = self.metrics();
        rate(metrics.tally.ties, metrics.tally.total())
    }

    /// Get average episode length in marks placed
    pub fn avg_episode_length(&self) -> f64 {
        let metrics = self.metrics();
        if metrics.move_counts.is_empty() {
            0.0
        } else {
            metrics.move_counts.iter().sum::<usize>() as f64 / metrics.move_counts.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let tally = self.metrics().tally;
        MetricsSummary {
            total_episodes: tally.total(),
            tally,
            agent_one_win_rate: self.win_rate(Seat::AgentOne),
            agent_two_win_rate: self.win_rate(Seat::AgentTwo),
            tie_rate: self.tie_rate(),
            avg_episode_length: self.avg_episode_length(),
        }
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, outcome: GameOutcome, moves: usize) -> Result<()> {
        let mut metrics = self.metrics();
        metrics.tally.record(outcome);
        metrics.move_counts.push(moves);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Player;

    #[test]
    fn test_metrics_observer_counts() {
        let mut observer = MetricsObserver::new();
        observer.on_episode_end(0, GameOutcome::Win(Player::X), 5).unwrap();
        observer.on_episode_end(1, GameOutcome::Win(Player::O), 6).unwrap();
        observer.on_episode_end(2, GameOutcome::Tie, 9).unwrap();
        observer.on_episode_end(3, GameOutcome::Win(Player::X), 8).unwrap();

        let summary = observer.summary();
        assert_eq!(summary.total_episodes, 4);
        assert_eq!(summary.tally.agent_one, 2);
        assert_eq!(summary.agent_one_win_rate, 0.5);
        assert_eq!(summary.agent_two_win_rate, 0.25);
        assert_eq!(summary.tie_rate, 0.25);
        assert_eq!(summary.avg_episode_length, 7.0);
    }

    #[test]
    fn test_metrics_clones_share_counters() {
        let observer = MetricsObserver::new();
        let mut boxed: Box<dyn Observer> = Box::new(observer.clone());
        boxed.on_episode_end(0, GameOutcome::Tie, 9).unwrap();

        assert_eq!(observer.summary().tally.ties, 1);
    }

    #[test]
    fn test_empty_metrics() {
        let observer = MetricsObserver::new();
        assert_eq!(observer.win_rate(Seat::AgentOne), 0.0);
        assert_eq!(observer.avg_episode_length(), 0.0);
    }

    #[test]
    fn test_progress_observer_lifecycle() {
        let mut observer = ProgressObserver::new();
        observer.on_training_start(2).unwrap();
        observer.on_episode_end(0, GameOutcome::Tie, 9).unwrap();
        observer.on_training_progress(0.5).unwrap();
        observer.on_training_end().unwrap();
        assert_eq!(observer.message(), "A1:0 A2:0 T:1");
    }
}
