//! Train command - Train a new model by self-play

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::App,
    cli::{
        config::EngineArgs,
        output::{format_number, format_percent, print_kv, print_section},
    },
    pipeline::{LogObserver, ProgressObserver, TrainingReport},
    ports::Observer,
};

/// Treat a directory or extension-less path as the place for a JSON report.
fn sanitize_report_path(raw: &Path) -> PathBuf {
    let raw_str = raw.as_os_str().to_string_lossy();
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || raw.file_name().is_none() || raw.is_dir() {
        return raw.join("training_report.json");
    }

    let mut normalized = raw.to_path_buf();
    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a new model by self-play")]
pub struct TrainArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Number of self-play episodes (overrides the config file)
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Optional path for writing the training report as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = args.engine.engine_config()?;
    if let Some(episodes) = args.episodes {
        config = config.with_episodes(episodes);
    }

    let app = App::from_config(config);
    let mut observers: Vec<Box<dyn Observer>> = vec![Box::new(LogObserver::new())];
    if !args.no_progress {
        observers.push(Box::new(ProgressObserver::new()));
    }

    let model_id = app.repository().next_free_id()?;
    print_section(&format!("Training model {model_id}"));
    print_kv("Episodes", &format_number(app.config().training.episodes));
    print_kv("Model directory", &app.config().model_dir.display().to_string());

    let trained = app
        .train_model(model_id, observers)
        .with_context(|| format!("Training model {model_id} failed"))?;
    print_report(&trained.report);

    if let Some(raw) = &args.summary {
        let path = sanitize_report_path(raw);
        trained
            .report
            .save(&path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        print_kv("Report", &path.display().to_string());
    }

    Ok(())
}

fn print_report(report: &TrainingReport) {
    let total = report.tally.total();
    print_section(&format!("Training model {} finished", report.model_id));
    print_kv(
        "Agent 1 wins",
        &format!(
            "{} ({})",
            format_number(report.tally.agent_one),
            format_percent(report.tally.agent_one, total)
        ),
    );
    print_kv(
        "Agent 2 wins",
        &format!(
            "{} ({})",
            format_number(report.tally.agent_two),
            format_percent(report.tally.agent_two, total)
        ),
    );
    print_kv(
        "Ties",
        &format!(
            "{} ({})",
            format_number(report.tally.ties),
            format_percent(report.tally.ties, total)
        ),
    );
    print_kv("Promoted", &report.promoted.to_string());
    print_kv("States learned", &format_number(report.table_size));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_report_path() {
        assert_eq!(
            sanitize_report_path(Path::new("out/report")),
            PathBuf::from("out/report.json")
        );
        assert_eq!(
            sanitize_report_path(Path::new("out/report.JSON")),
            PathBuf::from("out/report.JSON")
        );
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(
            sanitize_report_path(dir.path()),
            dir.path().join("training_report.json")
        );
    }

    #[test]
    fn test_parse_args() {
        let args = TrainArgs::parse_from([
            "train",
            "--episodes",
            "10",
            "--seed",
            "3",
            "--model-dir",
            "m",
            "--no-progress",
        ]);
        assert_eq!(args.episodes, Some(10));
        assert_eq!(args.engine.seed, Some(3));
        assert!(args.no_progress);
    }
}
