//! The train command run end to end against a temporary model directory.

use clap::Parser;
use tempfile::tempdir;
use tictactoe_td::cli::commands::train::{TrainArgs, execute};

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn test_train_writes_model_and_summary() {
    let tmp = tempdir().unwrap();
    let model_dir = tmp.path().join("models");
    let summary_stem = tmp.path().join("run_overview");

    let args = parse_args([
        "tictactoe-td-train",
        "--episodes",
        "10",
        "--seed",
        "17",
        "--no-progress",
        "--model-dir",
        model_dir.to_str().unwrap(),
        "--summary",
        summary_stem.to_str().unwrap(),
    ]);
    execute(args).expect("training should succeed");

    assert!(model_dir.join("q_table_1.csv").exists());

    let summary_path = summary_stem.with_extension("json");
    let contents = std::fs::read_to_string(&summary_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["model_id"], 1);
    assert_eq!(parsed["episodes"], 10);
    let tally = &parsed["tally"];
    let total = tally["agent_one"].as_u64().unwrap()
        + tally["agent_two"].as_u64().unwrap()
        + tally["ties"].as_u64().unwrap();
    assert_eq!(total, 10);
}

#[test]
fn test_second_run_allocates_next_model_id() {
    let tmp = tempdir().unwrap();
    let model_dir = tmp.path().join("models");
    let dir_arg = model_dir.to_str().unwrap().to_string();

    for seed in ["1", "2"] {
        let args = parse_args([
            "tictactoe-td-train",
            "-e",
            "5",
            "--seed",
            seed,
            "--no-progress",
            "--model-dir",
            dir_arg.as_str(),
        ]);
        execute(args).unwrap();
    }

    assert!(model_dir.join("q_table_1.csv").exists());
    assert!(model_dir.join("q_table_2.csv").exists());
}

#[test]
fn test_config_file_sets_episode_count() {
    let tmp = tempdir().unwrap();
    let model_dir = tmp.path().join("models");
    let config_path = tmp.path().join("engine.json");
    std::fs::write(
        &config_path,
        format!(
            r#"{{ "model_dir": {:?}, "training": {{ "episodes": 7 }} }}"#,
            model_dir.to_str().unwrap()
        ),
    )
    .unwrap();
    let summary_path = tmp.path().join("report.json");

    let args = parse_args([
        "tictactoe-td-train",
        "--config",
        config_path.to_str().unwrap(),
        "--no-progress",
        "--summary",
        summary_path.to_str().unwrap(),
    ]);
    execute(args).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(parsed["episodes"], 7);
    assert!(model_dir.join("q_table_1.csv").exists());
}
