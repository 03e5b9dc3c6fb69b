//! Tic-Tac-Toe TD CLI - train models by self-play and play against them

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tictactoe-td")]
#[command(version, about = "Self-play TD(0) Tic-Tac-Toe", long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model by self-play
    Train(tictactoe_td::cli::commands::train::TrainArgs),

    /// Play against a trained model
    Play(tictactoe_td::cli::commands::play::PlayArgs),

    /// List persisted models
    Models(tictactoe_td::cli::commands::models::ModelsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = tictactoe_td::logging::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Train(args) => tictactoe_td::cli::commands::train::execute(args),
        Commands::Play(args) => tictactoe_td::cli::commands::play::execute(args),
        Commands::Models(args) => tictactoe_td::cli::commands::models::execute(args),
    }
}
