//! Play command - Interactive game against a trained model

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    Result as CoreResult,
    app::App,
    cli::{
        config::EngineArgs,
        output::{describe_outcome, print_kv, print_section, render_board},
    },
    identifiers::ModelId,
    pipeline::{LogObserver, MatchController, MoveResponse, ProgressObserver},
    ports::Observer,
    tictactoe::{BoardState, GameOutcome, Player},
};

#[derive(Parser, Debug)]
#[command(about = "Play against a trained model")]
pub struct PlayArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Model to play against (defaults to the lowest persisted id)
    #[arg(long, short = 'm')]
    pub model: Option<u32>,

    /// Let the model learn from every finished game
    #[arg(long)]
    pub learn: bool,

    /// Train a first model without asking when none exists
    #[arg(long)]
    pub train_if_missing: bool,
}

/// Prints the board and game announcements to stdout
struct TerminalObserver;

impl Observer for TerminalObserver {
    fn on_board_changed(&mut self, board: &BoardState) -> CoreResult<()> {
        println!("\n{}\n", render_board(board));
        Ok(())
    }

    fn on_game_over(&mut self, outcome: GameOutcome) -> CoreResult<()> {
        println!("Game over: {}", describe_outcome(outcome, Player::X));
        Ok(())
    }

    fn on_model_switched(&mut self, from: ModelId, to: ModelId) -> CoreResult<()> {
        println!("Model {from} lost too often, switched to model {to}");
        Ok(())
    }
}

/// Results of one interactive session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub games: usize,
    pub agent_wins: usize,
    pub human_wins: usize,
    pub ties: usize,
}

impl SessionStats {
    fn record(&mut self, outcome: GameOutcome) {
        self.games += 1;
        match outcome.winner() {
            Some(Player::X) => self.agent_wins += 1,
            Some(Player::O) => self.human_wins += 1,
            None => self.ties += 1,
        }
    }
}

enum Command {
    Move(usize),
    NewGame,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> Command {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Command::Quit,
        "n" | "new" => Command::NewGame,
        other => other
            .parse::<usize>()
            .map(Command::Move)
            .unwrap_or_else(|_| Command::Invalid(other.to_string())),
    }
}

/// Read commands from `input` until it ends or the player quits.
///
/// A finished game is followed by a fresh one automatically.
pub fn run_session<R: BufRead>(
    controller: &mut MatchController,
    mut input: R,
) -> Result<SessionStats> {
    let mut stats = SessionStats::default();
    let mut line = String::new();

    loop {
        print!("Your move (0-8, n = new game, q = quit): ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            Command::Quit => break,
            Command::NewGame => controller.new_game()?,
            Command::Invalid(text) => println!("Unrecognised input '{text}'"),
            Command::Move(position) => match controller.apply_human_move(position)? {
                MoveResponse::Rejected(reason) => println!("Move rejected: {reason}"),
                MoveResponse::AgentMoved { position } => println!("AI plays {position}"),
                MoveResponse::Finished { outcome, .. } => {
                    stats.record(outcome);
                    print_kv("Model", &controller.agent().model_id().to_string());
                    print_kv("Losses", &controller.agent().losses().to_string());
                    println!("\nNew game");
                    controller.new_game()?;
                }
            },
        }
    }

    Ok(stats)
}

fn confirm(question: &str, input: &mut impl BufRead) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let mut config = args.engine.engine_config()?;
    if args.learn {
        config = config.with_learning(true);
    }
    let app = App::from_config(config);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    if !app.has_trained_models()? {
        let train = args.train_if_missing
            || confirm(
                "No trained models found. Would you like to train the first model?",
                &mut input,
            )?;
        if train {
            let observers: Vec<Box<dyn Observer>> =
                vec![Box::new(LogObserver::new()), Box::new(ProgressObserver::new())];
            let trained = app.train_new_model(observers)?;
            println!("Trained model {}", trained.report.model_id);
        }
    }

    let model_id = match args.model {
        Some(raw) => ModelId::new(raw)?,
        None => app
            .model_ids()?
            .first()
            .copied()
            .unwrap_or(ModelId::FIRST),
    };
    let agent = app
        .load_agent(model_id)
        .with_context(|| format!("Failed to load model {model_id}"))?;

    print_section(&format!("Tic-Tac-Toe vs model {model_id}"));
    print_kv("AI", "X");
    print_kv("You", "O");
    print_kv("Learning", if app.config().play.learn_from_games { "on" } else { "off" });

    let observers: Vec<Box<dyn Observer>> = vec![Box::new(TerminalObserver), Box::new(LogObserver::new())];
    let mut controller = app.start_match(agent, observers)?;
    let stats = run_session(&mut controller, &mut input)?;
    controller.close().context("Failed to save the model on exit")?;

    print_section("Session");
    print_kv("Games", &stats.games.to_string());
    print_kv("AI wins", &stats.agent_wins.to_string());
    print_kv("Human wins", &stats.human_wins.to_string());
    print_kv("Ties", &stats.ties.to_string());
    Ok(())
}
