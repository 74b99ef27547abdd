mod session;

use anyhow::{bail, Context, Result};
use baccarat::{
    parse_labels, simulate, Label, Outcome, Round, RoundStatus, Side, SimulationConfig,
    SimulationResult, WeightTable,
};
use baccarat_drivers::{
    parse_config_from_file, Config, MAX_DECKS, MAX_ITERATIONS, MIN_DECKS, MIN_ITERATIONS,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn, Level};

use session::{format_cards, format_score, format_simulation, format_summary, Session};

const DEFAULT_CONFIG_PATH: &str = "~/.baccarat.yml";

#[derive(Debug, Parser)]
#[command(author, about = "Baccarat round checker and next-round calculator", long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Weight preset from the config file
    #[arg(short, long)]
    preset: Option<String>,

    /// More log output on stderr, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a round and score it
    Evaluate {
        /// Player cards, e.g. "8 A"
        #[arg(long, default_value = "")]
        player: String,
        /// Banker cards, e.g. "9,2"
        #[arg(long, default_value = "")]
        banker: String,
        /// Also simulate the next round from the remaining shoe
        #[arg(long)]
        simulate: bool,
        #[arg(long)]
        decks: Option<u8>,
        #[arg(long)]
        iterations: Option<u32>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enter rounds card by card
    Interactive,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    player_cards: &'a [Label],
    banker_cards: &'a [Label],
    status: &'static str,
    message: &'static str,
    score: i64,
    recommendation: Option<Side>,
    winner: Option<Outcome>,
    simulation: Option<SimulationResult>,
}

fn build_report<'a>(
    round: &'a Round,
    weights: &WeightTable,
    simulation: Option<&SimulationConfig>,
) -> Result<Report<'a>> {
    let status = round.status();
    let simulation = match simulation {
        Some(config) if status.is_valid() => {
            let removed: Vec<Label> = round.all_cards().copied().collect();
            Some(simulate(config, &removed, weights)?)
        }
        Some(_) => {
            warn!("round is not valid and complete, skipping simulation");
            None
        }
        None => None,
    };
    Ok(Report {
        player_cards: round.get_player_cards(),
        banker_cards: round.get_banker_cards(),
        status: match status {
            RoundStatus::Incomplete(_) => "incomplete",
            RoundStatus::Invalid(_) => "invalid",
            RoundStatus::Valid(_) => "valid",
        },
        message: status.message(),
        score: round.score(weights),
        recommendation: round.recommendation(weights),
        winner: round.outcome(),
        simulation,
    })
}

fn print_report(report: &Report, round: &Round, weights: &WeightTable) {
    println!("Status: {} ({})", report.status, report.message);
    if report.status == "valid" {
        println!("{}", format_summary(round, weights));
    } else {
        println!(
            "Player cards: {}\nBanker cards: {}\nScore: {}",
            format_cards(report.player_cards),
            format_cards(report.banker_cards),
            format_score(report.score),
        );
    }
    if let Some(result) = &report.simulation {
        println!("{}", format_simulation(result));
    }
}

/// Resolves the config file. A missing default file means the built-in
/// defaults; a missing file given explicitly is an error.
fn load_config(path: &str) -> Result<Config> {
    if path != DEFAULT_CONFIG_PATH {
        return Ok(parse_config_from_file(path)?);
    }
    let home_dir = home::home_dir().context("cannot find home directory")?;
    let config_file_path: PathBuf = home_dir.join(".baccarat.yml");
    if !config_file_path.exists() {
        warn!(path = %config_file_path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }
    if config_file_path.is_dir() {
        bail!("{} should be a file rather than a directory", config_file_path.display());
    }
    let path = config_file_path
        .to_str()
        .context("config path is not valid UTF-8")?;
    Ok(parse_config_from_file(path)?)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = CommandLineArgs::parse();
    init_tracing(args.verbose);

    let config = load_config(&args.config)?;
    let weights = config.weight_table(args.preset.as_deref())?;
    let mut simulation = config.simulation.to_simulation_config();
    info!(?simulation, preset = ?args.preset, "config loaded");

    match args.command {
        Command::Evaluate {
            player,
            banker,
            simulate,
            decks,
            iterations,
            json,
        } => {
            if let Some(decks) = decks {
                simulation.number_of_decks = decks.clamp(MIN_DECKS, MAX_DECKS);
            }
            if let Some(iterations) = iterations {
                simulation.iterations = iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS);
            }
            let round = Round::from_hands(&parse_labels(&player)?, &parse_labels(&banker)?)?;
            let report = build_report(&round, &weights, simulate.then_some(&simulation))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, &round, &weights);
            }
        }
        Command::Interactive => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            let mut session = Session::new(weights, simulation);
            session.run(stdin.lock(), &mut stdout)?;
            info!(rounds = session.get_history().len(), "session ended");
        }
    }
    Ok(())
}
