mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::batch::BatchArgs;
use commands::scoring::{NarrativeArgs, ScoreArgs};

/// Deterministic IPO quality and risk scoring
#[derive(Parser)]
#[command(
    name = "iposcore",
    version,
    about = "Deterministic IPO quality and risk scoring",
    long_about = "Scores IPO disclosures on fundamentals, valuation and governance, \
                  combines them into an overall 0-10 score, classifies risk and lists \
                  red flags and positives. Records are read as JSON from a file or stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Scoring policy file (.json, .yaml or .yml); defaults to the built-in policy
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single offering
    Score(ScoreArgs),
    /// Score a JSON array of offerings and summarise the batch
    Batch(BatchArgs),
    /// Score an offering and describe it in plain text
    Narrative(NarrativeArgs),
    /// Print the scoring policy in effect
    Policy,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Log to stderr so that stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "iposcore=debug" } else { "iposcore=info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let policy = match input::file::load_policy(cli.policy.as_deref()) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Score(args) => commands::scoring::run_score(args, &policy),
        Commands::Batch(args) => commands::batch::run_batch(args, &policy),
        Commands::Narrative(args) => commands::scoring::run_narrative(args, &policy),
        Commands::Policy => commands::scoring::run_policy(&policy),
        Commands::Version => {
            println!("iposcore {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
