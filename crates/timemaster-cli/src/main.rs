use clap::{Parser, Subcommand};
use timemaster_core::Priority;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "timemaster", version, about = "TimeMaster: gamified Pomodoro and task matrix")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive day
    Play {
        /// Seed for reproducible distractions
        #[arg(long)]
        seed: Option<u64>,
        /// Start with an empty board
        #[arg(long)]
        no_samples: bool,
    },
    /// Points a task earns on completion
    Score {
        /// Matrix quadrant (urgent-important, ui, q1, ...)
        #[arg(long, short)]
        priority: Priority,
        /// Completed pomodoros
        #[arg(long, short = 'n')]
        pomodoros: u32,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // Tracing is opt-in via RUST_LOG and writes to stderr.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Play { seed, no_samples } => commands::play::run(seed, no_samples),
        Commands::Score { priority, pomodoros } => commands::score::run(priority, pomodoros),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
