use clap::{Parser, Subcommand};
use pomotrack_core::Config;

mod commands;
mod context;
mod logging;
mod view;

use commands::CliResult;
use context::AppContext;

#[derive(Parser)]
#[command(name = "pomotrack", version, about = "Pomodoro timer with a 7-day history")]
struct Cli {
    /// Use this time (milliseconds since the Unix epoch) instead of the clock
    #[arg(long, global = true, value_name = "EPOCH_MS")]
    at: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Daily and weekly statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Completed session history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    logging::init(&config.logging.filter);

    let at = cli.at;
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Timer { action } => with_context(config, at, |ctx| commands::timer::run(ctx, action)),
        Commands::Stats { action } => with_context(config, at, |ctx| commands::stats::run(ctx, action)),
        Commands::History { action } => {
            with_context(config, at, |ctx| commands::history::run(ctx, action))
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Open storage and run the startup prune before handing over to a command.
fn with_context(
    config: Config,
    at: Option<i64>,
    run: impl FnOnce(&AppContext) -> CliResult,
) -> CliResult {
    let ctx = AppContext::open(config, at)?;
    ctx.prune_on_startup();
    run(&ctx)
}
