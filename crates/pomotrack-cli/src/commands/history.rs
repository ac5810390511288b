use clap::Subcommand;
use pomotrack_core::history::startup_prune_cutoff;

use super::CliResult;
use crate::context::AppContext;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded work sessions, oldest first
    List {
        /// Print raw millisecond timestamps as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop sessions from before the seven-day window
    Prune,
    /// Delete all recorded sessions
    Clear,
}

pub fn run(ctx: &AppContext, action: HistoryAction) -> CliResult {
    let history = ctx.history();

    match action {
        HistoryAction::List { json } => {
            let collection = history.load();
            if json {
                println!("{}", serde_json::to_string(&collection)?);
            } else if collection.is_empty() {
                println!("No sessions recorded.");
            } else {
                for entry in &collection {
                    println!("{entry}");
                }
            }
        }
        HistoryAction::Prune => {
            let removed = history.prune_older_than(startup_prune_cutoff(ctx.now()))?;
            println!("removed {removed} session(s)");
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}
