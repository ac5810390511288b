use clap::Subcommand;

use super::CliResult;
use crate::context::AppContext;
use crate::view;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Work sessions completed today against the daily goal
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Completions for each of the seven days before today
    Week {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(ctx: &AppContext, action: StatsAction) -> CliResult {
    let collection = ctx.history().load();
    let aggregator = ctx.aggregator();
    let now = ctx.now();

    match action {
        StatsAction::Today { json } => {
            let progress = aggregator.count_today(&collection, now);
            if json {
                println!("{}", serde_json::to_string_pretty(&progress)?);
            } else {
                println!("{}", view::progress_line(&progress));
            }
        }
        StatsAction::Week { json } => {
            let week = aggregator.weekly_breakdown(&collection, now);
            if json {
                println!("{}", serde_json::to_string_pretty(&week)?);
            } else {
                println!("{}", view::week_table(&week));
            }
        }
    }
    Ok(())
}
