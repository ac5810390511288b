use std::io::Write;

use clap::Subcommand;
use pomotrack_core::{Event, ManualTicker, TimerEngine, TimerStatus, TokioTicker};

use super::CliResult;
use crate::context::AppContext;
use crate::view;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work session, or resume a paused one
    Start,
    /// Pause the running phase
    Pause,
    /// Stop and reset to a fresh work session
    Stop,
    /// Print current timer state as JSON
    Status,
    /// Show a live countdown until Ctrl-C (incompatible with --at)
    Watch {
        /// Pause the timer when exiting
        #[arg(long)]
        pause_on_exit: bool,
    },
}

pub fn run(ctx: &AppContext, action: TimerAction) -> CliResult {
    match action {
        TimerAction::Start => one_shot(ctx, TimerEngine::start),
        TimerAction::Pause => one_shot(ctx, TimerEngine::pause),
        TimerAction::Stop => one_shot(ctx, TimerEngine::stop),
        TimerAction::Status => one_shot(ctx, |_| None),
        TimerAction::Watch { pause_on_exit } => watch(ctx, pause_on_exit),
    }
}

/// Apply missed rollovers, run `command`, print what happened and persist.
///
/// Prints the command's event, or a snapshot when the command was a no-op.
fn one_shot(ctx: &AppContext, command: impl FnOnce(&mut TimerEngine) -> Option<Event>) -> CliResult {
    let mut engine = ctx.load_engine(ManualTicker::new());

    for event in engine.catch_up() {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    let event = command(&mut engine).unwrap_or_else(|| engine.snapshot());
    println!("{}", serde_json::to_string_pretty(&event)?);

    ctx.save_engine(&engine)
}

fn watch(ctx: &AppContext, pause_on_exit: bool) -> CliResult {
    // A pinned clock never advances, so the countdown would never move.
    if ctx.clock_is_pinned() {
        return Err("--at cannot be used with `timer watch`".into());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (ticker, mut ticks) = TokioTicker::new();
        let mut engine = ctx.load_engine(ticker);
        let mut out = std::io::stdout();

        for event in engine.catch_up() {
            print_completion(&event);
        }
        if engine.status() != TimerStatus::Running {
            engine.start();
        }
        render(&mut out, &engine, engine.remaining_display())?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                Some(handle) = ticks.recv() => {
                    if let Some(outcome) = engine.on_scheduled_tick(handle) {
                        if let Some(event) = &outcome.completed {
                            print_completion(event);
                        }
                        render(&mut out, &engine, outcome.display)?;
                    }
                }
                _ = &mut ctrl_c => break,
                else => break,
            }
        }

        if pause_on_exit {
            engine.pause();
            render(&mut out, &engine, engine.remaining_display())?;
        }
        println!();
        ctx.save_engine(&engine)?;
        tracing::debug!(status = ?engine.status(), "watch finished");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn render(
    out: &mut impl Write,
    engine: &TimerEngine,
    display: pomotrack_core::RemainingDisplay,
) -> std::io::Result<()> {
    let line = view::countdown_line(engine.phase(), engine.status(), display);
    write!(out, "\r{line:<32}")?;
    out.flush()
}

fn print_completion(event: &Event) {
    if let Event::PhaseCompleted { finished, next, .. } = event {
        println!("\r{} finished, {} begins{:<8}", finished.label(), next.label(), "");
    }
}
