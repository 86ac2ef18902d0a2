use crate::commands::{print_json, Context};
use crate::platforms;
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;
use vibebot_scout::{Orchestrator, Scheduler, TickOutcome};

#[derive(Debug, Args)]
pub struct DaemonArgs {
    /// Run a single scheduled mission and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Serialize)]
struct TickDto {
    query: String,
    outcome: &'static str,
    report: Option<vibebot_scout::MissionReport>,
    error: Option<String>,
    next_in_secs: u64,
}

pub fn daemon(ctx: &Context<'_>, args: DaemonArgs) -> Result<()> {
    let settings = &ctx.config.scheduler;
    let filters = platforms::filter_chain(&ctx.config.filter)?;
    let generator = platforms::generator(ctx.config)?;
    let session = platforms::session(settings.platform, ctx.config, ctx.db_path)?;
    let mut options = platforms::mission_options(ctx.config);
    options.mode = settings.mode;
    let orchestrator = Orchestrator::new(ctx.store, &filters, &generator, options);

    let mut scheduler = Scheduler::new(
        settings.queries.clone(),
        settings.query_cooldown,
        settings.rotation_cooldown,
        |query: &str| orchestrator.run(&session, &[query.to_string()]),
    )
    .with_context(|| "start scheduler")?;

    info!(
        platform = %settings.platform,
        mode = %settings.mode,
        queries = settings.queries.len(),
        "scheduler started"
    );

    if !args.once {
        scheduler.run_forever();
    }

    let tick = scheduler.step();
    let (outcome, report, error) = match tick.outcome {
        TickOutcome::Completed(report) => ("completed", Some(report), None),
        TickOutcome::Failed(err) => ("failed", None, Some(err)),
        TickOutcome::Panicked(err) => ("panicked", None, Some(err)),
    };
    if ctx.json {
        return print_json(&TickDto {
            query: tick.query,
            outcome,
            report,
            error,
            next_in_secs: tick.pause.as_secs(),
        });
    }
    println!("{}: {outcome}", tick.query);
    if let Some(report) = report {
        println!(
            "  found={} filtered={} engaged={}",
            report.found, report.filtered, report.engaged
        );
    }
    if let Some(error) = error {
        println!("  error: {error}");
    }
    Ok(())
}
