use crate::commands::{print_json, Context};
use crate::error::{aborted, invalid_input};
use crate::platforms;
use crate::util::{clean_keywords, parse_mode};
use anyhow::{anyhow, Context as _, Result};
use clap::{Args, ValueEnum};
use std::path::Path;
use std::thread;
use tracing::info;
use vibebot_config::{AppConfig, MAX_LIMIT};
use vibebot_core::domain::Platform;
use vibebot_scout::{FilterChain, MissionOptions, MissionReport, Orchestrator, ReplyGenerator};
use vibebot_store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Twitter,
    Reddit,
    All,
}

impl PlatformArg {
    fn platforms(self) -> Vec<Platform> {
        match self {
            PlatformArg::Twitter => vec![Platform::Twitter],
            PlatformArg::Reddit => vec![Platform::Reddit],
            PlatformArg::All => vec![Platform::Twitter, Platform::Reddit],
        }
    }
}

#[derive(Debug, Args)]
pub struct ScoutArgs {
    #[arg(required = true)]
    pub keywords: Vec<String>,
    #[arg(long, value_enum, default_value_t = PlatformArg::Twitter)]
    pub platform: PlatformArg,
    #[arg(long)]
    pub limit: Option<usize>,
    /// discover or engage
    #[arg(long)]
    pub mode: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    /// Skip the relevance filters
    #[arg(long)]
    pub no_filter: bool,
}

pub fn scout(ctx: &Context<'_>, args: ScoutArgs) -> Result<()> {
    let keywords = clean_keywords(args.keywords)?;
    let mut options = platforms::mission_options(ctx.config);
    if let Some(limit) = args.limit {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(invalid_input(format!("limit must be within 1..={MAX_LIMIT}")));
        }
        options.limit = limit;
    }
    if let Some(mode) = args.mode.as_deref() {
        options.mode = parse_mode(mode)?;
    }
    options.tag = args
        .tag
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty());

    let filters = if args.no_filter {
        FilterChain::pass_through()
    } else {
        platforms::filter_chain(&ctx.config.filter)?
    };
    let generator = platforms::generator(ctx.config)?;

    let mission = Mission {
        db_path: ctx.db_path,
        config: ctx.config,
        filters: &filters,
        generator: &generator,
        options: &options,
        keywords: &keywords,
    };
    let targets = args.platform.platforms();
    let reports = if targets.len() == 1 {
        vec![mission.run(ctx.store, targets[0])?]
    } else {
        mission.run_parallel(&targets)?
    };

    if ctx.json {
        if reports.len() == 1 {
            print_json(&reports[0])?;
        } else {
            print_json(&reports)?;
        }
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    let aborted_reasons: Vec<String> = reports
        .iter()
        .filter(|report| report.aborted())
        .map(|report| {
            let platform = report
                .platform
                .map(|platform| platform.to_string())
                .unwrap_or_else(|| "mission".to_string());
            format!(
                "{platform}: {}",
                report.abort_reason.as_deref().unwrap_or("unknown reason")
            )
        })
        .collect();
    if aborted_reasons.len() == reports.len() {
        return Err(aborted(aborted_reasons.join("; ")));
    }
    Ok(())
}

/// Everything a mission needs except the platform and store connection.
#[derive(Clone, Copy)]
struct Mission<'a> {
    db_path: &'a Path,
    config: &'a AppConfig,
    filters: &'a FilterChain,
    generator: &'a dyn ReplyGenerator,
    options: &'a MissionOptions,
    keywords: &'a [String],
}

impl Mission<'_> {
    fn run(&self, store: &Store, platform: Platform) -> Result<MissionReport> {
        let session = platforms::session(platform, self.config, self.db_path)?;
        let orchestrator =
            Orchestrator::new(store, self.filters, self.generator, self.options.clone());
        let report = orchestrator
            .run(&session, self.keywords)
            .with_context(|| format!("{platform} mission"))?;
        Ok(report)
    }

    /// One thread per platform, each with its own session and store connection.
    fn run_parallel(&self, targets: &[Platform]) -> Result<Vec<MissionReport>> {
        info!(platforms = targets.len(), "running missions in parallel");
        let db_path = self.db_path;
        thread::scope(|scope| {
            let handles: Vec<_> = targets
                .iter()
                .map(|&platform| {
                    let mission = *self;
                    scope.spawn(move || -> Result<MissionReport> {
                        let store = Store::open(db_path)
                            .with_context(|| format!("open database {}", db_path.display()))?;
                        mission.run(&store, platform)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .map_err(|_| anyhow!("mission thread panicked"))
                        .and_then(|result| result)
                })
                .collect()
        })
    }
}

fn print_report(report: &MissionReport) {
    let platform = report
        .platform
        .map(|platform| platform.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{platform}: {:?} found={} filtered={} engaged={} liked={} skipped={} failed={}",
        report.state,
        report.found,
        report.filtered,
        report.engaged,
        report.liked_only,
        report.skipped,
        report.failed
    );
    if report.unrecorded > 0 {
        println!(
            "  {} replies published but not recorded; see the log",
            report.unrecorded
        );
    }
    if !report.failed_keywords.is_empty() {
        println!("  failed keywords: {}", report.failed_keywords.join(", "));
    }
    if let Some(alert) = report.alert_id {
        println!("  alert recorded: {alert}");
    }
    if let Some(reason) = &report.abort_reason {
        println!("  aborted: {reason}");
    }
}
