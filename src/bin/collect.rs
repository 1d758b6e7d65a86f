#![forbid(unsafe_code)]

//! Command-line front end for the collector: reads video ids or watch URLs,
//! scrapes every page once and writes `video_id,title,date,views` rows for
//! the videos whose three fields were all found.
//!
//! Per-video failures never change the exit code; only configuration and
//! output errors do.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ytstats_collector::config::{SettingsOverrides, resolve_settings};
use ytstats_collector::{Collector, HtmlQuery, HttpFetcher};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Collect title, publish date and view count for YouTube videos"
)]
struct Args {
    /// Video ids or watch URLs
    videos: Vec<String>,

    /// File with one id or URL per line; `#` starts a comment
    #[arg(long)]
    input: Option<PathBuf>,

    /// CSV destination (default: COLLECTOR_OUTPUT or videos.csv)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write a JSON summary of disabled and skipped videos
    #[arg(long)]
    report: Option<PathBuf>,

    /// Pages fetched at once
    #[arg(long)]
    workers: Option<usize>,

    /// Site root the watch URLs are built from
    #[arg(long)]
    site_base: Option<String>,

    /// TOML file overriding the title/published/views selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// Env file with COLLECTOR_* settings
    #[arg(long)]
    env_file: Option<PathBuf>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout; unset or 0 waits forever
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            site_base: self.site_base.clone(),
            output: self.output.clone(),
            workers: self.workers,
            progress_every: None,
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout_secs,
            selectors_path: self.selectors.clone(),
            env_path: self.env_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let mut videos = args.videos.clone();
    if let Some(path) = &args.input {
        videos.extend(read_input_file(path)?);
    }
    if videos.is_empty() {
        bail!("no videos given; pass ids/URLs or --input <file>");
    }

    let settings = resolve_settings(args.overrides()).context("loading settings")?;
    let query = HtmlQuery::new(&settings.selectors()?)?;
    let fetcher = HttpFetcher::new(&settings.user_agent, settings.timeout);

    let mut collector = Collector::new(videos, fetcher, query)
        .with_site_base(settings.site_base.clone())
        .with_workers(settings.workers)
        .with_progress_every(settings.progress_every);
    collector.run();

    for (video_id, reason) in collector.skipped() {
        warn!(video_id, reason, "skipped");
    }
    for video_id in collector.identifiers() {
        if collector.is_disabled(video_id) {
            let fields = collector.failed_fields(video_id).unwrap_or_default();
            warn!(video_id = %video_id, ?fields, "disabled");
        }
    }

    let rows = collector
        .save(&settings.output)
        .with_context(|| format!("writing {}", settings.output.display()))?;
    if let Some(report) = &args.report {
        collector
            .summary()?
            .write_json(report)
            .with_context(|| format!("writing {}", report.display()))?;
    }

    info!(
        rows,
        valid = collector.valid().len(),
        disabled = collector.disabled().len(),
        skipped = collector.skipped().len(),
        site_base = collector.site_base(),
        output = %settings.output.display(),
        "done"
    );
    Ok(())
}

fn read_input_file(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    Ok(parse_input_list(&content))
}

/// One entry per line. Blank lines and `#` comments (whole-line or trailing)
/// are dropped.
fn parse_input_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
