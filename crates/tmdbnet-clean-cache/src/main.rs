//! tmdbnet poster cache maintenance
//!
//! Removes posters cached longer ago than `--days`, then evicts least
//! recently viewed posters until the cache fits in `--max-size` megabytes.

mod error;
mod report;

use crate::error::Result;
use chrono::Utc;
use clap::Parser;
use poster_cache::PosterStore;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "tmdbnet-clean-cache")]
#[command(about = "Clean old cached movie posters", version)]
struct Args {
    /// Remove images older than this many days
    #[arg(long, default_value_t = 14)]
    days: u32,

    /// Maximum cache size in MB
    #[arg(long = "max-size", default_value_t = 500)]
    max_size: u64,

    /// Show what would be done without actually removing files
    #[arg(long)]
    dry_run: bool,

    /// Poster cache root
    #[arg(long, env = "CACHE_DIR", default_value = "./media/posters")]
    cache_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::from_default_env().add_directive("tmdbnet_clean_cache=info".parse()?);

    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let args = Args::parse();
    run(&args, &mut std::io::stdout()).await
}

async fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    writeln!(out, "Cleaning image cache older than {} days", args.days)?;
    writeln!(out, "Maximum cache size: {} MB", args.max_size)?;
    if args.dry_run {
        writeln!(out, "DRY RUN - no files will be deleted")?;
    }

    if !tokio::fs::try_exists(&args.cache_dir).await? {
        warn!(cache_dir = ?args.cache_dir, "Poster cache directory does not exist");
        writeln!(out, "Posters directory does not exist")?;
        return Ok(());
    }

    let store = PosterStore::new(args.cache_dir.clone());

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(args.days));
    writeln!(out, "Cutoff date: {}", cutoff.to_rfc3339())?;

    let max_age = Duration::from_secs(u64::from(args.days) * 24 * 60 * 60);
    let expiry = store.expire_older_than(max_age, args.dry_run).await;
    writeln!(out, "Found {} cached images", expiry.scanned)?;
    for line in report::expiry_lines(&expiry) {
        writeln!(out, "{}", line)?;
    }

    if args.dry_run {
        let usage = store.usage().await;
        for line in report::dry_run_size_lines(usage.total_size, args.max_size) {
            writeln!(out, "{}", line)?;
        }
    } else {
        let budget = store
            .enforce_size_budget(report::budget_bytes(args.max_size))
            .await;
        writeln!(out, "{}", report::budget_line(&budget))?;
    }

    writeln!(out, "Cache cleanup completed")?;
    Ok(())
}
