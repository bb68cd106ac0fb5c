pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod event;
pub mod filter;
pub mod grid;
pub mod index;
pub mod render;
pub mod store;

use std::ffi::OsString;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting hirecal CLI");

    let mut cfg = config::Config::load(cli.config.as_deref())?;
    cfg.apply_overrides(
        cli.rc_overrides
            .into_iter()
            .map(|kv| (kv.key, kv.value)),
    );

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let store = store::EventStore::open(&data_dir)
        .with_context(|| format!("failed to open event store at {}", data_dir.display()))?;

    let mut renderer = render::Renderer::new(&cfg)?;

    // The one place the clock is read; everything below takes `today`
    // explicitly so the grid and index stay pure.
    let today = calendar::CalendarDate::from_naive(Local::now().date_naive());
    debug!(today = %today, "resolved today");

    let command = cli
        .command
        .unwrap_or(cli::Command::Show { month: None });

    commands::dispatch(&store, &mut renderer, command, today)?;

    info!("done");
    Ok(())
}
