// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

use std::path::PathBuf;

use anyhow::Context;
use bump_selector::host::HostFixture;
use bump_selector::models::config::{SAMPLE_CONFIG_JSON, load_config_value};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Preview the bump selector against a simulated checkout page.
#[derive(Parser, Debug)]
#[command(name = "bump-selector", version, about)]
struct Args {
    /// Bump configuration (JSON). Uses the built-in sample when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Checkout page description (JSON). Uses the demo storefront when omitted.
    #[arg(short, long)]
    page: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // BUMP_SELECTOR_LOG_PATH redirects logs to a file
    if let Ok(path) = std::env::var("BUMP_SELECTOR_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let fixture = match &args.page {
        Some(path) => HostFixture::load(path)?,
        None => HostFixture::sample(),
    };
    let config = match &args.config {
        Some(path) => load_config_value(path)?,
        None => serde_json::from_str(SAMPLE_CONFIG_JSON).context("Built-in sample config is invalid")?,
    };

    bump_selector::app::run(fixture, config, args.config)
        .map_err(|err| anyhow::anyhow!("Preview window failed: {err}"))
}
