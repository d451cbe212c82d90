// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * sdfinder - Subdomain Discovery CLI
 * Queries every enabled source for the given domains and writes one
 * json line per discovered name
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sdfinder::config::{load_config, SourcesConfig};
use sdfinder::executor::Executor;
use sdfinder::input::{feed_queries, InputSource};
use sdfinder::output::JsonLinesWriter;
use sdfinder::registry::FINDER_REGISTRY;
use sdfinder::sources::DEFAULT_WORKERS;

/// Concurrent multi-source subdomain discovery
#[derive(Parser, Debug)]
#[command(name = "sdfinder")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Find subdomains of the given domains across public sources", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["src", "domains"])))]
struct Cli {
    /// File with one domain per line
    #[arg(long)]
    src: Option<PathBuf>,

    /// Domains separated by ','
    #[arg(short = 'd', value_name = "DOMAINS")]
    domains: Option<String>,

    /// YAML config with per-source tuning; defaults are used when absent
    #[arg(long)]
    cfg: Option<PathBuf>,

    /// Resolve IPv4 addresses and query IP-serving sources too
    #[arg(long)]
    ip: bool,

    /// Output file, one json line per discovered name
    #[arg(long)]
    out: PathBuf,

    /// Limit to these sources, separated by ','; ignored with --cfg
    #[arg(short = 'q', value_name = "SOURCES")]
    queriers: Option<String>,

    /// Workers per source when no config is given
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    worker: usize,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("sdfinder")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn sources_config(cli: &Cli) -> Result<SourcesConfig> {
    match &cli.cfg {
        Some(path) => {
            if cli.queriers.is_some() {
                warn!("-q is ignored when --cfg is given");
            }
            info!(cfg = ?path, "Read config file for custom config");
            load_config(path)
        }
        None => {
            if cli.worker == 0 {
                anyhow::bail!("--worker should > 0");
            }
            info!("Config file not given, using default config for sources");
            let enabled: Vec<String> = cli
                .queriers
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            Ok(SourcesConfig::with_defaults(&enabled, cli.worker, &FINDER_REGISTRY))
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    info!(
        out = ?cli.out,
        resolve_ip = cli.ip,
        src = ?cli.src,
        domains = ?cli.domains,
        "flag"
    );

    let config = sources_config(&cli)?;
    let executor = Executor::from_config(&config, &FINDER_REGISTRY).context("init err")?;

    let source = match (&cli.src, &cli.domains) {
        (Some(path), _) => InputSource::File(path.clone()),
        (None, Some(list)) => InputSource::List(list.clone()),
        (None, None) => anyhow::bail!("domains should be given by --src <file> or -d <domains>"),
    };

    let mut writer = JsonLinesWriter::create(&cli.out).await?;

    let ctx = CancellationToken::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding queries");
            interrupt.cancel();
        }
    });

    let (query_tx, query_rx) = mpsc::channel(1);
    let handle = executor.run(&ctx, query_rx)?;

    let resolve_ip = cli.ip;
    let reader = tokio::spawn(async move {
        if let Err(e) = feed_queries(source, resolve_ip, query_tx).await {
            error!(error = %format!("{:#}", e), "Failed to read input");
        }
    });

    let written = writer.drain(handle.records).await?;
    let stat = handle.stats.await.context("stat task failed")?;
    reader.await.context("input task failed")?;

    info!(
        "[unique] domain: {}, subdomain: {}, rows: {}",
        stat.domains_cnt, stat.sub_domains_cnt, stat.total_output_row
    );
    info!(written = written, out = ?cli.out, "Output written");
    for (name, source_stat) in &stat.finder {
        match serde_json::to_string(source_stat) {
            Ok(json) => info!("{}: {}", name, json),
            Err(e) => warn!(name = %name, error = %e, "encode stat"),
        }
    }

    Ok(())
}
