use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sighting_source::HttpFetcher;
use tracing_subscriber::EnvFilter;
use whale_sync::{
    config::SyncConfig,
    db::{connection::connect_sqlite, migrate},
    ingest::{IngestError, Ingestor},
    schedule,
    species::{
        AliasIndex,
        config::load_catalog_path,
        sync::{SyncOptions, sync_species},
    },
};

#[derive(Parser)]
#[command(version, about = "Whale count ingestion CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply embedded migrations.
    Migrate,
    /// Run one ingest and print the summary.
    Ingest {
        /// Source page; defaults to WHALE_FEED_URL.
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
    /// Species catalog commands.
    Species(SpeciesCmd),
    /// Migrate, ingest once, then ingest daily.
    Serve,
}

#[derive(Args)]
struct SpeciesCmd {
    #[command(subcommand)]
    sub: SpeciesSub,
}

#[derive(Subcommand)]
enum SpeciesSub {
    /// Make the DB catalog match a TOML file.
    Sync {
        #[arg(long, value_name = "FILE")]
        file: String,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        prune: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn build_ingestor(cfg: &SyncConfig, index: Arc<AliasIndex>) -> Result<Ingestor> {
    let fetcher = HttpFetcher::new(cfg.fetcher.clone()).context("build http client")?;
    Ok(Ingestor::new(Arc::new(fetcher), index, cfg.feed_url.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let cfg = SyncConfig::from_env()?;

    match cli.cmd {
        Cmd::Migrate => {
            migrate::run_sqlite(&cfg.database_url)?;
            tracing::info!("migrations applied");
        }
        Cmd::Ingest { url } => {
            let mut conn = connect_sqlite(&cfg.database_url)?;
            let index = Arc::new(AliasIndex::new());
            index.refresh(&mut conn)?;
            let ingestor = build_ingestor(&cfg, index)?;

            let url = url.unwrap_or_else(|| cfg.feed_url.clone());
            match ingestor.ingest_url(&mut conn, &url).await {
                Ok(summary) => println!("{summary}"),
                Err(IngestError::Persist { failures, summary, .. }) => {
                    println!("{summary}");
                    for f in &failures {
                        eprintln!("failed: {f}");
                    }
                    anyhow::bail!("{} day(s) failed to persist", failures.len());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Cmd::Species(SpeciesCmd {
            sub: SpeciesSub::Sync { file, dry_run, prune },
        }) => {
            let cat = load_catalog_path(&file)?;
            let mut conn = connect_sqlite(&cfg.database_url)?;

            let diff = sync_species(&mut conn, cat, SyncOptions { dry_run, prune })?;
            println!("{diff}");
            if !dry_run {
                let n = AliasIndex::new().refresh(&mut conn)?;
                tracing::info!(aliases = n, "catalog resolves cleanly");
            }
        }
        Cmd::Serve => {
            migrate::run_sqlite(&cfg.database_url)?;
            let mut conn = connect_sqlite(&cfg.database_url)?;
            let index = Arc::new(AliasIndex::new());
            let n = index.refresh(&mut conn)?;
            tracing::info!(aliases = n, "alias index loaded");

            let ingestor = build_ingestor(&cfg, index)?;
            schedule::run_daily(&ingestor, &mut conn, cfg.schedule).await;
        }
    }

    Ok(())
}
