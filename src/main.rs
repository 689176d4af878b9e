//! `dexscrape` binary — thin wrapper: run the scrape, then export.

use anyhow::{Context, Result};
use clap::Parser;
use dexscrape::{ConnectionDescriptor, HttpFetcher, Pipeline, ScrapeConfig, SqliteSink};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "dexscrape", version, about = "Scrape the national Pokédex into a SQLite table")]
struct Args {
    /// JSON config file; CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Index page URL.
    #[arg(long)]
    index_url: Option<String>,

    /// Base URL for resolving relative detail-page links.
    #[arg(long)]
    base_url: Option<String>,

    /// Scrape at most this many entities.
    #[arg(long)]
    limit: Option<usize>,

    /// Minimum delay between detail-page requests, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// SQLite database file to write.
    #[arg(long, default_value = "pokedex.db")]
    db: PathBuf,

    /// Destination table name.
    #[arg(long, default_value = "master_pokemon")]
    table: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dexscrape=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ScrapeConfig::from_file(path)?,
        None => ScrapeConfig::default(),
    };
    if let Some(index_url) = args.index_url {
        config.index_url = index_url;
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(limit) = args.limit {
        config.max_entities = Some(limit);
    }
    if let Some(delay_ms) = args.delay_ms {
        config.min_delay_ms = delay_ms;
    }

    let fetcher = HttpFetcher::new(&config).context("failed to set up HTTP client")?;
    let mut pipeline = Pipeline::new(config, fetcher);

    let scraped = pipeline.run().await.context("scrape run failed")?.len();
    info!(rows = scraped, "scrape finished");

    let conn = ConnectionDescriptor {
        service: args.db.display().to_string(),
        table_name: args.table,
        ..Default::default()
    };
    let rows = pipeline
        .export(&SqliteSink, &conn)
        .context("export failed")?;
    println!("wrote {rows} rows to {}:{}", conn.service, conn.table_name);

    Ok(())
}
