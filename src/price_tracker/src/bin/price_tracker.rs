use std::num::NonZeroUsize;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use price_tracker::{
    config::TrackerConfig,
    cycle::{CheckCycle, CheckOptions},
    history::HistoryStore,
    providers::{build_dispatcher, build_extractor},
    tracking::TrackingSet,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Product price tracker")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending database migrations.
    Migrate,
    /// Run one check cycle over the tracked products.
    Check {
        /// Check every product in the history store instead of the tracking list.
        #[arg(long)]
        known_products: bool,
        /// Override CHECK_CONCURRENCY.
        #[arg(long, value_name = "N")]
        workers: Option<NonZeroUsize>,
    },
    /// Start tracking a product URL (runs an initial check).
    Add { url: String },
    /// Stop tracking a URL and delete its price history.
    Remove { url: String },
    /// List tracked URLs with their latest known price.
    List,
    /// Print the recorded price history of a product.
    History { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = TrackerConfig::from_env().context("loading configuration")?;
    let store = HistoryStore::open(&cfg.connection_string).context("opening history store")?;

    match cli.cmd {
        Cmd::Migrate => {
            info!(database = %cfg.connection_string, "migrations applied");
        }
        Cmd::Check {
            known_products,
            workers,
        } => {
            let mut options = cfg.check_options();
            if let Some(n) = workers {
                options.workers = n;
            }
            let cycle = build_cycle(&cfg, store.clone(), options)?;

            let urls = if known_products {
                store.list_products().await?.into_iter().map(|p| p.url).collect()
            } else {
                TrackingSet::from_spec(&cfg.products_source, &store).list().await?
            };
            if urls.is_empty() {
                warn!("no products to check; use `add <url>` first");
                return Ok(());
            }
            // an interrupted cycle is an error, so the exit code is non-zero
            let summary = cycle.run_until(urls, ctrl_c()).await?;
            println!("{summary}");
        }
        Cmd::Add { url } => {
            let cycle = build_cycle(&cfg, store.clone(), cfg.check_options())?;
            let set = TrackingSet::from_spec(&cfg.products_source, &store);
            let outcome = set.add(&url, &cycle).await?;
            println!(
                "Tracking {} ({:.2} {}) {}",
                outcome.name, outcome.price, outcome.currency, outcome.url
            );
        }
        Cmd::Remove { url } => {
            let set = TrackingSet::from_spec(&cfg.products_source, &store);
            if set.remove(&url, &store).await? {
                println!("Removed {url}");
            } else {
                println!("{url} was not tracked; any stored history was purged");
            }
        }
        Cmd::List => {
            let set = TrackingSet::from_spec(&cfg.products_source, &store);
            for url in set.list().await? {
                match store.latest_price(&url).await? {
                    Some(p) => println!(
                        "{url}\t{:.2} {}\t{}",
                        p.price,
                        p.currency,
                        p.observed_at.to_rfc3339()
                    ),
                    None => println!("{url}\t-"),
                }
            }
        }
        Cmd::History { url } => {
            let entries = store.price_history(&url).await?;
            if entries.is_empty() {
                bail!("no price history for {url}");
            }
            for e in entries {
                println!("{}\t{:.2} {}\t{}", e.observed_at, e.price, e.currency, e.name);
            }
        }
    }

    Ok(())
}

fn build_cycle(
    cfg: &TrackerConfig,
    store: HistoryStore,
    options: CheckOptions,
) -> Result<CheckCycle> {
    let extractor = build_extractor(cfg.extractor).context("building extractor")?;
    let dispatcher =
        build_dispatcher(cfg.discord_webhook_url.as_deref()).context("building alert dispatcher")?;
    Ok(CheckCycle::new(store, extractor, dispatcher, options))
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
