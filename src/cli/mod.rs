use crate::adapters::default_adapters;
use crate::config::Config;
use crate::core::engine::{Limits, ScrapeEngine};
use crate::core::fetch::HttpFetcher;
use crate::core::store;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "matchscrape")]
#[command(about = "Aggregate sports-replay listings into one deduplicated JSON store")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Store file (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Activity log file (overrides config)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Only run the named sources (repeatable; default: all)
    #[arg(short, long)]
    pub source: Vec<String>,

    /// Maximum candidates per source (overrides config)
    #[arg(short = 'n', long)]
    pub max_items: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        if self.verbose {
            println!("Verbose mode enabled");
        }

        let mut config = Config::load(self.config.as_deref())?;
        if let Some(output) = &self.output {
            config.store_file = output.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(max_items) = self.max_items {
            config.max_candidates_per_source = max_items;
        }

        let fetcher = HttpFetcher::new(
            &config.user_agent,
            config.request_timeout_secs,
            config.retries,
            config.politeness_min_ms,
            config.politeness_max_ms,
        )?;

        let mut engine = ScrapeEngine::new();
        for adapter in default_adapters() {
            if self.source.is_empty() || self.source.iter().any(|s| s == adapter.id()) {
                engine.register_adapter(adapter);
            }
        }
        anyhow::ensure!(engine.adapter_count() > 0, "no sources matched the --source filter");

        let existing = store::load_store(&config.store_file);
        let log = store::load_log(&config.log_file);
        println!("Loaded {} existing records from {}", existing.len(), config.store_file.display());

        let limits = Limits {
            max_candidates: config.max_candidates_per_source,
        };
        let outcome = engine.run(&fetcher, limits, existing, log).await;

        // An unwritable store is the one fatal outcome of a run.
        store::save_store(&config.store_file, &outcome.store)?;
        store::save_log(&config.log_file, &outcome.log)?;

        println!("Records captured this run: {}", outcome.new_records);
        println!("Total records in store: {}", outcome.store.len());
        println!("Saved to {}", config.store_file.display());

        Ok(())
    }
}
