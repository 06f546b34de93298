pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

pub use adapters::SourceAdapter;
pub use config::Config;
pub use core::{ActivityLog, LinkEntry, MatchRecord, PageFetcher, ScrapeEngine};
