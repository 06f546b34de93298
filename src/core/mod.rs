pub mod builder;
pub mod dates;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod links;
pub mod merge;
pub mod record;
pub mod store;
pub mod structured;

pub use engine::{Limits, RunOutcome, ScrapeEngine};
pub use error::ScrapeError;
pub use fetch::{FetchError, HttpFetcher, PageFetcher};
pub use identity::compute_match_id;
pub use merge::{merge, ActivityLog};
pub use record::{Candidate, DetailPage, LinkEntry, LogEntry, MatchRecord};
