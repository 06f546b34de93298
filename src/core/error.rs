use crate::core::fetch::FetchError;
use thiserror::Error;

/// Failure taxonomy for one candidate or one source.
///
/// None of these abort a run: fetch and parse failures skip the candidate
/// (or yield zero candidates for the source), and `ZeroLinks` is the soft
/// "nothing playable here" signal.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("parse failure: {0}")]
    Parse(String),

    #[error("no playable links found")]
    ZeroLinks,
}
