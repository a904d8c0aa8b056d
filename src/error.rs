use thiserror::Error;

/// Marker the vendor pages never contain; kept for logs and CSV audits.
pub const ODDS_NOT_FOUND: &str = "Odds not found";
pub const FETCH_FAILED: &str = "Failed to fetch data";

/// Outcome of one best-effort page fetch. Failures never escape the scraper;
/// they come back as one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Found(T),
    /// The page rendered but the expected table or element was absent
    NotFound,
    /// Navigation, browser or parsing error
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Fetch::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Fetch::Found(_))
    }

    /// Short reason for log lines. `Found` renders as an empty string.
    pub fn describe(&self) -> &str {
        match self {
            Fetch::Found(_) => "",
            Fetch::NotFound => ODDS_NOT_FOUND,
            Fetch::Failed(_) => FETCH_FAILED,
        }
    }
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("No valid data found for any stat of {player}")]
    NoData { player: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Page parse error: {0}")]
    Parse(String),
}
