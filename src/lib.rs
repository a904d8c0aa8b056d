//! NBA player prop lines and possession-adjusted matchup metrics.
//!
//! - [`league`] builds today's games from the roster fixtures and the live
//!   scoreboard.
//! - [`scraper`] pulls historical and same-day prop lines from bettingpros
//!   through a WebDriver browser session.
//! - [`merge`] joins scraped lines onto a player's game log.
//! - [`possessions`] rescales matchup exports to full-game possessions.

pub mod browser;
pub mod config;
pub mod dates;
pub mod error;
pub mod fixtures;
pub mod league;
pub mod merge;
pub mod page;
pub mod possessions;
pub mod scoreboard;
pub mod scraper;
pub mod table;

pub use config::Config;
pub use error::{Fetch, ScrapeError};
