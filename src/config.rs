//! Runtime configuration read from the environment.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::dates::SeasonCalendar;

pub const DEFAULT_SCOREBOARD_URL: &str =
    "https://cdn.nba.com/static/json/liveData/scoreboard/todaysScoreboard_00.json";
pub const DEFAULT_PROPS_BASE_URL: &str = "https://www.bettingpros.com/nba/props/";

/// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub rosters_path: PathBuf,
    pub player_info_path: PathBuf,
    /// Directory holding `<player>_log.csv` game logs
    pub gamelog_dir: PathBuf,
    /// Where merged log + prop files are written
    pub merged_dir: PathBuf,
    /// Root of the `offense/` and `defense/` matchup exports
    pub matchup_dir: PathBuf,
    pub adjusted_dir: PathBuf,
    pub scoreboard_url: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub scrape: ScrapeSettings,
}

/// Knobs for the prop scraper. Defaults reproduce the vendor timings the
/// recorded fixtures were captured with.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub props_base_url: String,
    pub max_attempts: u32,
    /// Wait after navigation on the first historical attempt
    pub historical_wait: Duration,
    /// Added to the historical wait for every further attempt
    pub historical_wait_step: Duration,
    pub today_wait: Duration,
    pub min_avg_minutes: f64,
    pub calendar: SeasonCalendar,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            props_base_url: DEFAULT_PROPS_BASE_URL.to_string(),
            max_attempts: 3,
            historical_wait: Duration::from_secs(10),
            historical_wait_step: Duration::from_secs(3),
            today_wait: Duration::from_secs(5),
            min_avg_minutes: 15.0,
            calendar: SeasonCalendar::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let season = env::var("SEASON").unwrap_or_else(|_| "2024-25".to_string());
        let boundary_month: u32 = env::var("SEASON_BOUNDARY_MONTH")
            .unwrap_or_else(|_| "6".to_string())
            .parse()
            .context("SEASON_BOUNDARY_MONTH must be a month number")?;
        let calendar = SeasonCalendar::from_label(&season)?
            .with_boundary_month(boundary_month)?;

        let scrape = ScrapeSettings {
            props_base_url: env::var("PROPS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PROPS_BASE_URL.to_string()),
            max_attempts: parse_or("MAX_ATTEMPTS", 3),
            historical_wait: Duration::from_secs(parse_or("HISTORICAL_WAIT_SECONDS", 10)),
            historical_wait_step: Duration::from_secs(parse_or("HISTORICAL_WAIT_STEP_SECONDS", 3)),
            today_wait: Duration::from_secs(parse_or("TODAY_WAIT_SECONDS", 5)),
            min_avg_minutes: parse_or("MIN_AVG_MINUTES", 15.0),
            calendar,
        };

        if scrape.max_attempts == 0 {
            return Err(anyhow!("MAX_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            rosters_path: path_or("ROSTERS_PATH", "teams/metadata/rosters/team_rosters.json"),
            player_info_path: path_or("PLAYER_INFO_PATH", "players/player_json/player_info.json"),
            gamelog_dir: path_or("GAMELOG_DIR", "players/gamelogsv2"),
            merged_dir: path_or("MERGED_DIR", "test"),
            matchup_dir: path_or("MATCHUP_DIR", "players/matchups/data"),
            adjusted_dir: path_or("ADJUSTED_DIR", "players/gameMicro"),
            scoreboard_url: env::var("SCOREBOARD_URL")
                .unwrap_or_else(|_| DEFAULT_SCOREBOARD_URL.to_string()),
            webdriver_url: env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:9515".to_string()),
            headless: env::var("HEADLESS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase() != "false",
            scrape,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn path_or(key: &str, default: &str) -> PathBuf {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
        _ => PathBuf::from(default),
    }
}
