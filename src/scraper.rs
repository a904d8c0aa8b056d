//! Prop-line scraping from bettingpros.com player pages.
//!
//! Every fetch is best effort: browser or markup failures are logged and come
//! back as [`Fetch::Failed`] so one player never aborts a batch.

use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::browser::Browser;
use crate::config::ScrapeSettings;
use crate::dates::GAME_DATE;
use crate::error::{Fetch, ScrapeError, ODDS_NOT_FOUND};
use crate::league::League;
use crate::page;
use crate::table::Frame;

/// Vendor column carrying the historical line
pub const PROP_LINE: &str = "Prop Line";

/// Player names the vendor spells differently from the NBA feeds
const NAME_CORRECTIONS: &[(&str, &str)] = &[("Nic Claxton", "Nicolas Claxton")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Points,
    Assists,
    Rebounds,
    PointsAssistsRebounds,
}

impl Stat {
    pub const ALL: [Stat; 4] = [
        Stat::Points,
        Stat::Assists,
        Stat::Rebounds,
        Stat::PointsAssistsRebounds,
    ];

    /// URL keyword, also the prefix of the `<stat>_line` column
    pub fn slug(&self) -> &'static str {
        match self {
            Stat::Points => "points",
            Stat::Assists => "assists",
            Stat::Rebounds => "rebounds",
            Stat::PointsAssistsRebounds => "points-assists-rebounds",
        }
    }

    pub fn line_column(&self) -> String {
        format!("{}_line", self.slug())
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

pub fn normalize_player_name(name: &str) -> &str {
    NAME_CORRECTIONS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// `"Nic Claxton"` → `"nicolas-claxton"`
pub fn player_slug(name: &str) -> String {
    normalize_player_name(name).to_lowercase().replace(' ', "-")
}

/// Plain over/under values only: spreads and moneylines carry a sign.
pub fn is_valid_prop_format(prop: &str) -> bool {
    !prop.contains('+') && !prop.contains('-') && prop != ODDS_NOT_FOUND
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropQuote {
    pub player: String,
    pub stat: Stat,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidProp {
    pub player: String,
    pub stat: Stat,
    pub outcome: Fetch<String>,
}

/// Result of a same-day run. Rejected lines are kept for auditing.
#[derive(Debug, Clone, Default)]
pub struct TodayReport {
    pub valid: Vec<PropQuote>,
    pub invalid: Vec<InvalidProp>,
}

pub struct Scraper<B: Browser> {
    browser: B,
    settings: ScrapeSettings,
}

impl<B: Browser> Scraper<B> {
    pub fn new(browser: B, settings: ScrapeSettings) -> Self {
        Self { browser, settings }
    }

    pub fn player_stat_url(&self, player: &str, stat: Stat) -> String {
        format!("{}{}/{}/", self.settings.props_base_url, player_slug(player), stat.slug())
    }

    /// Wait after navigating on a given (zero-based) attempt
    pub fn historical_wait(&self, attempt: u32) -> Duration {
        self.settings.historical_wait + self.settings.historical_wait_step * attempt
    }

    /// Historical prop table for one player/stat page, with retries
    pub async fn fetch_historical_odds(&mut self, url: &str) -> Fetch<Frame> {
        match self.try_fetch_historical(url).await {
            Ok(Some(frame)) => Fetch::Found(frame),
            Ok(None) => {
                warn!(
                    "No table with '{}' column found after {} attempts: {}",
                    page::MATCHUP_HEADER,
                    self.settings.max_attempts,
                    url
                );
                Fetch::NotFound
            }
            Err(e) => {
                error!("An error occurred fetching {}: {}. Probably a player name mismatch.", url, e);
                Fetch::Failed(e.to_string())
            }
        }
    }

    async fn try_fetch_historical(&mut self, url: &str) -> Result<Option<Frame>, ScrapeError> {
        let attempts = self.settings.max_attempts;

        for attempt in 0..attempts {
            self.browser.navigate(url).await?;
            tokio::time::sleep(self.historical_wait(attempt)).await;

            let html = self.browser.page_source().await?;
            if let Some(mut frame) = page::find_matchup_table(&html)? {
                self.settings.calendar.normalize_date_column(&mut frame);
                return Ok(Some(frame));
            }

            if attempt + 1 < attempts {
                info!("Attempt {} failed. Retrying with longer wait...", attempt + 1);
            }
        }

        Ok(None)
    }

    /// One row per game date with a `<stat>_line` column for every stat the
    /// vendor had a table for.
    pub async fn scrape_historical(&mut self, player: &str) -> Result<Frame, ScrapeError> {
        let mut frames = Vec::new();

        for stat in Stat::ALL {
            let url = self.player_stat_url(player, stat);
            info!("Scraping URL: {}", url);

            match self.fetch_historical_odds(&url).await {
                Fetch::Found(table) => match table.select(&[GAME_DATE, PROP_LINE]) {
                    Ok(mut lines) => {
                        lines.rename_column(PROP_LINE, &stat.line_column());
                        frames.push(lines);
                    }
                    Err(e) => warn!("{} - {} table is unusable: {}", player, stat, e),
                },
                other => info!("{} - {} data not found: {}", player, stat, other.describe()),
            }
        }

        if frames.is_empty() {
            return Err(ScrapeError::NoData {
                player: player.to_string(),
            });
        }

        Frame::outer_join(GAME_DATE, &frames).map_err(|e| ScrapeError::Parse(e.to_string()))
    }

    /// Current line for one player/stat page. Single attempt.
    pub async fn fetch_todays_odds(&mut self, url: &str) -> Fetch<String> {
        let result = async {
            self.browser.navigate(url).await?;
            tokio::time::sleep(self.settings.today_wait).await;
            let html = self.browser.page_source().await?;
            page::find_odds_line(&html)
        }
        .await;

        match result {
            Ok(Some(line)) => Fetch::Found(line),
            Ok(None) => Fetch::NotFound,
            Err(e) => {
                error!("An error occurred fetching {}: {}", url, e);
                Fetch::Failed(e.to_string())
            }
        }
    }

    /// Points lines for every eligible player in today's games
    pub async fn scrape_today(&mut self, league: &League) -> TodayReport {
        let stat = Stat::Points;
        let participants = league.eligible_players(self.settings.min_avg_minutes);
        info!("{} players eligible for same-day lines", participants.len());

        let mut report = TodayReport::default();
        for player in participants {
            let url = self.player_stat_url(&player.name, stat);

            match self.fetch_todays_odds(&url).await {
                Fetch::Found(text) if is_valid_prop_format(&text) => {
                    let line = text.strip_prefix("O ").unwrap_or(&text).to_string();
                    info!("{} {}: {}", player.name, stat, line);
                    report.valid.push(PropQuote {
                        player: player.name.clone(),
                        stat,
                        line,
                    });
                }
                outcome => report.invalid.push(InvalidProp {
                    player: player.name.clone(),
                    stat,
                    outcome,
                }),
            }
        }

        info!(
            "Same-day scrape finished: {} valid, {} invalid",
            report.valid.len(),
            report.invalid.len()
        );
        report
    }

    /// Release the browser session
    pub async fn close(self) {
        if let Err(e) = self.browser.quit().await {
            warn!("Failed to release browser session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league;
    use crate::page::tests::HISTORY_PAGE;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serves canned pages per URL; an exhausted queue renders an empty page.
    #[derive(Default)]
    struct ScriptedBrowser {
        pages: HashMap<String, VecDeque<String>>,
        broken: HashSet<String>,
        current: String,
        visits: Arc<Mutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
    }

    impl ScriptedBrowser {
        fn serve(mut self, url: &str, pages: &[&str]) -> Self {
            self.pages
                .insert(url.to_string(), pages.iter().map(|p| p.to_string()).collect());
            self
        }

        fn break_url(mut self, url: &str) -> Self {
            self.broken.insert(url.to_string());
            self
        }
    }

    #[async_trait]
    impl Browser for ScriptedBrowser {
        async fn navigate(&mut self, url: &str) -> Result<(), ScrapeError> {
            self.visits.lock().unwrap().push(url.to_string());
            if self.broken.contains(url) {
                return Err(ScrapeError::Browser("net::ERR_CONNECTION_RESET".to_string()));
            }
            self.current = url.to_string();
            Ok(())
        }

        async fn page_source(&mut self) -> Result<String, ScrapeError> {
            Ok(self
                .pages
                .get_mut(&self.current)
                .and_then(|q| q.pop_front())
                .unwrap_or_else(|| "<html><body></body></html>".to_string()))
        }

        async fn quit(self) -> Result<(), ScrapeError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn instant() -> ScrapeSettings {
        ScrapeSettings {
            props_base_url: "https://props.test/nba/props/".to_string(),
            historical_wait: Duration::ZERO,
            historical_wait_step: Duration::ZERO,
            today_wait: Duration::ZERO,
            ..ScrapeSettings::default()
        }
    }

    fn url(player: &str, stat: &str) -> String {
        format!("https://props.test/nba/props/{}/{}/", player, stat)
    }

    fn odds_page(text: &str) -> String {
        format!(r#"<div><span class="typography odds-cell__line">{}</span></div>"#, text)
    }

    #[test]
    fn builds_vendor_urls() {
        let scraper = Scraper::new(ScriptedBrowser::default(), ScrapeSettings::default());
        assert_eq!(
            scraper.player_stat_url("Nic Claxton", Stat::Points),
            "https://www.bettingpros.com/nba/props/nicolas-claxton/points/"
        );
        assert_eq!(
            scraper.player_stat_url("Coby White", Stat::PointsAssistsRebounds),
            "https://www.bettingpros.com/nba/props/coby-white/points-assists-rebounds/"
        );
    }

    #[test]
    fn historical_wait_grows_linearly() {
        let scraper = Scraper::new(ScriptedBrowser::default(), ScrapeSettings::default());
        assert_eq!(scraper.historical_wait(0), Duration::from_secs(10));
        assert_eq!(scraper.historical_wait(1), Duration::from_secs(13));
        assert_eq!(scraper.historical_wait(2), Duration::from_secs(16));
    }

    #[test]
    fn prop_format_rules() {
        assert!(is_valid_prop_format("O 24.5"));
        assert!(!is_valid_prop_format("+150"));
        assert!(!is_valid_prop_format("-3.5"));
        assert!(!is_valid_prop_format("Odds not found"));
    }

    #[tokio::test]
    async fn retries_until_matchup_table_renders() {
        let target = url("coby-white", "points");
        let browser = ScriptedBrowser::default().serve(&target, &["<p>loading</p>", HISTORY_PAGE]);
        let visits = browser.visits.clone();
        let mut scraper = Scraper::new(browser, instant());

        let frame = scraper.fetch_historical_odds(&target).await.found().unwrap();
        assert_eq!(visits.lock().unwrap().len(), 2);
        assert_eq!(frame.column(GAME_DATE).unwrap(), vec!["DEC 05, 2024", "JAN 08, 2025"]);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let target = url("coby-white", "points");
        let browser = ScriptedBrowser::default();
        let visits = browser.visits.clone();
        let mut scraper = Scraper::new(browser, instant());

        assert_eq!(scraper.fetch_historical_odds(&target).await, Fetch::NotFound);
        assert_eq!(visits.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn browser_errors_become_failed() {
        let target = url("coby-white", "points");
        let browser = ScriptedBrowser::default().break_url(&target);
        let visits = browser.visits.clone();
        let mut scraper = Scraper::new(browser, instant());

        assert!(matches!(scraper.fetch_historical_odds(&target).await, Fetch::Failed(_)));
        assert!(matches!(scraper.fetch_todays_odds(&target).await, Fetch::Failed(_)));
        // No retry once the browser itself errors
        assert_eq!(visits.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn combines_stats_that_succeeded() {
        let rebounds_page = r#"<table>
            <thead><tr><th>Date</th><th>Matchup</th><th>Prop Line</th></tr></thead>
            <tbody><tr><td>1/8</td><td>vs MIA</td><td>4.5</td></tr>
                   <tr><td>1/10</td><td>@ NYK</td><td>5.5</td></tr></tbody></table>"#;
        let browser = ScriptedBrowser::default()
            .serve(&url("coby-white", "points"), &[HISTORY_PAGE])
            .serve(&url("coby-white", "rebounds"), &[rebounds_page])
            .break_url(&url("coby-white", "points-assists-rebounds"));
        let mut scraper = Scraper::new(browser, instant());

        let frame = scraper.scrape_historical("Coby White").await.unwrap();
        assert_eq!(frame.columns(), &["GAME_DATE", "points_line", "rebounds_line"]);
        assert_eq!(frame.rows()[0], vec!["DEC 05, 2024", "24.5", ""]);
        assert_eq!(frame.rows()[1], vec!["JAN 08, 2025", "22.5", "4.5"]);
        assert_eq!(frame.rows()[2], vec!["JAN 10, 2025", "", "5.5"]);
    }

    #[tokio::test]
    async fn table_without_prop_line_is_left_out() {
        let assists_page = r#"<table>
            <thead><tr><th>Date</th><th>Matchup</th><th>Result</th></tr></thead>
            <tbody><tr><td>12/5</td><td>@ CHI</td><td>O</td></tr></tbody></table>"#;
        let browser = ScriptedBrowser::default()
            .serve(&url("coby-white", "points"), &[HISTORY_PAGE])
            .serve(&url("coby-white", "assists"), &[assists_page]);
        let mut scraper = Scraper::new(browser, instant());

        let frame = scraper.scrape_historical("Coby White").await.unwrap();
        assert_eq!(frame.columns(), &["GAME_DATE", "points_line"]);
        assert_eq!(frame.column("points_line").unwrap(), vec!["24.5", "22.5"]);
    }

    #[tokio::test]
    async fn no_stat_data_is_reported() {
        let mut scraper = Scraper::new(ScriptedBrowser::default(), instant());
        let err = scraper.scrape_historical("Nobody Atall").await.unwrap_err();
        assert!(matches!(err, ScrapeError::NoData { ref player } if player == "Nobody Atall"));
    }

    #[tokio::test]
    async fn today_keeps_plain_lines_and_audits_the_rest() {
        let browser = ScriptedBrowser::default()
            .serve(&url("coby-white", "points"), &[odds_page("O 24.5").as_str()])
            .serve(&url("nicolas-claxton", "points"), &[odds_page("+150").as_str()]);
        let closed = browser.closed.clone();
        let visits = browser.visits.clone();
        let mut scraper = Scraper::new(browser, instant());

        let league = League::new(league::tests::fixtures(), league::tests::scoreboard_games());
        let report = scraper.scrape_today(&league).await;
        scraper.close().await;

        assert_eq!(
            report.valid,
            vec![PropQuote {
                player: "Coby White".to_string(),
                stat: Stat::Points,
                line: "24.5".to_string(),
            }]
        );
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].player, "Nic Claxton");
        assert_eq!(report.invalid[0].outcome, Fetch::Found("+150".to_string()));
        // Ineligible players are never visited
        assert_eq!(visits.lock().unwrap().len(), 2);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_odds_element_is_not_found() {
        let mut scraper = Scraper::new(ScriptedBrowser::default(), instant());
        let outcome = tokio_test::block_on(scraper.fetch_todays_odds(&url("coby-white", "points")));
        assert_eq!(outcome, Fetch::NotFound);
    }
}
