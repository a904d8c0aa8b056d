//! NBA live scoreboard feed (`todaysScoreboard_00.json`).

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ScoreboardResponse {
    pub scoreboard: Scoreboard,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Scoreboard {
    pub game_date: Option<String>,
    pub league_id: Option<String>,
    pub games: Vec<ScoreboardGame>,
}

/// One entry of the scoreboard `games` array
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreboardGame {
    pub game_id: Option<String>,
    pub game_code: Option<String>,
    pub game_status: Option<i64>,
    pub game_status_text: Option<String>,
    pub period: Option<i64>,
    pub game_clock: Option<String>,
    #[serde(rename = "gameTimeUTC")]
    pub game_time_utc: Option<DateTime<Utc>>,
    pub game_et: Option<String>,
    pub regulation_periods: Option<i64>,
    pub if_necessary: Option<bool>,
    pub series_game_number: Option<String>,
    pub game_label: Option<String>,
    pub game_sub_label: Option<String>,
    pub series_text: Option<String>,
    pub series_conference: Option<String>,
    pub po_round_desc: Option<String>,
    pub game_subtype: Option<String>,
    pub home_team: Option<ScoreboardTeam>,
    pub away_team: Option<ScoreboardTeam>,
    pub game_leaders: Option<GameLeaders>,
    pub pb_odds: Option<PbOdds>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreboardTeam {
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub team_city: Option<String>,
    pub team_tricode: Option<String>,
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    pub score: Option<i64>,
}

/// Per-side statistical leaders; empty before tip-off.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GameLeaders {
    pub home_leaders: Option<Leader>,
    pub away_leaders: Option<Leader>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Leader {
    pub person_id: Option<i64>,
    pub name: Option<String>,
    pub jersey_num: Option<String>,
    pub position: Option<String>,
    pub team_tricode: Option<String>,
    pub player_slug: Option<String>,
    pub points: Option<i64>,
    pub rebounds: Option<i64>,
    pub assists: Option<i64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PbOdds {
    pub team: Option<String>,
    pub odds: Option<f64>,
    pub suspended: Option<i64>,
}

/// Fetch today's games from the live scoreboard endpoint
pub async fn fetch_scoreboard(client: &reqwest::Client, url: &str) -> Result<Scoreboard> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(30))
        .send()
        .await
        .context("Failed to fetch scoreboard")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read scoreboard body")?;

    if !status.is_success() {
        return Err(anyhow!("Scoreboard error (status {}): {}", status, body));
    }

    let parsed: ScoreboardResponse =
        serde_json::from_str(&body).context("Failed to parse scoreboard")?;

    info!(
        "Fetched {} games from scoreboard ({})",
        parsed.scoreboard.games.len(),
        parsed.scoreboard.game_date.as_deref().unwrap_or("unknown date")
    );
    Ok(parsed.scoreboard)
}
