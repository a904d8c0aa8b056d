//! Today's games as an object graph: League → Game → Team → Player.
//!
//! Everything here is built from the fixtures and a single scoreboard
//! snapshot. Lookups that miss degrade to empty values instead of failing.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Config;
use crate::fixtures::{Fixtures, PlayerInfo};
use crate::scoreboard::{self, GameLeaders, PbOdds, ScoreboardGame};

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub info: PlayerInfo,
    /// Free-form per-player values attached after scraping
    pub props: HashMap<String, String>,
}

impl Player {
    pub fn new(name: &str, fixtures: &Fixtures) -> Self {
        Self {
            name: name.to_string(),
            info: fixtures.player_info(name).cloned().unwrap_or_default(),
            props: HashMap::new(),
        }
    }

    pub fn average_minutes(&self) -> Option<f64> {
        self.info.gamelogs.as_ref().and_then(|g| g.avg_min)
    }

    /// Has game-log data and averages at least `min_minutes`.
    pub fn meets_minutes(&self, min_minutes: f64) -> bool {
        matches!(self.average_minutes(), Some(avg) if avg >= min_minutes)
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub abbr: String,
    /// Players in roster-fixture order
    pub players: Vec<Player>,
}

impl Team {
    pub fn from_roster(abbr: &str, fixtures: &Fixtures) -> Self {
        let players = fixtures
            .roster(abbr)
            .map(|roster| roster.keys().map(|name| Player::new(name, fixtures)).collect())
            .unwrap_or_default();
        Self {
            abbr: abbr.to_string(),
            players,
        }
    }

    pub fn player_names(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Game {
    pub game_id: Option<String>,
    pub game_code: Option<String>,
    pub game_status: Option<i64>,
    pub game_status_text: Option<String>,
    pub period: Option<i64>,
    pub game_clock: Option<String>,
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
    pub home_team_id: Option<i64>,
    pub away_team_id: Option<i64>,
    pub home: Option<Team>,
    pub away: Option<Team>,
    pub leaders: Option<GameLeaders>,
    pub pb_odds: Option<PbOdds>,
}

impl Game {
    pub fn from_scoreboard(entry: ScoreboardGame, fixtures: &Fixtures) -> Self {
        let build_team = |tricode: Option<&String>| {
            Team::from_roster(tricode.map(String::as_str).unwrap_or_default(), fixtures)
        };

        let home = entry.home_team.as_ref().map(|t| build_team(t.team_tricode.as_ref()));
        let away = entry.away_team.as_ref().map(|t| build_team(t.team_tricode.as_ref()));

        Self {
            home_team_id: entry.home_team.as_ref().and_then(|t| t.team_id),
            away_team_id: entry.away_team.as_ref().and_then(|t| t.team_id),
            home,
            away,
            game_id: entry.game_id,
            game_code: entry.game_code,
            game_status: entry.game_status,
            game_status_text: entry.game_status_text,
            period: entry.period,
            game_clock: entry.game_clock,
            game_time_utc: entry.game_time_utc,
            game_et: entry.game_et,
            regulation_periods: entry.regulation_periods,
            if_necessary: entry.if_necessary,
            series_game_number: entry.series_game_number,
            game_label: entry.game_label,
            game_sub_label: entry.game_sub_label,
            series_text: entry.series_text,
            series_conference: entry.series_conference,
            po_round_desc: entry.po_round_desc,
            game_subtype: entry.game_subtype,
            leaders: entry.game_leaders,
            pb_odds: entry.pb_odds,
        }
    }

    /// Home roster first, then away.
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.home.iter().chain(self.away.iter())
    }

    /// `"BKN@CHI  8:00 pm ET"`
    pub fn matchup_label(&self) -> String {
        let abbr = |t: &Option<Team>| t.as_ref().map(|t| t.abbr.clone()).unwrap_or_default();
        format!(
            "{}@{}  {}",
            abbr(&self.away),
            abbr(&self.home),
            self.game_status_text.as_deref().unwrap_or_default()
        )
    }

    /// Away and home rosters side by side, shorter side padded with blanks.
    pub fn render_rosters(&self) -> String {
        let away = roster_names(&self.away);
        let home = roster_names(&self.home);

        let rows: Vec<RosterRow> = (0..away.len().max(home.len()))
            .map(|i| RosterRow {
                away: away.get(i).copied().unwrap_or_default().to_string(),
                home: home.get(i).copied().unwrap_or_default().to_string(),
            })
            .collect();

        Table::new(rows)
            .with(Style::blank())
            .to_string()
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Tabled)]
struct RosterRow {
    #[tabled(rename = "Away Players")]
    away: String,
    #[tabled(rename = "Home Players")]
    home: String,
}

fn roster_names(team: &Option<Team>) -> Vec<&str> {
    team.as_ref().map(Team::player_names).unwrap_or_default()
}

/// Today's slate, keyed by game code
#[derive(Debug, Clone)]
pub struct League {
    fixtures: Fixtures,
    games: Vec<Game>,
}

impl League {
    pub fn new(fixtures: Fixtures, entries: Vec<ScoreboardGame>) -> Self {
        let mut games: Vec<Game> = Vec::with_capacity(entries.len());
        for entry in entries {
            let game = Game::from_scoreboard(entry, &fixtures);
            // Same code twice in one snapshot: the later entry wins
            match games.iter_mut().find(|g| g.game_code == game.game_code) {
                Some(existing) => *existing = game,
                None => games.push(game),
            }
        }
        Self { fixtures, games }
    }

    /// Load fixtures and fetch the live scoreboard
    pub async fn today(config: &Config, client: &reqwest::Client) -> Result<Self> {
        let fixtures = Fixtures::load(&config.rosters_path, &config.player_info_path)?;
        let board = scoreboard::fetch_scoreboard(client, &config.scoreboard_url).await?;
        Ok(Self::new(fixtures, board.games))
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, code: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.game_code.as_deref() == Some(code))
    }

    pub fn player_info(&self, name: &str) -> Option<&PlayerInfo> {
        self.fixtures.player_info(name)
    }

    /// Players on today's rosters who log enough minutes to carry prop lines.
    pub fn eligible_players(&self, min_minutes: f64) -> Vec<&Player> {
        self.games
            .iter()
            .flat_map(|g| g.teams())
            .flat_map(|t| t.players.iter())
            .filter(|p| p.meets_minutes(min_minutes))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn fixtures() -> Fixtures {
        let rosters = serde_json::from_value(json!({
            "BKN": {"Nic Claxton": {}, "Cam Thomas": {}, "Dariq Whitehead": {}},
            "CHI": {"Coby White": {}, "Zach LaVine": {}}
        }))
        .unwrap();
        let players = serde_json::from_value(json!({
            "Nic Claxton": {"gamelogs": {"AVG_MIN": 15.0}},
            "Cam Thomas": {"gamelogs": {"AVG_MIN": 14.99}},
            "Coby White": {"gamelogs": {"AVG_MIN": 36.2}},
            "Zach LaVine": {"position": "G"}
        }))
        .unwrap();
        Fixtures::new(rosters, players)
    }

    pub(crate) fn scoreboard_games() -> Vec<ScoreboardGame> {
        serde_json::from_value(json!([{
            "gameId": "0022400345",
            "gameCode": "20241205/BKNCHI",
            "gameStatusText": "8:00 pm ET",
            "homeTeam": {"teamId": 1610612741, "teamTricode": "CHI"},
            "awayTeam": {"teamId": 1610612751, "teamTricode": "BKN"}
        }]))
        .unwrap()
    }

    #[test]
    fn builds_games_from_scoreboard() {
        let league = League::new(fixtures(), scoreboard_games());
        let game = league.game("20241205/BKNCHI").unwrap();

        assert_eq!(game.home.as_ref().unwrap().player_names(), ["Coby White", "Zach LaVine"]);
        assert_eq!(
            game.away.as_ref().unwrap().player_names(),
            ["Nic Claxton", "Cam Thomas", "Dariq Whitehead"]
        );
        assert_eq!(game.home_team_id, Some(1610612741));
        assert!(game.leaders.is_none());
        assert_eq!(game.matchup_label(), "BKN@CHI  8:00 pm ET");
    }

    #[test]
    fn missing_lookups_degrade_to_empty() {
        let fx = fixtures();
        assert!(Team::from_roster("SEA", &fx).players.is_empty());

        let whitehead = Player::new("Dariq Whitehead", &fx);
        assert_eq!(whitehead.info, PlayerInfo::default());
        assert!(!whitehead.meets_minutes(0.0));

        let entries: Vec<ScoreboardGame> = serde_json::from_value(json!([{"gameCode": "X"}])).unwrap();
        let league = League::new(fx, entries);
        assert!(league.game("X").unwrap().home.is_none());
    }

    #[test]
    fn eligibility_requires_gamelogs_and_fifteen_minutes() {
        let league = League::new(fixtures(), scoreboard_games());
        let names: Vec<&str> = league
            .eligible_players(15.0)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["Coby White", "Nic Claxton"]);
    }

    #[test]
    fn renders_rosters_side_by_side() {
        let league = League::new(fixtures(), scoreboard_games());
        let table = league.games()[0].render_rosters();
        let lines: Vec<&str> = table.lines().map(str::trim).collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Away Players"));
        assert!(lines[0].ends_with("Home Players"));
        assert!(lines[1].starts_with("Nic Claxton"));
        assert!(lines[1].ends_with("Coby White"));
        assert!(lines[2].ends_with("Zach LaVine"));
        // Home roster is shorter: the last row has only the away player
        assert_eq!(lines[3], "Dariq Whitehead");
    }

    #[test]
    fn player_info_comes_from_fixtures() {
        let league = League::new(fixtures(), scoreboard_games());
        let claxton = league.player_info("Nic Claxton").unwrap();
        assert_eq!(claxton.gamelogs.as_ref().and_then(|g| g.avg_min), Some(15.0));
        assert!(league.player_info("Dariq Whitehead").is_none());
    }
}
