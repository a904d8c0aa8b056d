//! Static roster and player-info lookup tables, loaded once per process.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Roster metadata is passed through untouched; only the player names (the
/// keys) are used.
pub type Roster = Map<String, Value>;

/// Per-player attributes from the player-info fixture.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct PlayerInfo {
    #[serde(default)]
    pub gamelogs: Option<GameLogSummary>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct GameLogSummary {
    #[serde(rename = "AVG_MIN", default)]
    pub avg_min: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    rosters: HashMap<String, Roster>,
    players: HashMap<String, PlayerInfo>,
}

impl Fixtures {
    pub fn new(rosters: HashMap<String, Roster>, players: HashMap<String, PlayerInfo>) -> Self {
        Self { rosters, players }
    }

    pub fn load(rosters_path: &Path, player_info_path: &Path) -> Result<Self> {
        let rosters: HashMap<String, Roster> = read_json(rosters_path)?;
        let players: HashMap<String, PlayerInfo> = read_json(player_info_path)?;
        info!(
            "Loaded fixtures: {} team rosters, {} players",
            rosters.len(),
            players.len()
        );
        Ok(Self::new(rosters, players))
    }

    pub fn roster(&self, team_abbr: &str) -> Option<&Roster> {
        self.rosters.get(team_abbr)
    }

    pub fn player_info(&self, name: &str) -> Option<&PlayerInfo> {
        self.players.get(name)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse fixture {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_fixture_files() {
        let mut rosters = tempfile::NamedTempFile::new().unwrap();
        write!(
            rosters,
            r#"{{"BKN": {{"Nic Claxton": {{"num": "33"}}, "Cam Thomas": {{}}}}}}"#
        )
        .unwrap();
        let mut players = tempfile::NamedTempFile::new().unwrap();
        write!(
            players,
            r#"{{"Nic Claxton": {{"position": "C", "gamelogs": {{"AVG_MIN": 27.4, "AVG_PTS": 9.8}}}},
                "Cam Thomas": {{"position": "G"}}}}"#
        )
        .unwrap();

        let fixtures = Fixtures::load(rosters.path(), players.path()).unwrap();
        let names: Vec<&String> = fixtures.roster("BKN").unwrap().keys().collect();
        assert_eq!(names, ["Nic Claxton", "Cam Thomas"]);

        let clax = fixtures.player_info("Nic Claxton").unwrap();
        let logs = clax.gamelogs.as_ref().unwrap();
        assert_eq!(logs.avg_min, Some(27.4));
        assert!(logs.extra.contains_key("AVG_PTS"));
        assert_eq!(clax.attributes["position"], "C");
        assert!(fixtures.player_info("Cam Thomas").unwrap().gamelogs.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Fixtures::load(Path::new("/nonexistent/rosters.json"), Path::new("/nonexistent/p.json"))
            .unwrap_err();
        assert!(err.to_string().contains("rosters.json"));
    }
}
