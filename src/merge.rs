//! Attach scraped prop lines to a player's game log.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dates::{SeasonCalendar, GAME_DATE};
use crate::table::Frame;

pub fn gamelog_path(gamelog_dir: &Path, player: &str) -> PathBuf {
    gamelog_dir.join(format!("{}_log.csv", player))
}

/// Left-join `props` onto the player's log by game date. The log drives the
/// date axis: games without a line keep empty prop cells.
pub fn merge_props(log: &Frame, props: &Frame, calendar: &SeasonCalendar) -> Result<Frame> {
    let mut props = props.clone();
    calendar.normalize_date_column(&mut props);

    let stat_columns: Vec<&str> = props
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| *c != GAME_DATE)
        .collect();
    let mut keep = vec![GAME_DATE];
    keep.extend(stat_columns);

    log.left_join(&props.select(&keep)?, GAME_DATE)
}

/// Read `<gamelog_dir>/<player>_log.csv`, merge the prop lines and write
/// `<merged_dir>/<player>.csv`. Returns the written path.
pub fn merge_player_props(
    gamelog_dir: &Path,
    merged_dir: &Path,
    player: &str,
    props: &Frame,
    calendar: &SeasonCalendar,
) -> Result<PathBuf> {
    info!("Trying prop gamelogs merge for player: {}", player);

    let log_path = gamelog_path(gamelog_dir, player);
    let log = Frame::read_csv(&log_path)
        .with_context(|| format!("Failed to load game log for {}", player))?;

    let merged = merge_props(&log, props, calendar)?;
    let out = merged_dir.join(format!("{}.csv", player));
    merged.write_csv(&out)?;

    info!("Wrote {} rows to {}", merged.len(), out.display());
    Ok(out)
}
