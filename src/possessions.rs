//! Possession-adjusted matchup metrics.
//!
//! Each matchup export has one row per (game, opponent) stint with the number
//! of possessions the pair shared. Scaling a stint's box-score columns by
//! `game total / stint possessions` gives what the matchup would have
//! produced over a full game, so opponents guarded for different stretches
//! become comparable.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::table::Frame;

pub const PERFORMANCE_COLUMNS: [&str; 3] = ["Player Points", "Team Points", "Matchup Assists"];
pub const CATEGORIES: [&str; 2] = ["offense", "defense"];

const GAME_ID: &str = "Game_Id";
const PARTIAL_POSSESSIONS: &str = "partialPossessions";
const AVG_POINTS: &str = "Avg Pts";
const POINTS_COLUMN: &str = "Player Points";
const POINTS_DIFFERENCE: &str = "Adjusted_Points_Difference";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

fn numeric_column(frame: &Frame, name: &str) -> Result<Vec<Option<f64>>> {
    let cells = frame
        .column(name)
        .ok_or_else(|| anyhow!("missing column '{}'", name))?;

    cells
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            let raw = raw.trim();
            if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
                return Ok(None);
            }
            raw.parse::<f64>()
                .map(Some)
                .with_context(|| format!("non-numeric '{}' in column '{}' row {}", raw, name, row + 1))
        })
        .collect()
}

/// Integral values keep one decimal (`10.0`), the rest print in shortest
/// round-trip form; missing values are empty cells.
fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => format!("{:.1}", v),
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

/// Append `Adjusted_<col>` for every performance column, plus the points
/// difference against `Avg Pts` when that column is present.
pub fn adjust_frame(frame: &Frame) -> Result<Frame> {
    let game_ids = frame
        .column(GAME_ID)
        .ok_or_else(|| anyhow!("missing column '{}'", GAME_ID))?;
    // Zero possessions would divide by zero; treat them as missing
    let partials: Vec<Option<f64>> = numeric_column(frame, PARTIAL_POSSESSIONS)?
        .into_iter()
        .map(|p| p.filter(|v| *v != 0.0))
        .collect();

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (game, partial) in game_ids.iter().zip(&partials) {
        *totals.entry(*game).or_insert(0.0) += partial.unwrap_or(0.0);
    }

    let mut out = frame.clone();
    for col in PERFORMANCE_COLUMNS {
        let values = numeric_column(frame, col)?;
        let adjusted: Vec<Option<f64>> = values
            .iter()
            .zip(&partials)
            .zip(&game_ids)
            .map(|((value, partial), game)| match (value, partial) {
                (Some(v), Some(p)) => Some(v * totals[game] / p),
                _ => None,
            })
            .collect();

        out.push_column(
            format!("Adjusted_{}", col),
            adjusted.iter().copied().map(format_number).collect(),
        )?;

        if col == POINTS_COLUMN && frame.has_column(AVG_POINTS) {
            let averages = numeric_column(frame, AVG_POINTS)?;
            let diff = adjusted
                .iter()
                .zip(&averages)
                .map(|(adj, avg)| match (adj, avg) {
                    (Some(a), Some(b)) => Some(a - b),
                    _ => None,
                })
                .map(format_number)
                .collect();
            out.push_column(POINTS_DIFFERENCE, diff)?;
        }
    }

    Ok(out)
}

pub fn process_player_file(path: &Path) -> Result<Frame> {
    let frame = Frame::read_csv(path)?;
    adjust_frame(&frame)
}

/// Exports eligible for processing: `.csv`, not resource-fork `._` files,
/// not already marked processed.
fn should_process(file_name: &str) -> bool {
    !file_name.contains("processed") && file_name.ends_with(".csv") && !file_name.starts_with("._")
}

/// Adjust every matchup export under `<matchup_dir>/{offense,defense}` into
/// the mirrored `<output_dir>/{offense,defense}`. A file that fails is logged
/// and counted; the batch carries on.
pub fn run_batch(matchup_dir: &Path, output_dir: &Path) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for category in CATEGORIES {
        let input = matchup_dir.join(category);
        let output = output_dir.join(category);

        let mut files: Vec<PathBuf> = match fs::read_dir(&input) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(e) => {
                error!("Cannot read matchup directory {}: {}", input.display(), e);
                continue;
            }
        };
        files.sort();

        for path in files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                summary.skipped += 1;
                continue;
            };
            if !path.is_file() || !should_process(&name) {
                summary.skipped += 1;
                continue;
            }

            let target = output.join(&name);
            match process_player_file(&path).and_then(|frame| frame.write_csv(&target)) {
                Ok(()) => {
                    summary.processed += 1;
                    info!("Processed and saved: {}", target.display());
                }
                Err(e) => {
                    summary.failed += 1;
                    error!("Error processing {}: {:#}", path.display(), e);
                }
            }
        }
    }

    info!(
        "Possession batch done: {} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
    summary
}
