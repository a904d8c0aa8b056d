//! Year attribution for the vendor's partial `MM/DD` game dates.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use crate::table::Frame;

pub const GAME_DATE: &str = "GAME_DATE";

/// An NBA season straddles New Year: months on or after `boundary_month`
/// belong to `start_year`, earlier months to the year after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCalendar {
    pub start_year: i32,
    pub boundary_month: u32,
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self {
            start_year: 2024,
            boundary_month: 6,
        }
    }
}

impl SeasonCalendar {
    /// Parse a season label such as `2024-25`.
    pub fn from_label(label: &str) -> Result<Self> {
        let start = label.trim().split('-').next().unwrap_or_default();
        let start_year: i32 = start
            .parse()
            .with_context(|| format!("Invalid season label '{}'", label))?;
        Ok(Self {
            start_year,
            ..Self::default()
        })
    }

    pub fn with_boundary_month(mut self, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow!("Season boundary month {} is not a calendar month", month));
        }
        self.boundary_month = month;
        Ok(self)
    }

    pub fn year_for_month(&self, month: u32) -> i32 {
        if month >= self.boundary_month {
            self.start_year
        } else {
            self.start_year + 1
        }
    }

    /// `"12/5"` → `"DEC 05, 2024"`. `None` when the value is not a valid
    /// `MM/DD` date.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let (month, day) = raw.trim().split_once('/')?;
        let month: u32 = month.trim().parse().ok()?;
        let day: u32 = day.trim().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(self.year_for_month(month), month, day)?;
        Some(date.format("%b %d, %Y").to_string().to_uppercase())
    }

    /// Rename a vendor `Date` column to `GAME_DATE` and normalize its
    /// values. Values that do not parse (including ones already normalized)
    /// are left untouched.
    pub fn normalize_date_column(&self, frame: &mut Frame) {
        frame.rename_column("Date", GAME_DATE);
        frame.map_column(GAME_DATE, |raw| {
            self.normalize(raw).unwrap_or_else(|| raw.to_string())
        });
    }
}
