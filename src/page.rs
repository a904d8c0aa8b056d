//! Extraction from rendered vendor pages. Pure functions over HTML text so
//! they can be checked against saved pages.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::table::Frame;

/// Header the historical odds table is recognised by
pub const MATCHUP_HEADER: &str = "Matchup";

/// Class signature of the same-day over/under line
pub const ODDS_LINE_SELECTOR: &str = "span.typography.odds-cell__line";

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("Bad selector '{}': {}", css, e)))
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// First `<table>` whose header row has a `Matchup` column, as a frame keyed
/// by the header names. Body rows without `<td>` cells are skipped and short
/// rows (spacers, "Show more") are padded with empty cells.
///
/// `Ok(None)` when no table qualifies. A header section without rows, or a
/// body row wider than the header, is an error.
pub fn find_matchup_table(html: &str) -> Result<Option<Frame>, ScrapeError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let thead_sel = selector("thead")?;
    let tbody_sel = selector("tbody")?;
    let tr_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    for table in document.select(&table_sel) {
        let Some(thead) = table.select(&thead_sel).next() else {
            continue;
        };
        let header_row = thead
            .select(&tr_sel)
            .next()
            .ok_or_else(|| ScrapeError::Parse("table header has no rows".to_string()))?;
        let columns: Vec<String> = header_row.select(&th_sel).map(cell_text).collect();

        if !columns.iter().any(|c| c == MATCHUP_HEADER) {
            continue;
        }
        let Some(body) = table.select(&tbody_sel).next() else {
            continue;
        };

        let rows: Vec<Vec<String>> = body
            .select(&tr_sel)
            .map(|row| row.select(&td_sel).map(cell_text).collect::<Vec<_>>())
            .filter(|cells| !cells.is_empty())
            .map(|mut cells| {
                if cells.len() < columns.len() {
                    cells.resize(columns.len(), String::new());
                }
                cells
            })
            .collect();

        let frame = Frame::from_rows(columns, rows)
            .map_err(|e| ScrapeError::Parse(format!("matchup table: {}", e)))?;
        return Ok(Some(frame));
    }

    Ok(None)
}

/// Trimmed text of the same-day odds element, if present
pub fn find_odds_line(html: &str) -> Result<Option<String>, ScrapeError> {
    let document = Html::parse_document(html);
    let line_sel = selector(ODDS_LINE_SELECTOR)?;
    Ok(document.select(&line_sel).next().map(cell_text))
}
