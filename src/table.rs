//! A small string-celled table used for scraped prop lines, game logs and
//! matchup exports. Empty cells stand for missing values, which is how the
//! CSV files on disk encode them too.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a frame from header names and body rows. Every row must have
    /// exactly one cell per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut frame = Self::new(columns);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(anyhow!(
                "row has {} cells but the table has {} columns",
                row.len(),
                self.columns.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a column; `values` must line up with the existing rows.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(anyhow!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            ));
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
    }

    /// Rewrite every cell of a column in place. Missing column is a no-op.
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }

    /// New frame holding only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Frame> {
        let idxs = names
            .iter()
            .map(|n| {
                self.column_index(n)
                    .ok_or_else(|| anyhow!("column '{}' not found", n))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Frame {
            columns: names.iter().map(|n| n.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| idxs.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Outer join of several frames on `key`. Keys appear in first-seen
    /// order; each frame contributes its non-key columns, left empty for keys
    /// the frame does not have.
    pub fn outer_join(key: &str, frames: &[Frame]) -> Result<Frame> {
        let mut columns = vec![key.to_string()];
        let mut order: Vec<String> = Vec::new();
        let mut by_key: HashMap<String, Vec<String>> = HashMap::new();
        let mut width = 0;

        for frame in frames {
            let key_idx = frame
                .column_index(key)
                .ok_or_else(|| anyhow!("column '{}' not found", key))?;
            let value_idxs: Vec<usize> = (0..frame.columns.len()).filter(|&i| i != key_idx).collect();
            columns.extend(value_idxs.iter().map(|&i| frame.columns[i].clone()));

            for row in &frame.rows {
                let slot = by_key.entry(row[key_idx].clone()).or_insert_with(|| {
                    order.push(row[key_idx].clone());
                    vec![String::new(); width]
                });
                // A repeated key keeps its first value for this frame's columns
                if slot.len() == width {
                    slot.extend(value_idxs.iter().map(|&i| row[i].clone()));
                }
            }

            width += value_idxs.len();
            for slot in by_key.values_mut() {
                slot.resize(width, String::new());
            }
        }

        let rows = order
            .into_iter()
            .map(|k| {
                let mut row = vec![k.clone()];
                row.extend(by_key.remove(&k).unwrap_or_default());
                row
            })
            .collect();

        Ok(Frame { columns, rows })
    }

    /// Left join on `key`: every row of `self` is kept, matched rows of
    /// `right` contribute their non-key columns. Several matches repeat the
    /// left row once per match. A non-key name present on both sides becomes
    /// `<name>_x` on the left and `<name>_y` on the right.
    pub fn left_join(&self, right: &Frame, key: &str) -> Result<Frame> {
        let left_key = self
            .column_index(key)
            .ok_or_else(|| anyhow!("left table has no '{}' column", key))?;
        let right_key = right
            .column_index(key)
            .ok_or_else(|| anyhow!("right table has no '{}' column", key))?;
        let right_idxs: Vec<usize> = (0..right.columns.len()).filter(|&i| i != right_key).collect();

        let clashes = |name: &String| name != key && self.has_column(name) && right.has_column(name);

        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|name| if clashes(name) { format!("{}_x", name) } else { name.clone() })
            .collect();
        for &i in &right_idxs {
            let name = &right.columns[i];
            if clashes(name) {
                columns.push(format!("{}_y", name));
            } else {
                columns.push(name.clone());
            }
        }

        let mut matches: HashMap<&str, Vec<&Vec<String>>> = HashMap::new();
        for row in &right.rows {
            matches.entry(row[right_key].as_str()).or_default().push(row);
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match matches.get(row[left_key].as_str()) {
                Some(found) => {
                    for r in found {
                        let mut out = row.clone();
                        out.extend(right_idxs.iter().map(|&i| r[i].clone()));
                        rows.push(out);
                    }
                }
                None => {
                    let mut out = row.clone();
                    out.extend(std::iter::repeat(String::new()).take(right_idxs.len()));
                    rows.push(out);
                }
            }
        }

        Ok(Frame { columns, rows })
    }

    pub fn read_csv(path: &Path) -> Result<Frame> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut frame = Frame::new(columns);
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Bad record {} in {}", line + 1, path.display()))?;
            frame
                .push_row(record.iter().map(|c| c.to_string()).collect())
                .with_context(|| format!("Bad record {} in {}", line + 1, path.display()))?;
        }
        Ok(frame)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_records(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer.into_inner().map_err(|e| anyhow!("Failed to flush CSV: {}", e))?;
        Ok(String::from_utf8(bytes)?)
    }

    fn write_records<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(())
    }
}
