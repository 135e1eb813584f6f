//! In-memory tabular dataset: parsing, typed column access, subsetting, and
//! the quality/provenance report produced right after a fetch.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Columns the decomposition view cannot work without.
pub const GAP_REQUIRED: [&str; 8] = [
    "Method",
    "Backbone",
    "Data Augmentation",
    "Memorization",
    "Rationality",
    "Robustness",
    "Generalization Gap",
    "Theorem II bound",
];

/// Columns the noise-sweep view cannot work without.
pub const NOISE_REQUIRED: [&str; 4] = ["model_name", "train_noise_prob", "Train Acc", "Dirty Test"];

/// One cell: numeric if it parses as f64, categorical text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Num(f64),
    Text(String),
}

impl Field {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(v) => Field::Num(v),
            Err(_) => Field::Text(trimmed.to_string()),
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Field::Num(v) => Some(*v),
            Field::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            Field::Num(_) => None,
        }
    }
}

/// Ordered rows with named columns. Immutable after load; the only derived
/// form is a row subset produced by filtering.
#[derive(Debug, Clone)]
pub struct MetricTable {
    columns: Vec<String>,
    rows: Vec<Vec<Field>>,
}

impl MetricTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Field>>) -> Self {
        Self { columns, rows }
    }

    /// Parse CSV text. The first non-empty, non-comment line is the header.
    /// Rows with a column count different from the header are dropped and
    /// counted by the quality report, not here.
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if columns.is_empty() {
                columns = trimmed.split(',').map(|s| s.trim().to_string()).collect();
                continue;
            }
            let cells: Vec<Field> = trimmed.split(',').map(Field::parse).collect();
            if cells.len() == columns.len() {
                rows.push(cells);
            }
        }
        if columns.is_empty() {
            return Err(anyhow!("csv has no header"));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
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

    /// All values of a numeric column, in row order.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| anyhow!("missing column '{}'", name))?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row[idx]
                    .as_num()
                    .ok_or_else(|| anyhow!("column '{}' row {} is not numeric", name, i))
            })
            .collect()
    }

    /// All values of a categorical column, in row order. Numeric cells
    /// stringify, so a numeric key column can still drive a filter.
    pub fn text(&self, name: &str) -> Result<Vec<String>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| anyhow!("missing column '{}'", name))?;
        Ok(self
            .rows
            .iter()
            .map(|row| match &row[idx] {
                Field::Text(s) => s.clone(),
                Field::Num(v) => v.to_string(),
            })
            .collect())
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Field> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Row subset by mask, preserving order. The mask length must match.
    pub fn subset(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.rows.len() {
            return Err(anyhow!(
                "mask length {} != row count {}",
                keep.len(),
                self.rows.len()
            ));
        }
        let rows = self
            .rows
            .iter()
            .zip(keep)
            .filter(|(_, &k)| k)
            .map(|(r, _)| r.clone())
            .collect();
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Names of required columns not present in this table.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }
}

// =============================================================================
// Quality report
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub rows: u64,
    pub bad_rows: u64,
    pub columns: Vec<String>,
    pub hash_sha256: String,
    pub warnings: Vec<String>,
}

/// Inspect raw CSV text without consuming it: row counts, shape mismatches,
/// content hash for provenance.
pub fn analyze_csv(text: &str) -> Result<QualityReport> {
    let mut warnings = Vec::new();
    let mut columns: Vec<String> = Vec::new();
    let mut rows = 0u64;
    let mut bad_rows = 0u64;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if columns.is_empty() {
            columns = trimmed.split(',').map(|s| s.trim().to_string()).collect();
            continue;
        }
        let cell_count = trimmed.split(',').count();
        if cell_count == columns.len() {
            rows += 1;
        } else {
            bad_rows += 1;
            warnings.push(format!(
                "bad_row: expected {} cells, got {}",
                columns.len(),
                cell_count
            ));
        }
    }

    if columns.is_empty() {
        warnings.push("missing_header".to_string());
    }

    Ok(QualityReport {
        rows,
        bad_rows,
        columns,
        hash_sha256: content_sha256(text),
        warnings,
    })
}

/// SHA-256 of the payload, hex-encoded. Same bytes, same hash, so two runs
/// against the same snapshot are comparable.
pub fn content_sha256(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Tests
// =============================================================================
