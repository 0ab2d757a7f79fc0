//! Experimental data series from disk.
//!
//! Two formats are accepted:
//! - JSON: `{"label": "...", "source": "...", "x": [...], "y": [...]}`
//! - plain text: two numeric columns separated by whitespace or a comma; blank lines
//!   and lines starting with `#` are skipped. The label defaults to the file stem.
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("failed to parse JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {reason}")]
    BadLine { line: usize, reason: String },
    #[error("series has {x} x values and {y} y values")]
    LengthMismatch { x: usize, y: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalSeries {
    pub label: String,
    #[serde(default)]
    pub source: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ExperimentalSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn check(self) -> Result<Self, DataError> {
        if self.x.len() != self.y.len() {
            return Err(DataError::LengthMismatch {
                x: self.x.len(),
                y: self.y.len(),
            });
        }
        if self.is_empty() {
            warn!("experimental series '{}' is empty", self.label);
        }
        Ok(self)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        let series: ExperimentalSeries = serde_json::from_str(text)?;
        series.check()
    }

    pub fn from_columns_str(label: &str, text: &str) -> Result<Self, DataError> {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty())
                .collect();
            if fields.len() != 2 {
                return Err(DataError::BadLine {
                    line: i + 1,
                    reason: format!("expected 2 columns, found {}", fields.len()),
                });
            }
            let parse = |f: &str| {
                f.parse::<f64>().map_err(|_| DataError::BadLine {
                    line: i + 1,
                    reason: format!("'{}' is not a number", f),
                })
            };
            x.push(parse(fields[0])?);
            y.push(parse(fields[1])?);
        }
        ExperimentalSeries {
            label: label.to_string(),
            source: None,
            x,
            y,
        }
        .check()
    }

    /// loads JSON when the extension is `.json`, two-column text otherwise
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let series = if is_json {
            Self::from_json_str(&text)?
        } else {
            let label = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("experiment");
            Self::from_columns_str(label, &text)?
        };
        info!(
            "loaded {} experimental points '{}' from {}",
            series.len(),
            series.label,
            path.display()
        );
        Ok(series)
    }
}
