//! Picked-color history, owned by the caller and persisted as JSON.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::ColorSample;
use crate::names;

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O failed")]
    Io(#[from] std::io::Error),
    #[error("history serialization failed")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// `#RRGGBB`.
    pub color: String,
    #[serde(default)]
    pub color_name: String,
    pub rgb: [u8; 3],
    /// Unix seconds.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(sample: ColorSample, timestamp: i64) -> Self {
        let color = sample.to_hex();
        let color_name = names::color_name(&color).unwrap_or_default();
        Self {
            color,
            color_name,
            rgb: sample.rgb(),
            timestamp,
        }
    }

    pub fn now(sample: ColorSample) -> Self {
        Self::new(sample, chrono::Utc::now().timestamp())
    }

    pub fn sample(&self) -> ColorSample {
        ColorSample::from(self.rgb)
    }
}

/// Oldest entry first, at most `limit` entries, no repeated hex values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorHistory {
    entries: Vec<HistoryEntry>,
    limit: usize,
}

impl Default for ColorHistory {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl ColorHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    pub fn with_entries(entries: Vec<HistoryEntry>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries {
            history.record(entry);
        }
        history
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Appends `entry` unless its hex is already present. Returns whether
    /// anything changed.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if self
            .entries
            .iter()
            .any(|existing| existing.color.eq_ignore_ascii_case(&entry.color))
        {
            return false;
        }
        self.entries.push(entry);
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        true
    }

    /// Newest first, each row carrying its own display context.
    pub fn rows(&self) -> impl Iterator<Item = HistoryRow<'_>> {
        self.entries
            .iter()
            .rev()
            .enumerate()
            .map(|(index, entry)| HistoryRow {
                index: index + 1,
                entry,
            })
    }

    /// Reads `path`. A missing file is an empty history; a corrupt one is
    /// logged and treated as empty.
    pub fn load(path: &Path, limit: usize) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Self::new(limit),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "reading history failed");
                return Self::new(limit);
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&data) {
            Ok(entries) => Self::with_entries(entries, limit),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "history file is corrupt, starting over");
                Self::new(limit)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// One history line: its 1-based position (newest is 1) and the entry.
#[derive(Debug, Clone, Copy)]
pub struct HistoryRow<'a> {
    pub index: usize,
    pub entry: &'a HistoryEntry,
}

pub fn render_row(row: &HistoryRow<'_>) -> String {
    let when = chrono::DateTime::from_timestamp(row.entry.timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    if row.entry.color_name.is_empty() {
        format!("{:>3}. {}  {}", row.index, row.entry.color, when)
    } else {
        format!(
            "{:>3}. {}  {}  ({})",
            row.index, row.entry.color, when, row.entry.color_name
        )
    }
}
