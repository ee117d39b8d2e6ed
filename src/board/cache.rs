use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use crate::models::{PipelineEntry, Stage};

/// Entries grouped into stage columns.
///
/// Column order follows stage `sort_order`; entry order within a column is
/// arrival order from the most recent fetch, with optimistic moves appended
/// at the end of their target column. An entry id lives in exactly one
/// column at a time. Entries whose status matches no loaded stage are kept
/// off the board entirely and only surface as the orphan count.
#[derive(Debug, Clone, Default)]
pub struct BoardCache {
    stages: Vec<Stage>,
    columns: HashMap<String, Vec<PipelineEntry>>,
    orphaned: usize,
}

/// One rendered column: a stage and the entries currently in it
#[derive(Debug, Clone, Serialize)]
pub struct StageColumn {
    pub stage: Stage,
    pub entries: Vec<PipelineEntry>,
}

/// Point-in-time copy of the board, safe to render or serialize while the
/// live cache keeps moving
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub columns: Vec<StageColumn>,
    pub orphaned: usize,
}

impl BoardSnapshot {
    pub fn entry_count(&self) -> usize {
        self.columns.iter().map(|c| c.entries.len()).sum()
    }
}

impl BoardCache {
    pub fn new(stages: Vec<Stage>, entries: Vec<PipelineEntry>) -> Self {
        let mut cache = BoardCache::default();
        cache.replace(stages, entries);
        cache
    }

    /// Throw away everything and regroup from fresh server state
    pub fn replace(&mut self, mut stages: Vec<Stage>, entries: Vec<PipelineEntry>) {
        stages.sort_by_key(|s| s.sort_order);
        self.stages = stages;
        self.regroup(entries);
    }

    /// Regroup fresh entries under the current stage set
    pub fn replace_entries(&mut self, entries: Vec<PipelineEntry>) {
        self.regroup(entries);
    }

    fn regroup(&mut self, entries: Vec<PipelineEntry>) {
        let mut columns: HashMap<String, Vec<PipelineEntry>> = self
            .stages
            .iter()
            .map(|s| (s.key.clone(), Vec::new()))
            .collect();

        let mut orphaned = 0;
        for entry in entries {
            match columns.get_mut(&entry.status) {
                Some(column) => column.push(entry),
                None => orphaned += 1,
            }
        }
        if orphaned > 0 {
            warn!("{} entries reference stages outside the loaded set", orphaned);
        }

        self.columns = columns;
        self.orphaned = orphaned;
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, key: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.key == key)
    }

    pub fn contains_stage(&self, key: &str) -> bool {
        self.stages.iter().any(|s| s.key == key)
    }

    /// Entries currently in a column (empty for unknown keys)
    pub fn column(&self, key: &str) -> &[PipelineEntry] {
        self.columns.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Which stage's column holds this entry, resolved by scanning columns
    /// in board order
    pub fn stage_of(&self, entry_id: &str) -> Option<&str> {
        for stage in &self.stages {
            if let Some(column) = self.columns.get(&stage.key) {
                if column.iter().any(|e| e.id == entry_id) {
                    return Some(&stage.key);
                }
            }
        }
        None
    }

    pub fn entry(&self, entry_id: &str) -> Option<&PipelineEntry> {
        for stage in &self.stages {
            if let Some(entry) = self
                .columns
                .get(&stage.key)
                .and_then(|column| column.iter().find(|e| e.id == entry_id))
            {
                return Some(entry);
            }
        }
        None
    }

    /// Move an entry to another column, rewriting its status to match.
    /// Returns the stage it came from, or None when the entry or the target
    /// stage is unknown (the board is untouched in that case).
    pub fn move_entry(&mut self, entry_id: &str, to_stage: &str) -> Option<String> {
        if !self.columns.contains_key(to_stage) {
            return None;
        }
        let from_stage = self.stage_of(entry_id)?.to_string();

        let source = self.columns.get_mut(&from_stage)?;
        let position = source.iter().position(|e| e.id == entry_id)?;
        let mut entry = source.remove(position);
        entry.status = to_stage.to_string();

        // contains_key checked above
        if let Some(target) = self.columns.get_mut(to_stage) {
            target.push(entry);
        }
        Some(from_stage)
    }

    /// Take an entry off the board entirely
    pub fn remove(&mut self, entry_id: &str) -> Option<PipelineEntry> {
        let stage = self.stage_of(entry_id)?.to_string();
        let column = self.columns.get_mut(&stage)?;
        let position = column.iter().position(|e| e.id == entry_id)?;
        Some(column.remove(position))
    }

    /// Put a previously removed entry back in the column its status names.
    /// Returns false (leaving the board untouched) when that stage is no
    /// longer loaded.
    pub fn restore(&mut self, entry: PipelineEntry) -> bool {
        match self.columns.get_mut(&entry.status) {
            Some(column) => {
                column.push(entry);
                true
            }
            None => false,
        }
    }

    /// Total entries on the board
    pub fn entry_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Entries that referenced unknown stages in the last fetch
    pub fn orphaned(&self) -> usize {
        self.orphaned
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            columns: self
                .stages
                .iter()
                .map(|stage| StageColumn {
                    stage: stage.clone(),
                    entries: self.column(&stage.key).to_vec(),
                })
                .collect(),
            orphaned: self.orphaned,
        }
    }
}
