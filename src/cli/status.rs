// Status computation for the pipeline summary

use serde::Serialize;

use crate::board::BoardSnapshot;

/// Per-stage counts for `status --json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub stages: Vec<StageCount>,
    pub total: usize,
    pub unassigned: usize,
    pub orphaned: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Tally the board into a status report
pub fn compute_status_report(snapshot: &BoardSnapshot) -> StatusReport {
    let stages = snapshot
        .columns
        .iter()
        .map(|column| StageCount {
            key: column.stage.key.clone(),
            label: column.stage.label.clone(),
            count: column.entries.len(),
        })
        .collect();

    let unassigned = snapshot
        .columns
        .iter()
        .flat_map(|c| c.entries.iter())
        .filter(|e| e.assigned_to.is_none())
        .count();

    StatusReport {
        stages,
        total: snapshot.entry_count(),
        unassigned,
        orphaned: snapshot.orphaned,
    }
}

/// Compute the one-line pipeline summary for `ridgeline status`
pub fn compute_pipeline_status(snapshot: &BoardSnapshot) -> String {
    let report = compute_status_report(snapshot);

    if report.total == 0 && report.orphaned == 0 {
        return "Pipeline is empty".to_string();
    }

    // Only stages that have entries; an all-zero list is noise
    let parts: Vec<String> = report
        .stages
        .iter()
        .filter(|s| s.count > 0)
        .map(|s| format!("{} {}", s.count, s.key))
        .collect();

    let mut status = format!(
        "Pipeline: {}; {} total, {} unassigned",
        parts.join(", "),
        report.total,
        report.unassigned
    );
    if report.orphaned > 0 {
        status.push_str(&format!(
            "; {} off-board (unknown stage)",
            report.orphaned
        ));
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardCache;
    use crate::models::{fallback_stages, EntryKind, PipelineEntry};

    fn entry(id: &str, status: &str) -> PipelineEntry {
        PipelineEntry::new(id, status, EntryKind::Lead, "c-1")
    }

    #[test]
    fn test_compute_pipeline_status() {
        let cache = BoardCache::new(
            fallback_stages(),
            vec![
                entry("e-1", "lead"),
                entry("e-2", "lead").with_assignee("u-1"),
                entry("e-3", "legal"),
            ],
        );
        let status = compute_pipeline_status(&cache.snapshot());
        assert_eq!(status, "Pipeline: 2 lead, 1 legal; 3 total, 2 unassigned");
    }

    #[test]
    fn test_empty_pipeline() {
        let cache = BoardCache::new(fallback_stages(), vec![]);
        assert_eq!(compute_pipeline_status(&cache.snapshot()), "Pipeline is empty");
    }

    #[test]
    fn test_status_mentions_orphans() {
        let cache = BoardCache::new(fallback_stages(), vec![entry("e-1", "demolition")]);
        let status = compute_pipeline_status(&cache.snapshot());
        assert!(status.contains("1 off-board"));
    }

    #[test]
    fn test_status_report_counts() {
        let cache = BoardCache::new(
            fallback_stages(),
            vec![entry("e-1", "lead"), entry("e-2", "billing")],
        );
        let report = compute_status_report(&cache.snapshot());
        assert_eq!(report.total, 2);
        assert_eq!(report.stages.len(), 7);
        assert_eq!(report.stages[0].key, "lead");
        assert_eq!(report.stages[0].count, 1);
    }
}
