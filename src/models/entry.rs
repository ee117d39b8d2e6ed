use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of work a pipeline entry tracks.
///
/// Leads are prospects moving through the sales side of the pipeline; jobs
/// are sold work moving through production. The hosted delete function
/// branches on this discriminator, so it rides along on every delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Lead,
    Job,
}

impl EntryKind {
    /// Convert to string for API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Lead => "lead",
            EntryKind::Job => "job",
        }
    }

    /// Parse from string (CLI filters, config)
    pub fn from_str(s: &str) -> Option<EntryKind> {
        match s {
            "lead" => Some(EntryKind::Lead),
            "job" => Some(EntryKind::Job),
            _ => None,
        }
    }
}

/// A unit of work tracked on the pipeline board.
///
/// Entries are created and edited through the web forms; this client only
/// moves them between stages and removes them. `status` always holds a stage
/// key, and entries whose key matches no loaded stage are kept off the board
/// rather than invented a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineEntry {
    pub id: String,
    pub status: String,
    pub entry_type: EntryKind,
    pub contact_id: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Display label maintained by the backend (usually the contact's name
    /// and street). Falls back to the contact id when absent.
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineEntry {
    /// Create a new entry with current timestamps (fixtures and tests;
    /// production entries always arrive from the backend)
    pub fn new(id: &str, status: &str, entry_type: EntryKind, contact_id: &str) -> Self {
        let now = Utc::now();
        PipelineEntry {
            id: id.to_string(),
            status: status.to_string(),
            entry_type,
            contact_id: contact_id.to_string(),
            assigned_to: None,
            title: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_assignee(mut self, user_id: &str) -> Self {
        self.assigned_to = Some(user_id.to_string());
        self
    }

    /// Label to show on cards and in tables
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.contact_id)
    }

    /// Leading slice of the id for compact card rendering. Ids are
    /// backend-generated ASCII, but fall back to the whole id rather than
    /// split a multibyte character.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}
