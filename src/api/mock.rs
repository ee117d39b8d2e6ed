use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::error::{ApiError, ApiResult};
use super::types::{DeleteVerdict, TransitionRequest, TransitionVerdict};
use super::Backend;
use crate::context::RequestContext;
use crate::models::{EntryKind, PipelineEntry, Stage};

/// Scripted backend for tests and offline experimentation.
///
/// Stage and entry fixtures are set up front; transition and delete
/// verdicts are consumed from FIFO scripts, defaulting to acceptance when
/// the script runs dry. The entry fixtures act as server truth: an accepted
/// transition updates them, so a refetch after confirmation returns what a
/// real backend would. Recorded calls let tests assert exactly what was,
/// and was not, asked of the backend.
#[derive(Default)]
pub struct MockBackend {
    stages: Vec<Stage>,
    entries: Mutex<Vec<PipelineEntry>>,
    transition_script: Mutex<VecDeque<ApiResult<TransitionVerdict>>>,
    delete_script: Mutex<VecDeque<ApiResult<DeleteVerdict>>>,
    transition_calls: Mutex<Vec<TransitionRequest>>,
    delete_calls: Mutex<Vec<(String, EntryKind)>>,
    entry_fetches: AtomicU32,
    stage_fetches: AtomicU32,
    fail_entry_fetches: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(mut self, stages: Vec<Stage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_entries(self, entries: Vec<PipelineEntry>) -> Self {
        *self.entries.lock() = entries;
        self
    }

    pub fn with_entry(self, entry: PipelineEntry) -> Self {
        self.entries.lock().push(entry);
        self
    }

    /// Queue the next transition verdict
    pub fn push_transition(&self, verdict: TransitionVerdict) {
        self.transition_script.lock().push_back(Ok(verdict));
    }

    /// Queue a transport failure for the next transition call
    pub fn push_transition_error(&self, error: ApiError) {
        self.transition_script.lock().push_back(Err(error));
    }

    /// Queue the next delete verdict
    pub fn push_delete(&self, verdict: DeleteVerdict) {
        self.delete_script.lock().push_back(Ok(verdict));
    }

    /// Queue a transport failure for the next delete call
    pub fn push_delete_error(&self, error: ApiError) {
        self.delete_script.lock().push_back(Err(error));
    }

    /// Make subsequent entry fetches fail at the transport level
    pub fn fail_entry_fetches(&self, fail: bool) {
        self.fail_entry_fetches.store(fail, Ordering::SeqCst);
    }

    /// Mutate server truth directly, as if another user edited the pipeline
    pub fn set_entries(&self, entries: Vec<PipelineEntry>) {
        *self.entries.lock() = entries;
    }

    /// Current server truth
    pub fn entries(&self) -> Vec<PipelineEntry> {
        self.entries.lock().clone()
    }

    /// Every transition request received, in order
    pub fn transition_calls(&self) -> Vec<TransitionRequest> {
        self.transition_calls.lock().clone()
    }

    /// Every delete request received, in order
    pub fn delete_calls(&self) -> Vec<(String, EntryKind)> {
        self.delete_calls.lock().clone()
    }

    pub fn entry_fetch_count(&self) -> u32 {
        self.entry_fetches.load(Ordering::SeqCst)
    }

    pub fn stage_fetch_count(&self) -> u32 {
        self.stage_fetches.load(Ordering::SeqCst)
    }

    /// Apply an accepted transition to server truth
    fn apply_transition(&self, request: &TransitionRequest) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == request.entry_id) {
            entry.status = request.to_stage.clone();
            entry.updated_at = Utc::now();
        }
    }

    fn apply_delete(&self, entry_id: &str) {
        self.entries.lock().retain(|e| e.id != entry_id);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_stages(&self, _ctx: &RequestContext) -> ApiResult<Vec<Stage>> {
        self.stage_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.stages.clone())
    }

    async fn fetch_entries(&self, _ctx: &RequestContext) -> ApiResult<Vec<PipelineEntry>> {
        self.entry_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_entry_fetches.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                message: "entry fetch scripted to fail".to_string(),
            });
        }
        Ok(self.entries.lock().clone())
    }

    async fn transition_entry(
        &self,
        _ctx: &RequestContext,
        request: &TransitionRequest,
    ) -> ApiResult<TransitionVerdict> {
        self.transition_calls.lock().push(request.clone());

        let scripted = self.transition_script.lock().pop_front();
        let verdict = match scripted {
            Some(result) => result?,
            None => TransitionVerdict::Accepted {
                message: "ok".to_string(),
            },
        };

        if matches!(verdict, TransitionVerdict::Accepted { .. }) {
            self.apply_transition(request);
        }
        Ok(verdict)
    }

    async fn delete_entry(
        &self,
        _ctx: &RequestContext,
        entry_id: &str,
        entry_type: EntryKind,
    ) -> ApiResult<DeleteVerdict> {
        self.delete_calls
            .lock()
            .push((entry_id.to_string(), entry_type));

        let scripted = self.delete_script.lock().pop_front();
        let verdict = match scripted {
            Some(result) => result?,
            None => DeleteVerdict::Removed { message: None },
        };

        if matches!(verdict, DeleteVerdict::Removed { .. }) {
            self.apply_delete(entry_id);
        }
        Ok(verdict)
    }
}
