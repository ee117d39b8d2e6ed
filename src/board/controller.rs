use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use super::cache::{BoardCache, BoardSnapshot};
use super::transition::{DeleteOutcome, DropError, TransitionOutcome};
use crate::api::{ApiResult, Backend, DeleteVerdict, TransitionRequest, TransitionVerdict};
use crate::context::RequestContext;
use crate::models::{fallback_stages, PipelineEntry};

/// Drives the pipeline board: optimistic local moves, backend verdicts.
///
/// A drop is applied to the cache before the backend is asked, so callers
/// can re-render immediately; the transition authority then either confirms
/// it (followed by a wholesale refetch of server truth) or the move is
/// rolled back. The internal lock is only ever held for synchronous cache
/// edits, never across a backend call, so transitions for different entries
/// run concurrently. A second gesture on an entry whose verdict is still
/// outstanding is rejected up front rather than queued.
pub struct BoardController {
    backend: Arc<dyn Backend>,
    state: Mutex<BoardState>,
}

#[derive(Default)]
struct BoardState {
    cache: BoardCache,
    active_drag: Option<String>,
    in_flight: HashSet<String>,
    used_fallback: bool,
}

impl BoardController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        BoardController {
            backend,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Fetch stages and entries and rebuild the board from scratch
    pub async fn load(&self, ctx: &RequestContext) -> ApiResult<()> {
        let mut stages = self.backend.fetch_stages(ctx).await?;
        let used_fallback = stages.is_empty();
        if used_fallback {
            debug!("tenant has no stage configuration; using the built-in pipeline");
            stages = fallback_stages();
        }
        let entries = self.backend.fetch_entries(ctx).await?;

        let mut state = self.state.lock();
        state.cache.replace(stages, entries);
        state.used_fallback = used_fallback;
        Ok(())
    }

    /// Refetch entries and regroup them under the current stage set.
    /// The replacement is wholesale; any optimistic positions are
    /// overwritten by server truth.
    pub async fn refresh(&self, ctx: &RequestContext) -> ApiResult<()> {
        let entries = self.backend.fetch_entries(ctx).await?;
        self.state.lock().cache.replace_entries(entries);
        Ok(())
    }

    /// Whether the last load fell back to the built-in pipeline
    pub fn used_fallback(&self) -> bool {
        self.state.lock().used_fallback
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.state.lock().cache.snapshot()
    }

    pub fn entry(&self, entry_id: &str) -> Option<PipelineEntry> {
        self.state.lock().cache.entry(entry_id).cloned()
    }

    /// Stage currently showing the entry (optimistic positions included)
    pub fn stage_of(&self, entry_id: &str) -> Option<String> {
        self.state
            .lock()
            .cache
            .stage_of(entry_id)
            .map(|s| s.to_string())
    }

    /// Whether a transition or delete for this entry is awaiting its verdict
    pub fn is_pending(&self, entry_id: &str) -> bool {
        self.state.lock().in_flight.contains(entry_id)
    }

    /// Start a drag gesture. Only one drag is active at a time; starting a
    /// new one replaces the previous.
    pub fn begin_drag(&self, entry_id: &str) -> Result<(), DropError> {
        let mut state = self.state.lock();
        if state.cache.stage_of(entry_id).is_none() {
            return Err(DropError::UnknownEntry(entry_id.to_string()));
        }
        if state.in_flight.contains(entry_id) {
            return Err(DropError::TransitionPending(entry_id.to_string()));
        }
        state.active_drag = Some(entry_id.to_string());
        Ok(())
    }

    /// Abandon the active drag, if any, returning the entry it carried
    pub fn cancel_drag(&self) -> Option<String> {
        self.state.lock().active_drag.take()
    }

    pub fn active_drag(&self) -> Option<String> {
        self.state.lock().active_drag.clone()
    }

    /// Drop an entry onto a target and see the move through.
    ///
    /// `target` is a stage key or, when dropping onto a card, another
    /// entry's id; an entry target resolves to the column that contains it.
    /// The entry moves locally before the backend is asked; the outcome
    /// says how the move settled.
    pub async fn complete_drag(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        target: &str,
    ) -> Result<TransitionOutcome, DropError> {
        let request = {
            let mut state = self.state.lock();

            let from_stage = match state.cache.stage_of(entry_id) {
                Some(stage) => stage.to_string(),
                None => return Err(DropError::UnknownEntry(entry_id.to_string())),
            };
            if state.in_flight.contains(entry_id) {
                return Err(DropError::TransitionPending(entry_id.to_string()));
            }

            let to_stage = if state.cache.contains_stage(target) {
                target.to_string()
            } else if let Some(stage) = state.cache.stage_of(target) {
                stage.to_string()
            } else {
                return Err(DropError::UnknownTarget(target.to_string()));
            };

            if to_stage == from_stage {
                if state.active_drag.as_deref() == Some(entry_id) {
                    state.active_drag = None;
                }
                return Ok(TransitionOutcome::NoOp { stage: from_stage });
            }

            // Optimistic move; the caller can re-render before the verdict
            state.cache.move_entry(entry_id, &to_stage);
            state.in_flight.insert(entry_id.to_string());
            TransitionRequest::new(entry_id, &from_stage, &to_stage)
        };

        debug!(
            "transition {}: {} -> {}",
            request.entry_id, request.from_stage, request.to_stage
        );
        let verdict = self.backend.transition_entry(ctx, &request).await;

        match verdict {
            Ok(TransitionVerdict::Accepted { message }) => {
                self.settle(&request.entry_id);
                let refreshed = match self.refresh(ctx).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("refetch after accepted transition failed: {}", e);
                        false
                    }
                };
                Ok(TransitionOutcome::Accepted {
                    request,
                    message,
                    refreshed,
                })
            }
            Ok(TransitionVerdict::Denied { reason, message }) => {
                let reverted = self.revert(&request);
                Ok(TransitionOutcome::Denied {
                    request,
                    reason,
                    message,
                    reverted,
                })
            }
            Err(error) => {
                let reverted = self.revert(&request);
                Ok(TransitionOutcome::Failed {
                    request,
                    error,
                    reverted,
                })
            }
        }
    }

    /// Delete an entry through the backend's safe-delete function.
    ///
    /// The entry leaves the board immediately; a refusal or failure puts it
    /// back where its status says it belongs.
    pub async fn remove_entry(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
    ) -> Result<DeleteOutcome, DropError> {
        let entry = {
            let mut state = self.state.lock();
            if state.in_flight.contains(entry_id) {
                return Err(DropError::TransitionPending(entry_id.to_string()));
            }
            let entry = state
                .cache
                .remove(entry_id)
                .ok_or_else(|| DropError::UnknownEntry(entry_id.to_string()))?;
            state.in_flight.insert(entry_id.to_string());
            if state.active_drag.as_deref() == Some(entry_id) {
                state.active_drag = None;
            }
            entry
        };

        debug!("delete {} ({})", entry_id, entry.entry_type.as_str());
        let verdict = self
            .backend
            .delete_entry(ctx, entry_id, entry.entry_type)
            .await;

        match verdict {
            Ok(DeleteVerdict::Removed { message }) => {
                self.settle(entry_id);
                Ok(DeleteOutcome::Removed {
                    entry_id: entry_id.to_string(),
                    message,
                })
            }
            Ok(DeleteVerdict::Blocked { reason, message }) => {
                let restored = self.reinstate(entry);
                Ok(DeleteOutcome::Blocked {
                    entry_id: entry_id.to_string(),
                    reason,
                    message,
                    restored,
                })
            }
            Err(error) => {
                let restored = self.reinstate(entry);
                Ok(DeleteOutcome::Failed {
                    entry_id: entry_id.to_string(),
                    error,
                    restored,
                })
            }
        }
    }

    /// Clear bookkeeping after a confirmed verdict
    fn settle(&self, entry_id: &str) {
        let mut state = self.state.lock();
        state.in_flight.remove(entry_id);
        if state.active_drag.as_deref() == Some(entry_id) {
            state.active_drag = None;
        }
    }

    /// Roll back an optimistic move. Only undoes what the move did: if a
    /// wholesale refresh rewrote the board mid-flight, server truth has
    /// already won and the revert degrades to a no-op.
    fn revert(&self, request: &TransitionRequest) -> bool {
        let mut state = self.state.lock();
        state.in_flight.remove(&request.entry_id);
        if state.active_drag.as_deref() == Some(request.entry_id.as_str()) {
            state.active_drag = None;
        }

        let still_in_target =
            state.cache.stage_of(&request.entry_id) == Some(request.to_stage.as_str());
        if still_in_target {
            state
                .cache
                .move_entry(&request.entry_id, &request.from_stage)
                .is_some()
        } else {
            debug!(
                "skipping revert for {}: board no longer shows it in {}",
                request.entry_id, request.to_stage
            );
            false
        }
    }

    /// Put a locally removed entry back after a refused or failed delete
    fn reinstate(&self, entry: PipelineEntry) -> bool {
        let mut state = self.state.lock();
        state.in_flight.remove(&entry.id);
        // A refresh may have brought it back already
        if state.cache.stage_of(&entry.id).is_some() {
            return true;
        }
        state.cache.restore(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::context::Role;
    use crate::models::{EntryKind, Stage};

    fn ctx() -> RequestContext {
        RequestContext::new("t-test", "u-test", Role::Office)
    }

    fn entry(id: &str, status: &str) -> PipelineEntry {
        PipelineEntry::new(id, status, EntryKind::Lead, "c-1")
    }

    #[tokio::test]
    async fn test_load_uses_tenant_stages_when_present() {
        let mock = MockBackend::new()
            .with_stages(vec![
                Stage::new("intake", "Intake", None, None, 1),
                Stage::new("done", "Done", None, None, 2),
            ])
            .with_entry(entry("e-1", "intake"));
        let controller = BoardController::new(Arc::new(mock));

        controller.load(&ctx()).await.unwrap();
        assert!(!controller.used_fallback());
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.columns.len(), 2);
        assert_eq!(snapshot.columns[0].stage.key, "intake");
        assert_eq!(snapshot.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_load_falls_back_when_tenant_has_no_stages() {
        let mock = MockBackend::new().with_entry(entry("e-1", "lead"));
        let controller = BoardController::new(Arc::new(mock));

        controller.load(&ctx()).await.unwrap();
        assert!(controller.used_fallback());
        assert_eq!(controller.snapshot().columns.len(), 7);
        assert_eq!(controller.stage_of("e-1").as_deref(), Some("lead"));
    }

    #[tokio::test]
    async fn test_begin_and_cancel_drag() {
        let mock = MockBackend::new().with_entry(entry("e-1", "lead"));
        let controller = BoardController::new(Arc::new(mock));
        controller.load(&ctx()).await.unwrap();

        assert_eq!(
            controller.begin_drag("e-9"),
            Err(DropError::UnknownEntry("e-9".to_string()))
        );
        controller.begin_drag("e-1").unwrap();
        assert_eq!(controller.active_drag().as_deref(), Some("e-1"));
        assert_eq!(controller.cancel_drag().as_deref(), Some("e-1"));
        assert!(controller.active_drag().is_none());
    }
}
