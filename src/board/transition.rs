use thiserror::Error;

use crate::api::{ApiError, TransitionRequest};

/// Client-side reasons a drop never reached the backend.
///
/// These are caught before any optimistic mutation, so the board is exactly
/// as it was when one of them comes back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DropError {
    #[error("no pipeline entry '{0}' on the board")]
    UnknownEntry(String),

    #[error("'{0}' is neither a stage key nor an entry on the board")]
    UnknownTarget(String),

    /// An earlier move for the same entry is still waiting on its verdict
    #[error("entry '{0}' already has a transition in flight")]
    TransitionPending(String),
}

/// How a completed drag settled.
///
/// Every drop that passed client-side checks produces exactly one of these.
/// `Denied` and `Failed` both mean the entry snapped back to
/// `request.from_stage` (unless `reverted` is false because a wholesale
/// refresh already rewrote the board mid-flight).
#[derive(Debug)]
pub enum TransitionOutcome {
    /// Dropped on the stage it was already in; no call was made
    NoOp { stage: String },

    /// The backend recorded the move; `refreshed` reports whether the
    /// follow-up refetch of server state succeeded
    Accepted {
        request: TransitionRequest,
        message: String,
        refreshed: bool,
    },

    /// The backend refused the move
    Denied {
        request: TransitionRequest,
        reason: String,
        message: Option<String>,
        reverted: bool,
    },

    /// The call never completed; treated exactly like a denial locally
    Failed {
        request: TransitionRequest,
        error: ApiError,
        reverted: bool,
    },
}

impl TransitionOutcome {
    /// Did the entry end up in the requested stage?
    pub fn moved(&self) -> bool {
        matches!(self, TransitionOutcome::Accepted { .. })
    }
}

/// How a delete request settled
#[derive(Debug)]
pub enum DeleteOutcome {
    /// Gone server-side and locally
    Removed {
        entry_id: String,
        message: Option<String>,
    },

    /// The backend refused; `restored` reports whether the entry is back on
    /// the board
    Blocked {
        entry_id: String,
        reason: String,
        message: Option<String>,
        restored: bool,
    },

    /// The call never completed; treated like a refusal locally
    Failed {
        entry_id: String,
        error: ApiError,
        restored: bool,
    },
}
