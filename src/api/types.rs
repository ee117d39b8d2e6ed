use serde::{Deserialize, Serialize};

use crate::models::EntryKind;

/// A requested stage move, as judged by the transition authority.
///
/// `from_stage` is the stage the entry was in when the gesture started, not
/// whatever the cache says later; the authority audit-logs it and the
/// controller rolls back to it on refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub entry_id: String,
    pub from_stage: String,
    pub to_stage: String,
}

impl TransitionRequest {
    pub fn new(entry_id: &str, from_stage: &str, to_stage: &str) -> Self {
        TransitionRequest {
            entry_id: entry_id.to_string(),
            from_stage: from_stage.to_string(),
            to_stage: to_stage.to_string(),
        }
    }
}

/// Wire body for the `transitionStatus` backend function
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionCall<'a> {
    pub entry_id: &'a str,
    pub new_status: &'a str,
    pub from_status: &'a str,
}

impl<'a> TransitionCall<'a> {
    pub fn from_request(request: &'a TransitionRequest) -> Self {
        TransitionCall {
            entry_id: &request.entry_id,
            new_status: &request.to_stage,
            from_status: &request.from_stage,
        }
    }
}

/// Wire body for the `safeDelete` backend function
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCall<'a> {
    pub entry_id: &'a str,
    pub entry_type: EntryKind,
}

/// Reply envelope shared by the backend functions.
///
/// The functions signal refusal in-band: a 2xx reply carrying an `error`
/// field is a refusal, not a transport failure. Any other fields in the
/// body are ignored; a success without `message` is still a success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FunctionReply {
    pub fn into_transition_verdict(self) -> TransitionVerdict {
        match self.error {
            Some(reason) => TransitionVerdict::Denied {
                reason,
                message: self.message,
            },
            None => TransitionVerdict::Accepted {
                message: self.message.unwrap_or_default(),
            },
        }
    }

    pub fn into_delete_verdict(self) -> DeleteVerdict {
        match self.error {
            Some(reason) => DeleteVerdict::Blocked {
                reason,
                message: self.message,
            },
            None => DeleteVerdict::Removed {
                message: self.message,
            },
        }
    }
}

/// The transition authority's answer to a stage move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionVerdict {
    /// The move is recorded server-side; `message` is whatever the backend
    /// wants relayed to the user (may be empty)
    Accepted { message: String },
    /// The backend refused the move; the entry must go back where it was
    Denied {
        reason: String,
        message: Option<String>,
    },
}

/// The backend's answer to a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteVerdict {
    Removed { message: Option<String> },
    Blocked {
        reason: String,
        message: Option<String>,
    },
}
