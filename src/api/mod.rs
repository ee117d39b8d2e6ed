// Backend access layer
// One hosted service provides everything the board needs; the trait splits
// its surface so tests can script each call independently.

pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use http::HttpBackend;
pub use mock::MockBackend;
pub use types::{DeleteVerdict, FunctionReply, TransitionRequest, TransitionVerdict};

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::models::{EntryKind, PipelineEntry, Stage};

/// Backend surface the pipeline board runs against.
///
/// Reads return authoritative server state; the two mutating calls return
/// verdicts rather than data, and a refusal is an `Ok` verdict, never an
/// `Err`. Errors mean the call itself did not complete.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Tenant stage configuration. An empty list means the tenant has none
    /// and the caller should fall back to the built-in pipeline.
    async fn fetch_stages(&self, ctx: &RequestContext) -> ApiResult<Vec<Stage>>;

    /// The full authoritative entry list for the tenant
    async fn fetch_entries(&self, ctx: &RequestContext) -> ApiResult<Vec<PipelineEntry>>;

    /// Ask the transition authority to record a stage move
    async fn transition_entry(
        &self,
        ctx: &RequestContext,
        request: &TransitionRequest,
    ) -> ApiResult<TransitionVerdict>;

    /// Ask the backend to delete an entry of the given kind
    async fn delete_entry(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        entry_type: EntryKind,
    ) -> ApiResult<DeleteVerdict>;
}
