use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::types::{
    DeleteCall, DeleteVerdict, FunctionReply, TransitionCall, TransitionRequest, TransitionVerdict,
};
use super::Backend;
use crate::config::Config;
use crate::context::RequestContext;
use crate::models::{EntryKind, PipelineEntry, Stage};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Entity collection holding pipeline entries
const ENTRIES_COLLECTION: &str = "pipeline-entries";
/// Entity collection holding the tenant's stage configuration
const STAGES_COLLECTION: &str = "pipeline-stages";
/// Hosted function that judges stage moves
const TRANSITION_FUNCTION: &str = "transitionStatus";
/// Hosted function that deletes leads and jobs
const DELETE_FUNCTION: &str = "safeDelete";

/// Backend implementation over the hosted CRM's HTTP surface.
///
/// Entity collections are read with `GET {base}/api/entities/{name}`; server
/// functions are invoked by name with `POST {base}/api/functions/{name}`.
/// Tenant and actor travel as headers on every call, and each request gets
/// a fresh `X-Request-Id` for correlation with backend logs.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
    api_key: Option<String>,
}

impl HttpBackend {
    /// Create a backend client for the given base URL
    pub fn new(base_url: &str) -> ApiResult<Self> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(HttpBackend {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            api_key: None,
        })
    }

    /// Create a backend client from loaded configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let mut backend = Self::new(&config.api_url)?;
        backend.api_key = config.api_key.clone();
        Ok(backend)
    }

    /// Attach an API key, sent as a bearer token
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Replace the request timeout (rebuilds the underlying client)
    pub fn with_timeout(mut self, timeout: Duration) -> ApiResult<Self> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Build a full URL for an API path
    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach auth and context headers to a request
    fn decorate(&self, mut builder: RequestBuilder, ctx: &RequestContext) -> RequestBuilder {
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
            .header("X-Tenant-Id", &ctx.tenant_id)
            .header("X-User-Id", &ctx.user_id)
            .header("X-Role", ctx.role.as_str())
            .header("X-Request-Id", Uuid::new_v4().to_string())
    }

    /// Turn a non-success response into an error, preferring the backend's
    /// own wording when the body carries the standard envelope
    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_else(|_| String::new());
        let message = serde_json::from_str::<FunctionReply>(&body)
            .ok()
            .and_then(|reply| reply.error.or(reply.message))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    body.clone()
                }
            });

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_entities<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        collection: &str,
    ) -> ApiResult<Vec<T>> {
        let url = self.url(&format!("entities/{}", collection));
        debug!("GET {} (tenant {})", url, ctx.tenant_id);

        let response = self.decorate(self.http.get(&url), ctx).send().await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn invoke<B: Serialize>(
        &self,
        ctx: &RequestContext,
        function: &str,
        body: &B,
    ) -> ApiResult<FunctionReply> {
        let url = self.url(&format!("functions/{}", function));
        debug!("POST {} (tenant {}, user {})", url, ctx.tenant_id, ctx.user_id);

        let response = self
            .decorate(self.http.post(&url).json(body), ctx)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        // An empty 2xx body counts as success with nothing to relay
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(FunctionReply::default());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_stages(&self, ctx: &RequestContext) -> ApiResult<Vec<Stage>> {
        self.get_entities(ctx, STAGES_COLLECTION).await
    }

    async fn fetch_entries(&self, ctx: &RequestContext) -> ApiResult<Vec<PipelineEntry>> {
        self.get_entities(ctx, ENTRIES_COLLECTION).await
    }

    async fn transition_entry(
        &self,
        ctx: &RequestContext,
        request: &TransitionRequest,
    ) -> ApiResult<TransitionVerdict> {
        let call = TransitionCall::from_request(request);
        let reply = self.invoke(ctx, TRANSITION_FUNCTION, &call).await?;
        Ok(reply.into_transition_verdict())
    }

    async fn delete_entry(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        entry_type: EntryKind,
    ) -> ApiResult<DeleteVerdict> {
        let call = DeleteCall {
            entry_id,
            entry_type,
        };
        let reply = self.invoke(ctx, DELETE_FUNCTION, &call).await?;
        Ok(reply.into_delete_verdict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_scheme() {
        let result = HttpBackend::new("crm.example.com");
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
        let result = HttpBackend::new("ftp://crm.example.com");
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_join() {
        let backend = HttpBackend::new("https://crm.example.com/").unwrap();
        assert_eq!(
            backend.url("entities/pipeline-entries"),
            "https://crm.example.com/api/entities/pipeline-entries"
        );
        assert_eq!(
            backend.url("/functions/transitionStatus"),
            "https://crm.example.com/api/functions/transitionStatus"
        );
    }

    #[test]
    fn test_with_api_key() {
        let backend = HttpBackend::new("https://crm.example.com")
            .unwrap()
            .with_api_key("secret");
        assert_eq!(backend.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_with_timeout() {
        let backend = HttpBackend::new("https://crm.example.com")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert!(backend.is_ok());
    }
}
