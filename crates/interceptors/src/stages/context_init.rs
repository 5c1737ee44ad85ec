use crate::context::{ProtoRequest, ProtoResponse, RequestContext};
use crate::errors::InterceptError;
use crate::stages::{Stage, StageOutcome};
use async_trait::async_trait;

/// First stage on every route: adopts the caller's `X-Request-Id` or mints
/// one, so every log line and response carries the same id.
pub struct ContextInit;

#[async_trait]
impl Stage for ContextInit {
    fn name(&self) -> &'static str {
        "context_init"
    }

    async fn apply(
        &self,
        cx: &mut RequestContext,
        req: &mut dyn ProtoRequest,
        _res: &mut dyn ProtoResponse,
    ) -> Result<StageOutcome, InterceptError> {
        if cx.request_id.is_empty() {
            cx.request_id = req
                .header("x-request-id")
                .filter(|id| !id.is_empty() && id.len() <= 128)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        }
        tracing::debug!(
            request_id = %cx.request_id,
            method = req.method(),
            path = req.path(),
            "request"
        );
        Ok(StageOutcome::Continue)
    }
}
