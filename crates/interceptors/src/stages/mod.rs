//! The ordered stage driver.

pub mod authn_map;
pub mod context_init;
pub mod permit;
pub mod schema_guard;

use crate::context::{HandlerCx, ProtoRequest, ProtoResponse, RequestContext};
use crate::envelope;
use crate::errors::InterceptError;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

pub enum StageOutcome {
    Continue,
    /// The stage has written a complete response; nothing after it runs.
    ShortCircuit,
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(
        &self,
        cx: &mut RequestContext,
        req: &mut dyn ProtoRequest,
        res: &mut dyn ProtoResponse,
    ) -> Result<StageOutcome, InterceptError>;
}

/// What a handler produces: a status and the `data` half of the envelope.
/// The driver wraps it; handlers never build envelopes themselves.
pub struct Reply {
    pub status: u16,
    pub data: Value,
}

impl Reply {
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }

    pub fn created(data: Value) -> Self {
        Self { status: 201, data }
    }
}

#[derive(Clone, Default)]
pub struct RequestChain {
    stages: Vec<Arc<dyn Stage>>,
}

impl RequestChain {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Runs the stages in declaration order, then the handler. The first
    /// stage failure aborts the run; the caller renders the error.
    pub async fn run_with_handler<F, Fut>(
        &self,
        cx: &mut RequestContext,
        req: &mut dyn ProtoRequest,
        res: &mut dyn ProtoResponse,
        handler: F,
    ) -> Result<(), InterceptError>
    where
        F: FnOnce(HandlerCx) -> Fut + Send,
        Fut: Future<Output = Result<Reply, InterceptError>> + Send,
    {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), path = req.path(), "stage");
            match stage.apply(cx, req, res).await {
                Ok(StageOutcome::Continue) => {}
                Ok(StageOutcome::ShortCircuit) => return Ok(()),
                Err(err) => return Err(err),
            }
        }

        let reply = handler(HandlerCx::snapshot(cx)).await?;
        res.set_status(reply.status);
        res.insert_header("x-request-id", &cx.request_id);
        res.write_json(envelope::success(reply.data, &cx.request_id));
        Ok(())
    }
}

/// Shared error rendering for stages that finish a response themselves and
/// for the adapter's error path.
pub fn write_error(res: &mut dyn ProtoResponse, err: &InterceptError, cx: &RequestContext) {
    res.set_status(err.0.http_status);
    if !cx.request_id.is_empty() {
        res.insert_header("x-request-id", &cx.request_id);
    }
    res.write_json(envelope::failure(&err.0, cx.debug_errors));
}
