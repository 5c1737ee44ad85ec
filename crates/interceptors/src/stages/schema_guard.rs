use crate::context::{ProtoRequest, ProtoResponse, RequestContext};
use crate::errors::{self, InterceptError};
use crate::schema::{self, Schema};
use crate::stages::{Stage, StageOutcome};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone, Copy, Debug)]
pub enum PayloadSource {
    Body,
    Query,
}

/// Validates and normalizes one payload source. Runs before authentication:
/// a malformed request is rejected as malformed even when it also lacks
/// credentials.
pub struct SchemaGuard {
    source: PayloadSource,
    schema: Arc<Schema>,
}

impl SchemaGuard {
    pub fn body(schema: Arc<Schema>) -> Self {
        Self {
            source: PayloadSource::Body,
            schema,
        }
    }

    pub fn query(schema: Arc<Schema>) -> Self {
        Self {
            source: PayloadSource::Query,
            schema,
        }
    }
}

#[async_trait]
impl Stage for SchemaGuard {
    fn name(&self) -> &'static str {
        "schema_guard"
    }

    async fn apply(
        &self,
        cx: &mut RequestContext,
        req: &mut dyn ProtoRequest,
        _res: &mut dyn ProtoResponse,
    ) -> Result<StageOutcome, InterceptError> {
        let raw = match self.source {
            PayloadSource::Body => req.read_json()?.unwrap_or_else(|| json!({})),
            PayloadSource::Query => schema::query_to_value(req.query().unwrap_or_default()),
        };

        let normalized = self
            .schema
            .validate(&raw)
            .map_err(|violations| errors::schema(schema::to_error_map(violations)))?;

        match self.source {
            PayloadSource::Body => cx.payload = Some(normalized),
            PayloadSource::Query => cx.query = Some(normalized),
        }
        Ok(StageOutcome::Continue)
    }
}
