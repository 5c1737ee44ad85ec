use crate::context::{ProtoRequest, ProtoResponse, RequestContext};
use crate::errors::{self, InterceptError};
use crate::stages::{Stage, StageOutcome};
use async_trait::async_trait;
use fintrack_auth::prelude::{Authenticator, AuthnInput};
use std::sync::Arc;

/// Resolves the bearer credential into a Subject and pins it on the context.
pub struct AuthnMap {
    authenticator: Arc<dyn Authenticator>,
}

impl AuthnMap {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Stage for AuthnMap {
    fn name(&self) -> &'static str {
        "authn_map"
    }

    async fn apply(
        &self,
        cx: &mut RequestContext,
        req: &mut dyn ProtoRequest,
        _res: &mut dyn ProtoResponse,
    ) -> Result<StageOutcome, InterceptError> {
        let header = req
            .header("authorization")
            .ok_or_else(|| errors::unauthenticated("missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| errors::unauthenticated("authorization header is not a bearer token"))?;

        let subject = self
            .authenticator
            .authenticate(AuthnInput::Bearer(token.to_string()))
            .await?;
        tracing::debug!(request_id = %cx.request_id, subject = %subject.subject_id, "authenticated");
        cx.subject = Some(subject);
        Ok(StageOutcome::Continue)
    }
}
