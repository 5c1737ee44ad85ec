use crate::context::{ProtoRequest, ProtoResponse, RequestContext};
use crate::errors::{self, InterceptError};
use crate::stages::{Stage, StageOutcome};
use async_trait::async_trait;
use fintrack_auth::prelude::{AbilityResolver, Action, SubjectRef};
use std::sync::Arc;

/// Permission gate. Resolves the subject's abilities once per request and
/// checks the route's declared action against them. Denials are audited.
pub struct Permit {
    resolver: Arc<dyn AbilityResolver>,
    action: Action,
    subject_ref: SubjectRef,
}

impl Permit {
    pub fn new(resolver: Arc<dyn AbilityResolver>, action: Action, subject_ref: SubjectRef) -> Self {
        Self {
            resolver,
            action,
            subject_ref,
        }
    }
}

#[async_trait]
impl Stage for Permit {
    fn name(&self) -> &'static str {
        "permit"
    }

    async fn apply(
        &self,
        cx: &mut RequestContext,
        _req: &mut dyn ProtoRequest,
        _res: &mut dyn ProtoResponse,
    ) -> Result<StageOutcome, InterceptError> {
        let subject = cx
            .subject
            .clone()
            .ok_or_else(|| errors::internal("permission gate ran before authentication"))?;

        // Resolved once; handlers reuse the same set for any extra checks.
        if cx.abilities.is_none() {
            cx.abilities = Some(self.resolver.resolve(&subject).await?);
        }
        let abilities = cx
            .abilities
            .as_ref()
            .ok_or_else(|| errors::internal("ability set missing after resolution"))?;

        let decision = abilities.check(self.action, &self.subject_ref);
        if !decision.allow {
            tracing::warn!(
                request_id = %cx.request_id,
                subject = %subject.subject_id,
                action = self.action.as_str(),
                target = %self.subject_ref,
                reason = decision.reason.as_deref().unwrap_or(""),
                "permission denied"
            );
            return Err(errors::forbidden(&format!(
                "{} on {} denied",
                self.action.as_str(),
                self.subject_ref
            )));
        }
        Ok(StageOutcome::Continue)
    }
}
