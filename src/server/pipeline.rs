//! Per-route pipeline assembly. A route declares its guard (schemas, authn,
//! permission) and a handler; everything else is the shared chain.

use axum::extract::Request;
use axum::response::Response;
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::Id;
use fintrack_errors::prelude::{codes, ErrorBuilder};
use fintrack_interceptors::errors as ierr;
use fintrack_interceptors::prelude::*;
use fintrack_interceptors::schema::Schema;
use fintrack_store::prelude::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;

use crate::server::state::ServeState;

pub struct Guard {
    body: Option<Arc<Schema>>,
    query: Option<Arc<Schema>>,
    authenticate: bool,
    permit: Option<(Action, SubjectRef)>,
}

impl Guard {
    pub fn public() -> Self {
        Self {
            body: None,
            query: None,
            authenticate: false,
            permit: None,
        }
    }

    pub fn protected(action: Action, subject_ref: SubjectRef) -> Self {
        Self {
            body: None,
            query: None,
            authenticate: true,
            permit: Some((action, subject_ref)),
        }
    }

    pub fn body(mut self, schema: &Arc<Schema>) -> Self {
        self.body = Some(schema.clone());
        self
    }

    pub fn query(mut self, schema: &Arc<Schema>) -> Self {
        self.query = Some(schema.clone());
        self
    }
}

/// Stage order is fixed: context, body schema, query schema, authn, permit.
pub async fn run_pipeline<F, Fut>(
    state: &ServeState,
    req: Request,
    guard: Guard,
    handler: F,
) -> Response
where
    F: FnOnce(HandlerCx) -> Fut + Send,
    Fut: Future<Output = Result<Reply, InterceptError>> + Send,
{
    let mut stages: Vec<Arc<dyn Stage>> = vec![Arc::new(ContextInit)];
    if let Some(schema) = guard.body {
        stages.push(Arc::new(SchemaGuard::body(schema)));
    }
    if let Some(schema) = guard.query {
        stages.push(Arc::new(SchemaGuard::query(schema)));
    }
    if guard.authenticate {
        stages.push(Arc::new(AuthnMap::new(state.auth.authenticator.clone())));
    }
    if let Some((action, subject_ref)) = guard.permit {
        stages.push(Arc::new(Permit::new(
            state.auth.resolver.clone(),
            action,
            subject_ref,
        )));
    }
    let chain = RequestChain::new(stages);
    handle_with_chain(req, &chain, state.debug_errors, handler).await
}

pub fn store_err(err: StoreError) -> InterceptError {
    match err {
        StoreError::NotFound { what } => ierr::not_found(what),
        StoreError::Conflict { what } => InterceptError(
            ErrorBuilder::new(codes::SCHEMA_VALIDATION)
                .user_msg(format!("The {what} is already taken."))
                .build(),
        ),
        StoreError::Invalid(msg) => ierr::schema_msg(&msg),
        StoreError::Unavailable(msg) => ierr::internal(&msg),
    }
}

pub fn field_invalid(path: &str, message: &str) -> InterceptError {
    InterceptError(
        ErrorBuilder::new(codes::SCHEMA_VALIDATION)
            .field_error(path, message)
            .build(),
    )
}

/// Decodes the validated body into a typed input. The schema guard already
/// ran, so a decode failure here is a programming error, not a client one.
pub fn parse_payload<T: DeserializeOwned>(hx: &HandlerCx) -> Result<T, InterceptError> {
    serde_json::from_value(hx.payload()?.clone())
        .map_err(|err| ierr::internal(&format!("payload decode: {err}")))
}

pub fn parse_query<T: DeserializeOwned>(hx: &HandlerCx) -> Result<T, InterceptError> {
    let value = hx.query.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(value).map_err(|err| ierr::internal(&format!("query decode: {err}")))
}

pub fn owner_id(hx: &HandlerCx) -> Result<Id, InterceptError> {
    Ok(hx.subject()?.subject_id.clone())
}

pub fn to_json<T: Serialize>(value: &T) -> Result<Value, InterceptError> {
    serde_json::to_value(value).map_err(|err| ierr::internal(&format!("encode: {err}")))
}
