use crate::errors::InterceptError;
use fintrack_auth::prelude::AbilitySet;
use fintrack_core_types::prelude::Subject;
use serde_json::Value;

/// Mutable per-request state threaded through the stages. Created empty by
/// the adapter; stages fill it in as they run.
#[derive(Debug, Default)]
pub struct RequestContext {
    pub request_id: String,
    pub debug_errors: bool,
    pub subject: Option<Subject>,
    pub abilities: Option<AbilitySet>,
    /// Normalized request body, present after the body schema guard.
    pub payload: Option<Value>,
    /// Normalized query parameters, present after the query schema guard.
    pub query: Option<Value>,
}

impl RequestContext {
    pub fn new(debug_errors: bool) -> Self {
        Self {
            debug_errors,
            ..Self::default()
        }
    }
}

/// Owned snapshot handed to the route handler once every stage has passed.
#[derive(Debug)]
pub struct HandlerCx {
    pub request_id: String,
    pub subject: Option<Subject>,
    pub abilities: Option<AbilitySet>,
    pub payload: Option<Value>,
    pub query: Option<Value>,
}

impl HandlerCx {
    pub(crate) fn snapshot(cx: &RequestContext) -> Self {
        Self {
            request_id: cx.request_id.clone(),
            subject: cx.subject.clone(),
            abilities: cx.abilities.clone(),
            payload: cx.payload.clone(),
            query: cx.query.clone(),
        }
    }

    /// The authenticated subject. Only valid on routes behind the authn
    /// stage, hence the error rather than a panic.
    pub fn subject(&self) -> Result<&Subject, InterceptError> {
        self.subject
            .as_ref()
            .ok_or_else(|| crate::errors::internal("handler ran without an authenticated subject"))
    }

    pub fn payload(&self) -> Result<&Value, InterceptError> {
        self.payload
            .as_ref()
            .ok_or_else(|| crate::errors::internal("handler ran without a validated payload"))
    }
}

/// Transport-agnostic view of an incoming request.
pub trait ProtoRequest: Send {
    fn method(&self) -> &str;
    fn path(&self) -> &str;
    fn header(&self, name: &str) -> Option<String>;
    fn query(&self) -> Option<&str>;
    /// Parses the body as JSON. `None` for an empty body; a present but
    /// malformed body is an error.
    fn read_json(&mut self) -> Result<Option<Value>, InterceptError>;
}

/// Transport-agnostic response under construction.
pub trait ProtoResponse: Send {
    fn set_status(&mut self, status: u16);
    fn insert_header(&mut self, name: &str, value: &str);
    fn write_json(&mut self, body: Value);
}
