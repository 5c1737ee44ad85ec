use async_trait::async_trait;
use fintrack_auth::prelude::*;
use fintrack_core_types::prelude::{Id, Subject, SubjectKind};
use fintrack_interceptors::prelude::*;
use fintrack_interceptors::stages::schema_guard::SchemaGuard as Guard;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct MockReq {
    method: &'static str,
    path: &'static str,
    headers: HashMap<String, String>,
    query: Option<String>,
    body: Option<Value>,
}

impl MockReq {
    fn post(path: &'static str, body: Value) -> Self {
        Self {
            method: "POST",
            path,
            headers: HashMap::new(),
            query: None,
            body: Some(body),
        }
    }

    fn bearer(mut self, token: &str) -> Self {
        self.headers
            .insert("authorization".to_string(), format!("Bearer {token}"));
        self
    }
}

impl ProtoRequest for MockReq {
    fn method(&self) -> &str {
        self.method
    }

    fn path(&self) -> &str {
        self.path
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).cloned()
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn read_json(&mut self) -> Result<Option<Value>, InterceptError> {
        Ok(self.body.clone())
    }
}

#[derive(Default)]
struct MockRes {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl ProtoResponse for MockRes {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn insert_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn write_json(&mut self, body: Value) {
        self.body = Some(body);
    }
}

struct StaticAuthenticator;

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, input: AuthnInput) -> Result<Subject, AuthError> {
        let AuthnInput::Bearer(token) = input;
        if token == "good" {
            Ok(Subject {
                kind: SubjectKind::User,
                subject_id: Id("user-1".into()),
                email: "ada@example.com".into(),
                display_name: "Ada".into(),
                claims: serde_json::Map::new(),
            })
        } else {
            Err(fintrack_auth::errors::unauthenticated("bad token"))
        }
    }
}

struct CountingResolver {
    calls: Arc<AtomicUsize>,
    rules: Vec<AbilityRule>,
}

#[async_trait]
impl AbilityResolver for CountingResolver {
    async fn resolve(&self, _subject: &Subject) -> Result<AbilitySet, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AbilitySet::from_rules(self.rules.clone()))
    }
}

fn chain(rules: Vec<AbilityRule>, calls: Arc<AtomicUsize>) -> RequestChain {
    let schema = Arc::new(Schema::object(vec![Field::required(
        "name",
        Schema::text(1, 40),
    )]));
    let resolver = Arc::new(CountingResolver { calls, rules });
    RequestChain::new(vec![
        Arc::new(ContextInit),
        Arc::new(Guard::body(schema)),
        Arc::new(AuthnMap::new(Arc::new(StaticAuthenticator))),
        Arc::new(Permit::new(
            resolver,
            Action::Create,
            SubjectRef::of_type("Account"),
        )),
    ])
}

async fn run(
    chain: &RequestChain,
    req: &mut MockReq,
    handler_calls: Arc<AtomicUsize>,
) -> (Result<(), InterceptError>, MockRes) {
    let mut cx = RequestContext::new(false);
    let mut res = MockRes::default();
    let outcome = chain
        .run_with_handler(&mut cx, req, &mut res, move |_cx| async move {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::created(json!({"id": "a1"})))
        })
        .await;
    (outcome, res)
}

#[tokio::test]
async fn malformed_body_fails_before_authentication() {
    let resolver_calls = Arc::new(AtomicUsize::new(0));
    let chain = chain(
        vec![AbilityRule::allow(Action::Manage, SubjectMatch::All)],
        resolver_calls.clone(),
    );
    // No credential at all; the schema failure must win.
    let mut req = MockReq::post("/v1/accounts", json!({"name": ""}));
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let (outcome, _res) = run(&chain, &mut req, handler_calls.clone()).await;

    let err = outcome.unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
    assert_eq!(resolver_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_credential_is_unauthenticated() {
    let resolver_calls = Arc::new(AtomicUsize::new(0));
    let chain = chain(
        vec![AbilityRule::allow(Action::Manage, SubjectMatch::All)],
        resolver_calls.clone(),
    );
    let mut req = MockReq::post("/v1/accounts", json!({"name": "Main"}));
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let (outcome, _res) = run(&chain, &mut req, handler_calls.clone()).await;

    assert_eq!(outcome.unwrap_err().status(), 401);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
    // Abilities are never resolved for an unauthenticated request.
    assert_eq!(resolver_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn denied_request_never_reaches_the_handler() {
    let chain = chain(Vec::new(), Arc::new(AtomicUsize::new(0)));
    let mut req = MockReq::post("/v1/accounts", json!({"name": "Main"})).bearer("good");
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let (outcome, _res) = run(&chain, &mut req, handler_calls.clone()).await;

    assert_eq!(outcome.unwrap_err().status(), 403);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn allowed_request_gets_enveloped_reply_and_request_id() {
    let resolver_calls = Arc::new(AtomicUsize::new(0));
    let chain = chain(
        vec![AbilityRule::allow(Action::Manage, SubjectMatch::All)],
        resolver_calls.clone(),
    );
    let mut req = MockReq::post("/v1/accounts", json!({"name": "Main"})).bearer("good");
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let (outcome, res) = run(&chain, &mut req, handler_calls.clone()).await;

    outcome.unwrap();
    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver_calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.status, Some(201));

    let body = res.body.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], "a1");
    let request_id = body["meta"]["request_id"].as_str().unwrap();
    assert!(!request_id.is_empty());
    assert!(res
        .headers
        .iter()
        .any(|(name, value)| name == "x-request-id" && value == request_id));
}

#[tokio::test]
async fn handler_sees_normalized_payload_and_subject() {
    let chain = chain(
        vec![AbilityRule::allow(Action::Manage, SubjectMatch::All)],
        Arc::new(AtomicUsize::new(0)),
    );
    let mut req =
        MockReq::post("/v1/accounts", json!({"name": "Main", "extra": true})).bearer("good");
    let mut cx = RequestContext::new(false);
    let mut res = MockRes::default();

    chain
        .run_with_handler(&mut cx, &mut req, &mut res, |hx| async move {
            let payload = hx.payload()?.clone();
            assert!(payload.get("extra").is_none());
            assert_eq!(payload["name"], "Main");
            assert_eq!(hx.subject()?.subject_id, Id("user-1".into()));
            Ok(Reply::ok(json!({})))
        })
        .await
        .unwrap();
}
