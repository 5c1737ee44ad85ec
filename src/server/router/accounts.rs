use axum::extract::{Path, Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::{Account, AccountKind, Id};
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

use crate::server::pipeline::{owner_id, parse_payload, run_pipeline, store_err, to_json, Guard};
use crate::server::state::ServeState;

const KINDS: [&str; 4] = ["checking", "savings", "investment", "cash"];

static CREATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("name", Schema::text(1, 80)),
        Field::required("kind", Schema::OneOf(KINDS.to_vec())),
        Field::optional("balance_cents", Schema::integer()),
    ]))
});

static UPDATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("name", Schema::text(1, 80)),
        Field::optional("kind", Schema::OneOf(KINDS.to_vec())),
        Field::optional("balance_cents", Schema::integer()),
    ]))
});

pub fn router() -> Router<ServeState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

#[derive(Deserialize)]
struct CreateInput {
    name: String,
    kind: AccountKind,
    balance_cents: Option<i64>,
}

#[derive(Deserialize)]
struct UpdateInput {
    name: Option<String>,
    kind: Option<AccountKind>,
    balance_cents: Option<i64>,
}

async fn list(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::List, SubjectRef::of_type("Account")),
        move |hx| async move {
            let accounts = store.accounts_for(&owner_id(&hx)?).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&accounts)?))
        },
    )
    .await
}

async fn create(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Create, SubjectRef::of_type("Account")).body(&CREATE),
        move |hx| async move {
            let input: CreateInput = parse_payload(&hx)?;
            let account = Account {
                id: Id::new_random(),
                owner: owner_id(&hx)?,
                name: input.name,
                kind: input.kind,
                balance_cents: input.balance_cents.unwrap_or(0),
                created_at: Utc::now(),
            };
            let account = store.insert_account(account).await.map_err(store_err)?;
            Ok(Reply::created(to_json(&account)?))
        },
    )
    .await
}

async fn show(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Read, SubjectRef::instance("Account", id.clone())),
        move |hx| async move {
            let account = store
                .account(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(to_json(&account)?))
        },
    )
    .await
}

async fn update(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::instance("Account", id.clone())).body(&UPDATE),
        move |hx| async move {
            let input: UpdateInput = parse_payload(&hx)?;
            let mut account = store
                .account(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            if let Some(name) = input.name {
                account.name = name;
            }
            if let Some(kind) = input.kind {
                account.kind = kind;
            }
            if let Some(balance) = input.balance_cents {
                account.balance_cents = balance;
            }
            let account = store.update_account(account).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&account)?))
        },
    )
    .await
}

async fn remove(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Delete, SubjectRef::instance("Account", id.clone())),
        move |hx| async move {
            store
                .remove_account(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(serde_json::json!({"deleted": true})))
        },
    )
    .await
}
