use axum::extract::{Path, Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::{CreditCard, Id};
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

use crate::server::pipeline::{owner_id, parse_payload, run_pipeline, store_err, to_json, Guard};
use crate::server::state::ServeState;

static CREATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("name", Schema::text(1, 80)),
        Field::required("limit_cents", Schema::integer_in(0, i64::MAX)),
        // 1-28 so the closing day exists in every month.
        Field::required("closing_day", Schema::integer_in(1, 28)),
        Field::required("due_day", Schema::integer_in(1, 28)),
    ]))
});

static UPDATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("name", Schema::text(1, 80)),
        Field::optional("limit_cents", Schema::integer_in(0, i64::MAX)),
        Field::optional("closing_day", Schema::integer_in(1, 28)),
        Field::optional("due_day", Schema::integer_in(1, 28)),
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
    limit_cents: i64,
    closing_day: u8,
    due_day: u8,
}

#[derive(Deserialize)]
struct UpdateInput {
    name: Option<String>,
    limit_cents: Option<i64>,
    closing_day: Option<u8>,
    due_day: Option<u8>,
}

async fn list(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::List, SubjectRef::of_type("CreditCard")),
        move |hx| async move {
            let cards = store.cards_for(&owner_id(&hx)?).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&cards)?))
        },
    )
    .await
}

async fn create(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Create, SubjectRef::of_type("CreditCard")).body(&CREATE),
        move |hx| async move {
            let input: CreateInput = parse_payload(&hx)?;
            let card = CreditCard {
                id: Id::new_random(),
                owner: owner_id(&hx)?,
                name: input.name,
                limit_cents: input.limit_cents,
                closing_day: input.closing_day,
                due_day: input.due_day,
                created_at: Utc::now(),
            };
            let card = store.insert_card(card).await.map_err(store_err)?;
            Ok(Reply::created(to_json(&card)?))
        },
    )
    .await
}

async fn show(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Read, SubjectRef::instance("CreditCard", id.clone())),
        move |hx| async move {
            let card = store.card(&owner_id(&hx)?, &Id(id)).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&card)?))
        },
    )
    .await
}

async fn update(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::instance("CreditCard", id.clone()))
            .body(&UPDATE),
        move |hx| async move {
            let input: UpdateInput = parse_payload(&hx)?;
            let mut card = store.card(&owner_id(&hx)?, &Id(id)).await.map_err(store_err)?;
            if let Some(name) = input.name {
                card.name = name;
            }
            if let Some(limit) = input.limit_cents {
                card.limit_cents = limit;
            }
            if let Some(day) = input.closing_day {
                card.closing_day = day;
            }
            if let Some(day) = input.due_day {
                card.due_day = day;
            }
            let card = store.update_card(card).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&card)?))
        },
    )
    .await
}

async fn remove(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Delete, SubjectRef::instance("CreditCard", id.clone())),
        move |hx| async move {
            store
                .remove_card(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(serde_json::json!({"deleted": true})))
        },
    )
    .await
}
