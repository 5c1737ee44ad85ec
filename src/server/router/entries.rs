//! Ledger entries: the records everything else exists to classify.

use axum::extract::{Path, Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::{NaiveDate, Utc};
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::{Entry, EntryKind, Id};
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

use crate::server::pipeline::{
    field_invalid, owner_id, parse_payload, parse_query, run_pipeline, store_err, to_json, Guard,
};
use crate::server::state::ServeState;

const KINDS: [&str; 3] = ["income", "expense", "transfer"];

static CREATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("account", Schema::text(1, 64)),
        Field::optional("card", Schema::text(1, 64)),
        Field::optional("category", Schema::text(1, 64)),
        Field::required("description", Schema::text(1, 140)),
        Field::required("amount_cents", Schema::integer()),
        Field::required("kind", Schema::OneOf(KINDS.to_vec())),
        Field::required("date", Schema::Date),
        Field::optional("paid", Schema::Boolean),
    ]))
});

static UPDATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("category", Schema::text(1, 64)),
        Field::optional("description", Schema::text(1, 140)),
        Field::optional("amount_cents", Schema::integer()),
        Field::optional("kind", Schema::OneOf(KINDS.to_vec())),
        Field::optional("date", Schema::Date),
        Field::optional("paid", Schema::Boolean),
    ]))
});

static LIST: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("account", Schema::text(1, 64)),
        Field::optional("category", Schema::text(1, 64)),
        Field::optional("from", Schema::Date),
        Field::optional("to", Schema::Date),
        Field::optional("paid", Schema::Boolean),
    ]))
});

pub fn router() -> Router<ServeState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

#[derive(Deserialize)]
struct CreateInput {
    account: String,
    card: Option<String>,
    category: Option<String>,
    description: String,
    amount_cents: i64,
    kind: EntryKind,
    date: NaiveDate,
    paid: Option<bool>,
}

#[derive(Deserialize)]
struct UpdateInput {
    category: Option<String>,
    description: Option<String>,
    amount_cents: Option<i64>,
    kind: Option<EntryKind>,
    date: Option<NaiveDate>,
    paid: Option<bool>,
}

#[derive(Deserialize)]
struct ListQuery {
    account: Option<String>,
    category: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    paid: Option<bool>,
}

async fn list(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::List, SubjectRef::of_type("Entry")).query(&LIST),
        move |hx| async move {
            let query: ListQuery = parse_query(&hx)?;
            let filter = EntryFilter {
                account: query.account.map(Id),
                category: query.category.map(Id),
                from: query.from,
                to: query.to,
                paid: query.paid,
            };
            let entries = store
                .entries_for(&owner_id(&hx)?, filter)
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(to_json(&entries)?))
        },
    )
    .await
}

async fn create(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Create, SubjectRef::of_type("Entry")).body(&CREATE),
        move |hx| async move {
            let owner = owner_id(&hx)?;
            let input: CreateInput = parse_payload(&hx)?;

            // References must point at the caller's own records.
            let account = Id(input.account);
            store
                .account(&owner, &account)
                .await
                .map_err(|_| field_invalid("account", "does not exist"))?;
            let card = match input.card {
                Some(card) => {
                    let card = Id(card);
                    store
                        .card(&owner, &card)
                        .await
                        .map_err(|_| field_invalid("card", "does not exist"))?;
                    Some(card)
                }
                None => None,
            };
            let category = match input.category {
                Some(category) => {
                    let category = Id(category);
                    store
                        .category(&owner, &category)
                        .await
                        .map_err(|_| field_invalid("category", "does not exist"))?;
                    Some(category)
                }
                None => None,
            };

            let entry = Entry {
                id: Id::new_random(),
                owner,
                account,
                card,
                category,
                description: input.description,
                amount_cents: input.amount_cents,
                kind: input.kind,
                date: input.date,
                paid: input.paid.unwrap_or(false),
                created_at: Utc::now(),
            };
            let entry = store.insert_entry(entry).await.map_err(store_err)?;
            Ok(Reply::created(to_json(&entry)?))
        },
    )
    .await
}

async fn show(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Read, SubjectRef::instance("Entry", id.clone())),
        move |hx| async move {
            let entry = store.entry(&owner_id(&hx)?, &Id(id)).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&entry)?))
        },
    )
    .await
}

async fn update(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::instance("Entry", id.clone())).body(&UPDATE),
        move |hx| async move {
            let owner = owner_id(&hx)?;
            let input: UpdateInput = parse_payload(&hx)?;
            let mut entry = store.entry(&owner, &Id(id)).await.map_err(store_err)?;

            if let Some(category) = input.category {
                let category = Id(category);
                store
                    .category(&owner, &category)
                    .await
                    .map_err(|_| field_invalid("category", "does not exist"))?;
                entry.category = Some(category);
            }
            if let Some(description) = input.description {
                entry.description = description;
            }
            if let Some(amount) = input.amount_cents {
                entry.amount_cents = amount;
            }
            if let Some(kind) = input.kind {
                entry.kind = kind;
            }
            if let Some(date) = input.date {
                entry.date = date;
            }
            if let Some(paid) = input.paid {
                entry.paid = paid;
            }
            let entry = store.update_entry(entry).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&entry)?))
        },
    )
    .await
}

async fn remove(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Delete, SubjectRef::instance("Entry", id.clone())),
        move |hx| async move {
            store
                .remove_entry(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(serde_json::json!({"deleted": true})))
        },
    )
    .await
}
