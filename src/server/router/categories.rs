use axum::extract::{Path, Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::{Category, Id};
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

use crate::server::pipeline::{owner_id, parse_payload, run_pipeline, store_err, to_json, Guard};
use crate::server::state::ServeState;

static CREATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("name", Schema::text(1, 60)),
        Field::optional("color", Schema::text(1, 20)),
    ]))
});

static UPDATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("name", Schema::text(1, 60)),
        Field::optional("color", Schema::text(1, 20)),
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
    color: Option<String>,
}

#[derive(Deserialize)]
struct UpdateInput {
    name: Option<String>,
    color: Option<String>,
}

async fn list(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::List, SubjectRef::of_type("Category")),
        move |hx| async move {
            let categories = store
                .categories_for(&owner_id(&hx)?)
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(to_json(&categories)?))
        },
    )
    .await
}

async fn create(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Create, SubjectRef::of_type("Category")).body(&CREATE),
        move |hx| async move {
            let input: CreateInput = parse_payload(&hx)?;
            let category = Category {
                id: Id::new_random(),
                owner: owner_id(&hx)?,
                name: input.name,
                color: input.color,
                created_at: Utc::now(),
            };
            let category = store.insert_category(category).await.map_err(store_err)?;
            Ok(Reply::created(to_json(&category)?))
        },
    )
    .await
}

async fn show(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Read, SubjectRef::instance("Category", id.clone())),
        move |hx| async move {
            let category = store
                .category(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(to_json(&category)?))
        },
    )
    .await
}

async fn update(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::instance("Category", id.clone())).body(&UPDATE),
        move |hx| async move {
            let input: UpdateInput = parse_payload(&hx)?;
            let mut category = store
                .category(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            if let Some(name) = input.name {
                category.name = name;
            }
            if input.color.is_some() {
                category.color = input.color;
            }
            let category = store.update_category(category).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&category)?))
        },
    )
    .await
}

async fn remove(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Delete, SubjectRef::instance("Category", id.clone())),
        move |hx| async move {
            store
                .remove_category(&owner_id(&hx)?, &Id(id))
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(serde_json::json!({"deleted": true})))
        },
    )
    .await
}
