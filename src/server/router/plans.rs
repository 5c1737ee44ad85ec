//! Subscription plans. Members may read and list; writes need the billing
//! or admin role.

use axum::extract::{Path, Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::{Id, Plan, PlanInterval};
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

use crate::server::pipeline::{parse_payload, run_pipeline, store_err, to_json, Guard};
use crate::server::state::ServeState;

static CREATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("name", Schema::text(1, 80)),
        Field::required("price_cents", Schema::integer_in(0, i64::MAX)),
        Field::required("interval", Schema::OneOf(vec!["month", "year"])),
        Field::optional(
            "features",
            Schema::Array {
                item: Box::new(Schema::text(1, 120)),
                max: 20,
            },
        ),
        Field::optional("active", Schema::Boolean),
    ]))
});

static UPDATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("name", Schema::text(1, 80)),
        Field::optional("price_cents", Schema::integer_in(0, i64::MAX)),
        Field::optional("interval", Schema::OneOf(vec!["month", "year"])),
        Field::optional(
            "features",
            Schema::Array {
                item: Box::new(Schema::text(1, 120)),
                max: 20,
            },
        ),
        Field::optional("active", Schema::Boolean),
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
    price_cents: i64,
    interval: PlanInterval,
    features: Option<Vec<String>>,
    active: Option<bool>,
}

#[derive(Deserialize)]
struct UpdateInput {
    name: Option<String>,
    price_cents: Option<i64>,
    interval: Option<PlanInterval>,
    features: Option<Vec<String>>,
    active: Option<bool>,
}

async fn list(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::List, SubjectRef::of_type("Plan")),
        move |_hx| async move {
            let plans = store.plans().await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&plans)?))
        },
    )
    .await
}

async fn create(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Create, SubjectRef::of_type("Plan")).body(&CREATE),
        move |hx| async move {
            let input: CreateInput = parse_payload(&hx)?;
            let plan = Plan {
                id: Id::new_random(),
                name: input.name,
                price_cents: input.price_cents,
                interval: input.interval,
                features: input.features.unwrap_or_default(),
                active: input.active.unwrap_or(true),
                created_at: Utc::now(),
            };
            let plan = store.insert_plan(plan).await.map_err(store_err)?;
            Ok(Reply::created(to_json(&plan)?))
        },
    )
    .await
}

async fn show(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Read, SubjectRef::instance("Plan", id.clone())),
        move |_hx| async move {
            let plan = store.plan(&Id(id)).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&plan)?))
        },
    )
    .await
}

async fn update(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::instance("Plan", id.clone())).body(&UPDATE),
        move |hx| async move {
            let input: UpdateInput = parse_payload(&hx)?;
            let mut plan = store.plan(&Id(id)).await.map_err(store_err)?;
            if let Some(name) = input.name {
                plan.name = name;
            }
            if let Some(price) = input.price_cents {
                plan.price_cents = price;
            }
            if let Some(interval) = input.interval {
                plan.interval = interval;
            }
            if let Some(features) = input.features {
                plan.features = features;
            }
            if let Some(active) = input.active {
                plan.active = active;
            }
            let plan = store.update_plan(plan).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&plan)?))
        },
    )
    .await
}

async fn remove(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Delete, SubjectRef::instance("Plan", id.clone())),
        move |_hx| async move {
            store.remove_plan(&Id(id)).await.map_err(store_err)?;
            Ok(Reply::ok(serde_json::json!({"deleted": true})))
        },
    )
    .await
}
