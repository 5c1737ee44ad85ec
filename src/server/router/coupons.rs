//! Coupon administration. Gated behind `Coupon` abilities, which only the
//! admin and billing roles carry.

use axum::extract::{Path, Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::{NaiveDate, Utc};
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::{Coupon, Id};
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

use crate::server::pipeline::{parse_payload, run_pipeline, store_err, to_json, Guard};
use crate::server::state::ServeState;

static CREATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("code", Schema::text(1, 40)),
        Field::required("discount_percent", Schema::integer_in(1, 100)),
        Field::required("max_redemptions", Schema::integer_in(1, u32::MAX as i64)),
        Field::optional("expires_at", Schema::Date),
        Field::optional("active", Schema::Boolean),
    ]))
});

static UPDATE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("code", Schema::text(1, 40)),
        Field::optional("discount_percent", Schema::integer_in(1, 100)),
        Field::optional("max_redemptions", Schema::integer_in(1, u32::MAX as i64)),
        Field::optional("expires_at", Schema::Date),
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
    code: String,
    discount_percent: u8,
    max_redemptions: u32,
    expires_at: Option<NaiveDate>,
    active: Option<bool>,
}

#[derive(Deserialize)]
struct UpdateInput {
    code: Option<String>,
    discount_percent: Option<u8>,
    max_redemptions: Option<u32>,
    expires_at: Option<NaiveDate>,
    active: Option<bool>,
}

fn end_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    let time = chrono::NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    date.and_time(time).and_utc()
}

async fn list(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::List, SubjectRef::of_type("Coupon")),
        move |_hx| async move {
            let coupons = store.coupons().await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&coupons)?))
        },
    )
    .await
}

async fn create(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Create, SubjectRef::of_type("Coupon")).body(&CREATE),
        move |hx| async move {
            let input: CreateInput = parse_payload(&hx)?;
            let coupon = Coupon {
                id: Id::new_random(),
                code: input.code,
                discount_percent: input.discount_percent,
                max_redemptions: input.max_redemptions,
                redeemed: 0,
                expires_at: input.expires_at.map(end_of_day),
                active: input.active.unwrap_or(true),
                created_at: Utc::now(),
            };
            let coupon = store.insert_coupon(coupon).await.map_err(store_err)?;
            Ok(Reply::created(to_json(&coupon)?))
        },
    )
    .await
}

async fn show(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Read, SubjectRef::instance("Coupon", id.clone())),
        move |_hx| async move {
            let coupon = store.coupon(&Id(id)).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&coupon)?))
        },
    )
    .await
}

async fn update(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::instance("Coupon", id.clone())).body(&UPDATE),
        move |hx| async move {
            let input: UpdateInput = parse_payload(&hx)?;
            let mut coupon = store.coupon(&Id(id)).await.map_err(store_err)?;
            if let Some(code) = input.code {
                coupon.code = code;
            }
            if let Some(discount) = input.discount_percent {
                coupon.discount_percent = discount;
            }
            if let Some(max) = input.max_redemptions {
                coupon.max_redemptions = max;
            }
            if let Some(expires) = input.expires_at {
                coupon.expires_at = Some(end_of_day(expires));
            }
            if let Some(active) = input.active {
                coupon.active = active;
            }
            let coupon = store.update_coupon(coupon).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&coupon)?))
        },
    )
    .await
}

async fn remove(State(state): State<ServeState>, Path(id): Path<String>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Delete, SubjectRef::instance("Coupon", id.clone())),
        move |_hx| async move {
            store.remove_coupon(&Id(id)).await.map_err(store_err)?;
            Ok(Reply::ok(serde_json::json!({"deleted": true})))
        },
    )
    .await
}
