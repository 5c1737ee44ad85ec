//! Sign-up, profile, budget preferences and the avatar reference.

use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use fintrack_auth::prelude::{Action, SubjectRef};
use fintrack_core_types::prelude::BudgetPrefs;
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::ROLE_MEMBER;
use crate::server::pipeline::{owner_id, parse_payload, run_pipeline, store_err, to_json, Guard};
use crate::server::state::ServeState;

static SIGNUP: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("email", Schema::Email),
        Field::required("password", Schema::text(8, 128)),
        Field::required("display_name", Schema::text(1, 60)),
    ]))
});

static UPDATE_ME: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::optional("display_name", Schema::text(1, 60)),
        Field::optional(
            "prefs",
            Schema::object(vec![
                Field::optional("currency", Schema::text(3, 3)),
                Field::optional("monthly_limit_cents", Schema::integer_in(0, i64::MAX)),
                Field::optional("alert_threshold_percent", Schema::integer_in(1, 100)),
            ]),
        ),
    ]))
});

static AVATAR: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![Field::required(
        "url",
        Schema::text(1, 2048),
    )]))
});

pub fn router() -> Router<ServeState> {
    Router::new()
        .route("/", post(signup))
        .route("/me", get(me).put(update_me))
        .route("/me/avatar", post(avatar))
}

#[derive(Deserialize)]
struct SignupInput {
    email: String,
    password: String,
    display_name: String,
}

#[derive(Deserialize)]
struct PrefsPatch {
    currency: Option<String>,
    monthly_limit_cents: Option<i64>,
    alert_threshold_percent: Option<u8>,
}

#[derive(Deserialize)]
struct UpdateMeInput {
    display_name: Option<String>,
    prefs: Option<PrefsPatch>,
}

#[derive(Deserialize)]
struct AvatarInput {
    url: String,
}

async fn signup(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    let auth = state.auth.clone();
    run_pipeline(&state, req, Guard::public().body(&SIGNUP), move |hx| async move {
        let input: SignupInput = parse_payload(&hx)?;
        let profile = store
            .create_user(NewUser {
                email: input.email,
                display_name: input.display_name,
                password: Some(input.password),
                provider_subject: None,
                roles: vec![ROLE_MEMBER.to_string()],
            })
            .await
            .map_err(store_err)?;
        let token = auth
            .codec
            .issue(&profile.id.0, &profile.email, &profile.display_name)?;
        Ok(Reply::created(json!({
            "token": token,
            "user": to_json(&profile)?,
        })))
    })
    .await
}

async fn me(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Read, SubjectRef::of_type("Profile")),
        move |hx| async move {
            let profile = store.user(&owner_id(&hx)?).await.map_err(store_err)?;
            Ok(Reply::ok(to_json(&profile)?))
        },
    )
    .await
}

async fn update_me(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::of_type("Profile")).body(&UPDATE_ME),
        move |hx| async move {
            let owner = owner_id(&hx)?;
            let input: UpdateMeInput = parse_payload(&hx)?;

            let prefs = match input.prefs {
                Some(patch) => {
                    let current = store.user(&owner).await.map_err(store_err)?.prefs;
                    Some(merge_prefs(current, patch))
                }
                None => None,
            };
            let profile = store
                .update_profile(&owner, input.display_name, prefs)
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(to_json(&profile)?))
        },
    )
    .await
}

fn merge_prefs(mut current: BudgetPrefs, patch: PrefsPatch) -> BudgetPrefs {
    if let Some(currency) = patch.currency {
        current.currency = currency.to_ascii_uppercase();
    }
    if let Some(limit) = patch.monthly_limit_cents {
        current.monthly_limit_cents = Some(limit);
    }
    if let Some(threshold) = patch.alert_threshold_percent {
        current.alert_threshold_percent = threshold;
    }
    current
}

async fn avatar(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    run_pipeline(
        &state,
        req,
        Guard::protected(Action::Update, SubjectRef::of_type("Profile")).body(&AVATAR),
        move |hx| async move {
            let input: AvatarInput = parse_payload(&hx)?;
            let profile = store
                .set_avatar(&owner_id(&hx)?, input.url)
                .await
                .map_err(store_err)?;
            Ok(Reply::ok(to_json(&profile)?))
        },
    )
    .await
}
