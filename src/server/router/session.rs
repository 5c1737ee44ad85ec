//! Credentials login and the provider token relay.

use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use fintrack_errors::prelude::{codes, ErrorBuilder};
use fintrack_interceptors::prelude::*;
use fintrack_store::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::ROLE_MEMBER;
use crate::server::pipeline::{parse_payload, run_pipeline, store_err, to_json, Guard};
use crate::server::state::ServeState;

static LOGIN: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![
        Field::required("email", Schema::Email),
        Field::required("password", Schema::text(1, 128)),
    ]))
});

static GOOGLE: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(Schema::object(vec![Field::required(
        "id_token",
        Schema::text(1, 4096),
    )]))
});

pub fn router() -> Router<ServeState> {
    Router::new()
        .route("/", post(login))
        .route("/google", post(google))
}

#[derive(Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct GoogleInput {
    id_token: String,
}

fn bad_credentials() -> InterceptError {
    InterceptError(
        ErrorBuilder::new(codes::AUTH_UNAUTHENTICATED)
            .user_msg("Invalid email or password.")
            .dev_msg("credential verification failed")
            .build(),
    )
}

async fn login(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    let auth = state.auth.clone();
    run_pipeline(&state, req, Guard::public().body(&LOGIN), move |hx| async move {
        let input: LoginInput = parse_payload(&hx)?;
        let profile = store
            .verify_password(&input.email, &input.password)
            .await
            .map_err(|_| bad_credentials())?;
        let token = auth
            .codec
            .issue(&profile.id.0, &profile.email, &profile.display_name)?;
        Ok(Reply::ok(json!({
            "token": token,
            "user": to_json(&profile)?,
        })))
    })
    .await
}

async fn google(State(state): State<ServeState>, req: Request) -> Response {
    let store = state.store.clone();
    let auth = state.auth.clone();
    run_pipeline(&state, req, Guard::public().body(&GOOGLE), move |hx| async move {
        let input: GoogleInput = parse_payload(&hx)?;
        let identity = auth.provider.verify(&input.id_token).await?;

        let profile = match store
            .find_by_provider_subject(&identity.provider_subject)
            .await
            .map_err(store_err)?
        {
            Some(profile) => profile,
            None => store
                .create_user(NewUser {
                    email: identity.email,
                    display_name: identity.display_name,
                    password: None,
                    provider_subject: Some(identity.provider_subject),
                    roles: vec![ROLE_MEMBER.to_string()],
                })
                .await
                .map_err(store_err)?,
        };

        let token = auth
            .codec
            .issue(&profile.id.0, &profile.email, &profile.display_name)?;
        Ok(Reply::ok(json!({
            "token": token,
            "user": to_json(&profile)?,
        })))
    })
    .await
}
