use anyhow::{Context, Result};
use clap::Args;
use fintrack_store::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{seed_roles, AuthCenter, DisabledProviderVerifier, ROLE_ADMIN};
use crate::config::{load_configuration, AppConfig};
use crate::server::router::build_router;
use crate::server::state::ServeState;

#[derive(Args)]
pub struct ServeArgs {
    /// JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Override the configured bind address.
    #[arg(long)]
    pub bind: Option<String>,

    /// Include developer detail in error responses.
    #[arg(long)]
    pub debug_errors: bool,
}

pub async fn cmd_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_configuration(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if args.debug_errors {
        config.debug_errors = true;
    }

    let store = Arc::new(MemoryStore::new());
    seed_roles(&store).await.context("seeding role grants")?;
    seed_admin(&store, &config).await?;

    let auth = Arc::new(AuthCenter::new(
        store.clone(),
        &config,
        Arc::new(DisabledProviderVerifier),
    ));
    let state = ServeState::new(store, auth, config.debug_errors);
    let app = build_router(state.clone());

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, debug_errors = config.debug_errors, "fintrack listening");
    state.health.set_ready(true);

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

async fn seed_admin(store: &MemoryStore, config: &AppConfig) -> Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    if store.find_by_email(email).await.context("admin lookup")?.is_some() {
        return Ok(());
    }
    store
        .create_user(NewUser {
            email: email.clone(),
            display_name: "Administrator".to_string(),
            password: Some(password.clone()),
            provider_subject: None,
            roles: vec![ROLE_ADMIN.to_string()],
        })
        .await
        .context("seeding admin user")?;
    tracing::info!(%email, "seeded admin user");
    Ok(())
}
