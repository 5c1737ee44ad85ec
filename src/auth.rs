//! Wiring of the auth crate against the store: token codec, authenticator,
//! the store-backed ability resolver, the provider token relay, and the
//! built-in role grants.

use async_trait::async_trait;
use chrono::Duration;
use fintrack_auth::errors as auth_errors;
use fintrack_auth::prelude::*;
use fintrack_core_types::prelude::Subject;
use fintrack_store::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;

pub struct AuthCenter {
    pub codec: Arc<TokenCodec>,
    pub authenticator: Arc<dyn Authenticator>,
    pub resolver: Arc<dyn AbilityResolver>,
    pub provider: Arc<dyn ProviderTokenVerifier>,
}

impl AuthCenter {
    pub fn new(
        store: Arc<MemoryStore>,
        config: &AppConfig,
        provider: Arc<dyn ProviderTokenVerifier>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(
            &config.token_secret_or_ephemeral(),
            Duration::seconds(config.token_ttl_secs),
        ));
        Self {
            codec: codec.clone(),
            authenticator: Arc::new(TokenAuthenticator::new(codec)),
            resolver: Arc::new(StoreAbilityResolver { store }),
            provider,
        }
    }
}

/// Resolver backed by the identity store: role grants first, then
/// user-specific grants, in stored order.
pub struct StoreAbilityResolver {
    store: Arc<MemoryStore>,
}

#[async_trait]
impl AbilityResolver for StoreAbilityResolver {
    async fn resolve(&self, subject: &Subject) -> Result<AbilitySet, AuthError> {
        match self.store.grants_for(&subject.subject_id).await {
            Ok(rules) => Ok(AbilitySet::from_rules(rules)),
            Err(StoreError::NotFound { .. }) => {
                Err(auth_errors::unknown_identity(&subject.subject_id.0))
            }
            Err(err) => Err(auth_errors::internal(&err.to_string())),
        }
    }
}

/// Identity asserted by an external provider's id token.
#[derive(Clone, Debug)]
pub struct ProviderIdentity {
    pub provider_subject: String,
    pub email: String,
    pub display_name: String,
}

/// Verifies a provider-issued id token (the Google sign-in relay). The
/// verification internals are a collaborator; the server only consumes the
/// asserted identity.
#[async_trait]
pub trait ProviderTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<ProviderIdentity, AuthError>;
}

/// Default when no provider is configured.
pub struct DisabledProviderVerifier;

#[async_trait]
impl ProviderTokenVerifier for DisabledProviderVerifier {
    async fn verify(&self, _id_token: &str) -> Result<ProviderIdentity, AuthError> {
        Err(auth_errors::unauthenticated(
            "provider sign-in is not configured",
        ))
    }
}

/// Fixed token-to-identity table, for tests and local development.
#[derive(Default)]
pub struct StaticProviderVerifier {
    identities: HashMap<String, ProviderIdentity>,
}

impl StaticProviderVerifier {
    pub fn with_identity(mut self, id_token: &str, identity: ProviderIdentity) -> Self {
        self.identities.insert(id_token.to_string(), identity);
        self
    }
}

#[async_trait]
impl ProviderTokenVerifier for StaticProviderVerifier {
    async fn verify(&self, id_token: &str) -> Result<ProviderIdentity, AuthError> {
        self.identities
            .get(id_token)
            .cloned()
            .ok_or_else(|| auth_errors::unauthenticated("provider rejected the id token"))
    }
}

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";
pub const ROLE_BILLING: &str = "billing";

/// Built-in role grants, seeded into the store at startup. Order within each
/// list matters: later rules override earlier ones.
pub fn default_role_grants() -> Vec<(&'static str, Vec<AbilityRule>)> {
    let member_types = ["Account", "CreditCard", "Category", "Entry", "Profile"];
    let mut member = member_types
        .iter()
        .map(|t| AbilityRule::allow(Action::Manage, SubjectMatch::Type(t.to_string())))
        .collect::<Vec<_>>();
    member.push(AbilityRule::allow(
        Action::Read,
        SubjectMatch::Type("Plan".to_string()),
    ));
    member.push(AbilityRule::allow(
        Action::List,
        SubjectMatch::Type("Plan".to_string()),
    ));

    vec![
        (
            ROLE_ADMIN,
            vec![AbilityRule::allow(Action::Manage, SubjectMatch::All)],
        ),
        (ROLE_MEMBER, member),
        (
            ROLE_BILLING,
            vec![
                AbilityRule::allow(Action::Manage, SubjectMatch::Type("Coupon".to_string())),
                AbilityRule::allow(Action::Manage, SubjectMatch::Type("Plan".to_string())),
            ],
        ),
    ]
}

pub async fn seed_roles(store: &MemoryStore) -> Result<(), StoreError> {
    for (role, rules) in default_role_grants() {
        store.put_role_grants(role, rules).await?;
    }
    Ok(())
}
