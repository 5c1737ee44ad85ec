//! Users, credentials and ability grants.

use crate::errors::StoreError;
use async_trait::async_trait;
use fintrack_auth::prelude::AbilityRule;
use fintrack_core_types::prelude::{Id, UserProfile};
use serde::{Deserialize, Serialize};

/// A stored user: public profile plus credential material. The digest and
/// provider link never leave the store layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub profile: UserProfile,
    #[serde(default)]
    pub password_digest: Option<String>,
    /// Subject id at the external identity provider, when the user signed up
    /// through one.
    #[serde(default)]
    pub provider_subject: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password: Option<String>,
    pub provider_subject: Option<String>,
    pub roles: Vec<String>,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Creates a user. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<UserProfile, StoreError>;

    async fn user(&self, id: &Id) -> Result<UserProfile, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn find_by_provider_subject(
        &self,
        provider_subject: &str,
    ) -> Result<Option<UserProfile>, StoreError>;

    /// Checks a plaintext password against the stored digest. A user without
    /// a password (provider-only signup) never verifies.
    async fn verify_password(&self, email: &str, password: &str) -> Result<UserProfile, StoreError>;

    async fn update_profile(
        &self,
        id: &Id,
        display_name: Option<String>,
        prefs: Option<fintrack_core_types::prelude::BudgetPrefs>,
    ) -> Result<UserProfile, StoreError>;

    async fn set_avatar(&self, id: &Id, avatar_url: String) -> Result<UserProfile, StoreError>;

    /// Replaces the rule list attached to a role name.
    async fn put_role_grants(&self, role: &str, rules: Vec<AbilityRule>) -> Result<(), StoreError>;

    /// Replaces per-user rules, appended after role rules at resolve time.
    async fn put_user_grants(&self, id: &Id, rules: Vec<AbilityRule>) -> Result<(), StoreError>;

    /// Assembles the ordered rule list for a user: the rules of each of the
    /// user's roles in role order, then the user's own rules. Unknown user is
    /// an error, a user with no rules gets an empty list.
    async fn grants_for(&self, id: &Id) -> Result<Vec<AbilityRule>, StoreError>;
}
