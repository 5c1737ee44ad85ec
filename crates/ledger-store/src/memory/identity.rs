use crate::errors::StoreError;
use crate::identity::{IdentityStore, NewUser, UserRecord};
use crate::memory::MemoryStore;
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use fintrack_auth::prelude::AbilityRule;
use fintrack_core_types::prelude::{BudgetPrefs, Id, UserProfile};
use sha2::{Digest, Sha256};

// Salted SHA-256, encoded as "salt$digest". Good enough for the in-memory
// backend; a database backend would use a KDF.
fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"\x00");
    hasher.update(password.as_bytes());
    let digest = base64::engine::general_purpose::STANDARD.encode(hasher.finalize());
    format!("{salt}${digest}")
}

fn make_digest(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    digest_password(&salt, password)
}

fn digest_matches(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, _)) => digest_password(salt, password) == stored,
        None => false,
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<UserProfile, StoreError> {
        let mut users = self.tables.users.write().await;
        let email = new_user.email.to_ascii_lowercase();
        if users.values().any(|u| u.profile.email == email) {
            return Err(StoreError::conflict("user email"));
        }
        let profile = UserProfile {
            id: Id::new_random(),
            email,
            display_name: new_user.display_name,
            avatar_url: None,
            roles: new_user.roles,
            prefs: BudgetPrefs::default(),
            created_at: Utc::now(),
        };
        let record = UserRecord {
            profile: profile.clone(),
            password_digest: new_user.password.as_deref().map(make_digest),
            provider_subject: new_user.provider_subject,
        };
        users.insert(profile.id.clone(), record);
        Ok(profile)
    }

    async fn user(&self, id: &Id) -> Result<UserProfile, StoreError> {
        self.tables
            .users
            .read()
            .await
            .get(id)
            .map(|r| r.profile.clone())
            .ok_or(StoreError::not_found("user"))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let email = email.to_ascii_lowercase();
        Ok(self
            .tables
            .users
            .read()
            .await
            .values()
            .find(|r| r.profile.email == email)
            .map(|r| r.profile.clone()))
    }

    async fn find_by_provider_subject(
        &self,
        provider_subject: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .tables
            .users
            .read()
            .await
            .values()
            .find(|r| r.provider_subject.as_deref() == Some(provider_subject))
            .map(|r| r.profile.clone()))
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, StoreError> {
        let email = email.to_ascii_lowercase();
        let users = self.tables.users.read().await;
        let record = users
            .values()
            .find(|r| r.profile.email == email)
            .ok_or(StoreError::not_found("user"))?;
        match &record.password_digest {
            Some(stored) if digest_matches(stored, password) => Ok(record.profile.clone()),
            _ => Err(StoreError::not_found("user")),
        }
    }

    async fn update_profile(
        &self,
        id: &Id,
        display_name: Option<String>,
        prefs: Option<BudgetPrefs>,
    ) -> Result<UserProfile, StoreError> {
        let mut users = self.tables.users.write().await;
        let record = users.get_mut(id).ok_or(StoreError::not_found("user"))?;
        if let Some(name) = display_name {
            record.profile.display_name = name;
        }
        if let Some(prefs) = prefs {
            record.profile.prefs = prefs;
        }
        Ok(record.profile.clone())
    }

    async fn set_avatar(&self, id: &Id, avatar_url: String) -> Result<UserProfile, StoreError> {
        let mut users = self.tables.users.write().await;
        let record = users.get_mut(id).ok_or(StoreError::not_found("user"))?;
        record.profile.avatar_url = Some(avatar_url);
        Ok(record.profile.clone())
    }

    async fn put_role_grants(
        &self,
        role: &str,
        rules: Vec<AbilityRule>,
    ) -> Result<(), StoreError> {
        self.tables
            .role_grants
            .write()
            .await
            .insert(role.to_string(), rules);
        Ok(())
    }

    async fn put_user_grants(&self, id: &Id, rules: Vec<AbilityRule>) -> Result<(), StoreError> {
        self.tables.user_grants.write().await.insert(id.clone(), rules);
        Ok(())
    }

    async fn grants_for(&self, id: &Id) -> Result<Vec<AbilityRule>, StoreError> {
        let roles = {
            let users = self.tables.users.read().await;
            users
                .get(id)
                .map(|r| r.profile.roles.clone())
                .ok_or(StoreError::not_found("user"))?
        };

        let mut rules = Vec::new();
        let role_grants = self.tables.role_grants.read().await;
        for role in &roles {
            if let Some(role_rules) = role_grants.get(role) {
                rules.extend(role_rules.iter().cloned());
            }
        }
        if let Some(user_rules) = self.tables.user_grants.read().await.get(id) {
            rules.extend(user_rules.iter().cloned());
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fintrack_auth::prelude::{Action, SubjectMatch};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: "Test".to_string(),
            password: Some("hunter22".to_string()),
            provider_subject: None,
            roles: vec!["member".to_string()],
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();
        let err = store
            .create_user(new_user("A@Example.COM"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn password_verification() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();
        assert!(store.verify_password("a@example.com", "hunter22").await.is_ok());
        assert!(store.verify_password("a@example.com", "wrong").await.is_err());
        assert!(store.verify_password("nobody@example.com", "hunter22").await.is_err());
    }

    #[tokio::test]
    async fn provider_only_user_never_verifies_a_password() {
        let store = MemoryStore::new();
        let mut user = new_user("sso@example.com");
        user.password = None;
        user.provider_subject = Some("google-123".to_string());
        store.create_user(user).await.unwrap();
        assert!(store.verify_password("sso@example.com", "anything").await.is_err());
        let found = store.find_by_provider_subject("google-123").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn grants_append_role_rules_then_user_rules() {
        let store = MemoryStore::new();
        let profile = store.create_user(new_user("a@example.com")).await.unwrap();
        store
            .put_role_grants(
                "member",
                vec![AbilityRule::allow(
                    Action::Manage,
                    SubjectMatch::Type("Account".into()),
                )],
            )
            .await
            .unwrap();
        store
            .put_user_grants(
                &profile.id,
                vec![AbilityRule::deny(
                    Action::Delete,
                    SubjectMatch::Type("Account".into()),
                )],
            )
            .await
            .unwrap();

        let rules = store.grants_for(&profile.id).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].action, Action::Delete);
    }

    #[tokio::test]
    async fn grants_for_unknown_user_is_not_found() {
        let store = MemoryStore::new();
        let err = store.grants_for(&Id("missing".into())).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
