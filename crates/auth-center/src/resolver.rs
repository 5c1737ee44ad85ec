use crate::ability::{AbilityRule, AbilitySet};
use crate::errors::{self, AuthError};
use async_trait::async_trait;
use fintrack_core_types::prelude::Subject;
use std::collections::HashMap;

/// Loads the ability rules for one identity. Must be deterministic for a
/// given identity within a request. An identity with no grant records at all
/// is an error; an identity with zero rules is a valid set that denies
/// everything.
#[async_trait]
pub trait AbilityResolver: Send + Sync {
    async fn resolve(&self, subject: &Subject) -> Result<AbilitySet, AuthError>;
}

/// Fixed in-memory grants, keyed by subject id. Used by tests and simple
/// wirings; production resolvers sit in front of the identity store.
#[derive(Default)]
pub struct MemoryAbilityResolver {
    grants: HashMap<String, Vec<AbilityRule>>,
}

impl MemoryAbilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grants(mut self, subject_id: impl Into<String>, rules: Vec<AbilityRule>) -> Self {
        self.grants.insert(subject_id.into(), rules);
        self
    }
}

#[async_trait]
impl AbilityResolver for MemoryAbilityResolver {
    async fn resolve(&self, subject: &Subject) -> Result<AbilitySet, AuthError> {
        match self.grants.get(&subject.subject_id.0) {
            Some(rules) => Ok(AbilitySet::from_rules(rules.clone())),
            None => Err(errors::unknown_identity(&subject.subject_id.0)),
        }
    }
}
