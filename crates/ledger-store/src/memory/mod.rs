//! In-memory backend. Each table is a map behind its own async RwLock so
//! unrelated collections never contend.

mod billing;
mod identity;
mod ledger;

use fintrack_auth::prelude::AbilityRule;
use fintrack_core_types::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::identity::UserRecord;

#[derive(Default)]
pub(crate) struct Tables {
    pub users: RwLock<HashMap<Id, UserRecord>>,
    pub role_grants: RwLock<HashMap<String, Vec<AbilityRule>>>,
    pub user_grants: RwLock<HashMap<Id, Vec<AbilityRule>>>,
    pub accounts: RwLock<HashMap<Id, Account>>,
    pub cards: RwLock<HashMap<Id, CreditCard>>,
    pub categories: RwLock<HashMap<Id, Category>>,
    pub entries: RwLock<HashMap<Id, Entry>>,
    pub coupons: RwLock<HashMap<Id, Coupon>>,
    pub plans: RwLock<HashMap<Id, Plan>>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(crate) tables: Arc<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
