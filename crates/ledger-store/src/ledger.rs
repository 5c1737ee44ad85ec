//! Owner-scoped persistence for the ledger records.

use crate::errors::StoreError;
use async_trait::async_trait;
use fintrack_core_types::prelude::{Account, Category, CreditCard, Entry, Id};

/// Every read and update takes the owner: a record that exists but belongs to
/// someone else is reported as `NotFound`, never as a permission problem.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError>;
    async fn account(&self, owner: &Id, id: &Id) -> Result<Account, StoreError>;
    async fn accounts_for(&self, owner: &Id) -> Result<Vec<Account>, StoreError>;
    async fn update_account(&self, account: Account) -> Result<Account, StoreError>;
    async fn remove_account(&self, owner: &Id, id: &Id) -> Result<(), StoreError>;

    async fn insert_card(&self, card: CreditCard) -> Result<CreditCard, StoreError>;
    async fn card(&self, owner: &Id, id: &Id) -> Result<CreditCard, StoreError>;
    async fn cards_for(&self, owner: &Id) -> Result<Vec<CreditCard>, StoreError>;
    async fn update_card(&self, card: CreditCard) -> Result<CreditCard, StoreError>;
    async fn remove_card(&self, owner: &Id, id: &Id) -> Result<(), StoreError>;

    async fn insert_category(&self, category: Category) -> Result<Category, StoreError>;
    async fn category(&self, owner: &Id, id: &Id) -> Result<Category, StoreError>;
    async fn categories_for(&self, owner: &Id) -> Result<Vec<Category>, StoreError>;
    async fn update_category(&self, category: Category) -> Result<Category, StoreError>;
    async fn remove_category(&self, owner: &Id, id: &Id) -> Result<(), StoreError>;

    async fn insert_entry(&self, entry: Entry) -> Result<Entry, StoreError>;
    async fn entry(&self, owner: &Id, id: &Id) -> Result<Entry, StoreError>;
    async fn entries_for(&self, owner: &Id, filter: EntryFilter) -> Result<Vec<Entry>, StoreError>;
    async fn update_entry(&self, entry: Entry) -> Result<Entry, StoreError>;
    async fn remove_entry(&self, owner: &Id, id: &Id) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct EntryFilter {
    pub account: Option<Id>,
    pub category: Option<Id>,
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
    pub paid: Option<bool>,
}

impl EntryFilter {
    pub fn accepts(&self, entry: &Entry) -> bool {
        if let Some(account) = &self.account {
            if entry.account != *account {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if entry.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.date > to {
                return false;
            }
        }
        if let Some(paid) = self.paid {
            if entry.paid != paid {
                return false;
            }
        }
        true
    }
}
