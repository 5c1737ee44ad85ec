use crate::errors::StoreError;
use crate::ledger::{EntryFilter, LedgerStore};
use crate::memory::MemoryStore;
use async_trait::async_trait;
use fintrack_core_types::prelude::{Account, Category, CreditCard, Entry, Id, Validate};
use std::collections::HashMap;
use tokio::sync::RwLock;

// The four ledger tables behave identically, so the CRUD bodies are shared.
async fn insert<T: Clone>(
    table: &RwLock<HashMap<Id, T>>,
    id: Id,
    record: T,
) -> Result<T, StoreError> {
    table.write().await.insert(id, record.clone());
    Ok(record)
}

async fn get_owned<T: Clone>(
    table: &RwLock<HashMap<Id, T>>,
    owner_of: impl Fn(&T) -> &Id,
    owner: &Id,
    id: &Id,
    what: &'static str,
) -> Result<T, StoreError> {
    table
        .read()
        .await
        .get(id)
        .filter(|record| owner_of(record) == owner)
        .cloned()
        .ok_or(StoreError::not_found(what))
}

async fn list_owned<T: Clone>(
    table: &RwLock<HashMap<Id, T>>,
    owner_of: impl Fn(&T) -> &Id,
    owner: &Id,
) -> Vec<T> {
    table
        .read()
        .await
        .values()
        .filter(|record| owner_of(record) == owner)
        .cloned()
        .collect()
}

async fn update_owned<T: Clone>(
    table: &RwLock<HashMap<Id, T>>,
    owner_of: impl Fn(&T) -> &Id,
    id: &Id,
    record: T,
    what: &'static str,
) -> Result<T, StoreError> {
    let mut guard = table.write().await;
    match guard.get(id) {
        Some(existing) if owner_of(existing) == owner_of(&record) => {
            guard.insert(id.clone(), record.clone());
            Ok(record)
        }
        _ => Err(StoreError::not_found(what)),
    }
}

async fn remove_owned<T>(
    table: &RwLock<HashMap<Id, T>>,
    owner_of: impl Fn(&T) -> &Id,
    owner: &Id,
    id: &Id,
    what: &'static str,
) -> Result<(), StoreError> {
    let mut guard = table.write().await;
    match guard.get(id) {
        Some(existing) if owner_of(existing) == owner => {
            guard.remove(id);
            Ok(())
        }
        _ => Err(StoreError::not_found(what)),
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError> {
        insert(&self.tables.accounts, account.id.clone(), account).await
    }

    async fn account(&self, owner: &Id, id: &Id) -> Result<Account, StoreError> {
        get_owned(&self.tables.accounts, |a: &Account| &a.owner, owner, id, "account").await
    }

    async fn accounts_for(&self, owner: &Id) -> Result<Vec<Account>, StoreError> {
        let mut records = list_owned(&self.tables.accounts, |a: &Account| &a.owner, owner).await;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn update_account(&self, account: Account) -> Result<Account, StoreError> {
        let id = account.id.clone();
        update_owned(&self.tables.accounts, |a: &Account| &a.owner, &id, account, "account").await
    }

    async fn remove_account(&self, owner: &Id, id: &Id) -> Result<(), StoreError> {
        remove_owned(&self.tables.accounts, |a: &Account| &a.owner, owner, id, "account").await
    }

    async fn insert_card(&self, card: CreditCard) -> Result<CreditCard, StoreError> {
        card.validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        insert(&self.tables.cards, card.id.clone(), card).await
    }

    async fn card(&self, owner: &Id, id: &Id) -> Result<CreditCard, StoreError> {
        get_owned(&self.tables.cards, |c: &CreditCard| &c.owner, owner, id, "credit card").await
    }

    async fn cards_for(&self, owner: &Id) -> Result<Vec<CreditCard>, StoreError> {
        let mut records = list_owned(&self.tables.cards, |c: &CreditCard| &c.owner, owner).await;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn update_card(&self, card: CreditCard) -> Result<CreditCard, StoreError> {
        card.validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        let id = card.id.clone();
        update_owned(&self.tables.cards, |c: &CreditCard| &c.owner, &id, card, "credit card").await
    }

    async fn remove_card(&self, owner: &Id, id: &Id) -> Result<(), StoreError> {
        remove_owned(&self.tables.cards, |c: &CreditCard| &c.owner, owner, id, "credit card").await
    }

    async fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
        insert(&self.tables.categories, category.id.clone(), category).await
    }

    async fn category(&self, owner: &Id, id: &Id) -> Result<Category, StoreError> {
        get_owned(&self.tables.categories, |c: &Category| &c.owner, owner, id, "category").await
    }

    async fn categories_for(&self, owner: &Id) -> Result<Vec<Category>, StoreError> {
        let mut records =
            list_owned(&self.tables.categories, |c: &Category| &c.owner, owner).await;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    async fn update_category(&self, category: Category) -> Result<Category, StoreError> {
        let id = category.id.clone();
        update_owned(&self.tables.categories, |c: &Category| &c.owner, &id, category, "category")
            .await
    }

    async fn remove_category(&self, owner: &Id, id: &Id) -> Result<(), StoreError> {
        remove_owned(&self.tables.categories, |c: &Category| &c.owner, owner, id, "category").await
    }

    async fn insert_entry(&self, entry: Entry) -> Result<Entry, StoreError> {
        insert(&self.tables.entries, entry.id.clone(), entry).await
    }

    async fn entry(&self, owner: &Id, id: &Id) -> Result<Entry, StoreError> {
        get_owned(&self.tables.entries, |e: &Entry| &e.owner, owner, id, "entry").await
    }

    async fn entries_for(&self, owner: &Id, filter: EntryFilter) -> Result<Vec<Entry>, StoreError> {
        let mut records: Vec<Entry> = self
            .tables
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.owner == *owner && filter.accepts(e))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(a.created_at.cmp(&b.created_at)));
        Ok(records)
    }

    async fn update_entry(&self, entry: Entry) -> Result<Entry, StoreError> {
        let id = entry.id.clone();
        update_owned(&self.tables.entries, |e: &Entry| &e.owner, &id, entry, "entry").await
    }

    async fn remove_entry(&self, owner: &Id, id: &Id) -> Result<(), StoreError> {
        remove_owned(&self.tables.entries, |e: &Entry| &e.owner, owner, id, "entry").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use fintrack_core_types::prelude::{AccountKind, EntryKind};

    fn account(owner: &str, name: &str) -> Account {
        Account {
            id: Id::new_random(),
            owner: Id(owner.into()),
            name: name.into(),
            kind: AccountKind::Checking,
            balance_cents: 0,
            created_at: Utc::now(),
        }
    }

    fn entry(owner: &str, account: &Id, date: NaiveDate, paid: bool) -> Entry {
        Entry {
            id: Id::new_random(),
            owner: Id(owner.into()),
            account: account.clone(),
            card: None,
            category: None,
            description: "coffee".into(),
            amount_cents: -450,
            kind: EntryKind::Expense,
            date,
            paid,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn foreign_records_read_as_not_found() {
        let store = MemoryStore::new();
        let mine = store.insert_account(account("user-1", "Main")).await.unwrap();

        let err = store
            .account(&Id("user-2".into()), &mine.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store
            .remove_account(&Id("user-2".into()), &mine.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.account(&Id("user-1".into()), &mine.id).await.is_ok());
    }

    #[tokio::test]
    async fn listing_is_owner_scoped() {
        let store = MemoryStore::new();
        store.insert_account(account("user-1", "A")).await.unwrap();
        store.insert_account(account("user-1", "B")).await.unwrap();
        store.insert_account(account("user-2", "C")).await.unwrap();

        let mine = store.accounts_for(&Id("user-1".into())).await.unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn card_with_impossible_cycle_days_is_rejected() {
        let store = MemoryStore::new();
        let card = CreditCard {
            id: Id::new_random(),
            owner: Id("user-1".into()),
            name: "Everyday".into(),
            limit_cents: 500_000,
            closing_day: 31,
            due_day: 5,
            created_at: Utc::now(),
        };
        let err = store.insert_card(card).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store
            .cards_for(&Id("user-1".into()))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn entry_filters_compose() {
        let store = MemoryStore::new();
        let acct = store.insert_account(account("user-1", "Main")).await.unwrap();
        let other = store.insert_account(account("user-1", "Side")).await.unwrap();

        let jan = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let feb = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        store.insert_entry(entry("user-1", &acct.id, jan, true)).await.unwrap();
        store.insert_entry(entry("user-1", &acct.id, feb, false)).await.unwrap();
        store.insert_entry(entry("user-1", &other.id, feb, true)).await.unwrap();

        let filter = EntryFilter {
            account: Some(acct.id.clone()),
            from: Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
            ..Default::default()
        };
        let hits = store.entries_for(&Id("user-1".into()), filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].paid);

        let unpaid = store
            .entries_for(
                &Id("user-1".into()),
                EntryFilter {
                    paid: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unpaid.len(), 1);
    }
}
