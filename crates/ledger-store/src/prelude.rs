pub use crate::{
    billing::BillingStore,
    errors::StoreError,
    identity::{IdentityStore, NewUser, UserRecord},
    ledger::{EntryFilter, LedgerStore},
    memory::MemoryStore,
};
