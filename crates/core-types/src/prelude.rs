pub use crate::{
    id::Id,
    records::{
        Account, AccountKind, BudgetPrefs, Category, Coupon, CreditCard, Entry, EntryKind, Plan,
        PlanInterval, UserProfile,
    },
    subject::{Subject, SubjectKind},
    validate::{Validate, ValidateError},
};
