//! Domain records for the personal-finance ledger.

use crate::id::Id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    Investment,
    Cash,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: Id,
    pub owner: Id,
    pub name: String,
    pub kind: AccountKind,
    pub balance_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: Id,
    pub owner: Id,
    pub name: String,
    pub limit_cents: i64,
    /// Day of month the statement closes (1-28 so every month has it).
    pub closing_day: u8,
    pub due_day: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: Id,
    pub owner: Id,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
    Transfer,
}

/// A single ledger movement (transaction).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub id: Id,
    pub owner: Id,
    pub account: Id,
    #[serde(default)]
    pub card: Option<Id>,
    #[serde(default)]
    pub category: Option<Id>,
    pub description: String,
    pub amount_cents: i64,
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Id,
    pub code: String,
    pub discount_percent: u8,
    pub max_redemptions: u32,
    pub redeemed: u32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanInterval {
    Month,
    Year,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plan {
    pub id: Id,
    pub name: String,
    pub price_cents: i64,
    pub interval: PlanInterval,
    #[serde(default)]
    pub features: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetPrefs {
    pub currency: String,
    #[serde(default)]
    pub monthly_limit_cents: Option<i64>,
    pub alert_threshold_percent: u8,
}

impl Default for BudgetPrefs {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            monthly_limit_cents: None,
            alert_threshold_percent: 80,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Id,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub roles: Vec<String>,
    pub prefs: BudgetPrefs,
    pub created_at: DateTime<Utc>,
}
