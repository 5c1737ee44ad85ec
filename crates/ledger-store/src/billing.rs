//! Coupons and subscription plans. Unlike the ledger these are global
//! records, not owner-scoped.

use crate::errors::StoreError;
use async_trait::async_trait;
use fintrack_core_types::prelude::{Coupon, Id, Plan};

#[async_trait]
pub trait BillingStore: Send + Sync {
    /// Inserts a coupon. Codes are unique; a duplicate is `Conflict`.
    async fn insert_coupon(&self, coupon: Coupon) -> Result<Coupon, StoreError>;
    async fn coupon(&self, id: &Id) -> Result<Coupon, StoreError>;
    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError>;
    async fn coupons(&self) -> Result<Vec<Coupon>, StoreError>;
    async fn update_coupon(&self, coupon: Coupon) -> Result<Coupon, StoreError>;
    async fn remove_coupon(&self, id: &Id) -> Result<(), StoreError>;

    async fn insert_plan(&self, plan: Plan) -> Result<Plan, StoreError>;
    async fn plan(&self, id: &Id) -> Result<Plan, StoreError>;
    async fn plans(&self) -> Result<Vec<Plan>, StoreError>;
    async fn update_plan(&self, plan: Plan) -> Result<Plan, StoreError>;
    async fn remove_plan(&self, id: &Id) -> Result<(), StoreError>;
}
