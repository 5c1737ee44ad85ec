use crate::billing::BillingStore;
use crate::errors::StoreError;
use crate::memory::MemoryStore;
use async_trait::async_trait;
use fintrack_core_types::prelude::{Coupon, Id, Plan, Validate};

#[async_trait]
impl BillingStore for MemoryStore {
    async fn insert_coupon(&self, coupon: Coupon) -> Result<Coupon, StoreError> {
        coupon
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        let mut coupons = self.tables.coupons.write().await;
        if coupons.values().any(|c| c.code == coupon.code) {
            return Err(StoreError::conflict("coupon code"));
        }
        coupons.insert(coupon.id.clone(), coupon.clone());
        Ok(coupon)
    }

    async fn coupon(&self, id: &Id) -> Result<Coupon, StoreError> {
        self.tables
            .coupons
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::not_found("coupon"))
    }

    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        Ok(self
            .tables
            .coupons
            .read()
            .await
            .values()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn coupons(&self) -> Result<Vec<Coupon>, StoreError> {
        let mut records: Vec<Coupon> =
            self.tables.coupons.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn update_coupon(&self, coupon: Coupon) -> Result<Coupon, StoreError> {
        coupon
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        let mut coupons = self.tables.coupons.write().await;
        if !coupons.contains_key(&coupon.id) {
            return Err(StoreError::not_found("coupon"));
        }
        if coupons
            .values()
            .any(|c| c.code == coupon.code && c.id != coupon.id)
        {
            return Err(StoreError::conflict("coupon code"));
        }
        coupons.insert(coupon.id.clone(), coupon.clone());
        Ok(coupon)
    }

    async fn remove_coupon(&self, id: &Id) -> Result<(), StoreError> {
        self.tables
            .coupons
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::not_found("coupon"))
    }

    async fn insert_plan(&self, plan: Plan) -> Result<Plan, StoreError> {
        self.tables.plans.write().await.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn plan(&self, id: &Id) -> Result<Plan, StoreError> {
        self.tables
            .plans
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::not_found("plan"))
    }

    async fn plans(&self) -> Result<Vec<Plan>, StoreError> {
        let mut records: Vec<Plan> = self.tables.plans.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.price_cents.cmp(&b.price_cents));
        Ok(records)
    }

    async fn update_plan(&self, plan: Plan) -> Result<Plan, StoreError> {
        let mut plans = self.tables.plans.write().await;
        if !plans.contains_key(&plan.id) {
            return Err(StoreError::not_found("plan"));
        }
        plans.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn remove_plan(&self, id: &Id) -> Result<(), StoreError> {
        self.tables
            .plans
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::not_found("plan"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn coupon(code: &str) -> Coupon {
        Coupon {
            id: Id::new_random(),
            code: code.into(),
            discount_percent: 10,
            max_redemptions: 100,
            redeemed: 0,
            expires_at: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_coupon_code_is_a_conflict() {
        let store = MemoryStore::new();
        store.insert_coupon(coupon("SAVE10")).await.unwrap();
        let err = store.insert_coupon(coupon("SAVE10")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_cannot_steal_another_code() {
        let store = MemoryStore::new();
        store.insert_coupon(coupon("SAVE10")).await.unwrap();
        let mut second = store.insert_coupon(coupon("SAVE20")).await.unwrap();
        second.code = "SAVE10".into();
        let err = store.update_coupon(second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn malformed_coupon_never_lands_in_the_table() {
        let store = MemoryStore::new();
        let mut bad = coupon("ZERO");
        bad.discount_percent = 0;
        let err = store.insert_coupon(bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.coupon_by_code("ZERO").await.unwrap().is_none());

        let mut stored = store.insert_coupon(coupon("OK")).await.unwrap();
        stored.code = String::new();
        let err = store.update_coupon(stored).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.coupon_by_code("OK").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn lookup_by_code() {
        let store = MemoryStore::new();
        let created = store.insert_coupon(coupon("WELCOME")).await.unwrap();
        let found = store.coupon_by_code("WELCOME").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(store.coupon_by_code("NOPE").await.unwrap().is_none());
    }
}
