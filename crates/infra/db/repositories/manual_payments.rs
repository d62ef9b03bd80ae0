use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::manual_payments},
};
use domain::{
    entities::manual_payments::{InsertManualPaymentEntity, ManualPaymentEntity},
    repositories::manual_payments::ManualPaymentRepository,
    value_objects::enums::{
        manual_payment_statuses::ManualPaymentStatus, payment_resolutions::PaymentResolution,
    },
};

pub struct ManualPaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ManualPaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ManualPaymentRepository for ManualPaymentPostgres {
    async fn create(&self, payment: InsertManualPaymentEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment_id = insert_into(manual_payments::table)
            .values(&payment)
            .returning(manual_payments::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(payment_id)
    }

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<ManualPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = manual_payments::table
            .find(payment_id)
            .select(ManualPaymentEntity::as_select())
            .first::<ManualPaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn list_all_newest_first(&self) -> Result<Vec<ManualPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payments = manual_payments::table
            .order(manual_payments::created_at.desc())
            .select(ManualPaymentEntity::as_select())
            .load::<ManualPaymentEntity>(&mut conn)?;

        Ok(payments)
    }

    async fn claim_resolution(
        &self,
        payment_id: Uuid,
        outcome: PaymentResolution,
    ) -> Result<Option<ManualPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The filters make the claim first-writer-wins: a concurrent claim
        // matches zero rows and comes back `None`.
        let claimed = update(
            manual_payments::table
                .filter(manual_payments::id.eq(payment_id))
                .filter(manual_payments::status.eq(ManualPaymentStatus::Pending.to_string()))
                .filter(manual_payments::intended_outcome.is_null()),
        )
        .set(manual_payments::intended_outcome.eq(outcome.to_string()))
        .returning(ManualPaymentEntity::as_select())
        .get_result::<ManualPaymentEntity>(&mut conn)
        .optional()?;

        Ok(claimed)
    }

    async fn finalize_resolution(
        &self,
        payment_id: Uuid,
        outcome: PaymentResolution,
    ) -> Result<ManualPaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let finalized = update(manual_payments::table.find(payment_id))
            .set((
                manual_payments::status.eq(outcome.final_status().to_string()),
                manual_payments::processed_at.eq(Some(Utc::now())),
            ))
            .returning(ManualPaymentEntity::as_select())
            .get_result::<ManualPaymentEntity>(&mut conn)?;

        Ok(finalized)
    }

    async fn list_claimed_unfinalized(&self) -> Result<Vec<ManualPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payments = manual_payments::table
            .filter(manual_payments::status.eq(ManualPaymentStatus::Pending.to_string()))
            .filter(manual_payments::intended_outcome.is_not_null())
            .order(manual_payments::created_at.asc())
            .select(ManualPaymentEntity::as_select())
            .load::<ManualPaymentEntity>(&mut conn)?;

        Ok(payments)
    }

    async fn count_by_status(&self, status: ManualPaymentStatus) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = manual_payments::table
            .filter(manual_payments::status.eq(status.to_string()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total)
    }
}
