use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{invoices, subscription_profiles},
    },
};
use domain::{
    entities::{
        invoices::{InsertInvoiceEntity, InvoiceEntity, InvoiceRow, UpdateInvoiceEntity},
        subscription_profiles::InsertSubscriptionProfileEntity,
    },
    repositories::invoices::InvoiceRepository,
    value_objects::invoices::QuotaInsert,
};

pub struct InvoicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InvoicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InvoiceRepository for InvoicePostgres {
    async fn list_by_user_newest_first(&self, user_id: Uuid) -> Result<Vec<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = invoices::table
            .filter(invoices::user_id.eq(user_id))
            .order(invoices::created_at.desc())
            .select(InvoiceRow::as_select())
            .load::<InvoiceRow>(&mut conn)?;

        Ok(rows.into_iter().map(InvoiceEntity::from).collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = invoices::table
            .filter(invoices::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total)
    }

    async fn create_within_limit(
        &self,
        invoice: InsertInvoiceEntity,
        limit: Option<i64>,
    ) -> Result<QuotaInsert> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let Some(limit) = limit else {
            let row = insert_into(invoices::table)
                .values(&invoice)
                .returning(InvoiceRow::as_select())
                .get_result::<InvoiceRow>(&mut conn)?;

            return Ok(QuotaInsert::Created(InvoiceEntity::from(row)));
        };

        // Count-then-insert must hold a per-user lock, otherwise two
        // concurrent requests both see count = limit - 1 and both insert.
        // The profile row serves as the lock and is created on first use.
        let outcome = conn.transaction::<QuotaInsert, diesel::result::Error, _>(|conn| {
            insert_into(subscription_profiles::table)
                .values(InsertSubscriptionProfileEntity::default_for(invoice.user_id))
                .on_conflict_do_nothing()
                .execute(conn)?;

            subscription_profiles::table
                .find(invoice.user_id)
                .select(subscription_profiles::user_id)
                .for_update()
                .first::<Uuid>(conn)?;

            let current_count = invoices::table
                .filter(invoices::user_id.eq(invoice.user_id))
                .count()
                .get_result::<i64>(conn)?;

            if current_count >= limit {
                return Ok(QuotaInsert::LimitReached { current_count });
            }

            let row = insert_into(invoices::table)
                .values(&invoice)
                .returning(InvoiceRow::as_select())
                .get_result::<InvoiceRow>(conn)?;

            Ok(QuotaInsert::Created(InvoiceEntity::from(row)))
        })?;

        Ok(outcome)
    }

    async fn update_owned(
        &self,
        invoice_id: Uuid,
        user_id: Uuid,
        changes: UpdateInvoiceEntity,
    ) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(
            invoices::table
                .filter(invoices::id.eq(invoice_id))
                .filter(invoices::user_id.eq(user_id)),
        )
        .set(&changes)
        .returning(InvoiceRow::as_select())
        .get_result::<InvoiceRow>(&mut conn)
        .optional()?;

        Ok(row.map(InvoiceEntity::from))
    }

    async fn delete_owned(&self, invoice_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(
            invoices::table
                .filter(invoices::id.eq(invoice_id))
                .filter(invoices::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
