use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::invoices::{InsertInvoiceEntity, InvoiceEntity, UpdateInvoiceEntity};
use crate::domain::value_objects::invoices::QuotaInsert;

#[async_trait]
#[automock]
pub trait InvoiceRepository {
    async fn list_by_user_newest_first(&self, user_id: Uuid) -> Result<Vec<InvoiceEntity>>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64>;

    /// Inserts the invoice, enforcing `limit` atomically when one is given:
    /// the owner's invoice count is re-checked under a row lock so two
    /// concurrent requests cannot both slip past the cap.
    async fn create_within_limit(
        &self,
        invoice: InsertInvoiceEntity,
        limit: Option<i64>,
    ) -> Result<QuotaInsert>;

    /// Applies the changeset to the invoice only when it belongs to
    /// `user_id`. Returns the updated invoice, or `None` when no owned row
    /// matched.
    async fn update_owned(
        &self,
        invoice_id: Uuid,
        user_id: Uuid,
        changes: UpdateInvoiceEntity,
    ) -> Result<Option<InvoiceEntity>>;

    /// Deletes the invoice only when it belongs to `user_id`. Returns whether
    /// a row was removed.
    async fn delete_owned(&self, invoice_id: Uuid, user_id: Uuid) -> Result<bool>;
}
