use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::manual_payments::{InsertManualPaymentEntity, ManualPaymentEntity};
use crate::domain::value_objects::enums::{
    manual_payment_statuses::ManualPaymentStatus, payment_resolutions::PaymentResolution,
};

#[async_trait]
#[automock]
pub trait ManualPaymentRepository {
    async fn create(&self, payment: InsertManualPaymentEntity) -> Result<Uuid>;

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<ManualPaymentEntity>>;

    async fn list_all_newest_first(&self) -> Result<Vec<ManualPaymentEntity>>;

    /// Stamps the intended outcome on a pending payment that has not been
    /// claimed yet. Returns the claimed row, or `None` when another admin got
    /// there first or the payment is already resolved.
    async fn claim_resolution(
        &self,
        payment_id: Uuid,
        outcome: PaymentResolution,
    ) -> Result<Option<ManualPaymentEntity>>;

    /// Moves a claimed payment to its final status, stamps `processed_at`
    /// and returns the finalized row.
    async fn finalize_resolution(
        &self,
        payment_id: Uuid,
        outcome: PaymentResolution,
    ) -> Result<ManualPaymentEntity>;

    /// Pending payments carrying an intended outcome: resolutions that were
    /// claimed but never finalized and need to be replayed.
    async fn list_claimed_unfinalized(&self) -> Result<Vec<ManualPaymentEntity>>;

    async fn count_by_status(&self, status: ManualPaymentStatus) -> Result<i64>;
}
