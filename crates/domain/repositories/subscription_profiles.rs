use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscription_profiles::{
    SubscriptionProfileEntity, UpdateSubscriptionProfileEntity,
};
use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;

#[async_trait]
#[automock]
pub trait SubscriptionProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionProfileEntity>>;

    /// Inserts the profile row if missing, then applies the changeset in the
    /// same statement. Fields the changeset skips keep their stored value.
    async fn upsert(&self, user_id: Uuid, changes: UpdateSubscriptionProfileEntity) -> Result<()>;

    async fn count_profiles(&self) -> Result<i64>;

    async fn count_by_status(&self, status: SubscriptionStatus) -> Result<i64>;
}
