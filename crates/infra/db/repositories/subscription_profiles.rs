use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::subscription_profiles},
};
use domain::{
    entities::subscription_profiles::{
        InsertSubscriptionProfileEntity, SubscriptionProfileEntity,
        UpdateSubscriptionProfileEntity,
    },
    repositories::subscription_profiles::SubscriptionProfileRepository,
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

pub struct SubscriptionProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// First write for a user inserts the row, so the insert half of the upsert
/// starts from the assumed defaults and lays the changeset over them.
fn merged_insert(
    user_id: Uuid,
    changes: &UpdateSubscriptionProfileEntity,
) -> InsertSubscriptionProfileEntity {
    let mut row = InsertSubscriptionProfileEntity::default_for(user_id);

    if let Some(active_plan) = &changes.active_plan {
        row.active_plan = active_plan.clone();
    }
    if let Some(status) = &changes.status {
        row.status = status.clone();
    }
    if let Some(role) = &changes.role {
        row.role = role.clone();
    }
    row.expires_at = changes.expires_at;

    row
}

#[async_trait]
impl SubscriptionProfileRepository for SubscriptionProfilePostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let profile = subscription_profiles::table
            .find(user_id)
            .select(SubscriptionProfileEntity::as_select())
            .first::<SubscriptionProfileEntity>(&mut conn)
            .optional()?;

        Ok(profile)
    }

    async fn upsert(&self, user_id: Uuid, changes: UpdateSubscriptionProfileEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(subscription_profiles::table)
            .values(merged_insert(user_id, &changes))
            .on_conflict(subscription_profiles::user_id)
            .do_update()
            .set(&changes)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn count_profiles(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = subscription_profiles::table
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total)
    }

    async fn count_by_status(&self, status: SubscriptionStatus) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = subscription_profiles::table
            .filter(subscription_profiles::status.eq(status.to_string()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total)
    }
}
