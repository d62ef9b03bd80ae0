use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::{
    plans::Plan, subscription_statuses::SubscriptionStatus, user_roles::UserRole,
};
use crate::infra::db::postgres::schema::subscription_profiles;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscription_profiles)]
#[diesel(primary_key(user_id))]
pub struct SubscriptionProfileEntity {
    pub user_id: Uuid,
    pub active_plan: String,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscription_profiles)]
pub struct InsertSubscriptionProfileEntity {
    pub user_id: Uuid,
    pub active_plan: String,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub role: String,
}

impl InsertSubscriptionProfileEntity {
    /// Row matching the defaults assumed for users with no stored profile.
    pub fn default_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            active_plan: Plan::Free.to_string(),
            status: SubscriptionStatus::Free.to_string(),
            expires_at: None,
            role: UserRole::User.to_string(),
        }
    }
}

/// Merge changeset for one profile row. `None` plan/status/role fields are
/// skipped by the update; `expires_at` writes NULL when absent.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = subscription_profiles)]
pub struct UpdateSubscriptionProfileEntity {
    pub active_plan: Option<String>,
    pub status: Option<String>,
    #[diesel(treat_none_as_null = true)]
    pub expires_at: Option<DateTime<Utc>>,
    pub role: Option<String>,
    pub updated_at: DateTime<Utc>,
}
