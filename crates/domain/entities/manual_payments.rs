use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::manual_payments;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = manual_payments)]
pub struct ManualPaymentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub amount_minor: i32,
    pub proof_url: String,
    pub status: String,
    /// Resolution an admin committed to before the subscription change was
    /// applied. Non-null on a `pending` row means the resolution was
    /// interrupted and must be replayed.
    pub intended_outcome: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = manual_payments)]
pub struct InsertManualPaymentEntity {
    pub user_id: Uuid,
    pub plan: String,
    pub amount_minor: i32,
    pub proof_url: String,
    pub status: String,
}
