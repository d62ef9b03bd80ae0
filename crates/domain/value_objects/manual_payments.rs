use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::manual_payments::ManualPaymentEntity;
use crate::domain::value_objects::enums::{
    manual_payment_statuses::ManualPaymentStatus, plans::Plan,
};

/// Request body for submitting a bank transfer for review. The proof image
/// is uploaded separately; this carries the URL returned by that upload.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitManualPaymentRequest {
    pub plan: Plan,
    pub proof_url: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitManualPaymentResponse {
    pub payment_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProofUploadResponse {
    pub proof_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualPaymentDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: Plan,
    pub amount_minor: i32,
    pub proof_url: String,
    pub status: ManualPaymentStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<ManualPaymentEntity> for ManualPaymentDto {
    fn from(value: ManualPaymentEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            plan: Plan::from_str(&value.plan).unwrap_or_default(),
            amount_minor: value.amount_minor,
            proof_url: value.proof_url,
            status: ManualPaymentStatus::from_str(&value.status),
            created_at: value.created_at,
            processed_at: value.processed_at,
        }
    }
}
