use std::sync::Arc;

use crates::domain::{
    entities::manual_payments::InsertManualPaymentEntity,
    repositories::{
        manual_payments::ManualPaymentRepository, storage::ImageStorageClient,
        subscription_profiles::SubscriptionProfileRepository,
    },
    value_objects::{
        enums::{manual_payment_statuses::ManualPaymentStatus, plans::Plan},
        manual_payments::{
            ProofUploadResponse, SubmitManualPaymentRequest, SubmitManualPaymentResponse,
        },
        subscriptions::{SubscriptionDto, SubscriptionUpdate},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::subscription_resolver::SubscriptionResolver;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("free plan does not require payment")]
    FreePlanNotPayable,
    #[error("proof_url is required")]
    MissingProofUrl,
    #[error("image is empty")]
    EmptyImage,
    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::FreePlanNotPayable
            | SubscriptionError::MissingProofUrl
            | SubscriptionError::EmptyImage
            | SubscriptionError::UnsupportedImageType(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S, M>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    resolver: Arc<SubscriptionResolver<S>>,
    profile_repo: Arc<S>,
    manual_payment_repo: Arc<M>,
    storage: Arc<dyn ImageStorageClient + Send + Sync>,
}

impl<S, M> SubscriptionUseCase<S, M>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    pub fn new(
        resolver: Arc<SubscriptionResolver<S>>,
        profile_repo: Arc<S>,
        manual_payment_repo: Arc<M>,
        storage: Arc<dyn ImageStorageClient + Send + Sync>,
    ) -> Self {
        Self {
            resolver,
            profile_repo,
            manual_payment_repo,
            storage,
        }
    }

    pub async fn current_subscription(&self, user_id: Uuid) -> UseCaseResult<SubscriptionDto> {
        info!(%user_id, "subscriptions: loading current subscription");

        let record = self
            .resolver
            .resolve_current_record(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to resolve current subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        Ok(SubscriptionDto::from(record))
    }

    pub async fn upload_payment_proof(
        &self,
        user_id: Uuid,
        image: Vec<u8>,
        content_type: &str,
    ) -> UseCaseResult<ProofUploadResponse> {
        info!(
            %user_id,
            image_size = image.len(),
            content_type,
            "subscriptions: payment proof upload requested"
        );

        if image.is_empty() {
            let err = SubscriptionError::EmptyImage;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: empty payment proof upload"
            );
            return Err(err);
        }

        if !content_type.starts_with("image/") {
            let err = SubscriptionError::UnsupportedImageType(content_type.to_string());
            warn!(
                %user_id,
                content_type,
                status = err.status_code().as_u16(),
                "subscriptions: payment proof with non-image content type"
            );
            return Err(err);
        }

        let proof_url = self
            .storage
            .upload_payment_proof(user_id, image, content_type)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    storage_error = ?err,
                    "subscriptions: failed to upload payment proof"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(%user_id, %proof_url, "subscriptions: payment proof uploaded");
        Ok(ProofUploadResponse { proof_url })
    }

    pub async fn submit_manual_payment(
        &self,
        user_id: Uuid,
        request: SubmitManualPaymentRequest,
    ) -> UseCaseResult<SubmitManualPaymentResponse> {
        info!(
            %user_id,
            plan = %request.plan,
            "subscriptions: manual payment submitted"
        );

        if request.plan == Plan::Free {
            let err = SubscriptionError::FreePlanNotPayable;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: manual payment for free plan rejected"
            );
            return Err(err);
        }

        let proof_url = request.proof_url.trim();
        if proof_url.is_empty() {
            let err = SubscriptionError::MissingProofUrl;
            warn!(
                %user_id,
                plan = %request.plan,
                status = err.status_code().as_u16(),
                "subscriptions: manual payment without proof url"
            );
            return Err(err);
        }

        // Price is snapshotted from the catalog, never taken from the client.
        let payment = InsertManualPaymentEntity {
            user_id,
            plan: request.plan.to_string(),
            amount_minor: request.plan.price_minor(),
            proof_url: proof_url.to_string(),
            status: ManualPaymentStatus::Pending.to_string(),
        };

        let payment_id = self
            .manual_payment_repo
            .create(payment)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to record manual payment"
                );
                SubscriptionError::Internal(err)
            })?;

        // Ledger row first, then the profile flip. If the flip fails the
        // payment is still on record for review and nothing is lost.
        self.profile_repo
            .upsert(user_id, SubscriptionUpdate::payment_pending().to_entity())
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %payment_id,
                    db_error = ?err,
                    "subscriptions: failed to mark subscription pending"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            %user_id,
            %payment_id,
            plan = %request.plan,
            "subscriptions: manual payment recorded, awaiting review"
        );
        Ok(SubmitManualPaymentResponse { payment_id })
    }
}
