use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    entities::manual_payments::ManualPaymentEntity,
    repositories::{
        manual_payments::ManualPaymentRepository,
        subscription_profiles::SubscriptionProfileRepository,
    },
    value_objects::{
        admin::AdminStatsDto,
        enums::{
            manual_payment_statuses::ManualPaymentStatus,
            payment_resolutions::PaymentResolution, plans::Plan,
            subscription_statuses::SubscriptionStatus, user_roles::UserRole,
        },
        manual_payments::ManualPaymentDto,
        subscriptions::SubscriptionUpdate,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::subscription_resolver::SubscriptionResolver;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("admin access required")]
    Forbidden,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("payment is already resolved")]
    AlreadyResolved,
    #[error("payment cannot be resolved: {0}")]
    InvalidPayment(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AdminError::Forbidden => StatusCode::FORBIDDEN,
            AdminError::PaymentNotFound => StatusCode::NOT_FOUND,
            AdminError::AlreadyResolved => StatusCode::CONFLICT,
            AdminError::InvalidPayment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AdminError>;

pub struct AdminUseCase<S, M>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    resolver: Arc<SubscriptionResolver<S>>,
    profile_repo: Arc<S>,
    payment_repo: Arc<M>,
}

impl<S, M> AdminUseCase<S, M>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    pub fn new(
        resolver: Arc<SubscriptionResolver<S>>,
        profile_repo: Arc<S>,
        payment_repo: Arc<M>,
    ) -> Self {
        Self {
            resolver,
            profile_repo,
            payment_repo,
        }
    }

    /// Admin rights come from the stored profile role, not the JWT, so a
    /// revoked admin is locked out on the next request.
    async fn ensure_admin(&self, admin_id: Uuid) -> UseCaseResult<()> {
        let record = self
            .resolver
            .resolve_current_record(admin_id)
            .await
            .map_err(|err| {
                error!(
                    %admin_id,
                    db_error = ?err,
                    "admin: failed to resolve profile for admin check"
                );
                AdminError::Internal(err)
            })?;

        if record.role != UserRole::Admin {
            let err = AdminError::Forbidden;
            warn!(
                %admin_id,
                status = err.status_code().as_u16(),
                "admin: rejected non-admin caller"
            );
            return Err(err);
        }

        Ok(())
    }

    pub async fn list_manual_payments(
        &self,
        admin_id: Uuid,
    ) -> UseCaseResult<Vec<ManualPaymentDto>> {
        self.ensure_admin(admin_id).await?;
        info!(%admin_id, "admin: listing manual payments");

        // Settle interrupted resolutions before the list is rendered, so an
        // admin never acts on a row whose outcome is already decided.
        self.replay_unfinalized().await?;

        let payments = self
            .payment_repo
            .list_all_newest_first()
            .await
            .map_err(|err| {
                error!(%admin_id, db_error = ?err, "admin: failed to list manual payments");
                AdminError::Internal(err)
            })?;

        Ok(payments.into_iter().map(ManualPaymentDto::from).collect())
    }

    pub async fn resolve_manual_payment(
        &self,
        admin_id: Uuid,
        payment_id: Uuid,
        resolution: PaymentResolution,
    ) -> UseCaseResult<ManualPaymentDto> {
        self.ensure_admin(admin_id).await?;
        info!(
            %admin_id,
            %payment_id,
            resolution = %resolution,
            "admin: resolving manual payment"
        );

        let claimed = self
            .payment_repo
            .claim_resolution(payment_id, resolution)
            .await
            .map_err(|err| {
                error!(
                    %admin_id,
                    %payment_id,
                    db_error = ?err,
                    "admin: failed to claim payment resolution"
                );
                AdminError::Internal(err)
            })?;

        if let Some(payment) = claimed {
            let finalized = self.apply_and_finalize(&payment, resolution).await?;
            info!(
                %admin_id,
                %payment_id,
                resolution = %resolution,
                "admin: manual payment resolved"
            );
            return Ok(ManualPaymentDto::from(finalized));
        }

        // The claim matched nothing. Work out whether that means missing,
        // an interrupted resolution to pick back up, or a done deal.
        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                error!(
                    %admin_id,
                    %payment_id,
                    db_error = ?err,
                    "admin: failed to load payment after missed claim"
                );
                AdminError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = AdminError::PaymentNotFound;
                warn!(
                    %admin_id,
                    %payment_id,
                    status = err.status_code().as_u16(),
                    "admin: resolution target does not exist"
                );
                err
            })?;

        if ManualPaymentStatus::from_str(&payment.status) == ManualPaymentStatus::Pending {
            if payment.intended_outcome.as_deref() == Some(&resolution.to_string()) {
                // Same outcome as the stamped claim: finish the interrupted
                // resolution instead of refusing it.
                info!(
                    %admin_id,
                    %payment_id,
                    resolution = %resolution,
                    "admin: replaying interrupted resolution"
                );
                let finalized = self.apply_and_finalize(&payment, resolution).await?;
                return Ok(ManualPaymentDto::from(finalized));
            }

            let err = AdminError::AlreadyResolved;
            warn!(
                %admin_id,
                %payment_id,
                intended = ?payment.intended_outcome,
                status = err.status_code().as_u16(),
                "admin: payment already claimed with a different outcome"
            );
            return Err(err);
        }

        if ManualPaymentStatus::from_str(&payment.status) == resolution.final_status() {
            // Retried resolution that already went through.
            info!(
                %admin_id,
                %payment_id,
                resolution = %resolution,
                "admin: payment was already resolved to the requested outcome"
            );
            return Ok(ManualPaymentDto::from(payment));
        }

        let err = AdminError::AlreadyResolved;
        warn!(
            %admin_id,
            %payment_id,
            current_status = %payment.status,
            status = err.status_code().as_u16(),
            "admin: payment already resolved to a different outcome"
        );
        Err(err)
    }

    pub async fn stats(&self, admin_id: Uuid) -> UseCaseResult<AdminStatsDto> {
        self.ensure_admin(admin_id).await?;
        info!(%admin_id, "admin: loading dashboard stats");

        let total_users = self.profile_repo.count_profiles().await.map_err(|err| {
            error!(%admin_id, db_error = ?err, "admin: failed to count profiles");
            AdminError::Internal(err)
        })?;

        let active_users = self
            .profile_repo
            .count_by_status(SubscriptionStatus::Active)
            .await
            .map_err(|err| {
                error!(
                    %admin_id,
                    db_error = ?err,
                    "admin: failed to count active subscriptions"
                );
                AdminError::Internal(err)
            })?;

        let pending_payments = self
            .payment_repo
            .count_by_status(ManualPaymentStatus::Pending)
            .await
            .map_err(|err| {
                error!(
                    %admin_id,
                    db_error = ?err,
                    "admin: failed to count pending payments"
                );
                AdminError::Internal(err)
            })?;

        Ok(AdminStatsDto {
            total_users,
            active_users,
            pending_payments,
        })
    }

    /// Applies the subscription change for a claimed payment, then moves the
    /// ledger row to its final status. Safe to repeat: the subscription
    /// overwrite is idempotent and finalizing an already-final row is a
    /// no-op status-wise.
    async fn apply_and_finalize(
        &self,
        payment: &ManualPaymentEntity,
        resolution: PaymentResolution,
    ) -> UseCaseResult<ManualPaymentEntity> {
        let update = match resolution {
            PaymentResolution::Approved => {
                let plan = Plan::from_str(&payment.plan).ok_or_else(|| {
                    let err = AdminError::InvalidPayment(format!(
                        "unknown plan on payment: {}",
                        payment.plan
                    ));
                    warn!(
                        payment_id = %payment.id,
                        plan = %payment.plan,
                        status = err.status_code().as_u16(),
                        "admin: payment carries a plan the catalog does not know"
                    );
                    err
                })?;
                SubscriptionUpdate::approved(plan, Utc::now())
            }
            PaymentResolution::Rejected => SubscriptionUpdate::rejected(),
        };

        self.profile_repo
            .upsert(payment.user_id, update.to_entity())
            .await
            .map_err(|err| {
                error!(
                    payment_id = %payment.id,
                    user_id = %payment.user_id,
                    db_error = ?err,
                    "admin: failed to apply subscription change"
                );
                AdminError::Internal(err)
            })?;

        let finalized = self
            .payment_repo
            .finalize_resolution(payment.id, resolution)
            .await
            .map_err(|err| {
                error!(
                    payment_id = %payment.id,
                    db_error = ?err,
                    "admin: failed to finalize payment resolution"
                );
                AdminError::Internal(err)
            })?;

        Ok(finalized)
    }

    /// Finishes resolutions that were claimed but interrupted before the
    /// finalize step. Failures are logged and skipped so one stuck row does
    /// not block the review queue.
    async fn replay_unfinalized(&self) -> UseCaseResult<()> {
        let stuck = self
            .payment_repo
            .list_claimed_unfinalized()
            .await
            .map_err(|err| {
                error!(db_error = ?err, "admin: failed to list interrupted resolutions");
                AdminError::Internal(err)
            })?;

        for payment in stuck {
            let Some(intended) = payment.intended_outcome.as_deref() else {
                continue;
            };
            let Some(resolution) = PaymentResolution::from_str(intended) else {
                warn!(
                    payment_id = %payment.id,
                    intended,
                    "admin: skipping replay with unknown intended outcome"
                );
                continue;
            };

            match self.apply_and_finalize(&payment, resolution).await {
                Ok(_) => {
                    info!(
                        payment_id = %payment.id,
                        resolution = %resolution,
                        "admin: replayed interrupted resolution"
                    );
                }
                Err(err) => {
                    warn!(
                        payment_id = %payment.id,
                        error = %err,
                        "admin: failed to replay interrupted resolution"
                    );
                }
            }
        }

        Ok(())
    }
}
