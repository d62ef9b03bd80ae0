use crate::{
    auth::AuthUser,
    axum_http::error_responses::respond_error,
    usecases::{admin::AdminUseCase, subscription_resolver::SubscriptionResolver},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            manual_payments::ManualPaymentRepository,
            subscription_profiles::SubscriptionProfileRepository,
        },
        value_objects::enums::payment_resolutions::PaymentResolution,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            manual_payments::ManualPaymentPostgres,
            subscription_profiles::SubscriptionProfilePostgres,
        },
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let profile_repository = Arc::new(SubscriptionProfilePostgres::new(Arc::clone(&db_pool)));
    let payment_repository = Arc::new(ManualPaymentPostgres::new(Arc::clone(&db_pool)));
    let resolver = Arc::new(SubscriptionResolver::new(Arc::clone(&profile_repository)));

    let usecase = AdminUseCase::new(resolver, profile_repository, payment_repository);

    Router::new()
        .route("/manual-payments", get(list_manual_payments))
        .route(
            "/manual-payments/:payment_id/approve",
            post(approve_manual_payment),
        )
        .route(
            "/manual-payments/:payment_id/reject",
            post(reject_manual_payment),
        )
        .route("/stats", get(stats))
        .with_state(Arc::new(usecase))
}

pub async fn list_manual_payments<S, M>(
    State(usecase): State<Arc<AdminUseCase<S, M>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    info!(%user_id, "admin: manual payments list request received");
    match usecase.list_manual_payments(user_id).await {
        Ok(payments) => Json(payments).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn approve_manual_payment<S, M>(
    State(usecase): State<Arc<AdminUseCase<S, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    info!(%user_id, %payment_id, "admin: approve request received");
    match usecase
        .resolve_manual_payment(user_id, payment_id, PaymentResolution::Approved)
        .await
    {
        Ok(payment) => Json(payment).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn reject_manual_payment<S, M>(
    State(usecase): State<Arc<AdminUseCase<S, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    info!(%user_id, %payment_id, "admin: reject request received");
    match usecase
        .resolve_manual_payment(user_id, payment_id, PaymentResolution::Rejected)
        .await
    {
        Ok(payment) => Json(payment).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn stats<S, M>(
    State(usecase): State<Arc<AdminUseCase<S, M>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    info!(%user_id, "admin: stats request received");
    match usecase.stats(user_id).await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}
