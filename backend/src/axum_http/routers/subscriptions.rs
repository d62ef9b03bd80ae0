use crate::{
    auth::AuthUser,
    axum_http::error_responses::respond_error,
    usecases::{subscription_resolver::SubscriptionResolver, subscriptions::SubscriptionUseCase},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            manual_payments::ManualPaymentRepository, storage::ImageStorageClient,
            subscription_profiles::SubscriptionProfileRepository,
        },
        value_objects::manual_payments::SubmitManualPaymentRequest,
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

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    storage: Arc<dyn ImageStorageClient + Send + Sync>,
) -> Router {
    let profile_repository = Arc::new(SubscriptionProfilePostgres::new(Arc::clone(&db_pool)));
    let payment_repository = Arc::new(ManualPaymentPostgres::new(Arc::clone(&db_pool)));
    let resolver = Arc::new(SubscriptionResolver::new(Arc::clone(&profile_repository)));

    let usecase =
        SubscriptionUseCase::new(resolver, profile_repository, payment_repository, storage);

    Router::new()
        .route("/me", get(current_subscription))
        .route("/proof", post(upload_payment_proof))
        .route("/manual-payments", post(submit_manual_payment))
        .with_state(Arc::new(usecase))
}

pub async fn current_subscription<S, M>(
    State(usecase): State<Arc<SubscriptionUseCase<S, M>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    info!(%user_id, "subscriptions: current subscription request received");
    match usecase.current_subscription(user_id).await {
        Ok(subscription) => Json(subscription).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn upload_payment_proof<S, M>(
    State(usecase): State<Arc<SubscriptionUseCase<S, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    info!(%user_id, "subscriptions: payment proof upload request received");
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    match usecase
        .upload_payment_proof(user_id, body.to_vec(), &content_type)
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn submit_manual_payment<S, M>(
    State(usecase): State<Arc<SubscriptionUseCase<S, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<SubmitManualPaymentRequest>,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    M: ManualPaymentRepository + Send + Sync + 'static,
{
    info!(%user_id, "subscriptions: manual payment submission received");
    match usecase.submit_manual_payment(user_id, request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}
