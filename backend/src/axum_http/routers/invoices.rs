use crate::{
    auth::AuthUser,
    axum_http::error_responses::respond_error,
    usecases::{
        invoices::{CreateInvoiceOutcome, InvoiceUseCase},
        subscription_resolver::SubscriptionResolver,
    },
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use crates::{
    domain::{
        repositories::{
            invoices::InvoiceRepository, storage::ImageStorageClient,
            subscription_profiles::SubscriptionProfileRepository,
        },
        value_objects::invoices::InvoicePayload,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            invoices::InvoicePostgres, subscription_profiles::SubscriptionProfilePostgres,
        },
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    storage: Arc<dyn ImageStorageClient + Send + Sync>,
) -> Router {
    let profile_repository = Arc::new(SubscriptionProfilePostgres::new(Arc::clone(&db_pool)));
    let invoice_repository = Arc::new(InvoicePostgres::new(Arc::clone(&db_pool)));
    let resolver = Arc::new(SubscriptionResolver::new(profile_repository));

    let usecase = InvoiceUseCase::new(resolver, invoice_repository, storage);

    Router::new()
        .route("/", get(list_invoices))
        .route("/", post(create_invoice))
        .route("/logo", post(upload_logo))
        .route("/:invoice_id", put(update_invoice))
        .route("/:invoice_id", delete(delete_invoice))
        .with_state(Arc::new(usecase))
}

pub async fn list_invoices<S, I>(
    State(usecase): State<Arc<InvoiceUseCase<S, I>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
{
    info!(%user_id, "invoices: list request received");
    match usecase.list_invoices(user_id).await {
        Ok(invoices) => Json(invoices).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn create_invoice<S, I>(
    State(usecase): State<Arc<InvoiceUseCase<S, I>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(payload): Json<InvoicePayload>,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
{
    info!(%user_id, "invoices: create request received");
    match usecase.create_invoice(user_id, payload).await {
        Ok(CreateInvoiceOutcome::Created(invoice)) => {
            (StatusCode::CREATED, Json(invoice)).into_response()
        }
        Ok(CreateInvoiceOutcome::Denied(reason)) => {
            respond_error(StatusCode::FORBIDDEN, reason.message().to_string())
        }
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn update_invoice<S, I>(
    State(usecase): State<Arc<InvoiceUseCase<S, I>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<InvoicePayload>,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
{
    info!(%user_id, %invoice_id, "invoices: update request received");
    match usecase.update_invoice(user_id, invoice_id, payload).await {
        Ok(invoice) => Json(invoice).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn delete_invoice<S, I>(
    State(usecase): State<Arc<InvoiceUseCase<S, I>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
{
    info!(%user_id, %invoice_id, "invoices: delete request received");
    match usecase.delete_invoice(user_id, invoice_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}

pub async fn upload_logo<S, I>(
    State(usecase): State<Arc<InvoiceUseCase<S, I>>>,
    AuthUser { user_id, .. }: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
{
    info!(%user_id, "invoices: logo upload request received");
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    match usecase.upload_logo(user_id, body.to_vec(), &content_type).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => respond_error(err.status_code(), err.to_string()),
    }
}
