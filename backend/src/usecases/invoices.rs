use std::sync::Arc;

use crates::domain::{
    repositories::{
        invoices::InvoiceRepository, storage::ImageStorageClient,
        subscription_profiles::SubscriptionProfileRepository,
    },
    value_objects::invoices::{InvoiceDto, InvoicePayload, LogoUploadResponse, QuotaInsert},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    quota::{self, QuotaDecision, QuotaDenyReason},
    subscription_resolver::SubscriptionResolver,
};

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("{0}")]
    Validation(String),
    #[error("invoice not found")]
    NotFound,
    #[error("image is empty")]
    EmptyImage,
    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl InvoiceError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            InvoiceError::Validation(_)
            | InvoiceError::EmptyImage
            | InvoiceError::UnsupportedImageType(_) => StatusCode::BAD_REQUEST,
            InvoiceError::NotFound => StatusCode::NOT_FOUND,
            InvoiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, InvoiceError>;

/// Result of a create attempt. A quota denial is a regular outcome here, not
/// an error: the router turns it into a 403 with the deny reason.
#[derive(Debug)]
pub enum CreateInvoiceOutcome {
    Created(InvoiceDto),
    Denied(QuotaDenyReason),
}

pub struct InvoiceUseCase<S, I>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
{
    resolver: Arc<SubscriptionResolver<S>>,
    invoice_repo: Arc<I>,
    storage: Arc<dyn ImageStorageClient + Send + Sync>,
}

impl<S, I> InvoiceUseCase<S, I>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
{
    pub fn new(
        resolver: Arc<SubscriptionResolver<S>>,
        invoice_repo: Arc<I>,
        storage: Arc<dyn ImageStorageClient + Send + Sync>,
    ) -> Self {
        Self {
            resolver,
            invoice_repo,
            storage,
        }
    }

    pub async fn list_invoices(&self, user_id: Uuid) -> UseCaseResult<Vec<InvoiceDto>> {
        info!(%user_id, "invoices: listing invoices");

        let invoices = self
            .invoice_repo
            .list_by_user_newest_first(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "invoices: failed to list invoices");
                InvoiceError::Internal(err)
            })?;

        Ok(invoices.into_iter().map(InvoiceDto::from).collect())
    }

    pub async fn create_invoice(
        &self,
        user_id: Uuid,
        payload: InvoicePayload,
    ) -> UseCaseResult<CreateInvoiceOutcome> {
        info!(
            %user_id,
            invoice_number = %payload.invoice_number,
            item_count = payload.items.len(),
            "invoices: create invoice requested"
        );

        payload.validate().map_err(|message| {
            let err = InvoiceError::Validation(message);
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                error = %err,
                "invoices: create rejected by validation"
            );
            err
        })?;

        let record = self
            .resolver
            .resolve_current_record(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "invoices: failed to resolve subscription before create"
                );
                InvoiceError::Internal(err)
            })?;

        let current_count = self
            .invoice_repo
            .count_by_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "invoices: failed to count invoices");
                InvoiceError::Internal(err)
            })?;

        if let QuotaDecision::Deny(reason) =
            quota::can_create_invoice(record.status, record.active_plan, current_count)
        {
            warn!(
                %user_id,
                current_count,
                reason = reason.message(),
                "invoices: create denied by quota"
            );
            return Ok(CreateInvoiceOutcome::Denied(reason));
        }

        let entity = payload.to_insert_entity(user_id).map_err(|err| {
            error!(%user_id, error = ?err, "invoices: failed to build invoice row");
            InvoiceError::Internal(err)
        })?;

        let limit = quota::enforced_limit(record.status, record.active_plan);
        let inserted = self
            .invoice_repo
            .create_within_limit(entity, limit)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "invoices: failed to insert invoice");
                InvoiceError::Internal(err)
            })?;

        match inserted {
            QuotaInsert::Created(invoice) => {
                info!(
                    %user_id,
                    invoice_id = %invoice.id,
                    total_minor = invoice.total_minor,
                    "invoices: invoice created"
                );
                Ok(CreateInvoiceOutcome::Created(InvoiceDto::from(invoice)))
            }
            QuotaInsert::LimitReached { current_count } => {
                // A concurrent create filled the last free slot between the
                // advisory check and the insert.
                warn!(
                    %user_id,
                    current_count,
                    "invoices: create lost the race for the last free slot"
                );
                Ok(CreateInvoiceOutcome::Denied(
                    QuotaDenyReason::FreeTierLimitReached,
                ))
            }
        }
    }

    pub async fn update_invoice(
        &self,
        user_id: Uuid,
        invoice_id: Uuid,
        payload: InvoicePayload,
    ) -> UseCaseResult<InvoiceDto> {
        info!(%user_id, %invoice_id, "invoices: update invoice requested");

        payload.validate().map_err(|message| {
            let err = InvoiceError::Validation(message);
            warn!(
                %user_id,
                %invoice_id,
                status = err.status_code().as_u16(),
                error = %err,
                "invoices: update rejected by validation"
            );
            err
        })?;

        let changes = payload.to_update_entity().map_err(|err| {
            error!(%user_id, %invoice_id, error = ?err, "invoices: failed to build changeset");
            InvoiceError::Internal(err)
        })?;

        let updated = self
            .invoice_repo
            .update_owned(invoice_id, user_id, changes)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %invoice_id,
                    db_error = ?err,
                    "invoices: failed to update invoice"
                );
                InvoiceError::Internal(err)
            })?;

        match updated {
            Some(invoice) => {
                info!(%user_id, %invoice_id, "invoices: invoice updated");
                Ok(InvoiceDto::from(invoice))
            }
            None => {
                let err = InvoiceError::NotFound;
                warn!(
                    %user_id,
                    %invoice_id,
                    status = err.status_code().as_u16(),
                    "invoices: update target not found for user"
                );
                Err(err)
            }
        }
    }

    pub async fn delete_invoice(&self, user_id: Uuid, invoice_id: Uuid) -> UseCaseResult<()> {
        info!(%user_id, %invoice_id, "invoices: delete invoice requested");

        let deleted = self
            .invoice_repo
            .delete_owned(invoice_id, user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %invoice_id,
                    db_error = ?err,
                    "invoices: failed to delete invoice"
                );
                InvoiceError::Internal(err)
            })?;

        if !deleted {
            let err = InvoiceError::NotFound;
            warn!(
                %user_id,
                %invoice_id,
                status = err.status_code().as_u16(),
                "invoices: delete target not found for user"
            );
            return Err(err);
        }

        info!(%user_id, %invoice_id, "invoices: invoice deleted");
        Ok(())
    }

    pub async fn upload_logo(
        &self,
        user_id: Uuid,
        image: Vec<u8>,
        content_type: &str,
    ) -> UseCaseResult<LogoUploadResponse> {
        info!(
            %user_id,
            image_size = image.len(),
            content_type,
            "invoices: logo upload requested"
        );

        if image.is_empty() {
            let err = InvoiceError::EmptyImage;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "invoices: empty logo upload"
            );
            return Err(err);
        }

        if !content_type.starts_with("image/") {
            let err = InvoiceError::UnsupportedImageType(content_type.to_string());
            warn!(
                %user_id,
                content_type,
                status = err.status_code().as_u16(),
                "invoices: logo upload with non-image content type"
            );
            return Err(err);
        }

        let logo_url = self
            .storage
            .upload_invoice_logo(user_id, image, content_type)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    storage_error = ?err,
                    "invoices: failed to upload logo"
                );
                InvoiceError::Internal(err)
            })?;

        info!(%user_id, %logo_url, "invoices: logo uploaded");
        Ok(LogoUploadResponse { logo_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, Utc};
    use crates::domain::{
        entities::{
            invoices::InvoiceEntity, subscription_profiles::SubscriptionProfileEntity,
        },
        repositories::{
            invoices::MockInvoiceRepository,
            subscription_profiles::MockSubscriptionProfileRepository,
        },
        value_objects::invoices::InvoiceItem,
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    struct FakeStorage {
        url: &'static str,
    }

    #[async_trait]
    impl ImageStorageClient for FakeStorage {
        async fn upload_payment_proof(
            &self,
            _user_id: Uuid,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> AnyResult<String> {
            Ok(self.url.to_string())
        }

        async fn upload_invoice_logo(
            &self,
            _user_id: Uuid,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> AnyResult<String> {
            Ok(self.url.to_string())
        }
    }

    fn usecase_with(
        profile_repo: MockSubscriptionProfileRepository,
        invoice_repo: MockInvoiceRepository,
    ) -> InvoiceUseCase<MockSubscriptionProfileRepository, MockInvoiceRepository> {
        InvoiceUseCase::new(
            Arc::new(SubscriptionResolver::new(Arc::new(profile_repo))),
            Arc::new(invoice_repo),
            Arc::new(FakeStorage {
                url: "https://project.supabase.co/storage/v1/object/public/uploads/logo.png",
            }),
        )
    }

    fn sample_payload() -> InvoicePayload {
        InvoicePayload {
            invoice_number: "INV-2025-001".to_string(),
            company_name: "Warung Kopi Senja".to_string(),
            company_address: "Jl. Melati No. 5, Yogyakarta".to_string(),
            client_name: "PT Maju Terus".to_string(),
            client_email: "finance@majuterus.co.id".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            logo_url: None,
            notes: None,
            items: vec![InvoiceItem {
                id: "item-1".to_string(),
                description: "Catering kopi untuk acara kantor".to_string(),
                quantity: 20,
                price_minor: 35_000,
            }],
        }
    }

    fn stored_invoice(user_id: Uuid, payload: &InvoicePayload) -> InvoiceEntity {
        let now = Utc::now();
        InvoiceEntity {
            id: Uuid::new_v4(),
            user_id,
            invoice_number: payload.invoice_number.clone(),
            company_name: payload.company_name.clone(),
            company_address: payload.company_address.clone(),
            client_name: payload.client_name.clone(),
            client_email: payload.client_email.clone(),
            issue_date: payload.issue_date,
            due_date: payload.due_date,
            logo_url: payload.logo_url.clone(),
            notes: payload.notes.clone(),
            items: payload.items.clone(),
            total_minor: payload.total_minor(),
            created_at: now,
            updated_at: now,
        }
    }

    fn active_profile(user_id: Uuid, plan: &str) -> SubscriptionProfileEntity {
        let now = Utc::now();
        SubscriptionProfileEntity {
            user_id,
            active_plan: plan.to_string(),
            status: "active".to_string(),
            expires_at: Some(now + Duration::days(20)),
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn profile_repo_returning(
        profile: Option<SubscriptionProfileEntity>,
    ) -> MockSubscriptionProfileRepository {
        let mut profile_repo = MockSubscriptionProfileRepository::new();
        profile_repo.expect_find_by_user_id().returning(move |_| {
            let profile = profile.clone();
            Box::pin(async move { Ok(profile) })
        });
        profile_repo
    }

    #[tokio::test]
    async fn create_denies_free_user_at_cap() {
        let user_id = Uuid::new_v4();

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_count_by_user()
            .with(eq(user_id))
            .returning(|_| Box::pin(async { Ok(5) }));
        invoice_repo.expect_create_within_limit().never();

        let usecase = usecase_with(profile_repo_returning(None), invoice_repo);

        let outcome = usecase
            .create_invoice(user_id, sample_payload())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            CreateInvoiceOutcome::Denied(QuotaDenyReason::FreeTierLimitReached)
        ));
    }

    #[tokio::test]
    async fn create_allows_free_user_below_cap() {
        let user_id = Uuid::new_v4();
        let payload = sample_payload();
        let invoice = stored_invoice(user_id, &payload);

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_count_by_user()
            .returning(|_| Box::pin(async { Ok(4) }));
        invoice_repo
            .expect_create_within_limit()
            .withf(move |entity, limit| entity.user_id == user_id && *limit == Some(5))
            .times(1)
            .returning(move |_, _| {
                let invoice = invoice.clone();
                Box::pin(async move { Ok(QuotaInsert::Created(invoice)) })
            });

        let usecase = usecase_with(profile_repo_returning(None), invoice_repo);

        let outcome = usecase.create_invoice(user_id, payload).await.unwrap();

        match outcome {
            CreateInvoiceOutcome::Created(dto) => {
                assert_eq!(dto.invoice_number, "INV-2025-001");
                assert_eq!(dto.total_minor, 700_000);
            }
            other => panic!("expected created invoice, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_denies_while_payment_is_pending() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let pending_profile = SubscriptionProfileEntity {
            user_id,
            active_plan: "free".to_string(),
            status: "pending".to_string(),
            expires_at: None,
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_count_by_user()
            .returning(|_| Box::pin(async { Ok(0) }));
        invoice_repo.expect_create_within_limit().never();

        let usecase = usecase_with(profile_repo_returning(Some(pending_profile)), invoice_repo);

        let outcome = usecase
            .create_invoice(user_id, sample_payload())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            CreateInvoiceOutcome::Denied(QuotaDenyReason::PaymentUnderReview)
        ));
    }

    #[tokio::test]
    async fn create_never_caps_active_paid_user() {
        let user_id = Uuid::new_v4();
        let payload = sample_payload();
        let invoice = stored_invoice(user_id, &payload);

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_count_by_user()
            .returning(|_| Box::pin(async { Ok(1_000) }));
        invoice_repo
            .expect_create_within_limit()
            .withf(|_, limit| limit.is_none())
            .times(1)
            .returning(move |_, _| {
                let invoice = invoice.clone();
                Box::pin(async move { Ok(QuotaInsert::Created(invoice)) })
            });

        let usecase = usecase_with(
            profile_repo_returning(Some(active_profile(user_id, "pro"))),
            invoice_repo,
        );

        let outcome = usecase.create_invoice(user_id, payload).await.unwrap();

        assert!(matches!(outcome, CreateInvoiceOutcome::Created(_)));
    }

    #[tokio::test]
    async fn create_applies_lazy_expiry_before_quota_check() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let lapsed_profile = SubscriptionProfileEntity {
            user_id,
            active_plan: "basic".to_string(),
            status: "active".to_string(),
            expires_at: Some(now - Duration::days(2)),
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut profile_repo = MockSubscriptionProfileRepository::new();
        profile_repo.expect_find_by_user_id().returning(move |_| {
            let profile = lapsed_profile.clone();
            Box::pin(async move { Ok(Some(profile)) })
        });
        profile_repo
            .expect_upsert()
            .withf(|_, changes| changes.status.as_deref() == Some("expired"))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_count_by_user()
            .returning(|_| Box::pin(async { Ok(5) }));
        invoice_repo.expect_create_within_limit().never();

        let usecase = usecase_with(profile_repo, invoice_repo);

        let outcome = usecase
            .create_invoice(user_id, sample_payload())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            CreateInvoiceOutcome::Denied(QuotaDenyReason::FreeTierLimitReached)
        ));
    }

    #[tokio::test]
    async fn create_maps_insert_race_to_denial() {
        let user_id = Uuid::new_v4();

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_count_by_user()
            .returning(|_| Box::pin(async { Ok(4) }));
        invoice_repo
            .expect_create_within_limit()
            .returning(|_, _| {
                Box::pin(async { Ok(QuotaInsert::LimitReached { current_count: 5 }) })
            });

        let usecase = usecase_with(profile_repo_returning(None), invoice_repo);

        let outcome = usecase
            .create_invoice(user_id, sample_payload())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            CreateInvoiceOutcome::Denied(QuotaDenyReason::FreeTierLimitReached)
        ));
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload_before_any_lookup() {
        let mut payload = sample_payload();
        payload.items.clear();

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo.expect_count_by_user().never();
        invoice_repo.expect_create_within_limit().never();

        let usecase = usecase_with(MockSubscriptionProfileRepository::new(), invoice_repo);

        let result = usecase.create_invoice(Uuid::new_v4(), payload).await;

        assert!(matches!(
            result,
            Err(InvoiceError::Validation(message)) if message == "at least one line item is required"
        ));
    }

    #[tokio::test]
    async fn update_returns_not_found_for_foreign_invoice() {
        let user_id = Uuid::new_v4();
        let invoice_id = Uuid::new_v4();

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_update_owned()
            .with(eq(invoice_id), eq(user_id), mockall::predicate::always())
            .returning(|_, _, _| Box::pin(async { Ok(None) }));

        let usecase = usecase_with(MockSubscriptionProfileRepository::new(), invoice_repo);

        let result = usecase
            .update_invoice(user_id, invoice_id, sample_payload())
            .await;

        assert!(matches!(result, Err(InvoiceError::NotFound)));
    }

    #[tokio::test]
    async fn delete_returns_not_found_when_no_row_matches() {
        let user_id = Uuid::new_v4();
        let invoice_id = Uuid::new_v4();

        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_delete_owned()
            .with(eq(invoice_id), eq(user_id))
            .returning(|_, _| Box::pin(async { Ok(false) }));

        let usecase = usecase_with(MockSubscriptionProfileRepository::new(), invoice_repo);

        let result = usecase.delete_invoice(user_id, invoice_id).await;

        assert!(matches!(result, Err(InvoiceError::NotFound)));
    }

    #[tokio::test]
    async fn logo_upload_rejects_non_image_content_type() {
        let usecase = usecase_with(
            MockSubscriptionProfileRepository::new(),
            MockInvoiceRepository::new(),
        );

        let result = usecase
            .upload_logo(Uuid::new_v4(), vec![0x00, 0x01], "text/plain")
            .await;

        assert!(matches!(
            result,
            Err(InvoiceError::UnsupportedImageType(content_type)) if content_type == "text/plain"
        ));
    }

    #[tokio::test]
    async fn logo_upload_returns_public_url() {
        let usecase = usecase_with(
            MockSubscriptionProfileRepository::new(),
            MockInvoiceRepository::new(),
        );

        let response = usecase
            .upload_logo(Uuid::new_v4(), vec![0x89, 0x50, 0x4E, 0x47], "image/png")
            .await
            .unwrap();

        assert_eq!(
            response.logo_url,
            "https://project.supabase.co/storage/v1/object/public/uploads/logo.png"
        );
    }
}
