use anyhow::Result;
use chrono::Utc;
use crates::domain::{
    repositories::subscription_profiles::SubscriptionProfileRepository,
    value_objects::subscriptions::{SubscriptionRecord, reconcile},
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Resolves the effective subscription for a user: stored profile or free
/// defaults, with lapsed paid plans downgraded on read.
pub struct SubscriptionResolver<S>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
{
    profile_repo: Arc<S>,
}

impl<S> SubscriptionResolver<S>
where
    S: SubscriptionProfileRepository + Send + Sync + 'static,
{
    pub fn new(profile_repo: Arc<S>) -> Self {
        Self { profile_repo }
    }

    pub async fn resolve_current_record(&self, user_id: Uuid) -> Result<SubscriptionRecord> {
        let record = match self.profile_repo.find_by_user_id(user_id).await? {
            Some(profile) => SubscriptionRecord::from(profile),
            None => {
                debug!(%user_id, "subscription_resolver: no stored profile, assuming free tier");
                SubscriptionRecord::default_record()
            }
        };

        let reconciled = reconcile(record, Utc::now());

        if let Some(downgrade) = reconciled.pending_write {
            info!(%user_id, "subscription_resolver: persisting downgrade of lapsed subscription");
            self.profile_repo
                .upsert(user_id, downgrade.to_entity())
                .await?;
        }

        Ok(reconciled.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use crates::domain::{
        entities::subscription_profiles::SubscriptionProfileEntity,
        repositories::subscription_profiles::MockSubscriptionProfileRepository,
        value_objects::enums::{
            plans::Plan, subscription_statuses::SubscriptionStatus, user_roles::UserRole,
        },
    };
    use mockall::predicate::eq;

    fn stored_profile(
        user_id: Uuid,
        plan: Plan,
        status: SubscriptionStatus,
        expires_at: Option<DateTime<Utc>>,
    ) -> SubscriptionProfileEntity {
        let now = Utc::now();
        SubscriptionProfileEntity {
            user_id,
            active_plan: plan.to_string(),
            status: status.to_string(),
            expires_at,
            role: UserRole::User.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn assumes_free_tier_when_profile_missing() {
        let user_id = Uuid::new_v4();

        let mut profile_repo = MockSubscriptionProfileRepository::new();
        profile_repo
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(|_| Box::pin(async { Ok(None) }));
        profile_repo.expect_upsert().never();

        let resolver = SubscriptionResolver::new(Arc::new(profile_repo));

        let record = resolver.resolve_current_record(user_id).await.unwrap();

        assert_eq!(record, SubscriptionRecord::default_record());
    }

    #[tokio::test]
    async fn returns_stored_record_when_subscription_is_current() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(10);

        let mut profile_repo = MockSubscriptionProfileRepository::new();
        let profile = stored_profile(
            user_id,
            Plan::Basic,
            SubscriptionStatus::Active,
            Some(expires_at),
        );
        profile_repo
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let profile = profile.clone();
                Box::pin(async move { Ok(Some(profile)) })
            });
        profile_repo.expect_upsert().never();

        let resolver = SubscriptionResolver::new(Arc::new(profile_repo));

        let record = resolver.resolve_current_record(user_id).await.unwrap();

        assert_eq!(record.active_plan, Plan::Basic);
        assert_eq!(record.status, SubscriptionStatus::Active);
        assert_eq!(record.expires_at, Some(expires_at));
    }

    #[tokio::test]
    async fn downgrades_lapsed_paid_profile_and_persists_it() {
        let user_id = Uuid::new_v4();

        let mut profile_repo = MockSubscriptionProfileRepository::new();
        let profile = stored_profile(
            user_id,
            Plan::Pro,
            SubscriptionStatus::Active,
            Some(Utc::now() - Duration::days(1)),
        );
        profile_repo
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let profile = profile.clone();
                Box::pin(async move { Ok(Some(profile)) })
            });
        profile_repo
            .expect_upsert()
            .withf(move |id, changes| {
                *id == user_id
                    && changes.active_plan.as_deref() == Some("free")
                    && changes.status.as_deref() == Some("expired")
                    && changes.expires_at.is_none()
                    && changes.role.is_none()
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let resolver = SubscriptionResolver::new(Arc::new(profile_repo));

        let record = resolver.resolve_current_record(user_id).await.unwrap();

        assert_eq!(record.active_plan, Plan::Free);
        assert_eq!(record.status, SubscriptionStatus::Expired);
        assert_eq!(record.expires_at, None);
    }

    #[tokio::test]
    async fn never_downgrades_free_profile_with_stale_expiry() {
        let user_id = Uuid::new_v4();
        let stale = Utc::now() - Duration::days(30);

        let mut profile_repo = MockSubscriptionProfileRepository::new();
        let profile = stored_profile(user_id, Plan::Free, SubscriptionStatus::Free, Some(stale));
        profile_repo
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let profile = profile.clone();
                Box::pin(async move { Ok(Some(profile)) })
            });
        profile_repo.expect_upsert().never();

        let resolver = SubscriptionResolver::new(Arc::new(profile_repo));

        let record = resolver.resolve_current_record(user_id).await.unwrap();

        assert_eq!(record.active_plan, Plan::Free);
        assert_eq!(record.status, SubscriptionStatus::Free);
        assert_eq!(record.expires_at, Some(stale));
    }
}
