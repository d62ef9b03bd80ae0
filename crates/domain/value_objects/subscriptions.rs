use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::entities::subscription_profiles::{
    SubscriptionProfileEntity, UpdateSubscriptionProfileEntity,
};
use crate::domain::value_objects::enums::{
    plans::Plan, subscription_statuses::SubscriptionStatus, user_roles::UserRole,
};

/// How long one approved manual payment keeps a subscription active.
pub const PAID_PERIOD_DAYS: i64 = 30;

/// Effective subscription state for one user, after defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRecord {
    pub active_plan: Plan,
    pub status: SubscriptionStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub role: UserRole,
}

impl SubscriptionRecord {
    /// State assumed for users with no stored profile. Missing rows are not
    /// an error; everyone starts as a free-tier user.
    pub fn default_record() -> Self {
        Self {
            active_plan: Plan::Free,
            status: SubscriptionStatus::Free,
            expires_at: None,
            role: UserRole::User,
        }
    }
}

impl From<SubscriptionProfileEntity> for SubscriptionRecord {
    fn from(value: SubscriptionProfileEntity) -> Self {
        Self {
            active_plan: Plan::from_str(&value.active_plan).unwrap_or_default(),
            status: SubscriptionStatus::from_str(&value.status),
            expires_at: value.expires_at,
            role: UserRole::from_str(&value.role),
        }
    }
}

/// Partial overwrite of a stored profile. `None` plan/status/role fields are
/// left untouched on merge. `expires_at` is the exception: it is written on
/// every update, so a merge that does not carry an expiry clears any stale
/// one instead of leaking it into a downgraded profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    pub active_plan: Option<Plan>,
    pub status: Option<SubscriptionStatus>,
    pub expires_at: Option<DateTime<Utc>>,
    pub role: Option<UserRole>,
}

impl SubscriptionUpdate {
    /// Flags the profile while a submitted payment awaits review.
    pub fn payment_pending() -> Self {
        Self {
            active_plan: None,
            status: Some(SubscriptionStatus::Pending),
            expires_at: None,
            role: None,
        }
    }

    /// Activates the paid plan for one period starting at `now`.
    pub fn approved(plan: Plan, now: DateTime<Utc>) -> Self {
        Self {
            active_plan: Some(plan),
            status: Some(SubscriptionStatus::Active),
            expires_at: Some(now + Duration::days(PAID_PERIOD_DAYS)),
            role: None,
        }
    }

    /// Resets a rejected applicant back to the free tier.
    pub fn rejected() -> Self {
        Self {
            active_plan: Some(Plan::Free),
            status: Some(SubscriptionStatus::Free),
            expires_at: None,
            role: None,
        }
    }

    /// Downgrade written when a paid period has lapsed.
    pub fn expired() -> Self {
        Self {
            active_plan: Some(Plan::Free),
            status: Some(SubscriptionStatus::Expired),
            expires_at: None,
            role: None,
        }
    }

    pub fn to_entity(&self) -> UpdateSubscriptionProfileEntity {
        UpdateSubscriptionProfileEntity {
            active_plan: self.active_plan.map(|plan| plan.to_string()),
            status: self.status.map(|status| status.to_string()),
            expires_at: self.expires_at,
            role: self.role.map(|role| role.to_string()),
            updated_at: Utc::now(),
        }
    }
}

/// Result of applying the expiry rules to a stored record at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub record: SubscriptionRecord,
    /// Write the caller must persist to make the store match the returned
    /// view. `None` when the stored record is already current.
    pub pending_write: Option<SubscriptionUpdate>,
}

/// Applies lazy expiry to a record. Pure: the caller persists
/// `pending_write` (if any) and serves `record`.
///
/// A paid plan whose expiry is strictly in the past downgrades to the free
/// tier with status `expired`. A free-tier record is never touched, even if
/// it carries a stale expiry.
pub fn reconcile(record: SubscriptionRecord, now: DateTime<Utc>) -> Reconciled {
    let lapsed = matches!(record.expires_at, Some(expires_at) if expires_at < now);

    if lapsed && record.active_plan != Plan::Free {
        let downgraded = SubscriptionRecord {
            active_plan: Plan::Free,
            status: SubscriptionStatus::Expired,
            expires_at: None,
            role: record.role,
        };
        return Reconciled {
            record: downgraded,
            pending_write: Some(SubscriptionUpdate::expired()),
        };
    }

    Reconciled {
        record,
        pending_write: None,
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionDto {
    pub active_plan: Plan,
    pub status: SubscriptionStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub role: UserRole,
    pub invoice_limit: Option<i64>,
}

impl From<SubscriptionRecord> for SubscriptionDto {
    fn from(value: SubscriptionRecord) -> Self {
        Self {
            invoice_limit: value.active_plan.invoice_limit(),
            active_plan: value.active_plan,
            status: value.status,
            expires_at: value.expires_at,
            role: value.role,
        }
    }
}
