use crates::domain::value_objects::enums::{
    plans::Plan, subscription_statuses::SubscriptionStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDenyReason {
    PaymentUnderReview,
    FreeTierLimitReached,
}

impl QuotaDenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            QuotaDenyReason::PaymentUnderReview => "payment under review",
            QuotaDenyReason::FreeTierLimitReached => "free tier limit reached",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allow,
    Deny(QuotaDenyReason),
}

/// Whether a user may create another invoice. Rules apply in order: a
/// pending payment blocks creation outright, then users without an active
/// subscription are held to the free tier cap. Paid tier caps are shown in
/// the catalog but not enforced here.
pub fn can_create_invoice(
    status: SubscriptionStatus,
    plan: Plan,
    current_count: i64,
) -> QuotaDecision {
    if status == SubscriptionStatus::Pending {
        return QuotaDecision::Deny(QuotaDenyReason::PaymentUnderReview);
    }

    if status != SubscriptionStatus::Active && plan == Plan::Free {
        if let Some(limit) = Plan::Free.invoice_limit() {
            if current_count >= limit {
                return QuotaDecision::Deny(QuotaDenyReason::FreeTierLimitReached);
            }
        }
    }

    QuotaDecision::Allow
}

/// Cap to enforce atomically at insert time, `None` when uncapped. Mirrors
/// the free tier branch of [`can_create_invoice`] so the insert cannot race
/// past the advisory check.
pub fn enforced_limit(status: SubscriptionStatus, plan: Plan) -> Option<i64> {
    if status != SubscriptionStatus::Active && plan == Plan::Free {
        Plan::Free.invoice_limit()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_user_at_cap_is_denied() {
        let decision = can_create_invoice(SubscriptionStatus::Free, Plan::Free, 5);

        assert_eq!(
            decision,
            QuotaDecision::Deny(QuotaDenyReason::FreeTierLimitReached)
        );
    }

    #[test]
    fn free_user_below_cap_is_allowed() {
        let decision = can_create_invoice(SubscriptionStatus::Free, Plan::Free, 4);

        assert_eq!(decision, QuotaDecision::Allow);
    }

    #[test]
    fn pending_payment_blocks_creation_before_any_count_check() {
        let decision = can_create_invoice(SubscriptionStatus::Pending, Plan::Basic, 0);

        assert_eq!(
            decision,
            QuotaDecision::Deny(QuotaDenyReason::PaymentUnderReview)
        );
    }

    #[test]
    fn active_paid_user_is_never_capped() {
        let decision = can_create_invoice(SubscriptionStatus::Active, Plan::Pro, 1000);

        assert_eq!(decision, QuotaDecision::Allow);
    }

    #[test]
    fn expired_subscription_falls_back_to_free_cap() {
        // Lazy expiry downgrades the plan to free before quota evaluation.
        let decision = can_create_invoice(SubscriptionStatus::Expired, Plan::Free, 5);

        assert_eq!(
            decision,
            QuotaDecision::Deny(QuotaDenyReason::FreeTierLimitReached)
        );
    }

    #[test]
    fn enforced_limit_caps_only_free_users_without_active_subscription() {
        assert_eq!(
            enforced_limit(SubscriptionStatus::Free, Plan::Free),
            Some(5)
        );
        assert_eq!(
            enforced_limit(SubscriptionStatus::Expired, Plan::Free),
            Some(5)
        );
        assert_eq!(enforced_limit(SubscriptionStatus::Active, Plan::Pro), None);
        assert_eq!(enforced_limit(SubscriptionStatus::Active, Plan::Basic), None);
    }

    #[test]
    fn deny_reasons_map_to_stable_messages() {
        assert_eq!(
            QuotaDenyReason::PaymentUnderReview.message(),
            "payment under review"
        );
        assert_eq!(
            QuotaDenyReason::FreeTierLimitReached.message(),
            "free tier limit reached"
        );
    }
}
