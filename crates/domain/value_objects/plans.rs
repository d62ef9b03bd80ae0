use serde::Serialize;

use crate::domain::value_objects::enums::plans::Plan;

/// Pricing and quota attached to one plan. The catalog is fixed at compile
/// time; changing a tier means shipping a new build, which is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanMeta {
    pub plan: Plan,
    pub label: &'static str,
    pub description: &'static str,
    /// Price in minor currency units for one 30-day period.
    pub price_minor: i32,
    /// `None` means unbounded.
    pub invoice_limit: Option<i64>,
}

pub const PLAN_CATALOG: [PlanMeta; 3] = [
    PlanMeta {
        plan: Plan::Free,
        label: "Free",
        description: "Get started with up to 5 invoices",
        price_minor: 0,
        invoice_limit: Some(5),
    },
    PlanMeta {
        plan: Plan::Basic,
        label: "Basic",
        description: "Up to 50 invoices for small businesses",
        price_minor: 50_000,
        invoice_limit: Some(50),
    },
    PlanMeta {
        plan: Plan::Pro,
        label: "Pro",
        description: "Unlimited invoices and priority review",
        price_minor: 150_000,
        invoice_limit: None,
    },
];

impl Plan {
    pub fn meta(&self) -> &'static PlanMeta {
        match self {
            Plan::Free => &PLAN_CATALOG[0],
            Plan::Basic => &PLAN_CATALOG[1],
            Plan::Pro => &PLAN_CATALOG[2],
        }
    }

    pub fn price_minor(&self) -> i32 {
        self.meta().price_minor
    }

    pub fn invoice_limit(&self) -> Option<i64> {
        self.meta().invoice_limit
    }
}

#[derive(Debug, Serialize)]
pub struct PlanDto {
    pub id: Plan,
    pub label: String,
    pub description: String,
    pub price_minor: i32,
    pub invoice_limit: Option<i64>,
}

impl From<&PlanMeta> for PlanDto {
    fn from(value: &PlanMeta) -> Self {
        Self {
            id: value.plan,
            label: value.label.to_string(),
            description: value.description.to_string(),
            price_minor: value.price_minor,
            invoice_limit: value.invoice_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entries_match_their_tier() {
        for meta in &PLAN_CATALOG {
            assert_eq!(meta.plan.meta(), meta);
        }
    }

    #[test]
    fn free_plan_is_unpaid_and_capped() {
        assert_eq!(Plan::Free.price_minor(), 0);
        assert_eq!(Plan::Free.invoice_limit(), Some(5));
    }

    #[test]
    fn paid_plans_have_prices() {
        assert_eq!(Plan::Basic.price_minor(), 50_000);
        assert_eq!(Plan::Basic.invoice_limit(), Some(50));
        assert_eq!(Plan::Pro.price_minor(), 150_000);
        assert_eq!(Plan::Pro.invoice_limit(), None);
    }

    #[test]
    fn plan_parsing_rejects_unknown_tier() {
        assert_eq!(Plan::from_str("basic"), Some(Plan::Basic));
        assert_eq!(Plan::from_str("enterprise"), None);
        assert_eq!(Plan::from_str(""), None);
    }
}
