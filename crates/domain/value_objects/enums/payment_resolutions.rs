use std::fmt::Display;

use crate::domain::value_objects::enums::manual_payment_statuses::ManualPaymentStatus;

/// Outcome an admin chose for a pending manual payment. Recorded on the
/// ledger row before the subscription change is applied, so an interrupted
/// resolution can be replayed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentResolution {
    Approved,
    Rejected,
}

impl Display for PaymentResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resolution = match self {
            PaymentResolution::Approved => "approved",
            PaymentResolution::Rejected => "rejected",
        };
        write!(f, "{}", resolution)
    }
}

impl PaymentResolution {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(PaymentResolution::Approved),
            "rejected" => Some(PaymentResolution::Rejected),
            _ => None,
        }
    }

    /// Terminal ledger status this resolution settles into.
    pub fn final_status(&self) -> ManualPaymentStatus {
        match self {
            PaymentResolution::Approved => ManualPaymentStatus::Approved,
            PaymentResolution::Rejected => ManualPaymentStatus::Rejected,
        }
    }
}
