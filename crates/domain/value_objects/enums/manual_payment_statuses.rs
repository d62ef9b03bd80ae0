use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Review state of a submitted transfer proof. `Approved` and `Rejected`
/// are terminal.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManualPaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Display for ManualPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ManualPaymentStatus::Pending => "pending",
            ManualPaymentStatus::Approved => "approved",
            ManualPaymentStatus::Rejected => "rejected",
        };
        write!(f, "{}", status)
    }
}

impl ManualPaymentStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "pending" => ManualPaymentStatus::Pending,
            "approved" => ManualPaymentStatus::Approved,
            "rejected" => ManualPaymentStatus::Rejected,
            _ => ManualPaymentStatus::Pending,
        }
    }
}
