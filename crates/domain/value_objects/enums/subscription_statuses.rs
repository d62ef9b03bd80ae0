use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a user's subscription profile.
///
/// `Free` doubles as the state for users who never paid and for users whose
/// payment was rejected. Unknown stored values parse as `Free` so a corrupt
/// row can never grant paid access.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Pending,
    Active,
    Expired,
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            SubscriptionStatus::Free => "free",
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
        };
        write!(f, "{}", status)
    }
}

impl SubscriptionStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "free" => SubscriptionStatus::Free,
            "pending" => SubscriptionStatus::Pending,
            "active" => SubscriptionStatus::Active,
            "expired" => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Free,
        }
    }
}
