use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Subscription tier. The set is closed; pricing and limits live in
/// `value_objects::plans::PLAN_CATALOG`.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Basic,
    Pro,
}

impl Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plan = match self {
            Plan::Free => "free",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
        };
        write!(f, "{}", plan)
    }
}

impl Plan {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Plan::Free),
            "basic" => Some(Plan::Basic),
            "pro" => Some(Plan::Pro),
            _ => None,
        }
    }
}
