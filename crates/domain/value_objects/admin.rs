use serde::Serialize;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AdminStatsDto {
    pub total_users: i64,
    pub active_users: i64,
    pub pending_payments: i64,
}
