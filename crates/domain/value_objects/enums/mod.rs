pub mod manual_payment_statuses;
pub mod payment_resolutions;
pub mod plans;
pub mod subscription_statuses;
pub mod user_roles;
