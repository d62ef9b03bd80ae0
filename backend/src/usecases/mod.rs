pub mod admin;
pub mod invoices;
pub mod quota;
pub mod subscription_resolver;
pub mod subscriptions;
