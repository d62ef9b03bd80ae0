pub mod admin;
pub mod invoices;
pub mod plans;
pub mod subscriptions;
