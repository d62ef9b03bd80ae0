pub mod admin;
pub mod enums;
pub mod invoices;
pub mod manual_payments;
pub mod plans;
pub mod subscriptions;
