pub mod invoices;
pub mod manual_payments;
pub mod subscription_profiles;
