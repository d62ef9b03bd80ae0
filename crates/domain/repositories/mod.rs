pub mod invoices;
pub mod manual_payments;
pub mod storage;
pub mod subscription_profiles;
