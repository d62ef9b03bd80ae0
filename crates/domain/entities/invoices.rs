use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::invoices::InvoiceItem, infra::db::postgres::schema::invoices,
};

#[derive(Debug, Clone)]
pub struct InvoiceEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invoice_number: String,
    pub company_name: String,
    pub company_address: String,
    pub client_name: String,
    pub client_email: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub logo_url: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub total_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row used for Diesel queries. Line items stay as JSON and are parsed into InvoiceItem.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoices)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invoice_number: String,
    pub company_name: String,
    pub company_address: String,
    pub client_name: String,
    pub client_email: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub logo_url: Option<String>,
    pub notes: Option<String>,
    pub items: serde_json::Value,
    pub total_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InvoiceRow> for InvoiceEntity {
    fn from(value: InvoiceRow) -> Self {
        let items = serde_json::from_value(value.items).unwrap_or_default();

        Self {
            id: value.id,
            user_id: value.user_id,
            invoice_number: value.invoice_number,
            company_name: value.company_name,
            company_address: value.company_address,
            client_name: value.client_name,
            client_email: value.client_email,
            issue_date: value.issue_date,
            due_date: value.due_date,
            logo_url: value.logo_url,
            notes: value.notes,
            items,
            total_minor: value.total_minor,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct InsertInvoiceEntity {
    pub user_id: Uuid,
    pub invoice_number: String,
    pub company_name: String,
    pub company_address: String,
    pub client_name: String,
    pub client_email: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub logo_url: Option<String>,
    pub notes: Option<String>,
    pub items: serde_json::Value,
    pub total_minor: i64,
}

/// Full-overwrite changeset for an invoice edit. `logo_url` and `notes`
/// clear to NULL when the new revision omits them.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = invoices)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateInvoiceEntity {
    pub invoice_number: String,
    pub company_name: String,
    pub company_address: String,
    pub client_name: String,
    pub client_email: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub logo_url: Option<String>,
    pub notes: Option<String>,
    pub items: serde_json::Value,
    pub total_minor: i64,
    pub updated_at: DateTime<Utc>,
}
