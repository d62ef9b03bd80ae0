use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::invoices::{
    InsertInvoiceEntity, InvoiceEntity, UpdateInvoiceEntity,
};

pub const MAX_LINE_ITEMS: usize = 200;
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;
pub const MAX_ITEM_PRICE_MINOR: i64 = 100_000_000_000;

/// One line item as stored inside the invoice document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    pub quantity: i64,
    pub price_minor: i64,
}

/// Client-supplied invoice fields for create and update. The total is never
/// accepted from the client; it is recomputed from the line items.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicePayload {
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
}

impl InvoicePayload {
    pub fn validate(&self) -> Result<(), String> {
        if self.invoice_number.trim().is_empty() {
            return Err("invoice_number is required".to_string());
        }
        if self.company_name.trim().is_empty() {
            return Err("company_name is required".to_string());
        }
        if self.company_address.trim().is_empty() {
            return Err("company_address is required".to_string());
        }
        if self.client_name.trim().is_empty() {
            return Err("client_name is required".to_string());
        }
        if !self.client_email.contains('@') {
            return Err("client_email must be a valid email address".to_string());
        }
        if self.items.is_empty() {
            return Err("at least one line item is required".to_string());
        }
        if self.items.len() > MAX_LINE_ITEMS {
            return Err(format!("at most {} line items are allowed", MAX_LINE_ITEMS));
        }

        let mut total: i64 = 0;
        for item in &self.items {
            if item.description.trim().is_empty() {
                return Err("item description is required".to_string());
            }
            if item.quantity <= 0 {
                return Err("item quantity must be positive".to_string());
            }
            if item.quantity > MAX_ITEM_QUANTITY {
                return Err("item quantity is out of range".to_string());
            }
            if item.price_minor < 0 {
                return Err("item price must not be negative".to_string());
            }
            if item.price_minor > MAX_ITEM_PRICE_MINOR {
                return Err("item price is out of range".to_string());
            }
            let line = item
                .quantity
                .checked_mul(item.price_minor)
                .ok_or_else(|| "invoice total is out of range".to_string())?;
            total = total
                .checked_add(line)
                .ok_or_else(|| "invoice total is out of range".to_string())?;
        }

        Ok(())
    }

    /// Sum of `quantity * price` over all line items.
    pub fn total_minor(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.quantity.saturating_mul(item.price_minor))
            .fold(0_i64, i64::saturating_add)
    }

    pub fn to_insert_entity(&self, user_id: Uuid) -> Result<InsertInvoiceEntity> {
        Ok(InsertInvoiceEntity {
            user_id,
            invoice_number: self.invoice_number.clone(),
            company_name: self.company_name.clone(),
            company_address: self.company_address.clone(),
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            issue_date: self.issue_date,
            due_date: self.due_date,
            logo_url: self.logo_url.clone(),
            notes: self.notes.clone(),
            items: serde_json::to_value(&self.items)?,
            total_minor: self.total_minor(),
        })
    }

    pub fn to_update_entity(&self) -> Result<UpdateInvoiceEntity> {
        Ok(UpdateInvoiceEntity {
            invoice_number: self.invoice_number.clone(),
            company_name: self.company_name.clone(),
            company_address: self.company_address.clone(),
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            issue_date: self.issue_date,
            due_date: self.due_date,
            logo_url: self.logo_url.clone(),
            notes: self.notes.clone(),
            items: serde_json::to_value(&self.items)?,
            total_minor: self.total_minor(),
            updated_at: Utc::now(),
        })
    }
}

/// Outcome of an invoice insert that enforces a count limit inside the same
/// transaction as the write.
#[derive(Debug, Clone)]
pub enum QuotaInsert {
    Created(InvoiceEntity),
    LimitReached { current_count: i64 },
}

#[derive(Debug, Serialize)]
pub struct LogoUploadResponse {
    pub logo_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
    pub id: Uuid,
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

impl From<InvoiceEntity> for InvoiceDto {
    fn from(value: InvoiceEntity) -> Self {
        Self {
            id: value.id,
            invoice_number: value.invoice_number,
            company_name: value.company_name,
            company_address: value.company_address,
            client_name: value.client_name,
            client_email: value.client_email,
            issue_date: value.issue_date,
            due_date: value.due_date,
            logo_url: value.logo_url,
            notes: value.notes,
            items: value.items,
            total_minor: value.total_minor,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: &str, quantity: i64, price_minor: i64) -> InvoiceItem {
        InvoiceItem {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            quantity,
            price_minor,
        }
    }

    fn sample_payload() -> InvoicePayload {
        InvoicePayload {
            invoice_number: "INV-2025-001".to_string(),
            company_name: "Warung Kopi Senja".to_string(),
            company_address: "Jl. Kemang Raya 12, Jakarta".to_string(),
            client_name: "PT Maju Terus".to_string(),
            client_email: "finance@majuterus.co.id".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            logo_url: None,
            notes: Some("Payment via bank transfer".to_string()),
            items: vec![item("Espresso beans 1kg", 2, 150_000)],
        }
    }

    #[test]
    fn accepts_well_formed_payload() {
        assert_eq!(sample_payload().validate(), Ok(()));
    }

    #[test]
    fn rejects_blank_invoice_number() {
        let mut payload = sample_payload();
        payload.invoice_number = "   ".to_string();

        assert_eq!(
            payload.validate(),
            Err("invoice_number is required".to_string())
        );
    }

    #[test]
    fn rejects_implausible_client_email() {
        let mut payload = sample_payload();
        payload.client_email = "not-an-email".to_string();

        assert_eq!(
            payload.validate(),
            Err("client_email must be a valid email address".to_string())
        );
    }

    #[test]
    fn rejects_empty_item_list() {
        let mut payload = sample_payload();
        payload.items.clear();

        assert_eq!(
            payload.validate(),
            Err("at least one line item is required".to_string())
        );
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut payload = sample_payload();
        payload.items = vec![item("Consulting", 0, 1_000)];

        assert_eq!(
            payload.validate(),
            Err("item quantity must be positive".to_string())
        );
    }

    #[test]
    fn rejects_negative_price() {
        let mut payload = sample_payload();
        payload.items = vec![item("Discount line", 1, -500)];

        assert_eq!(
            payload.validate(),
            Err("item price must not be negative".to_string())
        );
    }

    #[test]
    fn rejects_overflowing_total() {
        let mut payload = sample_payload();
        payload.items = (0..MAX_LINE_ITEMS)
            .map(|index| item(&format!("bulk {}", index), MAX_ITEM_QUANTITY, MAX_ITEM_PRICE_MINOR))
            .collect();

        assert_eq!(
            payload.validate(),
            Err("invoice total is out of range".to_string())
        );
    }

    #[test]
    fn total_is_recomputed_from_line_items() {
        let mut payload = sample_payload();
        payload.items = vec![
            item("Espresso beans 1kg", 2, 150_000),
            item("Grinder rental", 3, 10_000),
        ];

        assert_eq!(payload.total_minor(), 330_000);
    }

    #[test]
    fn insert_entity_carries_recomputed_total() {
        let mut payload = sample_payload();
        payload.items = vec![item("Setup fee", 1, 75_000), item("Support", 2, 25_000)];

        let entity = payload.to_insert_entity(Uuid::new_v4()).unwrap();

        assert_eq!(entity.total_minor, 125_000);
        let stored: Vec<InvoiceItem> = serde_json::from_value(entity.items).unwrap();
        assert_eq!(stored, payload.items);
    }
}
