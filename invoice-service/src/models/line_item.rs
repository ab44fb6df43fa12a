//! Invoice item model for invoice-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted line on an invoice. Prices are stored before markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub item_id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub designation: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub price: Decimal,
    pub total_price: Decimal,
}

/// Input for writing a line item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoiceItem {
    pub designation: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub price: Decimal,
}

impl NewInvoiceItem {
    /// `quantity * price`, before any markup.
    pub fn total_price(&self) -> Decimal {
        self.quantity * self.price
    }
}
