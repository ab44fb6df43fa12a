//! Invoice model for invoice-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::line_item::NewInvoiceItem;

/// Document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    Proforma,
    Definitive,
    BonLivraison,
    #[default]
    Simple,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Proforma => "proforma",
            InvoiceType::Definitive => "definitive",
            InvoiceType::BonLivraison => "bon_livraison",
            InvoiceType::Simple => "simple",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "proforma" => InvoiceType::Proforma,
            "definitive" => InvoiceType::Definitive,
            "bon_livraison" => InvoiceType::BonLivraison,
            _ => InvoiceType::Simple,
        }
    }
}

/// Invoice header as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub owner_id: String,
    pub number: String,
    pub company_id: Uuid,
    pub invoice_type: String,
    pub invoice_date: NaiveDate,
    pub client_name: String,
    pub client_address: Option<String>,
    pub amount_paid: Decimal,
    pub total_amount: Decimal,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Invoice {
    pub fn kind(&self) -> InvoiceType {
        InvoiceType::from_string(&self.invoice_type)
    }
}

/// What a caller submits on save. `number` is the one shown in the local
/// draft: a previously saved number updates that invoice, anything else
/// creates a new one under a freshly reserved number.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub number: String,
    pub company_id: Uuid,
    pub invoice_type: InvoiceType,
    pub client_name: String,
    pub client_address: Option<String>,
    pub amount_paid: Decimal,
    pub total_amount: Decimal,
    pub items: Vec<NewInvoiceItem>,
}

/// Header fields written on insert or overwrite.
#[derive(Debug, Clone)]
pub struct InvoiceHeader {
    pub owner_id: String,
    pub number: String,
    pub company_id: Uuid,
    pub invoice_type: InvoiceType,
    pub invoice_date: NaiveDate,
    pub client_name: String,
    pub client_address: Option<String>,
    pub amount_paid: Decimal,
    pub total_amount: Decimal,
}

impl InvoiceHeader {
    pub fn from_draft(owner_id: &str, number: String, date: NaiveDate, draft: &InvoiceDraft) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            number,
            company_id: draft.company_id,
            invoice_type: draft.invoice_type,
            invoice_date: date,
            client_name: draft.client_name.trim().to_string(),
            client_address: draft.client_address.clone(),
            amount_paid: draft.amount_paid,
            total_amount: draft.total_amount,
        }
    }
}

/// Paging parameters for listing invoices. `page` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct ListInvoicesFilter {
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListInvoicesFilter {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl ListInvoicesFilter {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(20).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

/// One page of invoice headers plus the owner's total count.
#[derive(Debug, Clone)]
pub struct InvoicePage {
    pub invoices: Vec<Invoice>,
    pub total: u64,
}
