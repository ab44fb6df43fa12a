use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Invoice, InvoiceDraft, InvoiceItem, InvoicePage, InvoiceType, NewInvoiceItem};
use crate::services::{SaveOutcome, SavedInvoice};

/// Line item in display form. `totalPrice` is output only; on input it is
/// recomputed from `quantity * unitPrice`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemDto {
    #[validate(length(min = 1, message = "Designation is required"))]
    pub designation: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    pub unit_price: Decimal,
    #[serde(default)]
    pub total_price: Decimal,
}

impl From<&InvoiceItemDto> for NewInvoiceItem {
    fn from(dto: &InvoiceItemDto) -> Self {
        Self {
            designation: dto.designation.trim().to_string(),
            quantity: dto.quantity,
            unit: dto.unit.clone().filter(|u| !u.trim().is_empty()),
            price: dto.unit_price,
        }
    }
}

impl From<InvoiceItem> for InvoiceItemDto {
    fn from(item: InvoiceItem) -> Self {
        Self {
            designation: item.designation,
            quantity: item.quantity,
            unit: item.unit,
            unit_price: item.price,
            total_price: item.total_price,
        }
    }
}

/// Local draft as edited in the UI.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraftDto {
    /// Number shown in the draft: a previously saved number to overwrite,
    /// or the provisional number from `next-number`.
    #[serde(default)]
    pub number: String,
    #[serde(rename = "type", default)]
    pub invoice_type: InvoiceType,
    #[validate(length(min = 1, max = 200, message = "Client name must be 1 to 200 characters"))]
    pub client_name: String,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<InvoiceItemDto>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveInvoiceRequest {
    #[validate(nested)]
    pub invoice: InvoiceDraftDto,
    pub company_id: Uuid,
    pub total_amount: Decimal,
}

impl SaveInvoiceRequest {
    pub fn into_draft(self) -> InvoiceDraft {
        let items = self.invoice.items.iter().map(NewInvoiceItem::from).collect();
        InvoiceDraft {
            number: self.invoice.number,
            company_id: self.company_id,
            invoice_type: self.invoice.invoice_type,
            client_name: self.invoice.client_name,
            client_address: self.invoice.client_address,
            amount_paid: self.invoice.amount_paid,
            total_amount: self.total_amount,
            items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInvoiceResponse {
    pub invoice_id: Uuid,
    pub number: String,
    pub outcome: String,
    /// True when the stored number differs from the submitted one.
    pub number_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub submitted_number: Option<String>,
}

impl From<SavedInvoice> for SaveInvoiceResponse {
    fn from(saved: SavedInvoice) -> Self {
        let outcome = saved.outcome.as_str().to_string();
        let submitted_number = match saved.outcome {
            SaveOutcome::Renumbered { submitted } => Some(submitted),
            SaveOutcome::Created | SaveOutcome::Updated => None,
        };
        Self {
            invoice_id: saved.invoice_id,
            number: saved.number,
            outcome,
            number_changed: submitted_number.is_some(),
            submitted_number,
        }
    }
}

/// Full invoice in display form.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub number: String,
    pub company_id: Uuid,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    pub date: NaiveDate,
    pub client_name: String,
    pub client_address: Option<String>,
    pub amount_paid: Decimal,
    pub total_amount: Decimal,
    pub items: Vec<InvoiceItemDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceResponse {
    pub fn new(invoice: Invoice, items: Vec<InvoiceItem>) -> Self {
        Self {
            invoice_type: invoice.kind(),
            id: invoice.invoice_id,
            number: invoice.number,
            company_id: invoice.company_id,
            date: invoice.invoice_date,
            client_name: invoice.client_name,
            client_address: invoice.client_address,
            amount_paid: invoice.amount_paid,
            total_amount: invoice.total_amount,
            items: items.into_iter().map(InvoiceItemDto::from).collect(),
            created_at: invoice.created_utc,
            updated_at: invoice.updated_utc,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub number: String,
    pub company_id: Uuid,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    pub date: NaiveDate,
    pub client_name: String,
    pub amount_paid: Decimal,
    pub total_amount: Decimal,
}

impl From<Invoice> for InvoiceSummary {
    fn from(invoice: Invoice) -> Self {
        Self {
            invoice_type: invoice.kind(),
            id: invoice.invoice_id,
            number: invoice.number,
            company_id: invoice.company_id,
            date: invoice.invoice_date,
            client_name: invoice.client_name,
            amount_paid: invoice.amount_paid,
            total_amount: invoice.total_amount,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceSummary>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl InvoiceListResponse {
    pub fn new(page: InvoicePage, page_number: u32, page_size: u32) -> Self {
        let total_pages = page.total.div_ceil(u64::from(page_size));
        Self {
            invoices: page.invoices.into_iter().map(InvoiceSummary::from).collect(),
            total: page.total,
            page: page_number,
            page_size,
            total_pages,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberParams {
    pub date: Option<NaiveDate>,
    pub company_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub invoice_type: Option<InvoiceType>,
}

/// Provisional next number. Nothing is reserved: the number may be taken
/// by the time the draft is saved, in which case the save renumbers.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberResponse {
    pub scope: String,
    pub sequence: i64,
    pub base_number: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_number: Option<String>,
    pub provisional: bool,
}
