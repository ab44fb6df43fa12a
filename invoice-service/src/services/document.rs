//! Presentation model handed to invoice templates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::numbering::adapt;
use super::pricing::PriceAdjuster;
use crate::models::{Company, Invoice, InvoiceItem, InvoiceType};

/// Everything a template needs to print an invoice. Every template renders
/// from this model so all documents agree on adjusted prices and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub invoice_id: Uuid,
    pub number: String,
    pub display_number: String,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    pub template_id: String,
    pub company_name: String,
    pub date: NaiveDate,
    pub client_name: String,
    pub client_address: Option<String>,
    pub lines: Vec<DocumentLine>,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub balance_due: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    pub designation: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

pub fn render_document(invoice: &Invoice, items: &[InvoiceItem], company: &Company) -> InvoiceDocument {
    let adjuster = PriceAdjuster::for_company(company);

    let lines: Vec<DocumentLine> = items
        .iter()
        .map(|item| DocumentLine {
            designation: item.designation.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            unit_price: adjuster.adjust(item.price),
            total_price: adjuster.line_total(item.price, item.quantity),
        })
        .collect();

    let total: Decimal = lines.iter().map(|l| l.total_price).sum();
    let balance_due = (total - invoice.amount_paid).max(Decimal::ZERO);

    InvoiceDocument {
        invoice_id: invoice.invoice_id,
        number: invoice.number.clone(),
        display_number: adapt(&invoice.number, company, invoice.kind()),
        invoice_type: invoice.kind(),
        template_id: company.template_id.clone(),
        company_name: company.display_name.clone(),
        date: invoice.invoice_date,
        client_name: invoice.client_name.clone(),
        client_address: invoice.client_address.clone(),
        lines,
        total,
        amount_paid: invoice.amount_paid,
        balance_due,
    }
}
