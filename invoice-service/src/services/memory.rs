//! In-process store for local development and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::StoreError;
use super::store::{CompanyDirectory, InvoiceStore, SequenceStore};
use crate::models::{
    Company, CounterScope, Invoice, InvoiceHeader, InvoiceItem, InvoicePage, ListInvoicesFilter,
    NewInvoiceItem,
};

#[derive(Default)]
struct State {
    counters: HashMap<CounterScope, i64>,
    invoices: HashMap<Uuid, Invoice>,
    items: HashMap<Uuid, Vec<InvoiceItem>>,
    companies: HashMap<Uuid, Company>,
}

/// All tables behind one lock, so every trait method is atomic with respect
/// to the others. Cloning shares the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the company directory.
    pub async fn insert_company(&self, company: Company) {
        let mut state = self.state.lock().await;
        state.companies.insert(company.company_id, company);
    }

    /// Number of stored invoices across all owners.
    pub async fn invoice_count(&self) -> usize {
        self.state.lock().await.invoices.len()
    }
}

fn build_items(invoice_id: Uuid, items: &[NewInvoiceItem]) -> Vec<InvoiceItem> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| InvoiceItem {
            item_id: Uuid::new_v4(),
            invoice_id,
            position: position as i32,
            designation: item.designation.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            price: item.price,
            total_price: item.total_price(),
        })
        .collect()
}

/// Sequences past 9999 are wider, so compare by length before text.
fn number_order(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[async_trait]
impl SequenceStore for MemoryStore {
    async fn current_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(state.counters.get(scope).copied().unwrap_or(0))
    }

    async fn increment_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError> {
        let mut state = self.state.lock().await;
        let last = state.counters.entry(scope.clone()).or_insert(0);
        *last += 1;
        Ok(*last)
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn find_by_number(
        &self,
        owner_id: &str,
        number: &str,
    ) -> Result<Option<Invoice>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .invoices
            .values()
            .find(|inv| inv.owner_id == owner_id && inv.number == number)
            .cloned())
    }

    async fn get_invoice(
        &self,
        owner_id: &str,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .invoices
            .get(&invoice_id)
            .filter(|inv| inv.owner_id == owner_id)
            .cloned())
    }

    async fn get_items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.items.get(&invoice_id).cloned().unwrap_or_default())
    }

    async fn insert_invoice(
        &self,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError> {
        let mut state = self.state.lock().await;

        let taken = state
            .invoices
            .values()
            .any(|inv| inv.owner_id == header.owner_id && inv.number == header.number);
        if taken {
            return Err(StoreError::Conflict(format!(
                "invoice number {} already exists",
                header.number
            )));
        }

        let now = Utc::now();
        let invoice = Invoice {
            invoice_id: Uuid::new_v4(),
            owner_id: header.owner_id.clone(),
            number: header.number.clone(),
            company_id: header.company_id,
            invoice_type: header.invoice_type.as_str().to_string(),
            invoice_date: header.invoice_date,
            client_name: header.client_name.clone(),
            client_address: header.client_address.clone(),
            amount_paid: header.amount_paid,
            total_amount: header.total_amount,
            created_utc: now,
            updated_utc: now,
        };

        state
            .items
            .insert(invoice.invoice_id, build_items(invoice.invoice_id, items));
        state.invoices.insert(invoice.invoice_id, invoice.clone());

        Ok(invoice)
    }

    async fn replace_invoice(
        &self,
        invoice_id: Uuid,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError> {
        let mut state = self.state.lock().await;

        let invoice = state
            .invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| StoreError::Query(format!("invoice {} does not exist", invoice_id)))?;

        invoice.company_id = header.company_id;
        invoice.invoice_type = header.invoice_type.as_str().to_string();
        invoice.invoice_date = header.invoice_date;
        invoice.client_name = header.client_name.clone();
        invoice.client_address = header.client_address.clone();
        invoice.amount_paid = header.amount_paid;
        invoice.total_amount = header.total_amount;
        invoice.updated_utc = Utc::now();
        let updated = invoice.clone();

        state.items.insert(invoice_id, build_items(invoice_id, items));

        Ok(updated)
    }

    async fn delete_invoice(&self, owner_id: &str, invoice_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;

        let owned = state
            .invoices
            .get(&invoice_id)
            .is_some_and(|inv| inv.owner_id == owner_id);
        if !owned {
            return Ok(false);
        }

        state.invoices.remove(&invoice_id);
        state.items.remove(&invoice_id);
        Ok(true)
    }

    async fn list_invoices(
        &self,
        owner_id: &str,
        filter: &ListInvoicesFilter,
    ) -> Result<InvoicePage, StoreError> {
        let state = self.state.lock().await;

        let mut owned: Vec<&Invoice> = state
            .invoices
            .values()
            .filter(|inv| inv.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| {
            b.invoice_date
                .cmp(&a.invoice_date)
                .then_with(|| number_order(&b.number, &a.number))
        });

        let total = owned.len() as u64;
        let invoices = owned
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .cloned()
            .collect();

        Ok(InvoicePage { invoices, total })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl CompanyDirectory for MemoryStore {
    async fn get_company(&self, company_id: Uuid) -> Result<Option<Company>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.companies.get(&company_id).cloned())
    }
}
