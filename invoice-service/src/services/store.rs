//! Storage seams used by the numbering core.
//!
//! [`Database`](super::Database) implements these over PostgreSQL and
//! [`MemoryStore`](super::MemoryStore) in process.

use async_trait::async_trait;
use uuid::Uuid;

use super::error::StoreError;
use crate::models::{
    Company, CounterScope, Invoice, InvoiceHeader, InvoiceItem, InvoicePage, ListInvoicesFilter,
    NewInvoiceItem,
};

/// Per-scope sequence counters.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Last issued sequence for `scope`, `0` when the scope has no row yet.
    /// Takes no lock.
    async fn current_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError>;

    /// Create the scope row if missing and add one, as a single atomic
    /// operation. Concurrent callers on one scope never see the same value.
    async fn increment_sequence(&self, scope: &CounterScope) -> Result<i64, StoreError>;
}

/// Invoice headers and their items.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn find_by_number(
        &self,
        owner_id: &str,
        number: &str,
    ) -> Result<Option<Invoice>, StoreError>;

    async fn get_invoice(
        &self,
        owner_id: &str,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, StoreError>;

    /// Items of an invoice ordered by position.
    async fn get_items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, StoreError>;

    /// Insert a header and its items atomically.
    async fn insert_invoice(
        &self,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError>;

    /// Overwrite the header of `invoice_id` (its number is kept) and replace
    /// all of its items, atomically.
    async fn replace_invoice(
        &self,
        invoice_id: Uuid,
        header: &InvoiceHeader,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, StoreError>;

    /// Delete an invoice and its items. Returns whether a row was removed.
    async fn delete_invoice(&self, owner_id: &str, invoice_id: Uuid) -> Result<bool, StoreError>;

    async fn list_invoices(
        &self,
        owner_id: &str,
        filter: &ListInvoicesFilter,
    ) -> Result<InvoicePage, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Read access to company profiles.
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn get_company(&self, company_id: Uuid) -> Result<Option<Company>, StoreError>;
}
