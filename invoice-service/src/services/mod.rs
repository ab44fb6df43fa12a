//! Services module for invoice-service.

pub mod counter;
pub mod database;
pub mod document;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod numbering;
pub mod pricing;
pub mod store;
pub mod upsert;
pub mod validation;

pub use counter::SequenceCounter;
pub use database::Database;
pub use document::{render_document, InvoiceDocument};
pub use error::{InvoiceError, StoreError};
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use pricing::PriceAdjuster;
pub use store::{CompanyDirectory, InvoiceStore, SequenceStore};
pub use upsert::{InvoiceUpsert, SaveOutcome, SavedInvoice};
