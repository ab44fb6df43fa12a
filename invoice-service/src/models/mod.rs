//! Domain models for invoice-service.

mod company;
mod counter;
mod invoice;
mod line_item;

pub use company::Company;
pub use counter::CounterScope;
pub use invoice::{Invoice, InvoiceDraft, InvoiceHeader, InvoicePage, InvoiceType, ListInvoicesFilter};
pub use line_item::{InvoiceItem, NewInvoiceItem};
