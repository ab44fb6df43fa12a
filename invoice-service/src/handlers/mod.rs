pub mod health;
pub mod invoices;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use invoices::{
    delete_invoice, get_invoice, get_invoice_document, list_invoices, peek_next_number,
    save_invoice,
};
