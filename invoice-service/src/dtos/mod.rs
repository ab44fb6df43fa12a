pub mod invoice;
pub mod mapping;

pub use invoice::{
    InvoiceItemDto, InvoiceListResponse, InvoiceResponse, InvoiceSummary, ListInvoicesParams,
    NextNumberParams, NextNumberResponse, SaveInvoiceRequest, SaveInvoiceResponse,
};
pub use mapping::display_path;
