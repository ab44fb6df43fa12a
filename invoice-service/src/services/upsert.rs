//! Create-or-update-by-number save workflow.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::counter::SequenceCounter;
use super::error::{InvoiceError, StoreError};
use super::metrics::{ERRORS_TOTAL, SAVES_TOTAL};
use super::numbering::format_base;
use super::store::{CompanyDirectory, InvoiceStore};
use super::validation::validate_draft;
use crate::models::{CounterScope, InvoiceDraft, InvoiceHeader};

/// How a save resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// New invoice stored under the number the caller submitted.
    Created,
    /// Existing invoice with the submitted number was overwritten.
    Updated,
    /// New invoice stored, but under a different number than submitted
    /// because the submitted one was already taken or stale. The caller
    /// should tell the user.
    Renumbered { submitted: String },
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveOutcome::Created => "created",
            SaveOutcome::Updated => "updated",
            SaveOutcome::Renumbered { .. } => "renumbered",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedInvoice {
    pub invoice_id: Uuid,
    pub number: String,
    pub outcome: SaveOutcome,
}

/// Ties numbering and persistence together.
///
/// The submitted number is looked up for the owner first. A hit overwrites
/// that invoice in place; a miss reserves a fresh number from the counter,
/// which is authoritative even when it differs from the submitted one.
/// Copying an invoice and changing only its number is therefore how a
/// client clones it.
#[derive(Clone)]
pub struct InvoiceUpsert {
    counter: SequenceCounter,
    invoices: Arc<dyn InvoiceStore>,
    companies: Arc<dyn CompanyDirectory>,
}

impl InvoiceUpsert {
    pub fn new(
        counter: SequenceCounter,
        invoices: Arc<dyn InvoiceStore>,
        companies: Arc<dyn CompanyDirectory>,
    ) -> Self {
        Self {
            counter,
            invoices,
            companies,
        }
    }

    /// Save `draft` for `owner_id`. `today` is the caller's local date; it
    /// selects the counter scope and becomes the invoice date.
    #[instrument(
        skip(self, draft),
        fields(owner_id = %owner_id, submitted = %draft.number, company_id = %draft.company_id)
    )]
    pub async fn save(
        &self,
        owner_id: &str,
        draft: &InvoiceDraft,
        today: NaiveDate,
    ) -> Result<SavedInvoice, InvoiceError> {
        let result = self.save_inner(owner_id, draft, today).await;

        match &result {
            Ok(saved) => {
                SAVES_TOTAL
                    .with_label_values(&[saved.outcome.as_str()])
                    .inc();
            }
            Err(e) => {
                ERRORS_TOTAL.with_label_values(&[e.kind()]).inc();
            }
        }

        result
    }

    async fn save_inner(
        &self,
        owner_id: &str,
        draft: &InvoiceDraft,
        today: NaiveDate,
    ) -> Result<SavedInvoice, InvoiceError> {
        validate_draft(draft)?;

        let submitted = draft.number.trim();
        self.companies
            .get_company(draft.company_id)
            .await
            .map_err(persistence_error(submitted, submitted))?
            .ok_or(InvoiceError::CompanyNotFound(draft.company_id))?;

        let existing = if submitted.is_empty() {
            None
        } else {
            self.invoices
                .find_by_number(owner_id, submitted)
                .await
                .map_err(persistence_error(submitted, submitted))?
        };

        if let Some(existing) = existing {
            let header = InvoiceHeader::from_draft(owner_id, existing.number.clone(), today, draft);
            let invoice = self
                .invoices
                .replace_invoice(existing.invoice_id, &header, &draft.items)
                .await
                .map_err(persistence_error(&existing.number, submitted))?;

            info!(
                invoice_id = %invoice.invoice_id,
                invoice_number = %invoice.number,
                item_count = draft.items.len(),
                "Invoice updated"
            );

            return Ok(SavedInvoice {
                invoice_id: invoice.invoice_id,
                number: invoice.number,
                outcome: SaveOutcome::Updated,
            });
        }

        let scope = CounterScope::for_date(today);
        let sequence = self.counter.increment_and_get(&scope).await?;
        let number = format_base(sequence, today);

        let header = InvoiceHeader::from_draft(owner_id, number.clone(), today, draft);
        let invoice = self
            .invoices
            .insert_invoice(&header, &draft.items)
            .await
            .map_err(persistence_error(&number, submitted))?;

        let outcome = if submitted.is_empty() || submitted == invoice.number {
            SaveOutcome::Created
        } else {
            warn!(
                submitted = %submitted,
                assigned = %invoice.number,
                "Invoice number changed on save"
            );
            SaveOutcome::Renumbered {
                submitted: submitted.to_string(),
            }
        };

        info!(
            invoice_id = %invoice.invoice_id,
            invoice_number = %invoice.number,
            item_count = draft.items.len(),
            "Invoice created"
        );

        Ok(SavedInvoice {
            invoice_id: invoice.invoice_id,
            number: invoice.number,
            outcome,
        })
    }
}

fn persistence_error(number: &str, submitted: &str) -> impl FnOnce(StoreError) -> InvoiceError {
    let number = number.to_string();
    let submitted = submitted.to_string();
    move |source| InvoiceError::Persistence {
        number,
        submitted,
        source,
    }
}
