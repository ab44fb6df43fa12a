//! Draft validation, run before the counter or store is touched.

use rust_decimal::Decimal;

use super::error::InvoiceError;
use crate::models::InvoiceDraft;

const MAX_CLIENT_NAME_CHARS: usize = 200;

/// Decimal places of the `NUMERIC(18, 2)` money columns.
const MONEY_SCALE: u32 = 2;
/// Decimal places of the `NUMERIC(18, 3)` quantity column.
const QUANTITY_SCALE: u32 = 3;

pub fn validate_draft(draft: &InvoiceDraft) -> Result<(), InvoiceError> {
    validate_client_name(&draft.client_name)?;
    amount("amount_paid", draft.amount_paid, MONEY_SCALE)?;
    amount("total_amount", draft.total_amount, MONEY_SCALE)?;

    for (i, item) in draft.items.iter().enumerate() {
        if item.designation.trim().is_empty() {
            return Err(InvoiceError::validation(
                format!("items[{i}].designation"),
                "must not be empty",
            ));
        }
        amount(&format!("items[{i}].quantity"), item.quantity, QUANTITY_SCALE)?;
        amount(&format!("items[{i}].price"), item.price, MONEY_SCALE)?;
    }

    Ok(())
}

fn validate_client_name(name: &str) -> Result<(), InvoiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InvoiceError::validation("client_name", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_CLIENT_NAME_CHARS {
        return Err(InvoiceError::validation(
            "client_name",
            format!("must be at most {MAX_CLIENT_NAME_CHARS} characters"),
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(InvoiceError::validation(
            "client_name",
            "must not contain control characters",
        ));
    }
    Ok(())
}

/// Non-negative and storable without rounding. Trailing zeros do not count
/// towards the scale.
fn amount(field: &str, value: Decimal, max_scale: u32) -> Result<(), InvoiceError> {
    if value < Decimal::ZERO {
        return Err(InvoiceError::validation(field, "must not be negative"));
    }
    if value.normalize().scale() > max_scale {
        return Err(InvoiceError::validation(
            field,
            format!("must have at most {max_scale} decimal places"),
        ));
    }
    Ok(())
}
