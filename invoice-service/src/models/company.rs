//! Company model for invoice-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Issuing company, read from the company directory. Never written here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub company_id: Uuid,
    pub display_name: String,
    /// Percentage surcharge in `[0, 100]`, clamped by the profile editor.
    pub markup_percentage: Decimal,
    pub template_id: String,
}
