//! Field names between the display model (JSON, camelCase) and the
//! persisted model (columns, snake_case).
//!
//! Struct conversions live in [`super::invoice`]; this table is what error
//! paths and anything else that names a field go through.

/// `(display, persisted)` pairs.
pub const FIELD_MAP: &[(&str, &str)] = &[
    ("id", "invoice_id"),
    ("number", "number"),
    ("companyId", "company_id"),
    ("type", "invoice_type"),
    ("date", "invoice_date"),
    ("clientName", "client_name"),
    ("clientAddress", "client_address"),
    ("amountPaid", "amount_paid"),
    ("totalAmount", "total_amount"),
    ("items", "items"),
    ("designation", "designation"),
    ("quantity", "quantity"),
    ("unit", "unit"),
    ("unitPrice", "price"),
    ("totalPrice", "total_price"),
];

pub fn to_display(persisted: &str) -> Option<&'static str> {
    FIELD_MAP
        .iter()
        .find(|(_, p)| *p == persisted)
        .map(|(d, _)| *d)
}

/// Rewrite a persisted field path such as `items[2].price` into its display
/// form `items[2].unitPrice`. Unknown segments are kept as they are.
pub fn display_path(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            let (name, index) = match segment.find('[') {
                Some(at) => segment.split_at(at),
                None => (segment, ""),
            };
            format!("{}{}", to_display(name).unwrap_or(name), index)
        })
        .collect::<Vec<_>>()
        .join(".")
}
