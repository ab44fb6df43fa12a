//! Markup and rounding rules shared by every invoice template.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Company;

/// Marked-up prices are rounded to the nearest multiple of this amount.
const ROUNDING_GRAIN: i64 = 500;

/// Unit price after `markup_percentage`, rounded half-up to the nearest 500.
///
/// A zero markup returns `price` untouched. The markup is trusted to be in
/// `[0, 100]`; range checks belong to the company profile editor.
pub fn adjust(price: Decimal, markup_percentage: Decimal) -> Decimal {
    if markup_percentage.is_zero() {
        return price;
    }

    let grain = Decimal::from(ROUNDING_GRAIN);
    let raised = price * (Decimal::ONE + markup_percentage / Decimal::ONE_HUNDRED);
    (raised / grain).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * grain
}

/// Adjusted unit price times quantity. The quantity itself is not rounded.
pub fn line_total(price: Decimal, quantity: Decimal, markup_percentage: Decimal) -> Decimal {
    adjust(price, markup_percentage) * quantity
}

/// Price adjuster bound to one company's markup.
#[derive(Debug, Clone, Copy)]
pub struct PriceAdjuster {
    markup_percentage: Decimal,
}

impl PriceAdjuster {
    pub fn new(markup_percentage: Decimal) -> Self {
        Self { markup_percentage }
    }

    pub fn for_company(company: &Company) -> Self {
        Self::new(company.markup_percentage)
    }

    pub fn adjust(&self, price: Decimal) -> Decimal {
        adjust(price, self.markup_percentage)
    }

    pub fn line_total(&self, price: Decimal, quantity: Decimal) -> Decimal {
        line_total(price, quantity, self.markup_percentage)
    }
}
