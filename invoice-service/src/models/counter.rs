//! Counter scope model for invoice-service.

use chrono::NaiveDate;
use std::fmt;

/// Period bucket a sequence counter applies to: two-digit year followed by
/// two-digit month (`YYMM`). Dates in the same calendar month share a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterScope(String);

impl CounterScope {
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.format("%y%m").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
