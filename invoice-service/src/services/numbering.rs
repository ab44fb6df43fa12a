//! Invoice number formatting.
//!
//! The canonical number of record is the company-agnostic *base number*
//! `FAC-YYMM-NNNN`. Company and document-type branding is applied by
//! [`adapt`] at display time only and never stored.

use chrono::NaiveDate;

use crate::models::{Company, CounterScope, InvoiceType};

/// Literal prefix of every base number.
pub const BASE_PREFIX: &str = "FAC-";

/// Words ignored when deriving company initials: legal forms, determiners,
/// conjunctions and trade abbreviations.
const STOP_WORDS: &[&str] = &[
    "ETS", "ETABLISSEMENT", "ETABLISSEMENTS", "ÉTABLISSEMENT", "ÉTABLISSEMENTS", "STE", "STÉ",
    "SOCIETE", "SOCIÉTÉ", "CIE", "SARL", "SARLU", "SA", "SAS", "SASU", "EURL", "SNC", "GIE",
    "SCI", "LTD", "INC", "LLC", "CO", "LE", "LA", "LES", "L", "UN", "UNE", "DE", "DU", "DES",
    "D", "ET", "&", "EN", "AU", "AUX", "POUR", "PAR", "THE", "AND", "OF",
];

/// Generic number for `sequence` in the month of `date`. Padded to four
/// digits; longer sequences are emitted in full rather than truncated.
pub fn format_base(sequence: i64, date: NaiveDate) -> String {
    format!(
        "{}{}-{:04}",
        BASE_PREFIX,
        CounterScope::for_date(date),
        sequence
    )
}

/// Initials derived from the company display name.
///
/// Several significant words give one letter each ("SOCIETE GENERALE DE
/// TRANSPORT" -> "GT"); a single significant word gives its first three
/// letters ("ETS MLF" -> "MLF"). When every word is a stop word the first
/// three letters of the whole name are used.
pub fn company_prefix(company: &Company) -> String {
    let name = company.display_name.to_uppercase();
    let words: Vec<&str> = name
        .split(|c: char| c.is_whitespace() || c == '-' || c == '\'')
        .filter(|w| !w.is_empty() && !STOP_WORDS.iter().any(|stop| stop == w))
        .collect();

    match words.as_slice() {
        [] => first_letters(&name, 3),
        [single] => first_letters(single, 3),
        many => many
            .iter()
            .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
            .collect(),
    }
}

fn first_letters(s: &str, n: usize) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).take(n).collect()
}

pub fn type_prefix(invoice_type: InvoiceType) -> &'static str {
    match invoice_type {
        InvoiceType::Proforma => "PRO",
        InvoiceType::Definitive => "DEF",
        InvoiceType::BonLivraison => "BL",
        InvoiceType::Simple => "FAC",
    }
}

/// Re-brand a base number for display. Anything that does not start with
/// [`BASE_PREFIX`] (already adapted, or foreign) is returned unchanged.
pub fn adapt(base_number: &str, company: &Company, invoice_type: InvoiceType) -> String {
    match base_number.strip_prefix(BASE_PREFIX) {
        Some(rest) => format!(
            "{}{}-{}",
            company_prefix(company),
            type_prefix(invoice_type),
            rest
        ),
        None => base_number.to_string(),
    }
}
