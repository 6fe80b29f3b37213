//! Ledger list filtering.

use chrono::NaiveDate;
use itinera_shared::types::Currency;
use serde::{Deserialize, Serialize};

use super::types::{EntryKind, EntryStatus};

/// Which date a date-range filter applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateType {
    /// Reservation sale date.
    #[default]
    Sale,
    /// Tour operation date.
    Operation,
}

impl DateType {
    /// Parses a date type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sale" | "sale_date" => Some(Self::Sale),
            "operation" | "operation_date" => Some(Self::Operation),
            _ => None,
        }
    }
}

/// Filter for ledger entry listings.
///
/// `is_closed` is resolved against active-closing membership by the store,
/// never against a stored flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Inclusive lower bound on the selected date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the selected date.
    pub date_to: Option<NaiveDate>,
    /// Date the range applies to.
    pub date_type: DateType,
    /// Free text matched against subject, reservation number, client and tour.
    pub search: Option<String>,
    /// Exact subject name.
    pub subject_name: Option<String>,
    /// Exact tour name.
    pub tour_name: Option<String>,
    /// Any of these statuses; empty means all.
    pub statuses: Vec<EntryStatus>,
    /// Open (`false`) or closed (`true`) entries only.
    pub is_closed: Option<bool>,
    /// Entry kind.
    pub kind: Option<EntryKind>,
    /// Currency.
    pub currency: Option<Currency>,
}

impl LedgerFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the search term as an `ILIKE` pattern, or `None` when blank.
    ///
    /// `%`, `_` and `\` in the term are escaped so they match literally.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let mut escaped = String::with_capacity(term.len() + 2);
        escaped.push('%');
        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        Some(escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(term: &str) -> LedgerFilter {
        LedgerFilter {
            search: Some(term.to_string()),
            ..LedgerFilter::new()
        }
    }

    #[test]
    fn test_blank_search_has_no_pattern() {
        assert_eq!(LedgerFilter::new().search_pattern(), None);
        assert_eq!(search("   ").search_pattern(), None);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search(" 50%_off ").search_pattern().as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(search("a\\b").search_pattern().as_deref(), Some("%a\\\\b%"));
    }

    #[test]
    fn test_date_type_parse() {
        assert_eq!(DateType::parse("operation"), Some(DateType::Operation));
        assert_eq!(DateType::parse("SALE_DATE"), Some(DateType::Sale));
        assert_eq!(DateType::parse("travel"), None);
        assert_eq!(DateType::default(), DateType::Sale);
    }
}
