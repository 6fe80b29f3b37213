//! Page layout for invoice documents.
//!
//! Coordinates are whole millimetres on an A4 page with the origin at the
//! bottom-left corner, the convention of the PDF writer.

use itinera_shared::config::InvoiceConfig;
use itinera_shared::types::{Currency, Money};
use rust_decimal::Decimal;

use crate::closing::{ClosingDetail, ClosingLineItem};

/// Left margin.
const LEFT: u16 = 15;
/// Right-hand header column.
const RIGHT_COLUMN: u16 = 130;
/// Top line of every page.
const TOP: u16 = 280;
/// First table row on the first page.
const FIRST_PAGE_ROW: u16 = 220;
/// First table row on continuation pages.
const NEXT_PAGE_ROW: u16 = 264;
/// Rows are not placed below this line.
const BOTTOM: u16 = 30;
/// Vertical distance between table rows.
const ROW_HEIGHT: u16 = 6;
/// Baseline of the footer.
const FOOTER: u16 = 12;

/// Table columns: header, x position, maximum characters.
const COLUMNS: [(&str, u16, usize); 6] = [
    ("Reservation", 15, 13),
    ("Tour", 42, 26),
    ("Client", 95, 21),
    ("Pax", 138, 4),
    ("Status", 150, 10),
    ("Amount", 172, 16),
];

/// One piece of text at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Text to print.
    pub text: String,
    /// Font size in points.
    pub size: u8,
    /// Distance from the left edge, in mm.
    pub x: u16,
    /// Distance from the bottom edge, in mm.
    pub y: u16,
    /// Bold face.
    pub bold: bool,
}

impl TextRun {
    fn regular(text: impl Into<String>, size: u8, x: u16, y: u16) -> Self {
        Self {
            text: text.into(),
            size,
            x,
            y,
            bold: false,
        }
    }

    fn bold(text: impl Into<String>, size: u8, x: u16, y: u16) -> Self {
        Self {
            bold: true,
            ..Self::regular(text, size, x, y)
        }
    }
}

/// Text runs of an invoice, page by page.
#[derive(Debug, Clone)]
pub struct InvoiceLayout {
    pages: Vec<Vec<TextRun>>,
}

impl InvoiceLayout {
    /// Lays out `detail` with the issuer details from `config`.
    #[must_use]
    pub fn build(detail: &ClosingDetail, config: &InvoiceConfig) -> Self {
        let closing = &detail.closing;
        let label = closing.invoice_label();
        let reversed = !closing.is_active;

        let mut page = Vec::new();
        page.push(TextRun::bold(config.issuer_name.as_str(), 16, LEFT, TOP));
        if let Some(address) = &config.issuer_address {
            page.push(TextRun::regular(address.as_str(), 9, LEFT, TOP - 6));
        }
        page.push(TextRun::bold(format!("INVOICE {label}"), 14, RIGHT_COLUMN, TOP));
        page.push(TextRun::regular(
            format!("Issued {}", closing.created_at.format("%Y-%m-%d")),
            9,
            RIGHT_COLUMN,
            TOP - 6,
        ));

        let details = [
            format!("Recipient: {}", closing.recipient_name),
            format!("Closing type: {}", closing.closing_type),
            format!("Period: {} to {}", closing.period_start, closing.period_end),
            format!("Currency: {}", closing.currency),
        ];
        let mut y = TOP - 20;
        for line in details {
            page.push(TextRun::regular(line, 10, LEFT, y));
            y -= 6;
        }

        if reversed {
            page.push(TextRun::bold("REVERSED", 18, RIGHT_COLUMN, TOP - 26));
            if let Some(reversal) = &detail.reversal {
                page.push(TextRun::regular(
                    fit(
                        &format!(
                            "Reversed {} by {}: {}",
                            reversal.undone_at.format("%Y-%m-%d"),
                            reversal.undone_by_name,
                            reversal.reason
                        ),
                        100,
                    ),
                    9,
                    LEFT,
                    y,
                ));
            }
        }

        let mut pages = Vec::new();
        Self::push_table_header(&mut page, FIRST_PAGE_ROW + ROW_HEIGHT);
        let mut y = FIRST_PAGE_ROW;

        for item in &detail.items {
            if y < BOTTOM {
                pages.push(std::mem::take(&mut page));
                page.extend(Self::continuation_header(&label, reversed));
                Self::push_table_header(&mut page, NEXT_PAGE_ROW + ROW_HEIGHT);
                y = NEXT_PAGE_ROW;
            }
            page.extend(Self::row(item, closing.currency, y));
            y -= ROW_HEIGHT;
        }

        if y < BOTTOM + ROW_HEIGHT {
            pages.push(std::mem::take(&mut page));
            page.extend(Self::continuation_header(&label, reversed));
            y = NEXT_PAGE_ROW;
        }
        page.push(TextRun::bold(
            format!(
                "Total: {} ({} items)",
                Money::new(closing.total_amount, closing.currency),
                closing.item_count
            ),
            11,
            LEFT,
            y - 4,
        ));
        pages.push(page);

        let page_count = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            if let Some(footer) = &config.footer {
                page.push(TextRun::regular(fit(footer, 90), 8, LEFT, FOOTER));
            }
            page.push(TextRun::regular(
                format!("Page {} of {page_count}", index + 1),
                8,
                172,
                FOOTER,
            ));
        }

        Self { pages }
    }

    /// Runs of each page, in order.
    #[must_use]
    pub fn pages(&self) -> &[Vec<TextRun>] {
        &self.pages
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if any run on any page prints `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.pages
            .iter()
            .flatten()
            .any(|run| run.text.contains(needle))
    }

    fn continuation_header(label: &str, reversed: bool) -> Vec<TextRun> {
        let mut runs = vec![TextRun::bold(
            format!("INVOICE {label} (continued)"),
            12,
            LEFT,
            TOP,
        )];
        if reversed {
            runs.push(TextRun::bold("REVERSED", 14, RIGHT_COLUMN, TOP));
        }
        runs
    }

    fn push_table_header(page: &mut Vec<TextRun>, y: u16) {
        for (title, x, _) in COLUMNS {
            page.push(TextRun::bold(title, 9, x, y));
        }
    }

    fn row(item: &ClosingLineItem, currency: Currency, y: u16) -> Vec<TextRun> {
        let mut amount = format_amount(item.amount, currency);
        if item.is_overridden() {
            amount.push_str(" *");
        }
        let cells = [
            item.reservation_number.clone(),
            item.tour_name.clone(),
            item.client_name.clone(),
            item.pax.to_string(),
            item.status.to_string(),
            amount,
        ];
        COLUMNS
            .iter()
            .zip(cells)
            .map(|((_, x, max), text)| TextRun::regular(fit(&text, *max), 9, *x, y))
            .collect()
    }
}

/// Formats an amount with the currency's minor units and no code.
fn format_amount(amount: Decimal, currency: Currency) -> String {
    let precision = usize::try_from(currency.minor_units()).unwrap_or(2);
    format!("{:.precision$}", currency.round(amount))
}

/// Shortens `text` to at most `max` characters.
fn fit(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(2)).collect();
    short.push_str("..");
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closing::{Closing, ClosingType};
    use crate::ledger::{EntryKind, EntryStatus};
    use crate::reversal::ReversalRecord;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn detail(item_count: usize, is_active: bool) -> ClosingDetail {
        let closing_id = Uuid::new_v4();
        let items: Vec<ClosingLineItem> = (0..item_count)
            .map(|i| ClosingLineItem {
                id: Uuid::new_v4(),
                closing_id,
                entry_id: Uuid::new_v4(),
                kind: EntryKind::Commission,
                reservation_id: Uuid::new_v4(),
                reservation_number: format!("R-{i:04}"),
                tour_name: "Full-day Colonia del Sacramento with lunch".to_string(),
                client_name: "G. Alvarez".to_string(),
                pax: 2,
                sale_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                operation_date: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
                original_amount: dec!(10),
                amount: dec!(10),
                status: EntryStatus::Approved,
                logistic_status: None,
            })
            .collect();
        let total: Decimal = items.iter().map(|i| i.amount).sum();
        ClosingDetail {
            closing: Closing {
                id: closing_id,
                invoice_number: 12,
                closing_type: ClosingType::Agency,
                recipient_name: "Rio Partners".to_string(),
                period_start: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                period_end: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
                currency: Currency::Uyu,
                item_count: i32::try_from(item_count).unwrap(),
                total_amount: total,
                created_at: Utc::now(),
                created_by: Uuid::new_v4(),
                created_by_name: "Lucia".to_string(),
                is_active,
            },
            items,
            reversal: (!is_active).then(|| ReversalRecord {
                id: Uuid::new_v4(),
                closing_id,
                reason: "wrong agency".to_string(),
                undone_by: Uuid::new_v4(),
                undone_by_name: "Ana".to_string(),
                undone_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_single_page_invoice() {
        let layout = InvoiceLayout::build(&detail(3, true), &InvoiceConfig::default());

        assert_eq!(layout.page_count(), 1);
        assert!(layout.contains("INVOICE AGC-000012"));
        assert!(layout.contains("Rio Partners"));
        assert!(layout.contains("Total: 30.00 UYU (3 items)"));
        assert!(layout.contains("Page 1 of 1"));
        assert!(!layout.contains("REVERSED"));
    }

    #[test]
    fn test_long_invoice_spans_pages() {
        let layout = InvoiceLayout::build(&detail(80, true), &InvoiceConfig::default());

        assert!(layout.page_count() >= 2);
        assert!(layout.contains("(continued)"));
        assert!(layout.contains("R-0079"));
        let last = layout.pages().last().unwrap();
        assert!(last.iter().any(|r| r.text.starts_with("Total:")));
        for page in layout.pages() {
            assert!(page.iter().all(|r| r.y >= FOOTER));
        }
    }

    #[test]
    fn test_reversed_invoice_is_marked() {
        let layout = InvoiceLayout::build(&detail(2, false), &InvoiceConfig::default());
        assert!(layout.contains("REVERSED"));
        assert!(layout.contains("wrong agency"));
    }

    #[test]
    fn test_fit_and_format() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("a very long tour name", 8), "a very..");
        assert_eq!(format_amount(dec!(1500.5), Currency::Clp), "1501");
        assert_eq!(format_amount(dec!(7), Currency::Eur), "7.00");
    }
}
