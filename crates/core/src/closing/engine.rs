//! Closing engine.
//!
//! Groups open ledger entries into a closing. Validation is all-or-nothing:
//! the first offending entry aborts the whole batch and is named in the
//! error. The resulting plan is sealed with an invoice number by the caller
//! inside the same transaction that persists it.

use chrono::{DateTime, Utc};
use itinera_shared::types::money::{MAX_AMOUNT, in_range};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::actor::{Actor, Role};
use crate::closing::types::{
    CloseRequest, Closing, ClosingDraft, ClosingLineItem, FinancialEntry, format_invoice_number,
};
use crate::error::CommissionError;
use crate::ledger::LedgerEntry;

/// A validated closing waiting for its invoice number.
#[derive(Debug, Clone)]
pub struct ClosingPlan {
    closing: Closing,
    items: Vec<ClosingLineItem>,
}

impl ClosingPlan {
    /// The closing id the plan will be persisted under.
    #[must_use]
    pub const fn closing_id(&self) -> Uuid {
        self.closing.id
    }

    /// Sum of line item amounts.
    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        self.closing.total_amount
    }

    /// Line item snapshots.
    #[must_use]
    pub fn items(&self) -> &[ClosingLineItem] {
        &self.items
    }

    /// Assigns the invoice number and builds the rows to persist.
    #[must_use]
    pub fn seal(self, invoice_number: i64) -> ClosingDraft {
        let mut closing = self.closing;
        closing.invoice_number = invoice_number;

        let label = format_invoice_number(closing.closing_type, invoice_number);
        let financial_entry = FinancialEntry {
            id: Uuid::new_v4(),
            closing_id: closing.id,
            kind: closing.closing_type.financial_kind(),
            counterparty: closing.recipient_name.clone(),
            description: format!(
                "{} closing {label}, {} to {}",
                closing.closing_type, closing.period_start, closing.period_end
            ),
            invoice_number: label,
            amount: closing.total_amount,
            currency: closing.currency,
            due_date: closing.period_end,
            created_at: closing.created_at,
        };

        ClosingDraft {
            closing,
            items: self.items,
            financial_entry,
        }
    }
}

/// Stateless closing engine.
pub struct ClosingEngine;

impl ClosingEngine {
    /// Validates `request` against the current, locked state of the
    /// selected entries and plans the closing.
    ///
    /// `entries` holds whichever of the requested entries exist; ids with no
    /// matching entry are reported as unknown.
    ///
    /// Checks run in this order, each across the whole selection before the
    /// next one starts:
    /// 1. actor is finance or above
    /// 2. non-empty selection without duplicates, valid period, recipient
    /// 3. every entry exists
    /// 4. no entry belongs to an active closing
    /// 5. every entry kind fits the closing type
    /// 6. every entry can close (operator tours concluded)
    /// 7. every entry is in the closing currency
    /// 8. overrides: admin only, inside the batch, not negative, within
    ///    [`MAX_AMOUNT`]
    /// 9. the total stays within [`MAX_AMOUNT`]
    ///
    /// # Errors
    ///
    /// Returns the `CommissionError` of the first failed check.
    pub fn prepare(
        request: &CloseRequest,
        entries: &[LedgerEntry],
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<ClosingPlan, CommissionError> {
        actor.require_role(Role::Finance)?;
        Self::validate_request(request)?;

        let by_id: HashMap<Uuid, &LedgerEntry> = entries.iter().map(|e| (e.id, e)).collect();
        let mut selected = Vec::with_capacity(request.entry_ids.len());
        for id in &request.entry_ids {
            let entry = by_id
                .get(id)
                .copied()
                .ok_or(CommissionError::UnknownEntry(*id))?;
            selected.push(entry);
        }

        for entry in &selected {
            if let Some(closing_id) = entry.closing_id {
                return Err(CommissionError::EntryClosed {
                    entry_id: entry.id,
                    closing_id,
                });
            }
        }

        let expected_kind = request.closing_type.entry_kind();
        if let Some(entry) = selected.iter().find(|e| e.kind != expected_kind) {
            return Err(CommissionError::KindMismatch {
                entry_id: entry.id,
                kind: entry.kind,
                closing_type: request.closing_type,
            });
        }

        if let Some(entry) = selected.iter().find(|e| !e.can_close()) {
            return Err(CommissionError::NotClosable {
                entry_id: entry.id,
                logistic_status: entry.logistic_status,
            });
        }

        if let Some(entry) = selected.iter().find(|e| e.currency != request.currency) {
            return Err(CommissionError::MixedCurrency {
                entry_id: entry.id,
                expected: request.currency,
                found: entry.currency,
            });
        }

        Self::validate_overrides(request, actor)?;

        let closing_id = Uuid::new_v4();
        let currency = request.currency;
        let items: Vec<ClosingLineItem> = selected
            .iter()
            .map(|entry| {
                let original_amount = currency.round(entry.amount());
                let amount = request
                    .overrides
                    .get(&entry.id)
                    .map_or(original_amount, |amount| currency.round(*amount));
                ClosingLineItem {
                    id: Uuid::new_v4(),
                    closing_id,
                    entry_id: entry.id,
                    kind: entry.kind,
                    reservation_id: entry.reservation_id,
                    reservation_number: entry.reservation_number.clone(),
                    tour_name: entry.tour_name.clone(),
                    client_name: entry.client_name.clone(),
                    pax: entry.pax,
                    sale_date: entry.sale_date,
                    operation_date: entry.operation_date,
                    original_amount,
                    amount,
                    status: entry.status,
                    logistic_status: entry.logistic_status,
                }
            })
            .collect();

        let total_amount = items.iter().try_fold(Decimal::ZERO, |total, item| {
            total
                .checked_add(item.amount)
                .filter(|sum| in_range(*sum))
                .ok_or(CommissionError::AmountOutOfRange {
                    item_id: item.entry_id,
                    amount: item.amount,
                })
        })?;
        let item_count = i32::try_from(items.len())
            .map_err(|_| CommissionError::Internal("too many line items".to_string()))?;

        let closing = Closing {
            id: closing_id,
            invoice_number: 0,
            closing_type: request.closing_type,
            recipient_name: request.recipient_name.trim().to_string(),
            period_start: request.period_start,
            period_end: request.period_end,
            currency,
            item_count,
            total_amount,
            created_at: now,
            created_by: actor.user_id,
            created_by_name: actor.name.clone(),
            is_active: true,
        };

        Ok(ClosingPlan { closing, items })
    }

    /// Checks the request shape without looking at any entry.
    ///
    /// # Errors
    ///
    /// `EmptySelection`, `DuplicateEntry`, `InvalidPeriod` or `RecipientRequired`.
    pub fn validate_request(request: &CloseRequest) -> Result<(), CommissionError> {
        if request.entry_ids.is_empty() {
            return Err(CommissionError::EmptySelection);
        }

        let mut seen = HashSet::with_capacity(request.entry_ids.len());
        if let Some(dup) = request.entry_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(CommissionError::DuplicateEntry(*dup));
        }

        if request.period_start > request.period_end {
            return Err(CommissionError::InvalidPeriod {
                start: request.period_start,
                end: request.period_end,
            });
        }

        if request.recipient_name.trim().is_empty() {
            return Err(CommissionError::RecipientRequired);
        }

        Ok(())
    }

    fn validate_overrides(request: &CloseRequest, actor: &Actor) -> Result<(), CommissionError> {
        if request.overrides.is_empty() {
            return Ok(());
        }
        actor.require_admin("override amounts at closing time")?;

        for (entry_id, amount) in &request.overrides {
            if !request.entry_ids.contains(entry_id) {
                return Err(CommissionError::OverrideOutsideBatch(*entry_id));
            }
            if *amount < Decimal::ZERO {
                return Err(CommissionError::NegativeAmount {
                    item_id: *entry_id,
                    amount: *amount,
                });
            }
            if request.currency.round(*amount) > MAX_AMOUNT {
                return Err(CommissionError::AmountOutOfRange {
                    item_id: *entry_id,
                    amount: *amount,
                });
            }
        }
        Ok(())
    }
}
