//! Initial database migration.
//!
//! Creates the ledger, adjustment, closing and reversal tables, their enums,
//! and the triggers that keep sealed data immutable.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 3: ADJUSTMENT WORKFLOW
        // ============================================================
        db.execute_unprepared(ADJUSTMENTS_SQL).await?;

        // ============================================================
        // PART 4: CLOSINGS
        // ============================================================
        db.execute_unprepared(CLOSINGS_SQL).await?;
        db.execute_unprepared(FINANCIAL_ENTRIES_SQL).await?;
        db.execute_unprepared(REVERSALS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE entry_kind AS ENUM ('commission', 'operator_payment');
CREATE TYPE entry_status AS ENUM ('pending', 'approved', 'paid', 'cancelled');
CREATE TYPE logistic_status AS ENUM (
    'pending', 'confirmed', 'in_progress', 'completed', 'no_show', 'cancelled'
);
CREATE TYPE adjustment_type AS ENUM ('increase', 'reduction', 'removal');
CREATE TYPE adjustment_status AS ENUM ('pending', 'approved', 'rejected');
CREATE TYPE closing_type AS ENUM ('salesperson', 'agency', 'operator');
CREATE TYPE financial_entry_kind AS ENUM ('payable', 'receivable');
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    kind entry_kind NOT NULL,
    subject_name VARCHAR(255) NOT NULL,
    reservation_id UUID NOT NULL,
    reservation_number VARCHAR(50) NOT NULL,
    tour_name VARCHAR(255) NOT NULL,
    client_name VARCHAR(255) NOT NULL DEFAULT '',
    pax INTEGER NOT NULL DEFAULT 0,
    sale_date DATE NOT NULL,
    operation_date DATE NOT NULL,
    gross_amount NUMERIC(19, 4) NOT NULL,
    currency VARCHAR(3) NOT NULL,
    rate NUMERIC(7, 4),
    computed_amount NUMERIC(19, 4),
    cost_amount NUMERIC(19, 4),
    status entry_status NOT NULL DEFAULT 'pending',
    logistic_status logistic_status,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_pax CHECK (pax >= 0),
    CONSTRAINT chk_gross_non_negative CHECK (gross_amount >= 0),
    CONSTRAINT chk_rate_range CHECK (rate IS NULL OR (rate >= 0 AND rate <= 100)),
    CONSTRAINT chk_commission_fields CHECK (
        kind <> 'commission'
        OR (rate IS NOT NULL AND computed_amount IS NOT NULL AND cost_amount IS NULL)
    ),
    CONSTRAINT chk_operator_fields CHECK (
        kind <> 'operator_payment'
        OR (cost_amount IS NOT NULL AND computed_amount IS NULL AND rate IS NULL)
    ),
    CONSTRAINT chk_amounts_non_negative CHECK (
        COALESCE(computed_amount, 0) >= 0 AND COALESCE(cost_amount, 0) >= 0
    )
);

CREATE INDEX idx_ledger_entries_sale_date ON ledger_entries(sale_date DESC, id);
CREATE INDEX idx_ledger_entries_operation_date ON ledger_entries(operation_date);
CREATE INDEX idx_ledger_entries_subject ON ledger_entries(subject_name);
CREATE INDEX idx_ledger_entries_kind_currency ON ledger_entries(kind, currency);
";

const ADJUSTMENTS_SQL: &str = r"
CREATE TABLE adjustment_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_id UUID NOT NULL REFERENCES ledger_entries(id),
    item_type entry_kind NOT NULL,
    original_amount NUMERIC(19, 4) NOT NULL,
    new_amount NUMERIC(19, 4) NOT NULL,
    adjustment_amount NUMERIC(19, 4) NOT NULL,
    adjustment_type adjustment_type NOT NULL,
    currency VARCHAR(3) NOT NULL,
    reason TEXT NOT NULL,
    requested_by UUID NOT NULL,
    requested_by_name VARCHAR(255) NOT NULL,
    status adjustment_status NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    decided_at TIMESTAMPTZ,
    decided_by UUID,

    CONSTRAINT chk_adjustment_reason CHECK (btrim(reason) <> ''),
    CONSTRAINT chk_adjustment_new_amount CHECK (new_amount >= 0),
    CONSTRAINT chk_adjustment_delta CHECK (adjustment_amount = new_amount - original_amount)
);

CREATE INDEX idx_adjustment_requests_status ON adjustment_requests(status, created_at DESC);
CREATE INDEX idx_adjustment_requests_entry ON adjustment_requests(entry_id);

-- Append-only audit of approvals and rejections
CREATE TABLE adjustment_decisions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    request_id UUID NOT NULL REFERENCES adjustment_requests(id),
    decision adjustment_status NOT NULL,
    reason TEXT,
    decided_by UUID NOT NULL,
    decided_by_name VARCHAR(255) NOT NULL,
    decided_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_decision_final CHECK (decision <> 'pending')
);

CREATE INDEX idx_adjustment_decisions_request ON adjustment_decisions(request_id);
";

const CLOSINGS_SQL: &str = r"
-- One row per closing type; incremented inside the closing transaction
CREATE TABLE invoice_counters (
    closing_type closing_type PRIMARY KEY,
    last_number BIGINT NOT NULL DEFAULT 0
);

CREATE TABLE closings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    closing_type closing_type NOT NULL,
    invoice_number BIGINT NOT NULL,
    recipient_name VARCHAR(255) NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    currency VARCHAR(3) NOT NULL,
    item_count INTEGER NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID NOT NULL,
    created_by_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,

    CONSTRAINT uq_closing_invoice_number UNIQUE (closing_type, invoice_number),
    CONSTRAINT chk_closing_period CHECK (period_start <= period_end),
    CONSTRAINT chk_closing_items CHECK (item_count > 0)
);

CREATE INDEX idx_closings_type_created ON closings(closing_type, created_at DESC);

-- Line item snapshots; kept after reversal for audit
CREATE TABLE closing_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    closing_id UUID NOT NULL REFERENCES closings(id),
    entry_id UUID NOT NULL REFERENCES ledger_entries(id),
    position INTEGER NOT NULL,
    kind entry_kind NOT NULL,
    reservation_id UUID NOT NULL,
    reservation_number VARCHAR(50) NOT NULL,
    tour_name VARCHAR(255) NOT NULL,
    client_name VARCHAR(255) NOT NULL,
    pax INTEGER NOT NULL,
    sale_date DATE NOT NULL,
    operation_date DATE NOT NULL,
    original_amount NUMERIC(19, 4) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    status entry_status NOT NULL,
    logistic_status logistic_status,

    CONSTRAINT uq_closing_item_entry UNIQUE (closing_id, entry_id),
    CONSTRAINT chk_closing_item_amount CHECK (amount >= 0)
);

CREATE INDEX idx_closing_items_entry ON closing_items(entry_id);
";

const FINANCIAL_ENTRIES_SQL: &str = r"
CREATE TABLE financial_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    closing_id UUID NOT NULL UNIQUE REFERENCES closings(id),
    kind financial_entry_kind NOT NULL,
    counterparty VARCHAR(255) NOT NULL,
    invoice_number VARCHAR(20) NOT NULL,
    description TEXT NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    currency VARCHAR(3) NOT NULL,
    due_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_financial_entries_kind ON financial_entries(kind, created_at DESC);
";

const REVERSALS_SQL: &str = r"
CREATE TABLE closing_reversals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    closing_id UUID NOT NULL UNIQUE REFERENCES closings(id),
    reason TEXT NOT NULL,
    undone_by UUID NOT NULL,
    undone_by_name VARCHAR(255) NOT NULL,
    undone_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_reversal_reason CHECK (btrim(reason) <> '')
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_double_closing
-- An entry may belong to at most one active closing
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_double_closing()
RETURNS TRIGGER AS $$
BEGIN
    IF EXISTS (
        SELECT 1
        FROM closing_items ci
        JOIN closings c ON c.id = ci.closing_id
        WHERE ci.entry_id = NEW.entry_id
          AND c.is_active
          AND ci.closing_id <> NEW.closing_id
    ) THEN
        RAISE EXCEPTION 'Ledger entry % already belongs to an active closing', NEW.entry_id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_double_closing
BEFORE INSERT ON closing_items
FOR EACH ROW
EXECUTE FUNCTION prevent_double_closing();

-- ============================================================
-- FUNCTION: prevent_closed_entry_modification
-- Entries in an active closing are frozen until reversed
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_closed_entry_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF EXISTS (
        SELECT 1
        FROM closing_items ci
        JOIN closings c ON c.id = ci.closing_id
        WHERE ci.entry_id = OLD.id AND c.is_active
    ) THEN
        RAISE EXCEPTION 'Cannot modify ledger entry % while it belongs to an active closing', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_closed_entry_mod
BEFORE UPDATE ON ledger_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_closed_entry_modification();

-- ============================================================
-- FUNCTION: protect_closing
-- Closings are never deleted; only is_active may go true -> false
-- ============================================================
CREATE OR REPLACE FUNCTION protect_closing()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        RAISE EXCEPTION 'Closings cannot be deleted';
    END IF;

    IF NOT OLD.is_active THEN
        RAISE EXCEPTION 'Cannot modify reversed closing %', OLD.id;
    END IF;

    IF NEW.is_active
       OR NEW.total_amount <> OLD.total_amount
       OR NEW.item_count <> OLD.item_count
       OR NEW.invoice_number <> OLD.invoice_number
       OR NEW.currency <> OLD.currency THEN
        RAISE EXCEPTION 'Closing % is immutable except for reversal', OLD.id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_protect_closing
BEFORE UPDATE OR DELETE ON closings
FOR EACH ROW
EXECUTE FUNCTION protect_closing();

-- ============================================================
-- FUNCTION: prevent_audit_modification
-- Snapshots and audit rows are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_audit_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION '% rows are append-only', TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_closing_items_append_only
BEFORE UPDATE OR DELETE ON closing_items
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_modification();

CREATE TRIGGER trg_adjustment_decisions_append_only
BEFORE UPDATE OR DELETE ON adjustment_decisions
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_modification();

CREATE TRIGGER trg_closing_reversals_append_only
BEFORE UPDATE OR DELETE ON closing_reversals
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS closing_reversals CASCADE;
DROP TABLE IF EXISTS financial_entries CASCADE;
DROP TABLE IF EXISTS closing_items CASCADE;
DROP TABLE IF EXISTS closings CASCADE;
DROP TABLE IF EXISTS invoice_counters CASCADE;
DROP TABLE IF EXISTS adjustment_decisions CASCADE;
DROP TABLE IF EXISTS adjustment_requests CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;

DROP FUNCTION IF EXISTS prevent_double_closing() CASCADE;
DROP FUNCTION IF EXISTS prevent_closed_entry_modification() CASCADE;
DROP FUNCTION IF EXISTS protect_closing() CASCADE;
DROP FUNCTION IF EXISTS prevent_audit_modification() CASCADE;

DROP TYPE IF EXISTS financial_entry_kind;
DROP TYPE IF EXISTS closing_type;
DROP TYPE IF EXISTS adjustment_status;
DROP TYPE IF EXISTS adjustment_type;
DROP TYPE IF EXISTS logistic_status;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS entry_kind;
";
