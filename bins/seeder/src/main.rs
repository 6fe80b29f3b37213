//! Database seeder for Itinera development and testing.
//!
//! Records a small open ledger (commissions for a salesperson and an agency,
//! operator payments in two currencies) and one pending adjustment, so every
//! closing type has something to close.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use itinera_core::ledger::{EntryKind, LedgerFilter, LogisticStatus, NewLedgerEntry};
use itinera_core::{Actor, Role};
use itinera_db::{AdjustmentRepository, LedgerRepository};
use itinera_shared::types::{Currency, PageRequest};

/// Seed finance user ID (consistent for all seeds)
const FINANCE_USER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Seed salesperson user ID
const SALES_USER_ID: &str = "00000000-0000-0000-0000-000000000003";

struct Seed {
    kind: EntryKind,
    subject: &'static str,
    reservation: &'static str,
    tour: &'static str,
    client: &'static str,
    pax: i32,
    gross: Decimal,
    currency: Currency,
    rate: Option<Decimal>,
    cost: Option<Decimal>,
    logistic: Option<LogisticStatus>,
    days_ago: i64,
}

const SEEDS: &[Seed] = &[
    Seed {
        kind: EntryKind::Commission,
        subject: "Ana Souza",
        reservation: "R-1001",
        tour: "Iguazu Falls Full Day",
        client: "J. Smith",
        pax: 2,
        gross: dec!(1000.00),
        currency: Currency::Usd,
        rate: Some(dec!(10)),
        cost: None,
        logistic: None,
        days_ago: 20,
    },
    Seed {
        kind: EntryKind::Commission,
        subject: "Ana Souza",
        reservation: "R-1002",
        tour: "Bird Park",
        client: "M. Rossi",
        pax: 4,
        gross: dec!(1500.00),
        currency: Currency::Usd,
        rate: Some(dec!(10)),
        cost: None,
        logistic: None,
        days_ago: 12,
    },
    Seed {
        kind: EntryKind::Commission,
        subject: "Andes Travel",
        reservation: "R-1003",
        tour: "Salt Flats Expedition",
        client: "K. Tanaka",
        pax: 3,
        gross: dec!(2400.00),
        currency: Currency::Eur,
        rate: Some(dec!(12.5)),
        cost: None,
        logistic: None,
        days_ago: 9,
    },
    Seed {
        kind: EntryKind::OperatorPayment,
        subject: "Cataratas Tours",
        reservation: "R-1001",
        tour: "Iguazu Falls Full Day",
        client: "J. Smith",
        pax: 2,
        gross: dec!(1000.00),
        currency: Currency::Usd,
        rate: None,
        cost: Some(dec!(420.00)),
        logistic: Some(LogisticStatus::Completed),
        days_ago: 20,
    },
    Seed {
        kind: EntryKind::OperatorPayment,
        subject: "Cataratas Tours",
        reservation: "R-1002",
        tour: "Bird Park",
        client: "M. Rossi",
        pax: 4,
        gross: dec!(1500.00),
        currency: Currency::Usd,
        rate: None,
        cost: Some(dec!(300.00)),
        logistic: Some(LogisticStatus::Confirmed),
        days_ago: 12,
    },
    Seed {
        kind: EntryKind::OperatorPayment,
        subject: "Altiplano Operadora",
        reservation: "R-1003",
        tour: "Salt Flats Expedition",
        client: "K. Tanaka",
        pax: 3,
        gross: dec!(2400.00),
        currency: Currency::Eur,
        rate: None,
        cost: Some(dec!(950.00)),
        logistic: Some(LogisticStatus::NoShow),
        days_ago: 9,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = itinera_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    let finance = Actor::new(parse_id(FINANCE_USER_ID)?, "Seed Finance", Role::Finance);
    let sales = Actor::new(parse_id(SALES_USER_ID)?, "Ana Souza", Role::Salesperson);

    let ledger = LedgerRepository::new(db.clone());
    let existing = ledger
        .list(&LedgerFilter::new(), &PageRequest::from_query(Some(1), Some(1)))
        .await?;
    if existing.meta.total > 0 {
        println!("  Ledger already has entries, skipping...");
        return Ok(());
    }

    println!("Seeding ledger entries...");
    let today = Utc::now().date_naive();
    let mut reservations: HashMap<&str, Uuid> = HashMap::new();
    let mut first_commission = None;
    for seed in SEEDS {
        // Entries of one reservation share its id.
        let reservation_id = *reservations
            .entry(seed.reservation)
            .or_insert_with(Uuid::new_v4);
        let entry = ledger
            .record(new_entry(seed, reservation_id, today), &finance)
            .await?;
        println!("  {} {} {} {}", entry.kind, entry.subject_name, entry.amount(), entry.currency);
        if entry.kind == EntryKind::Commission && first_commission.is_none() {
            first_commission = Some(entry);
        }
    }

    if let Some(entry) = first_commission {
        println!("Seeding a pending adjustment...");
        let adjustments = AdjustmentRepository::new(db.clone());
        adjustments
            .propose(
                entry.id,
                dec!(80.00),
                "Client received a partial refund",
                &sales,
            )
            .await?;
    }

    println!("Seeding complete!");
    Ok(())
}

fn parse_id(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid seed id {raw}"))
}

fn new_entry(seed: &Seed, reservation_id: Uuid, today: NaiveDate) -> NewLedgerEntry {
    let sale_date = today - Duration::days(seed.days_ago);
    NewLedgerEntry {
        kind: seed.kind,
        subject_name: seed.subject.to_string(),
        reservation_id,
        reservation_number: seed.reservation.to_string(),
        tour_name: seed.tour.to_string(),
        client_name: seed.client.to_string(),
        pax: seed.pax,
        sale_date,
        operation_date: sale_date + Duration::days(7),
        gross_amount: seed.gross,
        currency: seed.currency,
        rate: seed.rate,
        computed_amount: None,
        cost_amount: seed.cost,
        logistic_status: seed.logistic,
    }
}
