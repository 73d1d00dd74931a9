//! CSV export of account summaries and detailed projections
//!
//! The summary table reuses the import column names, so an exported summary
//! can be loaded back with [`crate::account::load_accounts`]. Rates are written
//! as plain decimals, which the loader reads back unchanged.

use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::account::loader::{
    COL_COMPOUND_FREQUENCY, COL_GOAL_TYPE, COL_INTEREST_RATE, COL_MONTHLY_CONTRIBUTION, COL_NAME,
    COL_STARTING_BALANCE, COL_TARGET_AMOUNT, COL_TARGET_DATE,
};
use crate::account::Account;
use crate::error::ExportError;
use crate::projection::ProjectionEngine;

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    name: &'a str,
    starting_balance: String,
    interest_rate: String,
    compound_frequency: &'static str,
    goal_type: &'static str,
    target_amount: String,
    target_date: String,
    monthly_contribution: String,
    final_balance: String,
    total_contributions: String,
    interest_earned: String,
    created: String,
}

#[derive(Debug, Serialize)]
struct DetailRow<'a> {
    #[serde(rename = "Account Name")]
    name: &'a str,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "Total Contributions")]
    total_contributions: String,
    #[serde(rename = "Interest Earned")]
    interest_earned: String,
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn summary_header(months: u32) -> Vec<String> {
    vec![
        COL_NAME.to_string(),
        COL_STARTING_BALANCE.to_string(),
        COL_INTEREST_RATE.to_string(),
        COL_COMPOUND_FREQUENCY.to_string(),
        COL_GOAL_TYPE.to_string(),
        COL_TARGET_AMOUNT.to_string(),
        COL_TARGET_DATE.to_string(),
        COL_MONTHLY_CONTRIBUTION.to_string(),
        format!("Final Balance ({} months)", months),
        "Total Contributions".to_string(),
        "Interest Earned".to_string(),
        "Created Date".to_string(),
    ]
}

/// Write one row per account with its position at the end of `months`
pub fn write_summary<W: Write>(
    out: W,
    accounts: &[Account],
    engine: &ProjectionEngine,
    months: u32,
) -> Result<(), ExportError> {
    if accounts.is_empty() {
        return Err(ExportError::NoAccounts);
    }

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(summary_header(months))?;

    for account in accounts {
        let end = engine.project(account, months).summary();
        let goal = account.goal();

        writer.serialize(SummaryRow {
            name: account.name(),
            starting_balance: money(account.starting_balance()),
            interest_rate: account.interest_rate().to_string(),
            compound_frequency: account.compound_frequency().as_str(),
            goal_type: goal.kind(),
            target_amount: goal.target_amount().map(money).unwrap_or_default(),
            target_date: goal.target_date().map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            monthly_contribution: money(account.monthly_contribution()),
            final_balance: money(end.final_balance),
            total_contributions: money(end.total_contributions),
            interest_earned: money(end.interest_earned),
            created: account.created_at().format("%Y-%m-%d").to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Write every projection point of every account, one row per account-month
pub fn write_detailed<W: Write>(
    out: W,
    accounts: &[Account],
    engine: &ProjectionEngine,
    months: u32,
) -> Result<(), ExportError> {
    if accounts.is_empty() {
        return Err(ExportError::NoAccounts);
    }

    let mut writer = csv::Writer::from_writer(out);

    for account in accounts {
        let series = engine.project(account, months);
        for point in &series.points {
            writer.serialize(DetailRow {
                name: account.name(),
                month: point.month,
                date: point.date.format("%Y-%m-%d").to_string(),
                balance: money(point.balance),
                total_contributions: money(point.total_contributions),
                interest_earned: money(point.interest_earned),
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

pub fn export_summary<P: AsRef<Path>>(
    path: P,
    accounts: &[Account],
    engine: &ProjectionEngine,
    months: u32,
) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_summary(file, accounts, engine, months)?;
    info!("Wrote summary of {} accounts to {}", accounts.len(), path.as_ref().display());
    Ok(())
}

pub fn export_detailed<P: AsRef<Path>>(
    path: P,
    accounts: &[Account],
    engine: &ProjectionEngine,
    months: u32,
) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_detailed(file, accounts, engine, months)?;
    info!(
        "Wrote {} months of projections for {} accounts to {}",
        months,
        accounts.len(),
        path.as_ref().display()
    );
    Ok(())
}
