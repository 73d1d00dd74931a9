//! Load accounts from a CSV import file
//!
//! Column names follow the spreadsheet template used for export. Headers are
//! matched case-insensitively; row-level problems are collected as
//! [`ImportIssue`]s and the offending rows are skipped rather than failing the
//! whole file.

use super::{Account, CompoundFrequency, Goal};
use crate::error::ImportError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const COL_NAME: &str = "Account Name";
pub const COL_STARTING_BALANCE: &str = "Starting Balance";
pub const COL_INTEREST_RATE: &str = "Interest Rate";
pub const COL_COMPOUND_FREQUENCY: &str = "Compound Frequency";
pub const COL_GOAL_TYPE: &str = "Goal Type";
pub const COL_TARGET_AMOUNT: &str = "Target Amount";
pub const COL_TARGET_DATE: &str = "Target Date";
pub const COL_MONTHLY_CONTRIBUTION: &str = "Monthly Contribution";

pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_NAME,
    COL_STARTING_BALANCE,
    COL_INTEREST_RATE,
    COL_COMPOUND_FREQUENCY,
    COL_GOAL_TYPE,
];

const OPTIONAL_COLUMNS: [&str; 3] = [COL_TARGET_AMOUNT, COL_TARGET_DATE, COL_MONTHLY_CONTRIBUTION];

const MAX_IMPORTED_NAME_LEN: usize = 50;

/// Raw CSV row; every cell is read as text so that bad values become issues
#[derive(Debug, Default, Deserialize)]
struct CsvRow {
    #[serde(rename = "Account Name", default)]
    name: Option<String>,
    #[serde(rename = "Starting Balance", default)]
    starting_balance: Option<String>,
    #[serde(rename = "Interest Rate", default)]
    interest_rate: Option<String>,
    #[serde(rename = "Compound Frequency", default)]
    compound_frequency: Option<String>,
    #[serde(rename = "Goal Type", default)]
    goal_type: Option<String>,
    #[serde(rename = "Target Amount", default)]
    target_amount: Option<String>,
    #[serde(rename = "Target Date", default)]
    target_date: Option<String>,
    #[serde(rename = "Monthly Contribution", default)]
    monthly_contribution: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found in one cell of the import file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportIssue {
    /// 1-based data row (0 = whole file)
    pub row: usize,
    pub column: String,
    pub message: String,
    pub severity: Severity,
}

impl ImportIssue {
    fn error(row: usize, column: &str, message: impl Into<String>) -> Self {
        Self { row, column: column.to_string(), message: message.into(), severity: Severity::Error }
    }

    fn warning(row: usize, column: &str, message: impl Into<String>) -> Self {
        Self { row, column: column.to_string(), message: message.into(), severity: Severity::Warning }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    pub warning_rows: usize,
}

/// Accounts recovered from an import file, with everything that went wrong
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub accounts: Vec<Account>,
    pub issues: Vec<ImportIssue>,
    pub total_rows: usize,
}

impl ImportResult {
    pub fn errors(&self) -> impl Iterator<Item = &ImportIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ImportIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn issues_for_row(&self, row: usize) -> Vec<&ImportIssue> {
        self.issues.iter().filter(|i| i.row == row).collect()
    }

    pub fn stats(&self) -> ImportStats {
        let rows_with = |severity: Severity| {
            let mut rows: Vec<usize> = self
                .issues
                .iter()
                .filter(|i| i.severity == severity && i.row > 0)
                .map(|i| i.row)
                .collect();
            rows.dedup();
            rows.len()
        };

        ImportStats {
            total_rows: self.total_rows,
            valid_rows: self.accounts.len(),
            error_rows: rows_with(Severity::Error),
            warning_rows: rows_with(Severity::Warning),
        }
    }
}

/// Interpret an interest rate cell as a decimal fraction
///
/// `"4%"` and `"4"` both mean 4%; values at or below 1 are taken as decimals
/// already (`"0.04"`).
pub fn parse_interest_rate(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f64>().ok().map(|v| v / 100.0);
    }
    let rate = value.parse::<f64>().ok()?;
    Some(if rate > 1.0 { rate / 100.0 } else { rate })
}

/// Parse a monetary cell, tolerating currency symbols and thousands separators
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_target_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn non_empty(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Map header names onto their canonical spelling, reporting missing required columns
fn canonical_headers(headers: &StringRecord) -> Result<StringRecord, ImportError> {
    let known: Vec<&str> = REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS.iter()).copied().collect();

    let canonical: StringRecord = headers
        .iter()
        .map(|h| {
            let h = h.trim();
            known
                .iter()
                .find(|k| k.eq_ignore_ascii_case(h))
                .map(|k| k.to_string())
                .unwrap_or_else(|| h.to_string())
        })
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !canonical.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(canonical)
    } else {
        Err(ImportError::MissingHeaders(missing))
    }
}

impl CsvRow {
    /// Check every cell, returning the issues found in this row
    fn validate(&self, row: usize, now: DateTime<Utc>) -> Vec<ImportIssue> {
        let mut issues = Vec::new();

        match non_empty(&self.name) {
            None => issues.push(ImportIssue::error(row, COL_NAME, "Account name is required")),
            Some(name) if name.chars().count() > MAX_IMPORTED_NAME_LEN => issues.push(
                ImportIssue::warning(row, COL_NAME, "Account name must be 50 characters or less"),
            ),
            Some(_) => {}
        }

        match non_empty(&self.starting_balance).and_then(parse_amount) {
            None => issues.push(ImportIssue::error(
                row,
                COL_STARTING_BALANCE,
                "Starting balance must be a valid number",
            )),
            Some(b) if b < 0.0 => issues.push(ImportIssue::error(
                row,
                COL_STARTING_BALANCE,
                "Starting balance must be positive",
            )),
            Some(_) => {}
        }

        match non_empty(&self.interest_rate).and_then(parse_interest_rate) {
            None => issues.push(ImportIssue::error(
                row,
                COL_INTEREST_RATE,
                "Interest rate must be a valid number",
            )),
            Some(r) if !(0.0..=1.0).contains(&r) => issues.push(ImportIssue::error(
                row,
                COL_INTEREST_RATE,
                "Interest rate must be between 0 and 100 percent",
            )),
            Some(_) => {}
        }

        let frequency_ok = non_empty(&self.compound_frequency)
            .map(|f| f.parse::<CompoundFrequency>().is_ok())
            .unwrap_or(false);
        if !frequency_ok {
            issues.push(ImportIssue::error(
                row,
                COL_COMPOUND_FREQUENCY,
                "Compound frequency must be \"daily\", \"monthly\", \"yearly\" or \"annual\"",
            ));
        }

        let goal_type = non_empty(&self.goal_type).map(str::to_ascii_lowercase);
        match goal_type.as_deref() {
            Some("amount") => match non_empty(&self.target_amount).and_then(parse_amount) {
                None => issues.push(ImportIssue::error(
                    row,
                    COL_TARGET_AMOUNT,
                    "Target amount is required when goal type is \"amount\"",
                )),
                Some(a) if a <= 0.0 => issues.push(ImportIssue::error(
                    row,
                    COL_TARGET_AMOUNT,
                    "Target amount must be positive",
                )),
                Some(_) => {}
            },
            Some("date") => match non_empty(&self.target_date) {
                None => issues.push(ImportIssue::error(
                    row,
                    COL_TARGET_DATE,
                    "Target date is required when goal type is \"date\"",
                )),
                Some(raw) => match parse_target_date(raw) {
                    None => issues.push(ImportIssue::error(
                        row,
                        COL_TARGET_DATE,
                        "Target date must be a valid date (YYYY-MM-DD format)",
                    )),
                    Some(date) if midnight_utc(date) <= now => issues.push(ImportIssue::warning(
                        row,
                        COL_TARGET_DATE,
                        "Target date must be in the future",
                    )),
                    Some(_) => {}
                },
            },
            Some("default") => {}
            _ => issues.push(ImportIssue::error(
                row,
                COL_GOAL_TYPE,
                "Goal type must be \"amount\", \"date\", or \"default\"",
            )),
        }

        if let Some(raw) = non_empty(&self.monthly_contribution) {
            match parse_amount(raw) {
                None => issues.push(ImportIssue::error(
                    row,
                    COL_MONTHLY_CONTRIBUTION,
                    "Monthly contribution must be a valid number",
                )),
                Some(c) if c < 0.0 => issues.push(ImportIssue::error(
                    row,
                    COL_MONTHLY_CONTRIBUTION,
                    "Monthly contribution must be positive",
                )),
                Some(_) => {}
            }
        }

        issues
    }

    /// Build an account from a row that passed validation
    fn to_account(&self, row: usize, now: DateTime<Utc>) -> Result<Account, ImportIssue> {
        let name = non_empty(&self.name).unwrap_or_default().to_string();
        let starting_balance = non_empty(&self.starting_balance).and_then(parse_amount).unwrap_or(0.0);
        let interest_rate = non_empty(&self.interest_rate).and_then(parse_interest_rate).unwrap_or(0.0);
        let compound_frequency = non_empty(&self.compound_frequency)
            .and_then(|f| f.parse::<CompoundFrequency>().ok())
            .unwrap_or_default();
        let monthly_contribution = non_empty(&self.monthly_contribution).and_then(parse_amount).unwrap_or(0.0);

        let goal = match non_empty(&self.goal_type).map(str::to_ascii_lowercase).as_deref() {
            Some("amount") => non_empty(&self.target_amount)
                .and_then(parse_amount)
                .map(Goal::TargetAmount)
                .unwrap_or_default(),
            Some("date") => non_empty(&self.target_date)
                .and_then(parse_target_date)
                .map(Goal::TargetDate)
                .unwrap_or_default(),
            _ => Goal::Default,
        };

        Account::new(name, starting_balance, interest_rate, compound_frequency, monthly_contribution, goal, now)
            .map(|account| account.with_id(format!("import-{}", row)))
            .map_err(|e| ImportIssue::error(row, "all", e.to_string()))
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

fn import_from_csv<R: Read>(mut reader: Reader<R>, now: DateTime<Utc>) -> Result<ImportResult, ImportError> {
    let headers = canonical_headers(reader.headers()?)?;
    reader.set_headers(headers);

    let mut result = ImportResult::default();

    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = index + 1;
        result.total_rows += 1;

        let csv_row = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping unreadable row {}: {}", row, e);
                result.issues.push(ImportIssue::error(row, "unknown", e.to_string()));
                continue;
            }
        };

        let issues = csv_row.validate(row, now);
        let row_has_errors = issues.iter().any(|i| i.severity == Severity::Error);
        result.issues.extend(issues);

        if row_has_errors {
            debug!("Row {} has errors, skipping", row);
            continue;
        }

        match csv_row.to_account(row, now) {
            Ok(account) => result.accounts.push(account),
            Err(issue) => {
                warn!("Skipping row {}: {}", row, issue.message);
                result.issues.push(issue);
            }
        }
    }

    if result.total_rows == 0 {
        result.issues.push(ImportIssue::error(0, "all", "No data found in the CSV file"));
    }

    info!(
        "Imported {} of {} rows ({} issues)",
        result.accounts.len(),
        result.total_rows,
        result.issues.len()
    );

    Ok(result)
}

fn csv_reader<R: Read>(reader: R) -> Reader<R> {
    ReaderBuilder::new().trim(Trim::Headers).flexible(true).from_reader(reader)
}

/// Load accounts from a CSV file
pub fn load_accounts<P: AsRef<Path>>(path: P, now: DateTime<Utc>) -> Result<ImportResult, ImportError> {
    let file = File::open(path)?;
    import_from_csv(csv_reader(file), now)
}

/// Load accounts from any reader (e.g., string buffer, request body)
pub fn load_accounts_from_reader<R: Read>(reader: R, now: DateTime<Utc>) -> Result<ImportResult, ImportError> {
    import_from_csv(csv_reader(reader), now)
}
