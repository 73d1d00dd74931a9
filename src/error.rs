//! Error types for account validation, import, export and settings

use thiserror::Error;

/// Reasons an account record is rejected before it reaches the projection engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountError {
    #[error("Account name is required")]
    EmptyName,
    #[error("Account name must be at least 2 characters long")]
    NameTooShort,
    #[error("Account name must be less than 50 characters")]
    NameTooLong,
    #[error("Balance must be a non-negative number, got {0}")]
    InvalidBalance(f64),
    #[error("Balance cannot exceed $10,000,000")]
    BalanceTooLarge,
    #[error("Interest rate must be between 0 and 1, got {0}")]
    InvalidInterestRate(f64),
    #[error("Interest rate cannot exceed 50%")]
    InterestRateTooHigh,
    #[error("Monthly contribution must be a non-negative number, got {0}")]
    InvalidContribution(f64),
    #[error("Monthly contribution cannot exceed $100,000")]
    ContributionTooLarge,
    #[error("Target amount must be a positive number, got {0}")]
    InvalidTargetAmount(f64),
    #[error("Target amount must be greater than starting balance")]
    TargetNotAboveBalance,
    #[error("Target amount cannot exceed $50,000,000")]
    TargetAmountTooLarge,
    #[error("Target date must be at least one month in the future")]
    TargetDateTooSoon,
    #[error("Target date cannot be more than 50 years in the future")]
    TargetDateTooFar,
    #[error("Account creation time is required")]
    MissingCreatedAt,
}

/// Failure to read an account import file as a whole
///
/// Row-level problems are reported as [`crate::account::ImportIssue`] values instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no accounts to export")]
    NoAccounts,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("default projection months must be between 1 and {max}, got {value}")]
    ProjectionMonthsOutOfRange { value: u32, max: u32 },
    #[error("currency code must be three letters, got {0:?}")]
    InvalidCurrency(String),
}
