//! Form-level validation rules applied before an account is saved
//!
//! These are stricter than the engine's own domain checks in [`Account::new`]:
//! they cap amounts at practical limits and require goals to lie in a sensible
//! window relative to the reference time.

use chrono::{DateTime, Months, NaiveDate, Utc};

use super::data::{Account, Goal};
use crate::error::AccountError;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_BALANCE: f64 = 10_000_000.0;
pub const MAX_FORM_INTEREST_RATE: f64 = 0.5;
pub const MAX_TARGET_AMOUNT: f64 = 50_000_000.0;
pub const MAX_MONTHLY_CONTRIBUTION: f64 = 100_000.0;
pub const MAX_GOAL_YEARS: u32 = 50;

pub fn validate_name(name: &str) -> Result<(), AccountError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AccountError::EmptyName);
    }
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(AccountError::NameTooShort);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AccountError::NameTooLong);
    }
    Ok(())
}

pub fn validate_balance(balance: f64) -> Result<(), AccountError> {
    if !balance.is_finite() || balance < 0.0 {
        return Err(AccountError::InvalidBalance(balance));
    }
    if balance > MAX_BALANCE {
        return Err(AccountError::BalanceTooLarge);
    }
    Ok(())
}

pub fn validate_interest_rate(rate: f64) -> Result<(), AccountError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(AccountError::InvalidInterestRate(rate));
    }
    if rate > MAX_FORM_INTEREST_RATE {
        return Err(AccountError::InterestRateTooHigh);
    }
    Ok(())
}

pub fn validate_target_amount(amount: f64, starting_balance: f64) -> Result<(), AccountError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AccountError::InvalidTargetAmount(amount));
    }
    if amount <= starting_balance {
        return Err(AccountError::TargetNotAboveBalance);
    }
    if amount > MAX_TARGET_AMOUNT {
        return Err(AccountError::TargetAmountTooLarge);
    }
    Ok(())
}

/// Target dates must fall between one month and fifty years after `now`
pub fn validate_target_date(date: NaiveDate, now: DateTime<Utc>) -> Result<(), AccountError> {
    let today = now.date_naive();
    let earliest = today.checked_add_months(Months::new(1)).unwrap_or(today);
    let latest = today
        .checked_add_months(Months::new(MAX_GOAL_YEARS * 12))
        .unwrap_or(NaiveDate::MAX);

    if date < earliest {
        return Err(AccountError::TargetDateTooSoon);
    }
    if date > latest {
        return Err(AccountError::TargetDateTooFar);
    }
    Ok(())
}

pub fn validate_monthly_contribution(contribution: f64) -> Result<(), AccountError> {
    if !contribution.is_finite() || contribution < 0.0 {
        return Err(AccountError::InvalidContribution(contribution));
    }
    if contribution > MAX_MONTHLY_CONTRIBUTION {
        return Err(AccountError::ContributionTooLarge);
    }
    Ok(())
}

/// Run every form rule against an account, reporting the first failure
pub fn validate_account(account: &Account, now: DateTime<Utc>) -> Result<(), AccountError> {
    validate_name(account.name())?;
    validate_balance(account.starting_balance())?;
    validate_interest_rate(account.interest_rate())?;

    match account.goal() {
        Goal::TargetAmount(amount) => validate_target_amount(amount, account.starting_balance())?,
        Goal::TargetDate(date) => validate_target_date(date, now)?,
        Goal::Default => {}
    }

    validate_monthly_contribution(account.monthly_contribution())
}
