//! Month-by-month projection output

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use super::growth::{compound_interest, MONTHS_PER_YEAR};
use crate::account::Account;

/// Balance of an account at one elapsed month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Elapsed months since the reference time (0 = now)
    pub month: u32,

    /// Compounded value of principal plus contributions to date
    pub balance: f64,

    /// Sum of contributions made through this month (none at month 0)
    pub total_contributions: f64,

    /// `balance - (starting_balance + total_contributions)`
    pub interest_earned: f64,

    /// Reference time advanced by `month` calendar months
    pub date: DateTime<Utc>,
}

/// Complete projection of one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub account_id: String,
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    pub fn last(&self) -> Option<&ProjectionPoint> {
        self.points.last()
    }

    pub fn final_balance(&self) -> f64 {
        self.last().map(|p| p.balance).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn summary(&self) -> ProjectionSummary {
        let last = self.last();
        ProjectionSummary {
            months: last.map(|p| p.month).unwrap_or(0),
            final_balance: self.final_balance(),
            total_contributions: last.map(|p| p.total_contributions).unwrap_or(0.0),
            interest_earned: last.map(|p| p.interest_earned).unwrap_or(0.0),
        }
    }
}

/// Where a projection ends up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub months: u32,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub interest_earned: f64,
}

/// Calendar date for a month offset, clamping the day to the target month's length
pub fn month_date(reference: DateTime<Utc>, month: u32) -> DateTime<Utc> {
    reference.checked_add_months(Months::new(month)).unwrap_or(reference)
}

/// Project an account month by month from the reference time
///
/// Produces `months + 1` points. Each point recomputes growth from scratch on
/// the accumulated principal, so the series matches the closed form exactly
/// at every month instead of drifting through repeated multiplication.
pub fn project_account(account: &Account, months: u32, reference: DateTime<Utc>) -> ProjectionSeries {
    let periods = account.periods_per_year();
    let contribution = account.monthly_contribution();

    let mut points = Vec::with_capacity(months as usize + 1);
    let mut total_contributions = 0.0;

    for month in 0..=months {
        if month > 0 {
            total_contributions += contribution;
        }

        let principal = account.starting_balance() + total_contributions;
        let years = month as f64 / MONTHS_PER_YEAR;
        let balance = compound_interest(principal, account.interest_rate(), periods, years);

        points.push(ProjectionPoint {
            month,
            balance,
            total_contributions,
            interest_earned: balance - principal,
            date: month_date(reference, month),
        });
    }

    ProjectionSeries {
        account_id: account.id().to_string(),
        points,
    }
}
