//! Goal resolution: whether, and when, an account reaches its goal

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::growth::{future_value_with_contributions, MONTHS_PER_YEAR};
use super::series::project_account;
use crate::account::{Account, Goal};

/// Upper bound of the time-to-goal search, in months (~83 years)
pub const MAX_SEARCH_MONTHS: f64 = 1000.0;

/// Width at which the time-to-goal search stops, in months
pub const SEARCH_PRECISION: f64 = 0.01;

/// Length of the approximate month used to turn date differences into months
pub const DAYS_PER_APPROX_MONTH: i64 = 30;

/// Outcome of evaluating an account's goal
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GoalProjection {
    pub achievable: bool,

    /// Months (fractional) until the target amount is reached; amount goals only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_goal_months: Option<f64>,

    /// Balance at the resolved horizon; date and default goals only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_amount: Option<f64>,

    /// Contribution needed to hit a stated amount by a target date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_needed: Option<f64>,
}

impl GoalProjection {
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn reached_in(months: f64) -> Self {
        Self {
            achievable: true,
            time_to_goal_months: Some(months),
            ..Self::default()
        }
    }

    pub fn balance_at_horizon(final_amount: f64) -> Self {
        Self {
            achievable: true,
            final_amount: Some(final_amount),
            ..Self::default()
        }
    }
}

/// Find the (fractional) month count at which the closed-form future value reaches `target_amount`
///
/// Bisects `[0, MAX_SEARCH_MONTHS]` until the bracket is narrower than
/// [`SEARCH_PRECISION`] and returns its midpoint. Returns `Some(0.0)` when the
/// principal already covers the target and `None` when the target is still
/// out of reach at the upper bound. Assumes the objective is non-decreasing
/// in time, which holds for non-negative rate and contribution.
pub fn time_to_reach_amount(
    principal: f64,
    target_amount: f64,
    annual_rate: f64,
    periods_per_year: u32,
    monthly_contribution: f64,
) -> Option<f64> {
    if target_amount <= principal {
        return Some(0.0);
    }

    let value_at = |months: f64| {
        future_value_with_contributions(
            principal,
            annual_rate,
            periods_per_year,
            months / MONTHS_PER_YEAR,
            monthly_contribution,
        )
    };

    if value_at(MAX_SEARCH_MONTHS) < target_amount {
        debug!(
            "Target {:.2} unreachable within {} months (principal {:.2}, rate {})",
            target_amount, MAX_SEARCH_MONTHS, principal, annual_rate
        );
        return None;
    }

    let mut low = 0.0_f64;
    let mut high = MAX_SEARCH_MONTHS;
    let mut iterations = 0;

    while high - low > SEARCH_PRECISION {
        let mid = (low + high) / 2.0;
        if value_at(mid) < target_amount {
            low = mid;
        } else {
            high = mid;
        }
        iterations += 1;
    }

    let months = (low + high) / 2.0;
    debug!("Target {:.2} reached in {:.2} months after {} iterations", target_amount, months, iterations);
    Some(months)
}

/// Whole months from `now` to `target`, counting 30-day months and rounding up
pub fn months_until(target: NaiveDate, now: DateTime<Utc>) -> i64 {
    let target = Utc.from_utc_datetime(&target.and_hms_opt(0, 0, 0).unwrap_or_default());
    let elapsed_ms = (target - now).num_milliseconds() as f64;
    let month_ms = (DAYS_PER_APPROX_MONTH * 24 * 60 * 60 * 1000) as f64;
    (elapsed_ms / month_ms).ceil() as i64
}

/// Evaluate an account's goal
///
/// * `TargetAmount` - search for the time to reach the amount
/// * `TargetDate` - project to the date and report the balance there
/// * `Default` - project over `default_months` and report the final balance
pub fn resolve_goal(account: &Account, default_months: u32, now: DateTime<Utc>) -> GoalProjection {
    match account.goal() {
        Goal::TargetAmount(amount) => {
            match time_to_reach_amount(
                account.starting_balance(),
                amount,
                account.interest_rate(),
                account.periods_per_year(),
                account.monthly_contribution(),
            ) {
                Some(months) => GoalProjection::reached_in(months),
                None => GoalProjection::unreachable(),
            }
        }
        Goal::TargetDate(date) => {
            let months_to_target = months_until(date, now);
            if months_to_target <= 0 {
                return GoalProjection::unreachable();
            }
            let horizon = u32::try_from(months_to_target).unwrap_or(u32::MAX);
            let series = project_account(account, horizon, now);
            GoalProjection::balance_at_horizon(series.final_balance())
        }
        Goal::Default => {
            let series = project_account(account, default_months, now);
            GoalProjection::balance_at_horizon(series.final_balance())
        }
    }
}
