//! Projection engine bound to a reference time and default horizon

use chrono::{DateTime, Utc};
use log::debug;

use super::goal::{months_until, resolve_goal, time_to_reach_amount, GoalProjection, DAYS_PER_APPROX_MONTH};
use super::growth::{compound_interest, required_monthly_contribution, MONTHS_PER_YEAR};
use super::series::{project_account, ProjectionSeries};
use crate::account::{Account, Goal};
use crate::settings::Settings;

/// Default projection horizon when an account has no explicit goal
pub const DEFAULT_PROJECTION_MONTHS: u32 = 36;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Horizon used for accounts without an explicit goal
    pub default_projection_months: u32,

    /// The "now" every projection starts from
    pub reference_time: DateTime<Utc>,
}

impl ProjectionConfig {
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self {
            default_projection_months: DEFAULT_PROJECTION_MONTHS,
            reference_time,
        }
    }

    pub fn from_settings(settings: &Settings, reference_time: DateTime<Utc>) -> Self {
        Self {
            default_projection_months: settings.default_projection_months,
            reference_time,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

/// Main projection engine
///
/// Holds no mutable state; one engine can serve any number of accounts,
/// including from several threads at once.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.config.reference_time
    }

    /// Month-by-month projection over `months`
    pub fn project(&self, account: &Account, months: u32) -> ProjectionSeries {
        debug!("Projecting account {} over {} months", account.id(), months);
        project_account(account, months, self.config.reference_time)
    }

    /// Projection over the configured default horizon
    pub fn project_default(&self, account: &Account) -> ProjectionSeries {
        self.project(account, self.config.default_projection_months)
    }

    /// Evaluate the account's own goal
    pub fn resolve_goal(&self, account: &Account) -> GoalProjection {
        resolve_goal(account, self.config.default_projection_months, self.config.reference_time)
    }

    /// Months until the account reaches `target_amount`, whatever its stored goal
    pub fn time_to_reach(&self, account: &Account, target_amount: f64) -> Option<f64> {
        time_to_reach_amount(
            account.starting_balance(),
            target_amount,
            account.interest_rate(),
            account.periods_per_year(),
            account.monthly_contribution(),
        )
    }

    /// Monthly contribution needed to reach `target_amount` within `months`
    pub fn required_monthly_contribution(&self, account: &Account, target_amount: f64, months: u32) -> f64 {
        required_monthly_contribution(
            account.starting_balance(),
            target_amount,
            account.interest_rate(),
            account.periods_per_year(),
            months,
        )
    }

    /// Resolve a date goal against a stated amount to hold by that date
    ///
    /// Adds the contribution needed to reach `target_amount` by the target
    /// date, and marks the plan achievable only when the balance projected
    /// for that date covers the amount. Accounts whose goal is not a date are
    /// resolved as usual with no `monthly_needed` figure.
    pub fn plan_for_date(&self, account: &Account, target_amount: f64) -> GoalProjection {
        let mut projection = self.resolve_goal(account);

        if let Goal::TargetDate(date) = account.goal() {
            let months = months_until(date, self.config.reference_time);
            if months > 0 {
                let months = u32::try_from(months).unwrap_or(u32::MAX);
                projection.monthly_needed = Some(self.required_monthly_contribution(account, target_amount, months));
                projection.achievable = projection.final_amount.is_some_and(|balance| balance >= target_amount);
            }
        }

        projection
    }

    /// Balance today, given the whole 30-day months elapsed since the account was created
    pub fn current_balance(&self, account: &Account) -> f64 {
        let elapsed = self.config.reference_time - account.created_at();
        let months_elapsed = elapsed.num_days().div_euclid(DAYS_PER_APPROX_MONTH);

        if months_elapsed <= 0 {
            return account.starting_balance();
        }

        let months_elapsed = months_elapsed as f64;
        compound_interest(
            account.starting_balance() + months_elapsed * account.monthly_contribution(),
            account.interest_rate(),
            account.periods_per_year(),
            months_elapsed / MONTHS_PER_YEAR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::CompoundFrequency;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(ProjectionConfig::at(now()))
    }

    #[test]
    fn test_default_horizon() {
        let account = Account::new("A1", 100.0, 0.05, CompoundFrequency::Monthly, 10.0, Goal::Default, now()).unwrap();
        let series = engine().project_default(&account);
        assert_eq!(series.len(), DEFAULT_PROJECTION_MONTHS as usize + 1);
        assert_eq!(series.points[0].date, now());
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings { default_projection_months: 120, ..Settings::default() };
        let engine = ProjectionEngine::new(ProjectionConfig::from_settings(&settings, now()));
        let account = Account::new("A1", 100.0, 0.05, CompoundFrequency::Monthly, 10.0, Goal::Default, now()).unwrap();
        assert_eq!(engine.project_default(&account).len(), 121);
    }

    #[test]
    fn test_current_balance_new_account() {
        let account = Account::new("A1", 500.0, 0.05, CompoundFrequency::Monthly, 10.0, Goal::Default, now())
            .unwrap()
            .with_created_at(now() - Duration::days(29));
        assert_eq!(engine().current_balance(&account), 500.0);
    }

    #[test]
    fn test_current_balance_after_a_year() {
        let account = Account::new("A1", 1_000.0, 0.05, CompoundFrequency::Monthly, 100.0, Goal::Default, now())
            .unwrap()
            .with_created_at(now() - Duration::days(360));
        let expected = compound_interest(2_200.0, 0.05, 12, 1.0);
        assert_relative_eq!(engine().current_balance(&account), expected);
    }

    #[test]
    fn test_plan_for_date_short_of_amount() {
        let date = NaiveDate::from_ymd_opt(2027, 6, 1).unwrap();
        let account =
            Account::new("Trip", 1_000.0, 0.05, CompoundFrequency::Monthly, 0.0, Goal::TargetDate(date), now())
                .unwrap();
        let plan = engine().plan_for_date(&account, 10_000.0);

        assert!(!plan.achievable);
        assert!(plan.final_amount.unwrap() < 10_000.0);
        let needed = plan.monthly_needed.unwrap();
        assert!(needed > 0.0 && needed < 10_000.0 / 24.0);
    }

    #[test]
    fn test_plan_for_date_covered_by_contributions() {
        let date = NaiveDate::from_ymd_opt(2027, 6, 1).unwrap();
        let account =
            Account::new("Trip", 1_000.0, 0.05, CompoundFrequency::Monthly, 500.0, Goal::TargetDate(date), now())
                .unwrap();
        let plan = engine().plan_for_date(&account, 10_000.0);

        assert!(plan.achievable);
        assert!(plan.final_amount.unwrap() >= 10_000.0);
        assert!(plan.monthly_needed.unwrap() < 500.0);
    }

    #[test]
    fn test_plan_for_past_date() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let account =
            Account::new("Late", 1_000.0, 0.05, CompoundFrequency::Monthly, 0.0, Goal::TargetDate(date), now())
                .unwrap();
        let plan = engine().plan_for_date(&account, 2_000.0);

        assert!(!plan.achievable);
        assert_eq!(plan.monthly_needed, None);
    }

    #[test]
    fn test_plan_for_non_date_goal_has_no_monthly_needed() {
        let account = Account::new("A1", 1_000.0, 0.05, CompoundFrequency::Monthly, 0.0, Goal::Default, now()).unwrap();
        assert_eq!(engine().plan_for_date(&account, 5_000.0).monthly_needed, None);
    }

    #[test]
    fn test_time_to_reach_ignores_stored_goal() {
        let account = Account::new("A1", 1_000.0, 0.05, CompoundFrequency::Monthly, 100.0, Goal::Default, now()).unwrap();
        let months = engine().time_to_reach(&account, 2_000.0).unwrap();
        assert!(months > 8.0 && months < 10.0, "got {}", months);
    }
}
