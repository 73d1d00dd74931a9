//! Display formatting and plain-text projection narration

use chrono::{DateTime, Utc};

use crate::account::Account;
use crate::projection::{GoalProjection, ProjectionEngine, ProjectionSeries};

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Group the integer part of a non-negative number with commas
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a number with thousands separators and a fixed number of decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let sign = if value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, group_thousands(int_part), f),
        None => format!("{}{}", sign, group_thousands(int_part)),
    }
}

/// `1234.5, "USD"` → `$1,234.50`; unknown codes are used as a prefix
pub fn format_currency(amount: f64, currency: &str) -> String {
    let number = format_number(amount.abs(), 2);
    let sign = if amount < 0.0 && number != "0.00" { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, number),
        None => format!("{}{} {}", sign, currency.to_ascii_uppercase(), number),
    }
}

/// `0.0525, 2` → `5.25%`
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// `Jan 5, 2025`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn plural(n: u32, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" })
}

/// Human-readable duration for a (fractional) month count
pub fn format_duration(months: f64) -> String {
    if months < 1.0 {
        return "Less than a month".to_string();
    }

    let whole = months.floor() as u32;
    let years = whole / 12;
    let remaining = whole % 12;

    match (years, remaining) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{} and {}", plural(y, "year"), plural(m, "month")),
    }
}

/// One-paragraph summary of an account's first year and goal outlook
pub fn projection_summary(series: &ProjectionSeries, goal: &GoalProjection, currency: &str) -> String {
    let Some(point) = series.points.iter().take(13).last() else {
        return "No projection data available.".to_string();
    };

    let mut summary = format!(
        "After {}, the balance would be {} with {} in interest earned.",
        format_duration(point.month as f64).to_lowercase(),
        format_currency(point.balance, currency),
        format_currency(point.interest_earned, currency),
    );

    if goal.achievable {
        if let Some(months) = goal.time_to_goal_months {
            if months <= 0.0 {
                summary.push_str(" Goal is already reached.");
            } else {
                summary.push_str(&format!(" Goal is achievable in {}.", format_duration(months).to_lowercase()));
            }
        } else if let Some(amount) = goal.final_amount {
            summary.push_str(&format!(" Balance at the goal horizon: {}.", format_currency(amount, currency)));
        }
        if let Some(needed) = goal.monthly_needed {
            summary.push_str(&format!(
                " {} monthly would be enough to reach the goal.",
                format_currency(needed, currency)
            ));
        }
    } else {
        if let Some(amount) = goal.final_amount {
            summary.push_str(&format!(" Balance at the goal horizon: {}.", format_currency(amount, currency)));
        }
        summary.push_str(" Current plan will not reach the goal.");
        if let Some(needed) = goal.monthly_needed {
            summary.push_str(&format!(
                " Would need {} monthly to reach the goal.",
                format_currency(needed, currency)
            ));
        }
    }

    summary
}

/// Summary of a whole account list: count, current total, goals and most recent account
pub fn accounts_overview(accounts: &[Account], engine: &ProjectionEngine, currency: &str) -> String {
    let Some(most_recent) = accounts.iter().max_by_key(|a| a.created_at()) else {
        return "No accounts created yet.".to_string();
    };

    let total: f64 = accounts.iter().map(|a| engine.current_balance(a)).sum();
    let goal_total: f64 = accounts.iter().filter_map(|a| a.goal().target_amount()).sum();
    let with_goals = accounts.iter().filter(|a| a.goal().target_amount().is_some()).count();

    let mut summary = format!(
        "{} with a total balance of {}.",
        if accounts.len() == 1 { "1 account".to_string() } else { format!("{} accounts", accounts.len()) },
        format_currency(total, currency),
    );

    if with_goals > 0 {
        summary.push_str(&format!(
            " {} specific goals totaling {}.",
            if with_goals == 1 { "1 account has".to_string() } else { format!("{} accounts have", with_goals) },
            format_currency(goal_total, currency),
        ));
    }

    summary.push_str(&format!(
        " Most recent account: \"{}\" with {}.",
        most_recent.name(),
        format_currency(engine.current_balance(most_recent), currency),
    ));

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{CompoundFrequency, Goal};
    use crate::projection::ProjectionConfig;
    use chrono::TimeZone;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5, "USD"), "$1,234.50");
        assert_eq!(format_currency(0.0, "usd"), "$0.00");
        assert_eq!(format_currency(1_000_000.0, "EUR"), "€1,000,000.00");
        assert_eq!(format_currency(-42.129, "GBP"), "-£42.13");
        assert_eq!(format_currency(999.999, "CHF"), "CHF 1,000.00");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 1), "1,234,567.9");
        assert_eq!(format_number(12.0, 0), "12");
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.0525, 2), "5.25%");
        assert_eq!(format_percentage(0.05, 0), "5%");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.4), "Less than a month");
        assert_eq!(format_duration(1.0), "1 month");
        assert_eq!(format_duration(11.9), "11 months");
        assert_eq!(format_duration(12.0), "1 year");
        assert_eq!(format_duration(25.3), "2 years and 1 month");
        assert_eq!(format_duration(38.0), "3 years and 2 months");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2025");
    }

    #[test]
    fn test_projection_summary() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let engine = ProjectionEngine::new(ProjectionConfig::at(now));
        let account =
            Account::new("Car", 1_000.0, 0.05, CompoundFrequency::Monthly, 0.0, Goal::TargetAmount(2_000.0), now)
                .unwrap();
        let text = projection_summary(&engine.project(&account, 60), &engine.resolve_goal(&account), "USD");

        assert!(text.starts_with("After 1 year, the balance would be $1,051.16"), "{}", text);
        assert!(text.contains("Goal is achievable in 13 years and 10 months."), "{}", text);
    }

    #[test]
    fn test_projection_summary_unreachable() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let engine = ProjectionEngine::new(ProjectionConfig::at(now));
        let account =
            Account::new("Jar", 10.0, 0.0, CompoundFrequency::Monthly, 0.0, Goal::TargetAmount(2_000.0), now).unwrap();
        let text = projection_summary(&engine.project(&account, 6), &engine.resolve_goal(&account), "USD");

        assert!(text.starts_with("After 6 months"), "{}", text);
        assert!(text.ends_with("Current plan will not reach the goal."), "{}", text);
    }

    #[test]
    fn test_projection_summary_date_plan() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let engine = ProjectionEngine::new(ProjectionConfig::at(now));
        let date = chrono::NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        let account =
            Account::new("Bike", 1_000.0, 0.0, CompoundFrequency::Monthly, 0.0, Goal::TargetDate(date), now).unwrap();

        // 730 days rounds up to 25 thirty-day months; 9,000 short over 25 months
        let plan = engine.plan_for_date(&account, 10_000.0);
        let text = projection_summary(&engine.project(&account, 12), &plan, "USD");

        assert!(text.ends_with(
            "Balance at the goal horizon: $1,000.00. Current plan will not reach the goal. \
             Would need $360.00 monthly to reach the goal."
        ), "{}", text);
    }

    #[test]
    fn test_accounts_overview() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let engine = ProjectionEngine::new(ProjectionConfig::at(now));
        assert_eq!(accounts_overview(&[], &engine, "USD"), "No accounts created yet.");

        let older = Account::new("Old", 100.0, 0.0, CompoundFrequency::Monthly, 0.0, Goal::TargetAmount(500.0), now)
            .unwrap();
        let newer = Account::new("New", 50.0, 0.0, CompoundFrequency::Monthly, 0.0, Goal::Default, now)
            .unwrap()
            .with_created_at(now + chrono::Duration::seconds(1));
        let text = accounts_overview(&[older, newer], &engine, "USD");

        assert_eq!(
            text,
            "2 accounts with a total balance of $150.00. 1 account has specific goals totaling $500.00. \
             Most recent account: \"New\" with $50.00."
        );
    }
}
