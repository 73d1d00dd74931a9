//! Savings Projection CLI
//!
//! Command-line interface for projecting savings accounts and checking goals

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use savings_projection::account::{load_accounts, validate_account, ImportResult, PromptParser, Severity};
use savings_projection::export::{export_detailed, export_summary};
use savings_projection::format::{
    accounts_overview, format_currency, format_duration, format_percentage, projection_summary,
};
use savings_projection::{
    Account, CompoundFrequency, Goal, GoalProjection, PortfolioRunner, ProjectionConfig, ProjectionEngine, Settings,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequency {
    Daily,
    Monthly,
    Yearly,
}

impl From<CliFrequency> for CompoundFrequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Daily => CompoundFrequency::Daily,
            CliFrequency::Monthly => CompoundFrequency::Monthly,
            CliFrequency::Yearly => CompoundFrequency::Yearly,
        }
    }
}

#[derive(Parser)]
#[command(name = "savings-projection")]
#[command(about = "Compound-interest projections and goal planning for savings accounts")]
#[command(version)]
struct Cli {
    /// JSON settings file (default horizon, currency)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Reference time for projections (RFC 3339); defaults to now
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct AccountArgs {
    /// Starting balance
    #[arg(long, short = 'b')]
    balance: f64,

    /// Annual interest rate as a decimal (0.05 = 5%)
    #[arg(long, short = 'r')]
    rate: f64,

    /// Compounding schedule
    #[arg(long, short = 'f', value_enum, default_value = "monthly")]
    frequency: CliFrequency,

    /// Monthly contribution
    #[arg(long, short = 'c', default_value_t = 0.0)]
    contribution: f64,
}

impl AccountArgs {
    fn to_account(&self, goal: Goal, now: DateTime<Utc>) -> Result<Account> {
        Account::new(
            "CLI account",
            self.balance,
            self.rate,
            self.frequency.into(),
            self.contribution,
            goal,
            now,
        )
        .context("invalid account parameters")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a month-by-month projection
    Project {
        #[command(flatten)]
        account: AccountArgs,

        /// Months to project (defaults to the settings horizon)
        #[arg(long, short = 'm')]
        months: Option<u32>,

        /// Print every month instead of the first 24
        #[arg(long)]
        all: bool,
    },

    /// Check whether a target amount or date is reachable
    ///
    /// With both --target-amount and --target-date, checks whether the amount
    /// is held by that date and reports the monthly contribution it needs.
    Goal {
        #[command(flatten)]
        account: AccountArgs,

        /// Target balance
        #[arg(long)]
        target_amount: Option<f64>,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target_date: Option<NaiveDate>,
    },

    /// Monthly contribution needed to reach a target within a horizon
    Required {
        #[command(flatten)]
        account: AccountArgs,

        /// Target balance
        #[arg(long, short = 't')]
        target: f64,

        /// Horizon in months
        #[arg(long, short = 'm')]
        months: u32,
    },

    /// Build an account from a sentence such as "save for a car with $2,000 at 4%"
    Create {
        /// Free-text account request
        sentence: String,

        /// Print the account as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Validate an account CSV and list what would be imported
    Import {
        /// CSV file to read
        input: PathBuf,
    },

    /// Export projections for the accounts in a CSV file
    Export {
        /// CSV file of accounts
        input: PathBuf,

        /// Output CSV path
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Write every projected month instead of one summary row per account
        #[arg(long)]
        detailed: bool,

        /// Months to project (defaults to the settings horizon)
        #[arg(long, short = 'm')]
        months: Option<u32>,
    },

    /// Compare and total the accounts in a CSV file
    Portfolio {
        /// CSV file of accounts
        input: PathBuf,

        /// Months to project (defaults to the settings horizon)
        #[arg(long, short = 'm')]
        months: Option<u32>,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(p) => Settings::from_json_path(p).with_context(|| format!("loading settings from {}", p.display())),
        None => Ok(Settings::default()),
    }
}

fn import_accounts(input: &PathBuf, now: DateTime<Utc>) -> Result<ImportResult> {
    load_accounts(input, now).with_context(|| format!("importing {}", input.display()))
}

/// Build the goal for the `goal` subcommand and resolve it
///
/// An amount together with a date becomes a date goal planned against that amount.
fn resolve_cli_goal(
    engine: &ProjectionEngine,
    args: &AccountArgs,
    target_amount: Option<f64>,
    target_date: Option<NaiveDate>,
) -> Result<(Account, GoalProjection)> {
    let goal = match (target_amount, target_date) {
        (_, Some(date)) => Goal::TargetDate(date),
        (Some(amount), None) => Goal::TargetAmount(amount),
        (None, None) => Goal::Default,
    };
    let account = args.to_account(goal, engine.reference_time())?;

    let projection = match (target_amount, target_date) {
        (Some(amount), Some(_)) => engine.plan_for_date(&account, amount),
        _ => engine.resolve_goal(&account),
    };
    Ok((account, projection))
}

fn print_issues(result: &ImportResult) {
    for issue in &result.issues {
        let tag = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("  row {:>3} [{}] {}: {}", issue.row, tag, issue.column, issue.message);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;
    let now = cli.now.unwrap_or_else(Utc::now);
    let engine = ProjectionEngine::new(ProjectionConfig::from_settings(&settings, now));
    let currency = settings.currency.as_str();

    match cli.command {
        Commands::Project { account, months, all } => {
            let account = account.to_account(Goal::Default, now)?;
            let months = months.unwrap_or(settings.default_projection_months);
            let series = engine.project(&account, months);

            println!("Projection Results ({} months):", months);
            println!(
                "{:>5} {:>12} {:>16} {:>16} {:>16}",
                "Month", "Date", "Balance", "Contributions", "Interest"
            );
            println!("{}", "-".repeat(70));

            let shown = if all { series.len() } else { 25 };
            for point in series.points.iter().take(shown) {
                println!(
                    "{:>5} {:>12} {:>16} {:>16} {:>16}",
                    point.month,
                    point.date.format("%Y-%m-%d"),
                    format_currency(point.balance, currency),
                    format_currency(point.total_contributions, currency),
                    format_currency(point.interest_earned, currency),
                );
            }
            if series.len() > shown {
                println!("... ({} more months)", series.len() - shown);
            }

            let summary = series.summary();
            println!("\nSummary:");
            println!("  Final Balance: {}", format_currency(summary.final_balance, currency));
            println!("  Total Contributions: {}", format_currency(summary.total_contributions, currency));
            println!("  Interest Earned: {}", format_currency(summary.interest_earned, currency));
        }

        Commands::Goal { account, target_amount, target_date } => {
            let (account, projection) = resolve_cli_goal(&engine, &account, target_amount, target_date)?;
            if let Err(e) = validate_account(&account, now) {
                log::warn!("Account would be rejected by form validation: {}", e);
            }

            println!("Goal: {}", account.goal().kind());
            println!("  Achievable: {}", if projection.achievable { "yes" } else { "no" });
            if let Some(months) = projection.time_to_goal_months {
                println!("  Time to goal: {} ({:.2} months)", format_duration(months), months);
            }
            if let Some(amount) = projection.final_amount {
                println!("  Balance at horizon: {}", format_currency(amount, currency));
            }
            if let Some(needed) = projection.monthly_needed {
                println!("  Monthly contribution needed: {}", format_currency(needed, currency));
            }

            let series = engine.project(&account, 60);
            println!("\n{}", projection_summary(&series, &projection, currency));
        }

        Commands::Required { account, target, months } => {
            let account = account.to_account(Goal::TargetAmount(target), now)?;
            let needed = engine.required_monthly_contribution(&account, target, months);
            println!(
                "Monthly contribution to reach {} in {} at {}: {}",
                format_currency(target, currency),
                format_duration(months as f64).to_lowercase(),
                format_percentage(account.interest_rate(), 2),
                format_currency(needed, currency),
            );
        }

        Commands::Create { sentence, json } => {
            let parser = PromptParser::new().context("compiling request patterns")?;
            let parsed = parser.parse_message(&sentence, now);
            let Some(prompt) = parsed.accounts.first() else {
                println!("No account request found in: {:?}", sentence);
                if parsed.requires_calculation {
                    println!("Use `project`, `goal` or `required` for calculations.");
                }
                return Ok(());
            };

            let account = prompt.to_account(now).context("building account from request")?;
            if let Err(e) = validate_account(&account, now) {
                log::warn!("Account would be rejected by form validation: {}", e);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&account)?);
            } else {
                println!("Account: {}", account.name());
                println!("  Starting Balance: {}", format_currency(account.starting_balance(), currency));
                println!("  Interest Rate: {}", format_percentage(account.interest_rate(), 2));
                println!("  Compounding: {}", account.compound_frequency());
                println!("  Monthly Contribution: {}", format_currency(account.monthly_contribution(), currency));
                println!("  Goal: {}", account.goal().kind());

                let projection = engine.resolve_goal(&account);
                let series = engine.project_default(&account);
                println!("\n{}", projection_summary(&series, &projection, currency));
            }
        }

        Commands::Import { input } => {
            let result = import_accounts(&input, now)?;
            let stats = result.stats();
            println!(
                "Rows: {}  Valid: {}  With errors: {}  With warnings: {}",
                stats.total_rows, stats.valid_rows, stats.error_rows, stats.warning_rows
            );
            print_issues(&result);
            for account in &result.accounts {
                println!(
                    "  {:<30} {:>16} {:>8} {:<8} {}",
                    account.name(),
                    format_currency(account.starting_balance(), currency),
                    format_percentage(account.interest_rate(), 2),
                    account.compound_frequency(),
                    account.goal().kind(),
                );
            }
        }

        Commands::Export { input, output, detailed, months } => {
            let result = import_accounts(&input, now)?;
            print_issues(&result);
            let months = months.unwrap_or(settings.default_projection_months);
            if detailed {
                export_detailed(&output, &result.accounts, &engine, months)?;
            } else {
                export_summary(&output, &result.accounts, &engine, months)?;
            }
            println!("Exported {} accounts to {}", result.accounts.len(), output.display());
        }

        Commands::Portfolio { input, months } => {
            let result = import_accounts(&input, now)?;
            print_issues(&result);
            let months = months.unwrap_or(settings.default_projection_months);
            let runner = PortfolioRunner::new(engine.clone());
            let summary = runner.summarize(&result.accounts, months);

            println!("Portfolio ({} months):", months);
            for row in &summary.accounts {
                println!(
                    "  {:<30} {:>16} {:>8}",
                    row.name,
                    format_currency(row.final_balance, currency),
                    format_percentage(row.share, 1),
                );
            }
            println!("  Total Value: {}", format_currency(summary.total_value, currency));
            println!("  Total Contributions: {}", format_currency(summary.total_contributions, currency));
            println!("  Total Interest: {}", format_currency(summary.total_interest, currency));
            println!("\n{}", accounts_overview(&result.accounts, &engine, currency));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn engine() -> ProjectionEngine {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        ProjectionEngine::new(ProjectionConfig::at(now))
    }

    fn args(contribution: f64) -> AccountArgs {
        AccountArgs { balance: 1_000.0, rate: 0.0, frequency: CliFrequency::Monthly, contribution }
    }

    #[test]
    fn test_amount_and_date_plans_contribution() {
        let date = NaiveDate::from_ymd_opt(2027, 1, 1);
        let (account, plan) = resolve_cli_goal(&engine(), &args(0.0), Some(10_000.0), date).unwrap();

        assert_eq!(account.goal(), Goal::TargetDate(date.unwrap()));
        assert!(!plan.achievable);
        assert_eq!(plan.final_amount, Some(1_000.0));
        assert_eq!(plan.monthly_needed, Some(360.0));
    }

    #[test]
    fn test_single_goal_kinds() {
        let (account, projection) = resolve_cli_goal(&engine(), &args(100.0), Some(500.0), None).unwrap();
        assert_eq!(account.goal(), Goal::TargetAmount(500.0));
        assert!(projection.achievable);
        assert_eq!(projection.time_to_goal_months, Some(0.0));
        assert_eq!(projection.monthly_needed, None);

        let (account, projection) = resolve_cli_goal(&engine(), &args(100.0), None, None).unwrap();
        assert_eq!(account.goal(), Goal::Default);
        assert_eq!(projection.final_amount, Some(1_000.0 + 36.0 * 100.0));
    }

    #[test]
    fn test_cli_parses_create() {
        let cli = Cli::try_parse_from(["savings-projection", "create", "save for a bike with $200", "--json"]).unwrap();
        match cli.command {
            Commands::Create { sentence, json } => {
                assert_eq!(sentence, "save for a bike with $200");
                assert!(json);
            }
            _ => panic!("expected create"),
        }
    }
}
