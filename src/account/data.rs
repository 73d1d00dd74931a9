//! Account snapshot consumed by the projection engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AccountError;

/// Upper bound accepted for the annual nominal rate
pub const MAX_INTEREST_RATE: f64 = 1.0;

static NEXT_ACCOUNT_SEQ: AtomicU64 = AtomicU64::new(1);

/// How often interest is capitalized into principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundFrequency {
    /// 365 periods per year
    Daily,
    /// 12 periods per year
    #[default]
    Monthly,
    /// 1 period per year
    Yearly,
}

impl CompoundFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundFrequency::Daily => 365,
            CompoundFrequency::Monthly => 12,
            CompoundFrequency::Yearly => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundFrequency::Daily => "daily",
            CompoundFrequency::Monthly => "monthly",
            CompoundFrequency::Yearly => "yearly",
        }
    }
}

impl FromStr for CompoundFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(CompoundFrequency::Daily),
            "monthly" => Ok(CompoundFrequency::Monthly),
            "yearly" | "annual" => Ok(CompoundFrequency::Yearly),
            other => Err(format!("Unknown compound frequency: {}", other)),
        }
    }
}

impl fmt::Display for CompoundFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Savings goal attached to an account
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Goal {
    /// No explicit goal; project over the configured default horizon
    #[default]
    Default,
    /// Reach this balance
    TargetAmount(f64),
    /// Report the balance reached on this date
    TargetDate(NaiveDate),
}

impl Goal {
    /// Short tag matching the import/export "Goal Type" column
    pub fn kind(&self) -> &'static str {
        match self {
            Goal::Default => "default",
            Goal::TargetAmount(_) => "amount",
            Goal::TargetDate(_) => "date",
        }
    }

    pub fn target_amount(&self) -> Option<f64> {
        match self {
            Goal::TargetAmount(amount) => Some(*amount),
            _ => None,
        }
    }

    pub fn target_date(&self) -> Option<NaiveDate> {
        match self {
            Goal::TargetDate(date) => Some(*date),
            _ => None,
        }
    }
}

/// Plain serde shape of an account, validated into [`Account`] on conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub starting_balance: f64,
    pub interest_rate: f64,
    #[serde(default)]
    pub compound_frequency: CompoundFrequency,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default)]
    pub goal: Goal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A savings account snapshot
///
/// Fields are private so that every constructed value satisfies the engine's
/// input domain: finite, non-negative balance and contribution, a rate in
/// `[0, 1]` and a positive target amount. Deserializing requires `created_at`;
/// use [`Account::from_record`] to supply one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AccountRecord", into = "AccountRecord")]
pub struct Account {
    id: String,
    name: String,
    starting_balance: f64,
    interest_rate: f64,
    compound_frequency: CompoundFrequency,
    monthly_contribution: f64,
    goal: Goal,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Create an account, checking the numeric domain of every field
    pub fn new(
        name: impl Into<String>,
        starting_balance: f64,
        interest_rate: f64,
        compound_frequency: CompoundFrequency,
        monthly_contribution: f64,
        goal: Goal,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AccountError> {
        if !starting_balance.is_finite() || starting_balance < 0.0 {
            return Err(AccountError::InvalidBalance(starting_balance));
        }
        if !interest_rate.is_finite() || !(0.0..=MAX_INTEREST_RATE).contains(&interest_rate) {
            return Err(AccountError::InvalidInterestRate(interest_rate));
        }
        if !monthly_contribution.is_finite() || monthly_contribution < 0.0 {
            return Err(AccountError::InvalidContribution(monthly_contribution));
        }
        if let Goal::TargetAmount(amount) = goal {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(AccountError::InvalidTargetAmount(amount));
            }
        }

        let name = name.into();
        Ok(Self {
            id: default_id(&name, created_at),
            name,
            starting_balance,
            interest_rate,
            compound_frequency,
            monthly_contribution,
            goal,
            created_at,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Validate a plain record, stamping `default_created_at` when it carries no creation time
    pub fn from_record(mut record: AccountRecord, default_created_at: DateTime<Utc>) -> Result<Self, AccountError> {
        record.created_at.get_or_insert(default_created_at);
        Self::try_from(record)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn compound_frequency(&self) -> CompoundFrequency {
        self.compound_frequency
    }

    pub fn periods_per_year(&self) -> u32 {
        self.compound_frequency.periods_per_year()
    }

    pub fn monthly_contribution(&self) -> f64 {
        self.monthly_contribution
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn default_id(name: &str, created_at: DateTime<Utc>) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let seq = NEXT_ACCOUNT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", slug, created_at.timestamp_millis(), seq)
}

impl TryFrom<AccountRecord> for Account {
    type Error = AccountError;

    fn try_from(record: AccountRecord) -> Result<Self, Self::Error> {
        let created_at = record.created_at.ok_or(AccountError::MissingCreatedAt)?;
        let mut account = Account::new(
            record.name,
            record.starting_balance,
            record.interest_rate,
            record.compound_frequency,
            record.monthly_contribution,
            record.goal,
            created_at,
        )?;
        if let Some(id) = record.id {
            account.id = id;
        }
        Ok(account)
    }
}

impl From<Account> for AccountRecord {
    fn from(account: Account) -> Self {
        Self {
            id: Some(account.id),
            name: account.name,
            starting_balance: account.starting_balance,
            interest_rate: account.interest_rate,
            compound_frequency: account.compound_frequency,
            monthly_contribution: account.monthly_contribution,
            goal: account.goal,
            created_at: Some(account.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(CompoundFrequency::Daily.periods_per_year(), 365);
        assert_eq!(CompoundFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(CompoundFrequency::Yearly.periods_per_year(), 1);
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("Daily".parse::<CompoundFrequency>(), Ok(CompoundFrequency::Daily));
        assert_eq!(" annual ".parse::<CompoundFrequency>(), Ok(CompoundFrequency::Yearly));
        assert!("weekly".parse::<CompoundFrequency>().is_err());
    }

    #[test]
    fn test_rejects_out_of_domain_inputs() {
        let freq = CompoundFrequency::Monthly;
        assert_eq!(
            Account::new("a", -1.0, 0.05, freq, 0.0, Goal::Default, created()),
            Err(AccountError::InvalidBalance(-1.0))
        );
        assert_eq!(
            Account::new("a", 100.0, -0.01, freq, 0.0, Goal::Default, created()),
            Err(AccountError::InvalidInterestRate(-0.01))
        );
        assert_eq!(
            Account::new("a", 100.0, 0.05, freq, -5.0, Goal::Default, created()),
            Err(AccountError::InvalidContribution(-5.0))
        );
        assert_eq!(
            Account::new("a", 100.0, 0.05, freq, 0.0, Goal::TargetAmount(0.0), created()),
            Err(AccountError::InvalidTargetAmount(0.0))
        );
        assert!(Account::new("a", f64::NAN, 0.05, freq, 0.0, Goal::Default, created()).is_err());
    }

    #[test]
    fn test_goal_json_shape() {
        let goal: Goal = serde_json::from_str(r#"{"type":"target_amount","value":5000.0}"#).unwrap();
        assert_eq!(goal, Goal::TargetAmount(5000.0));

        let goal: Goal = serde_json::from_str(r#"{"type":"target_date","value":"2030-06-01"}"#).unwrap();
        assert_eq!(goal.target_date(), NaiveDate::from_ymd_opt(2030, 6, 1));

        let goal: Goal = serde_json::from_str(r#"{"type":"default"}"#).unwrap();
        assert_eq!(goal, Goal::Default);
    }

    #[test]
    fn test_creation_time_is_explicit() {
        let a = Account::new("Rainy day", 10.0, 0.0, CompoundFrequency::Monthly, 0.0, Goal::Default, created()).unwrap();
        let b = Account::new("Rainy day", 10.0, 0.0, CompoundFrequency::Monthly, 0.0, Goal::Default, created()).unwrap();

        assert_eq!(a.created_at(), created());
        assert!(a.id().starts_with("rainy-day-"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_from_record_fills_creation_time() {
        let record: AccountRecord =
            serde_json::from_str(r#"{"name":"Rainy day","starting_balance":1000,"interest_rate":0.04}"#).unwrap();
        assert_eq!(Account::try_from(record.clone()), Err(AccountError::MissingCreatedAt));

        let account = Account::from_record(record, created()).unwrap();
        assert_eq!(account.created_at(), created());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"id":"acc-1","name":"Rainy day","starting_balance":1000,"interest_rate":0.04,"created_at":"2025-03-01T09:30:00Z"}"#;
        let account: Account = serde_json::from_str(ok).unwrap();
        assert_eq!(account.id(), "acc-1");
        assert_eq!(account.compound_frequency(), CompoundFrequency::Monthly);
        assert_eq!(account.monthly_contribution(), 0.0);
        assert_eq!(account.goal(), Goal::Default);
        assert_eq!(account.created_at(), created());

        let bad = r#"{"name":"Rainy day","starting_balance":-10,"interest_rate":0.04,"created_at":"2025-03-01T09:30:00Z"}"#;
        assert!(serde_json::from_str::<Account>(bad).is_err());
    }
}
