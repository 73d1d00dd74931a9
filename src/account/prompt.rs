//! Pull an account description out of a free-text request
//!
//! Handles sentences such as "Open an emergency fund with $2,500 at 4%
//! compounded daily, adding $150 a month. I want to reach $15,000 by 2027."
//! Extraction is keyword and pattern based; nothing here calls out to a
//! language model.

use chrono::{DateTime, Months, NaiveDate, Utc};
use log::debug;
use regex::{Captures, Regex};
use serde::Serialize;

use super::{Account, AccountRecord, CompoundFrequency, Goal};
use crate::error::AccountError;

const CREATION_KEYWORDS: [&str; 14] = [
    "create account",
    "new account",
    "start saving",
    "open account",
    "add account",
    "save for",
    "saving for",
    "want to save",
    "need to save",
    "goal is",
    "my goal",
    "retirement",
    "emergency fund",
    "vacation fund",
];

const CALCULATION_KEYWORDS: [&str; 10] = [
    "how much",
    "how long",
    "when will",
    "calculate",
    "projection",
    "forecast",
    "compound",
    "interest",
    "grow to",
    "reach my goal",
];

/// Leading words dropped from an extracted account name
const NAME_FILLER: [&str; 16] = [
    "a", "an", "the", "my", "our", "new", "another", "separate", "create", "open", "add", "start", "to", "i",
    "want", "need",
];

/// Words that end a "save for ..." name
const NAME_BREAKS: [&str; 10] = ["with", "at", "by", "in", "and", "starting", "earning", "i", "from", "that"];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const AMOUNT: &str = r"\$?(\d[\d,]*(?:\.\d+)?)";

/// Account details found in a message
///
/// The rate is kept as the percentage the user typed; [`AccountPrompt::to_record`]
/// turns it into a decimal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountPrompt {
    pub name: Option<String>,
    pub starting_balance: Option<f64>,
    pub interest_rate_percent: Option<f64>,
    pub compound_frequency: Option<CompoundFrequency>,
    pub target_amount: Option<f64>,
    pub target_date: Option<NaiveDate>,
    pub monthly_contribution: Option<f64>,
}

impl AccountPrompt {
    /// Reject values no account may carry
    pub fn validate(&self) -> Result<(), AccountError> {
        if let Some(balance) = self.starting_balance.filter(|b| *b < 0.0) {
            return Err(AccountError::InvalidBalance(balance));
        }
        if let Some(rate) = self.interest_rate_percent.filter(|r| !(0.0..=100.0).contains(r)) {
            return Err(AccountError::InvalidInterestRate(rate / 100.0));
        }
        if let Some(amount) = self.target_amount.filter(|a| *a <= 0.0) {
            return Err(AccountError::InvalidTargetAmount(amount));
        }
        if let Some(contribution) = self.monthly_contribution.filter(|c| *c < 0.0) {
            return Err(AccountError::InvalidContribution(contribution));
        }
        Ok(())
    }

    /// Fill in defaults and convert the rate to a decimal
    ///
    /// A target amount wins over a target date when both were mentioned.
    pub fn to_record(&self, now: DateTime<Utc>) -> Result<AccountRecord, AccountError> {
        self.validate()?;

        let goal = match (self.target_amount, self.target_date) {
            (Some(amount), _) => Goal::TargetAmount(amount),
            (None, Some(date)) => Goal::TargetDate(date),
            (None, None) => Goal::Default,
        };

        Ok(AccountRecord {
            id: None,
            name: self
                .name
                .clone()
                .unwrap_or_else(|| format!("Account {}", now.timestamp_millis())),
            starting_balance: self.starting_balance.unwrap_or(0.0),
            interest_rate: self.interest_rate_percent.unwrap_or(0.0) / 100.0,
            compound_frequency: self.compound_frequency.unwrap_or_default(),
            monthly_contribution: self.monthly_contribution.unwrap_or(0.0),
            goal,
            created_at: Some(now),
        })
    }

    pub fn to_account(&self, now: DateTime<Utc>) -> Result<Account, AccountError> {
        Account::from_record(self.to_record(now)?, now)
    }
}

/// Result of reading one message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedMessage {
    /// Accounts the message asks to create (zero or one)
    pub accounts: Vec<AccountPrompt>,

    /// The message asks for a projection or other calculation
    pub requires_calculation: bool,
}

/// Compiled patterns for reading account requests
#[derive(Debug, Clone)]
pub struct PromptParser {
    name_before_noun: Regex,
    name_after_save_for: Regex,
    rates: Vec<Regex>,
    frequency_stated: Regex,
    daily: Regex,
    monthly: Regex,
    yearly: Regex,
    starting_amount: Regex,
    goal_amount: Regex,
    contribution_per_month: Regex,
    contribution_verb: Regex,
    date_us: Regex,
    date_iso: Regex,
    date_long: Regex,
    date_in_years: Regex,
    date_by_year: Regex,
}

fn amount_after_keywords(keywords: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)\b(?:{})\w*[^\d,.;!?%]{{0,30}}?{}(\s*(?:%|percent\b|apy\b|(?:a|per|each|every|/)\s*month\b|monthly\b))?",
        keywords, AMOUNT
    ))
}

fn capture_u32(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps[index].parse().ok()
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strip_filler<'a>(words: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    words.skip_while(|w| NAME_FILLER.contains(&w.to_ascii_lowercase().as_str())).collect()
}

impl PromptParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            name_before_noun: Regex::new(r"(?i)\b((?:[a-z]+\s+){0,2}[a-z]+)\s+(account|fund|savings)\b")?,
            name_after_save_for: Regex::new(r"(?i)\bsav(?:e|ing)\s+(?:up\s+)?for\s+((?:[a-z]+\s+){0,3}[a-z]+)")?,
            rates: vec![
                Regex::new(r"(\d+(?:\.\d+)?)\s*%")?,
                Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*percent\b")?,
                Regex::new(r"(?i)\brate\s+of\s+(\d+(?:\.\d+)?)")?,
                Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*apy\b")?,
            ],
            frequency_stated: Regex::new(r"(?i)\bcompound(?:ed|s|ing)?\s+(daily|monthly|yearly|annually)\b")?,
            daily: Regex::new(r"(?i)\bdaily\b")?,
            monthly: Regex::new(r"(?i)\b(?:monthly|month)\b")?,
            yearly: Regex::new(r"(?i)\b(?:yearly|annual|annually)\b")?,
            starting_amount: amount_after_keywords("starting|initial|have|current|with")?,
            goal_amount: amount_after_keywords("goal|target|want|need|reach")?,
            contribution_per_month: Regex::new(&format!(
                r"(?i){}\s*(?:dollars\s*)?(?:(?:a|per|each|every|/)\s*month\b|monthly\b)",
                AMOUNT
            ))?,
            contribution_verb: amount_after_keywords("contribut|deposit|add|put")?,
            date_us: Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b")?,
            date_iso: Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b")?,
            date_long: Regex::new(&format!(r"(?i)\b({})\s+(\d{{1,2}}),?\s+(\d{{4}})\b", MONTHS.join("|")))?,
            date_in_years: Regex::new(r"(?i)\bin\s+(\d+)\s+years?\b")?,
            date_by_year: Regex::new(r"(?i)\bby\s+(\d{4})\b")?,
        })
    }

    pub fn is_account_request(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        CREATION_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    pub fn requires_calculation(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        CALCULATION_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// Read a message, extracting an account when it asks for one
    pub fn parse_message(&self, message: &str, now: DateTime<Utc>) -> ParsedMessage {
        let accounts = if self.is_account_request(message) {
            vec![self.extract(message, now)]
        } else {
            Vec::new()
        };

        ParsedMessage {
            accounts,
            requires_calculation: self.requires_calculation(message),
        }
    }

    /// Extract whatever account fields the message mentions
    pub fn extract(&self, message: &str, now: DateTime<Utc>) -> AccountPrompt {
        let target_date = self.target_date(message, now);
        let text = self.without_dates(message);

        let prompt = AccountPrompt {
            name: self.name(message),
            starting_balance: self.keyword_amount(&self.starting_amount, &text, false),
            interest_rate_percent: self.interest_rate(&text),
            compound_frequency: self.compound_frequency(&text),
            target_amount: self.keyword_amount(&self.goal_amount, &text, false),
            target_date,
            monthly_contribution: self.monthly_contribution(&text),
        };
        debug!("Extracted {:?} from {:?}", prompt, message);
        prompt
    }

    fn name(&self, message: &str) -> Option<String> {
        for caps in self.name_before_noun.captures_iter(message) {
            let words = strip_filler(caps[1].split_whitespace());
            if !words.is_empty() {
                return Some(capitalize(&format!("{} {}", words.join(" "), caps[2].to_lowercase())));
            }
        }

        let caps = self.name_after_save_for.captures(message)?;
        let words = strip_filler(
            caps[1]
                .split_whitespace()
                .take_while(|w| !NAME_BREAKS.contains(&w.to_ascii_lowercase().as_str())),
        );
        (!words.is_empty()).then(|| capitalize(&words.join(" ")))
    }

    /// First amount after one of the pattern's keywords, skipping rates
    fn keyword_amount(&self, pattern: &Regex, text: &str, allow_monthly: bool) -> Option<f64> {
        pattern.captures_iter(text).find_map(|caps| {
            let suffix = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
            let is_rate = suffix
                .as_deref()
                .is_some_and(|s| s.contains('%') || s.contains("percent") || s.contains("apy"));
            let is_monthly = suffix.as_deref().is_some_and(|s| s.contains("month"));
            if is_rate || (is_monthly && !allow_monthly) {
                return None;
            }
            parse_number(&caps[1])
        })
    }

    fn interest_rate(&self, text: &str) -> Option<f64> {
        self.rates
            .iter()
            .find_map(|re| re.captures(text).and_then(|caps| parse_number(&caps[1])))
    }

    fn compound_frequency(&self, text: &str) -> Option<CompoundFrequency> {
        if let Some(caps) = self.frequency_stated.captures(text) {
            let stated = caps[1].to_ascii_lowercase();
            let stated = if stated == "annually" { "yearly" } else { stated.as_str() };
            return stated.parse().ok();
        }
        if self.daily.is_match(text) {
            Some(CompoundFrequency::Daily)
        } else if self.monthly.is_match(text) {
            Some(CompoundFrequency::Monthly)
        } else if self.yearly.is_match(text) {
            Some(CompoundFrequency::Yearly)
        } else {
            None
        }
    }

    fn monthly_contribution(&self, text: &str) -> Option<f64> {
        self.contribution_per_month
            .captures(text)
            .and_then(|caps| parse_number(&caps[1]))
            .or_else(|| self.keyword_amount(&self.contribution_verb, text, true))
    }

    fn target_date(&self, message: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
        if let Some(caps) = self.date_us.captures(message) {
            let (month, day) = (capture_u32(&caps, 1)?, capture_u32(&caps, 2)?);
            return NaiveDate::from_ymd_opt(capture_u32(&caps, 3)? as i32, month, day);
        }
        if let Some(caps) = self.date_iso.captures(message) {
            let (month, day) = (capture_u32(&caps, 2)?, capture_u32(&caps, 3)?);
            return NaiveDate::from_ymd_opt(capture_u32(&caps, 1)? as i32, month, day);
        }
        if let Some(caps) = self.date_long.captures(message) {
            let month = caps[1].to_ascii_lowercase();
            let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
            return NaiveDate::from_ymd_opt(capture_u32(&caps, 3)? as i32, month, capture_u32(&caps, 2)?);
        }
        if let Some(caps) = self.date_in_years.captures(message) {
            let years = capture_u32(&caps, 1)?;
            return now.date_naive().checked_add_months(Months::new(years.checked_mul(12)?));
        }
        if let Some(caps) = self.date_by_year.captures(message) {
            return NaiveDate::from_ymd_opt(capture_u32(&caps, 1)? as i32, 12, 31);
        }
        None
    }

    /// Blank out dates so their digits are not read as amounts
    fn without_dates(&self, message: &str) -> String {
        [&self.date_us, &self.date_iso, &self.date_long, &self.date_in_years, &self.date_by_year]
            .iter()
            .fold(message.to_string(), |text, re| re.replace_all(&text, " ").into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()
    }

    fn parser() -> PromptParser {
        PromptParser::new().unwrap()
    }

    #[test]
    fn test_detects_requests() {
        let parser = parser();
        assert!(parser.is_account_request("I need to save for a new car"));
        assert!(parser.is_account_request("Set up an EMERGENCY FUND please"));
        assert!(!parser.is_account_request("What is the weather like?"));

        let parsed = parser.parse_message("How long will it take to double my money at 5%?", now());
        assert!(parsed.accounts.is_empty());
        assert!(parsed.requires_calculation);
    }

    #[test]
    fn test_amount_goal_with_contribution() {
        let message = "I want to start saving for a vacation. I have $1,000 and can add $150 a month \
                       at 4.5% compounded daily. My goal is $5,000.";
        let parsed = parser().parse_message(message, now());
        assert!(parsed.requires_calculation);

        assert_eq!(
            parsed.accounts,
            vec![AccountPrompt {
                name: Some("Vacation".to_string()),
                starting_balance: Some(1_000.0),
                interest_rate_percent: Some(4.5),
                compound_frequency: Some(CompoundFrequency::Daily),
                target_amount: Some(5_000.0),
                target_date: None,
                monthly_contribution: Some(150.0),
            }]
        );
    }

    #[test]
    fn test_named_account_without_goal() {
        let message = "Create a retirement account with $10,000 at 7% interest compounded yearly, adding $500 monthly";
        let prompt = parser().extract(message, now());

        assert_eq!(prompt.name.as_deref(), Some("Retirement account"));
        assert_eq!(prompt.starting_balance, Some(10_000.0));
        assert_eq!(prompt.interest_rate_percent, Some(7.0));
        assert_eq!(prompt.compound_frequency, Some(CompoundFrequency::Yearly));
        assert_eq!(prompt.monthly_contribution, Some(500.0));
        assert_eq!(prompt.target_amount, None);
        assert_eq!(prompt.target_date, None);
    }

    #[test]
    fn test_amount_and_year_deadline() {
        let message = "Open an emergency fund with $2,500. I want to reach $15,000 by 2027. Rate of 3.2 APY.";
        let prompt = parser().extract(message, now());

        assert_eq!(prompt.name.as_deref(), Some("Emergency fund"));
        assert_eq!(prompt.starting_balance, Some(2_500.0));
        assert_eq!(prompt.target_amount, Some(15_000.0));
        assert_eq!(prompt.target_date, NaiveDate::from_ymd_opt(2027, 12, 31));
        assert_eq!(prompt.interest_rate_percent, Some(3.2));
        assert_eq!(prompt.compound_frequency, None);

        let record = prompt.to_record(now()).unwrap();
        assert_eq!(record.goal, Goal::TargetAmount(15_000.0));
        assert_eq!(record.compound_frequency, CompoundFrequency::Monthly);
        assert!((record.interest_rate - 0.032).abs() < 1e-12);
    }

    #[test]
    fn test_relative_date_goal() {
        let message = "Save for a house in 5 years, starting with $20,000 at 5% compounded monthly";
        let prompt = parser().extract(message, now());

        assert_eq!(prompt.name.as_deref(), Some("House"));
        assert_eq!(prompt.starting_balance, Some(20_000.0));
        assert_eq!(prompt.target_amount, None);
        assert_eq!(prompt.target_date, NaiveDate::from_ymd_opt(2030, 4, 1));

        let account = prompt.to_account(now()).unwrap();
        assert_eq!(account.goal(), Goal::TargetDate(NaiveDate::from_ymd_opt(2030, 4, 1).unwrap()));
        assert_eq!(account.created_at(), now());
        assert!((account.interest_rate() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_date_formats() {
        let parser = parser();
        let cases = [
            ("My goal is to save $3,000 by 12/31/2026", NaiveDate::from_ymd_opt(2026, 12, 31)),
            ("My goal is $800 on 2026-03-15", NaiveDate::from_ymd_opt(2026, 3, 15)),
            ("My goal is $800 by September 1, 2026", NaiveDate::from_ymd_opt(2026, 9, 1)),
        ];
        for (message, expected) in cases {
            let prompt = parser.extract(message, now());
            assert_eq!(prompt.target_date, expected, "{}", message);
            assert!(prompt.target_amount.is_some(), "{}", message);
        }
        assert_eq!(parser.extract("My goal is $3,000 by 12/31/2026", now()).target_amount, Some(3_000.0));
    }

    #[test]
    fn test_defaults_and_rejection() {
        let prompt = parser().extract("Create a new account please", now());
        assert_eq!(prompt.name, None);

        let record = prompt.to_record(now()).unwrap();
        assert_eq!(record.name, format!("Account {}", now().timestamp_millis()));
        assert_eq!(record.starting_balance, 0.0);
        assert_eq!(record.goal, Goal::Default);

        let prompt = parser().extract("Create a new account with $1,000 at 150% interest", now());
        assert_eq!(prompt.to_record(now()).unwrap_err(), AccountError::InvalidInterestRate(1.5));
    }
}
