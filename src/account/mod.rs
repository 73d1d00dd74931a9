//! Account records, validation rules, CSV import and free-text requests

mod data;
pub mod loader;
pub mod prompt;
pub mod validation;

pub use data::{Account, AccountRecord, CompoundFrequency, Goal, MAX_INTEREST_RATE};
pub use loader::{load_accounts, load_accounts_from_reader, ImportIssue, ImportResult, ImportStats, Severity};
pub use prompt::{AccountPrompt, ParsedMessage, PromptParser};
pub use validation::validate_account;
