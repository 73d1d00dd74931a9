//! Savings Projection - compound-interest projections for savings accounts
//!
//! This library provides:
//! - Month-by-month balance projections with monthly contributions
//! - Goal resolution (target amount, target date, default horizon)
//! - Time-to-goal search and required monthly contribution
//! - CSV account import and CSV export of summaries and projections
//! - Portfolio aggregation across many accounts

pub mod account;
pub mod error;
pub mod export;
pub mod format;
pub mod portfolio;
pub mod projection;
pub mod settings;

// Re-export commonly used types
pub use account::{Account, CompoundFrequency, Goal};
pub use error::{AccountError, ExportError, ImportError, SettingsError};
pub use portfolio::{PortfolioRunner, PortfolioSummary};
pub use projection::{GoalProjection, ProjectionConfig, ProjectionEngine, ProjectionPoint, ProjectionSeries};
pub use settings::Settings;
