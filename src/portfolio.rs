//! Batch projections across many accounts
//!
//! Projects every account with a shared engine in parallel, then aggregates
//! the results into per-account comparison rows, portfolio allocation shares
//! and a month-by-month combined timeline.

use chrono::{DateTime, Utc};
use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::account::Account;
use crate::projection::{month_date, GoalProjection, ProjectionEngine, ProjectionSeries};

/// Projection and goal outcome for one account in a batch
#[derive(Debug, Clone, Serialize)]
pub struct AccountProjection {
    pub account_id: String,
    pub name: String,
    pub series: ProjectionSeries,
    pub goal: GoalProjection,
}

/// One account's end-of-horizon position, for side-by-side comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub account_id: String,
    pub name: String,
    pub starting_balance: f64,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub interest_earned: f64,
    /// Fraction of the portfolio's final value held in this account
    pub share: f64,
}

/// Combined balance of all accounts at one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub month: u32,
    pub date: DateTime<Utc>,
    pub balance: f64,
    pub total_contributions: f64,
    pub interest_earned: f64,
}

/// Aggregate view of a batch of projections
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub months: u32,
    pub account_count: usize,
    pub total_value: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub accounts: Vec<ComparisonRow>,
    pub timeline: Vec<TimelineRow>,
}

/// Runs projections for a list of accounts with one shared engine
#[derive(Debug, Clone)]
pub struct PortfolioRunner {
    engine: ProjectionEngine,
}

impl PortfolioRunner {
    pub fn new(engine: ProjectionEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    /// Project every account over `months` and resolve its goal
    pub fn run(&self, accounts: &[Account], months: u32) -> Vec<AccountProjection> {
        accounts
            .par_iter()
            .map(|account| AccountProjection {
                account_id: account.id().to_string(),
                name: account.name().to_string(),
                series: self.engine.project(account, months),
                goal: self.engine.resolve_goal(account),
            })
            .collect()
    }

    /// Project over the engine's default horizon
    pub fn run_default(&self, accounts: &[Account]) -> Vec<AccountProjection> {
        self.run(accounts, self.engine.config().default_projection_months)
    }

    /// Project and aggregate in one call
    pub fn summarize(&self, accounts: &[Account], months: u32) -> PortfolioSummary {
        let projections = self.run(accounts, months);
        let summary = summarize(accounts, &projections, months, self.engine.reference_time());
        info!(
            "Portfolio of {} accounts worth {:.2} after {} months",
            summary.account_count, summary.total_value, months
        );
        summary
    }
}

/// Aggregate projections (in the same order as `accounts`) into a portfolio summary
pub fn summarize(
    accounts: &[Account],
    projections: &[AccountProjection],
    months: u32,
    reference: DateTime<Utc>,
) -> PortfolioSummary {
    let total_value: f64 = projections.iter().map(|p| p.series.final_balance()).sum();

    let rows: Vec<ComparisonRow> = accounts
        .iter()
        .zip(projections)
        .map(|(account, projection)| {
            let end = projection.series.summary();
            ComparisonRow {
                account_id: projection.account_id.clone(),
                name: projection.name.clone(),
                starting_balance: account.starting_balance(),
                final_balance: end.final_balance,
                total_contributions: end.total_contributions,
                interest_earned: end.interest_earned,
                share: if total_value > 0.0 { end.final_balance / total_value } else { 0.0 },
            }
        })
        .collect();

    PortfolioSummary {
        months,
        account_count: rows.len(),
        total_value,
        total_contributions: rows.iter().map(|r| r.total_contributions).sum(),
        total_interest: rows.iter().map(|r| r.interest_earned).sum(),
        timeline: combined_timeline(projections, months, reference),
        accounts: rows,
    }
}

fn combined_timeline(projections: &[AccountProjection], months: u32, reference: DateTime<Utc>) -> Vec<TimelineRow> {
    let mut timeline: Vec<TimelineRow> = (0..=months)
        .map(|month| TimelineRow {
            month,
            date: month_date(reference, month),
            balance: 0.0,
            total_contributions: 0.0,
            interest_earned: 0.0,
        })
        .collect();

    for projection in projections {
        for point in &projection.series.points {
            if let Some(row) = timeline.get_mut(point.month as usize) {
                row.balance += point.balance;
                row.total_contributions += point.total_contributions;
                row.interest_earned += point.interest_earned;
            }
        }
    }

    timeline
}
