//! Projection engine for savings accounts

pub mod growth;
mod series;
mod goal;
mod engine;

pub use growth::{compound_interest, future_value_with_contributions, required_monthly_contribution};
pub use series::{month_date, project_account, ProjectionPoint, ProjectionSeries, ProjectionSummary};
pub use goal::{
    months_until, resolve_goal, time_to_reach_amount, GoalProjection, MAX_SEARCH_MONTHS, SEARCH_PRECISION,
};
pub use engine::{ProjectionConfig, ProjectionEngine, DEFAULT_PROJECTION_MONTHS};
