//! Closed-form growth formulas
//!
//! All functions are total over non-negative inputs and never fail. Rates are
//! annual nominal decimals; the contribution annuity always uses a monthly
//! rate of `annual_rate / 12` regardless of the compounding schedule.

/// Months per year, used to convert month counts into year fractions
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Compound a principal: `P × (1 + r/n)^(n × t)`
///
/// # Arguments
/// * `principal` - Amount at time zero
/// * `annual_rate` - Annual nominal rate as a decimal (0.05 for 5%)
/// * `periods_per_year` - Compounding periods per year (1, 12 or 365)
/// * `years` - Elapsed time in (possibly fractional) years
pub fn compound_interest(principal: f64, annual_rate: f64, periods_per_year: u32, years: f64) -> f64 {
    let n = periods_per_year as f64;
    principal * (1.0 + annual_rate / n).powf(n * years)
}

/// Future value of a principal plus an ordinary annuity of monthly contributions
///
/// The annuity term is `c × ((1 + r)^m − 1) / r` with `r = annual_rate / 12`
/// and `m = years × 12`, evaluated for continuous `m`. When the contribution
/// or the monthly rate is zero the annuity term is dropped entirely.
///
/// This is the objective used by the time-to-goal search. It does not match
/// the month-by-month series in [`super::series`] exactly: the series adds
/// each contribution to principal and compounds the total from month zero.
pub fn future_value_with_contributions(
    principal: f64,
    annual_rate: f64,
    periods_per_year: u32,
    years: f64,
    monthly_contribution: f64,
) -> f64 {
    let principal_fv = compound_interest(principal, annual_rate, periods_per_year, years);

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    let total_months = years * MONTHS_PER_YEAR;

    if monthly_contribution == 0.0 || monthly_rate == 0.0 {
        return principal_fv;
    }

    let annuity_fv = monthly_contribution * ((1.0 + monthly_rate).powf(total_months) - 1.0) / monthly_rate;

    principal_fv + annuity_fv
}

/// Monthly contribution needed to grow `principal` to `target_amount` in `months`
///
/// Inverts the annuity term of [`future_value_with_contributions`]. Returns 0
/// when compounded principal alone already reaches the target. With a zero
/// monthly rate the shortfall is split evenly across the months. A zero
/// horizon with a shortfall returns the whole shortfall as a single payment.
pub fn required_monthly_contribution(
    principal: f64,
    target_amount: f64,
    annual_rate: f64,
    periods_per_year: u32,
    months: u32,
) -> f64 {
    let years = months as f64 / MONTHS_PER_YEAR;
    let principal_fv = compound_interest(principal, annual_rate, periods_per_year, years);
    let shortfall = target_amount - principal_fv;

    if shortfall <= 0.0 {
        return 0.0;
    }
    if months == 0 {
        return shortfall;
    }

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;

    if monthly_rate == 0.0 {
        return shortfall / months as f64;
    }

    shortfall * monthly_rate / ((1.0 + monthly_rate).powi(months as i32) - 1.0)
}
