//! Project economics engine
//!
//! Data flows one way:
//! 1. [`calculate_lcoh`] turns plant inputs into annual output and a cost breakdown
//! 2. [`aggregate_incentives`] turns incentive rates into a per-kg credit
//! 3. [`evaluate_financials`] combines both with a selling price into NPV, payback and ROI
//!
//! Every function is pure; results are full precision and only rounded on request.

mod annuity;
mod incentives;
mod lcoh;
mod metrics;

pub use annuity::{capital_recovery_factor, present_value_annuity_factor};
pub use incentives::{aggregate_incentives, IncentiveResult};
pub use lcoh::{annual_hydrogen_kg, calculate_lcoh, CostBreakdown, LcohResult};
pub use metrics::{
    evaluate_financials, financials_at_unit_cost, net_present_value, FinancialMetrics, Metric,
    UndefinedMetric,
};

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
