//! Investment metrics: annual profit, NPV, payback period, ROI
//!
//! Payback and ROI have no value for a plant that does not make money; they
//! come back as [`Metric::Undefined`] rather than as an error or a sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::annuity::present_value_annuity_factor;
use super::incentives::IncentiveResult;
use super::lcoh::LcohResult;
use super::round_to;
use crate::error::{require_finite, require_non_negative, require_positive, DomainError};
use crate::inputs::{validate_selling_price, ProjectInputs};

/// Why a metric has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedMetric {
    /// Annual profit is zero or negative
    NonPositiveProfit,
    /// Nothing was invested, so a return ratio is meaningless
    ZeroInvestment,
    /// The annuity factor overflowed
    DegenerateAnnuity,
}

impl fmt::Display for UndefinedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UndefinedMetric::NonPositiveProfit => "annual profit is not positive",
            UndefinedMetric::ZeroInvestment => "initial investment is zero",
            UndefinedMetric::DegenerateAnnuity => "annuity factor is not finite",
        };
        f.write_str(text)
    }
}

/// A metric value, or the reason it does not exist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Defined(f64),
    Undefined(UndefinedMetric),
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(*v),
            Metric::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined(_))
    }

    fn rounded(&self, decimals: u32) -> Self {
        match self {
            Metric::Defined(v) => Metric::Defined(round_to(*v, decimals)),
            undefined => *undefined,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Defined(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            Metric::Undefined(_) => f.write_str("N/A"),
        }
    }
}

/// Profitability of a plant at a given selling price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    /// Hydrogen selling price [$/kg]
    pub selling_price_per_kg: f64,

    /// Incentive credit added to the price [$/kg]
    pub incentive_per_kg: f64,

    /// Unit production cost used for the annual cost [$/kg]
    pub unit_cost_per_kg: f64,

    /// (price + incentive) x annual output [$/yr]
    pub annual_revenue: f64,

    /// unit cost x annual output [$/yr]
    pub annual_cost: f64,

    /// revenue - cost [$/yr]; may be negative
    pub annual_profit: f64,

    /// capex per MW x plant size [$]
    pub initial_investment: f64,

    /// Net present value over the plant lifetime [$]
    pub npv: Metric,

    /// Years until cumulative profit repays the investment
    pub payback_years: Metric,

    /// Annual profit as a percentage of investment [%]
    pub roi_pct: Metric,
}

impl FinancialMetrics {
    /// Display copy with currency and defined metrics rounded to `decimals`
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            selling_price_per_kg: round_to(self.selling_price_per_kg, decimals),
            incentive_per_kg: round_to(self.incentive_per_kg, decimals),
            unit_cost_per_kg: round_to(self.unit_cost_per_kg, decimals),
            annual_revenue: round_to(self.annual_revenue, decimals),
            annual_cost: round_to(self.annual_cost, decimals),
            annual_profit: round_to(self.annual_profit, decimals),
            initial_investment: round_to(self.initial_investment, decimals),
            npv: self.npv.rounded(decimals),
            payback_years: self.payback_years.rounded(decimals),
            roi_pct: self.roi_pct.rounded(decimals),
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.annual_profit > 0.0
    }
}

/// Metrics for a plant whose costs come from [`calculate_lcoh`](super::calculate_lcoh)
pub fn evaluate_financials(
    lcoh: &LcohResult,
    incentives: &IncentiveResult,
    selling_price_per_kg: f64,
    inputs: &ProjectInputs,
) -> Result<FinancialMetrics, DomainError> {
    financials_at_unit_cost(
        lcoh.lcoh_per_kg,
        lcoh.annual_h2_kg,
        incentives.total_per_kg,
        selling_price_per_kg,
        inputs,
    )
}

/// Metrics for an explicitly supplied unit cost.
///
/// `unit_cost_per_kg` is taken as given; nothing is re-derived from the
/// plant's technical inputs. `inputs` only supplies capex, size, discount
/// rate, and lifetime.
pub fn financials_at_unit_cost(
    unit_cost_per_kg: f64,
    annual_h2_kg: f64,
    incentive_per_kg: f64,
    selling_price_per_kg: f64,
    inputs: &ProjectInputs,
) -> Result<FinancialMetrics, DomainError> {
    require_non_negative("lcoh_per_kg", unit_cost_per_kg)?;
    require_positive("annual_h2_kg", annual_h2_kg)?;
    require_non_negative("incentive_per_kg", incentive_per_kg)?;
    validate_selling_price(selling_price_per_kg)?;
    inputs.validate()?;

    let annual_revenue = require_finite(
        "annual_revenue",
        (selling_price_per_kg + incentive_per_kg) * annual_h2_kg,
    )?;
    let annual_cost = require_finite("annual_cost", unit_cost_per_kg * annual_h2_kg)?;
    // Both terms are finite and non-negative, so the difference is finite
    let annual_profit = annual_revenue - annual_cost;
    let initial_investment = require_finite("initial_investment", inputs.initial_investment())?;

    let npv = net_present_value(
        annual_profit,
        initial_investment,
        inputs.discount_rate(),
        inputs.lifetime_years,
    )?;

    let (payback_years, roi_pct) = if annual_profit > 0.0 {
        let roi = if initial_investment > 0.0 {
            Metric::Defined(annual_profit / initial_investment * 100.0)
        } else {
            Metric::Undefined(UndefinedMetric::ZeroInvestment)
        };
        (Metric::Defined(initial_investment / annual_profit), roi)
    } else {
        (
            Metric::Undefined(UndefinedMetric::NonPositiveProfit),
            Metric::Undefined(UndefinedMetric::NonPositiveProfit),
        )
    };

    log::debug!(
        "Financials: unit_cost={:.4} profit={:.2} npv={:?}",
        unit_cost_per_kg,
        annual_profit,
        npv
    );

    Ok(FinancialMetrics {
        selling_price_per_kg,
        incentive_per_kg,
        unit_cost_per_kg,
        annual_revenue,
        annual_cost,
        annual_profit,
        initial_investment,
        npv,
        payback_years,
        roi_pct,
    })
}

/// NPV of a level annual profit, less the up-front investment.
///
/// With a zero rate this is exactly `profit x lifetime - investment`.
pub fn net_present_value(
    annual_profit: f64,
    initial_investment: f64,
    rate: f64,
    lifetime_years: u32,
) -> Result<Metric, DomainError> {
    let factor = present_value_annuity_factor(rate, lifetime_years)?;
    let npv = annual_profit * factor - initial_investment;
    if !factor.is_finite() || !npv.is_finite() {
        return Ok(Metric::Undefined(UndefinedMetric::DegenerateAnnuity));
    }
    Ok(Metric::Defined(npv))
}
