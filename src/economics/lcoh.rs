//! Levelized cost of hydrogen
//!
//! Annual output:  H = CF x 8760 x MW x 1000 / (kWh/kg)
//! Annual cost:    capex x MW x CRF + opex x MW + ($/MWh / 1000) x (kWh/kg) x H
//!                 + (storage + transport) x H
//! LCOH:           annual cost / H

use serde::{Deserialize, Serialize};

use super::annuity::capital_recovery_factor;
use super::round_to;
use crate::error::{require_finite, DomainError};
use crate::inputs::{ProjectInputs, HOURS_PER_YEAR};

const KWH_PER_MWH: f64 = 1000.0;

/// Cost components, either per kg [$/kg] or per year [$/yr]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub capital: f64,
    pub operating: f64,
    pub electricity: f64,
    pub storage: f64,
    pub transport: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.capital + self.operating + self.electricity + self.storage + self.transport
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            capital: f(self.capital),
            operating: f(self.operating),
            electricity: f(self.electricity),
            storage: f(self.storage),
            transport: f(self.transport),
        }
    }
}

/// Output of [`calculate_lcoh`]
///
/// All values are full precision; call [`LcohResult::rounded`] for a display copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcohResult {
    /// Levelized cost [$/kg]
    pub lcoh_per_kg: f64,

    /// Per-kg cost components; they sum to `lcoh_per_kg`
    pub per_kg: CostBreakdown,

    /// Annual cost components [$/yr]
    pub annual_costs: CostBreakdown,

    /// Hydrogen produced per year [kg/yr]
    pub annual_h2_kg: f64,

    /// Capital recovery factor used for the capital component
    pub crf: f64,
}

impl LcohResult {
    /// Annual output in whole kilograms (truncated), as reported to users
    pub fn annual_h2_kg_whole(&self) -> u64 {
        self.annual_h2_kg.trunc() as u64
    }

    /// Total annual cost [$/yr]
    pub fn total_annual_cost(&self) -> f64 {
        self.annual_costs.total()
    }

    /// Display copy: currency rounded to `decimals`, CRF to `crf_decimals`,
    /// annual output truncated to whole kilograms.
    ///
    /// Never feed the rounded copy back into metrics or sweeps.
    pub fn rounded(&self, decimals: u32, crf_decimals: u32) -> Self {
        Self {
            lcoh_per_kg: round_to(self.lcoh_per_kg, decimals),
            per_kg: self.per_kg.map(|v| round_to(v, decimals)),
            annual_costs: self.annual_costs.map(|v| round_to(v, decimals)),
            annual_h2_kg: self.annual_h2_kg.trunc(),
            crf: round_to(self.crf, crf_decimals),
        }
    }
}

/// Annual hydrogen production [kg/yr]
pub fn annual_hydrogen_kg(inputs: &ProjectInputs) -> Result<f64, DomainError> {
    inputs.validate()?;
    let annual_h2_kg = inputs.capacity_factor() * HOURS_PER_YEAR * inputs.plant_size_mw
        * KWH_PER_MWH
        / inputs.efficiency_kwh_per_kg;
    require_finite("annual_h2_kg", annual_h2_kg)
}

/// Convert plant inputs into annual output and a levelized cost breakdown
pub fn calculate_lcoh(inputs: &ProjectInputs) -> Result<LcohResult, DomainError> {
    let annual_h2_kg = annual_hydrogen_kg(inputs)?;
    let crf = capital_recovery_factor(inputs.discount_rate(), inputs.lifetime_years)?;

    let annual_costs = CostBreakdown {
        capital: inputs.capex_per_mw * inputs.plant_size_mw * crf,
        operating: inputs.opex_per_mw * inputs.plant_size_mw,
        electricity: (inputs.electricity_cost_per_mwh / KWH_PER_MWH)
            * inputs.efficiency_kwh_per_kg
            * annual_h2_kg,
        storage: inputs.storage_cost_per_kg * annual_h2_kg,
        transport: inputs.transport_cost_per_kg * annual_h2_kg,
    };

    let per_kg = CostBreakdown {
        capital: annual_costs.capital / annual_h2_kg,
        operating: annual_costs.operating / annual_h2_kg,
        electricity: annual_costs.electricity / annual_h2_kg,
        storage: inputs.storage_cost_per_kg,
        transport: inputs.transport_cost_per_kg,
    };

    // Costs are non-negative, so a finite total bounds every component
    let lcoh_per_kg = require_finite("lcoh_per_kg", annual_costs.total() / annual_h2_kg)?;

    log::debug!(
        "LCOH: crf={:.6} annual_h2_kg={:.1} lcoh={:.4} $/kg",
        crf,
        annual_h2_kg,
        lcoh_per_kg
    );

    Ok(LcohResult {
        lcoh_per_kg,
        per_kg,
        annual_costs,
        annual_h2_kg,
        crf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_plant() {
        let result = calculate_lcoh(&ProjectInputs::default()).unwrap();

        assert_relative_eq!(result.annual_h2_kg, 876_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.crf, 0.094_392_925_743, max_relative = 1e-10);

        // Independent recomputation of the formula chain
        let crf = 0.07 * 1.07_f64.powi(20) / (1.07_f64.powi(20) - 1.0);
        let expected_capital = 2_000_000.0 * 10.0 * crf / 876_000.0;
        let expected_operating = 90_000.0 * 10.0 / 876_000.0;
        let expected_electricity = 50.0 / 1000.0 * 50.0;

        assert_relative_eq!(result.per_kg.capital, expected_capital, max_relative = 1e-9);
        assert_relative_eq!(result.per_kg.operating, expected_operating, max_relative = 1e-12);
        assert_relative_eq!(result.per_kg.electricity, expected_electricity, max_relative = 1e-12);
        assert_relative_eq!(
            result.lcoh_per_kg,
            expected_capital + expected_operating + expected_electricity,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_breakdown_sums_to_lcoh() {
        let inputs = ProjectInputs {
            electricity_cost_per_mwh: 37.5,
            capacity_factor_pct: 83.0,
            ..Default::default()
        }
        .with_storage_cost(0.8)
        .with_transport_cost(1.15);

        let result = calculate_lcoh(&inputs).unwrap();
        assert_relative_eq!(result.per_kg.total(), result.lcoh_per_kg, max_relative = 1e-9);
        assert_eq!(result.per_kg.storage, 0.8);
        assert_eq!(result.per_kg.transport, 1.15);
    }

    #[test]
    fn test_zero_discount_rate_uses_straight_line() {
        let inputs = ProjectInputs {
            discount_rate_pct: 0.0,
            ..Default::default()
        };
        let result = calculate_lcoh(&inputs).unwrap();
        assert_eq!(result.crf, 1.0 / 20.0);
        assert_relative_eq!(
            result.annual_costs.capital,
            2_000_000.0 * 10.0 / 20.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_rounded_copy() {
        let result = calculate_lcoh(&ProjectInputs::default()).unwrap();
        let display = result.rounded(2, 6);

        assert_eq!(display.lcoh_per_kg, 5.68);
        assert_eq!(display.per_kg.capital, 2.16);
        assert_eq!(display.per_kg.operating, 1.03);
        assert_eq!(display.per_kg.electricity, 2.5);
        assert_eq!(display.crf, 0.094393);
        assert_eq!(result.annual_h2_kg_whole(), 876_000);

        // The original keeps full precision
        assert!(result.lcoh_per_kg != display.lcoh_per_kg);
    }

    #[test]
    fn test_zero_efficiency_is_domain_error() {
        let inputs = ProjectInputs {
            efficiency_kwh_per_kg: 0.0,
            ..Default::default()
        };
        let err = calculate_lcoh(&inputs).unwrap_err();
        assert_eq!(err.field(), "efficiency_kwh_per_kg");
    }

    #[test]
    fn test_zero_capacity_factor_is_domain_error() {
        let inputs = ProjectInputs {
            capacity_factor_pct: 0.0,
            ..Default::default()
        };
        assert_eq!(
            annual_hydrogen_kg(&inputs).unwrap_err().field(),
            "capacity_factor_pct"
        );
    }

    #[test]
    fn test_long_lifetime_at_high_rate_is_defined() {
        let inputs = ProjectInputs {
            discount_rate_pct: 100.0,
            lifetime_years: 1100,
            ..Default::default()
        };
        let result = calculate_lcoh(&inputs).unwrap();

        assert_eq!(result.crf, 1.0);
        assert!(result.lcoh_per_kg.is_finite());
        assert_relative_eq!(result.per_kg.total(), result.lcoh_per_kg, max_relative = 1e-12);
    }

    #[test]
    fn test_overflowing_cost_is_domain_error() {
        let inputs = ProjectInputs {
            electricity_cost_per_mwh: 1e308,
            ..Default::default()
        };
        let err = calculate_lcoh(&inputs).unwrap_err();
        assert!(matches!(err, DomainError::NonFinite { field: "lcoh_per_kg", .. }));
    }

    #[test]
    fn test_overflowing_output_is_domain_error() {
        let inputs = ProjectInputs {
            plant_size_mw: 1e306,
            ..Default::default()
        };
        assert_eq!(annual_hydrogen_kg(&inputs).unwrap_err().field(), "annual_h2_kg");
    }
}
