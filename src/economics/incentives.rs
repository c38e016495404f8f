//! Incentive aggregation
//!
//! total [$/kg] = direct + electricity_rate x (kWh/kg) / 1000 + carbon_rate x (kg CO2/kg) / 1000

use serde::{Deserialize, Serialize};

use super::round_to;
use crate::error::{require_positive, DomainError};
use crate::inputs::IncentiveInputs;

/// Incentive value per kg of hydrogen, by stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncentiveResult {
    /// Direct production credit [$/kg]
    pub direct_per_kg: f64,

    /// Electricity-linked credit converted to [$/kg]
    pub electricity_per_kg: f64,

    /// Carbon credit converted to [$/kg]
    pub carbon_per_kg: f64,

    /// Sum of the three streams [$/kg]
    pub total_per_kg: f64,
}

impl IncentiveResult {
    /// No credit
    pub fn zero() -> Self {
        Self {
            direct_per_kg: 0.0,
            electricity_per_kg: 0.0,
            carbon_per_kg: 0.0,
            total_per_kg: 0.0,
        }
    }

    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            direct_per_kg: round_to(self.direct_per_kg, decimals),
            electricity_per_kg: round_to(self.electricity_per_kg, decimals),
            carbon_per_kg: round_to(self.carbon_per_kg, decimals),
            total_per_kg: round_to(self.total_per_kg, decimals),
        }
    }
}

/// Combine the incentive streams into one per-kg credit.
///
/// `efficiency_kwh_per_kg` converts the per-MWh credit into a per-kg value.
pub fn aggregate_incentives(
    incentives: &IncentiveInputs,
    efficiency_kwh_per_kg: f64,
) -> Result<IncentiveResult, DomainError> {
    incentives.validate()?;
    require_positive("efficiency_kwh_per_kg", efficiency_kwh_per_kg)?;

    let direct_per_kg = incentives.direct_credit_per_kg;
    let electricity_per_kg = incentives.electricity_credit_per_mwh * efficiency_kwh_per_kg / 1000.0;
    let carbon_per_kg = incentives.carbon_credit_per_ton * incentives.co2_avoided_kg_per_kg / 1000.0;

    Ok(IncentiveResult {
        direct_per_kg,
        electricity_per_kg,
        carbon_per_kg,
        total_per_kg: direct_per_kg + electricity_per_kg + carbon_per_kg,
    })
}
