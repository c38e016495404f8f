//! Plant, incentive, and market input records

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, DomainError};

/// Hours in a (non-leap) operating year
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Default hydrogen selling price [$/kg]
pub const DEFAULT_SELLING_PRICE_PER_KG: f64 = 15.0;

/// Technical and financial description of an electrolysis plant
///
/// Percent-valued fields (`discount_rate_pct`, `capacity_factor_pct`) are kept
/// in percent as entered; use [`ProjectInputs::discount_rate`] and
/// [`ProjectInputs::capacity_factor`] for the fractional forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInputs {
    /// Capital cost [$/MW/yr]
    pub capex_per_mw: f64,

    /// Fixed operating cost [$/MW/yr]
    pub opex_per_mw: f64,

    /// Electrolyzer nameplate size [MW]
    pub plant_size_mw: f64,

    /// Plant lifetime [years]
    pub lifetime_years: u32,

    /// Discount rate [%]
    pub discount_rate_pct: f64,

    /// Electricity price [$/MWh]
    pub electricity_cost_per_mwh: f64,

    /// Capacity factor [%], 0-100
    pub capacity_factor_pct: f64,

    /// Specific electricity consumption [kWh/kg H2]
    pub efficiency_kwh_per_kg: f64,

    /// Storage cost [$/kg H2]
    #[serde(default)]
    pub storage_cost_per_kg: f64,

    /// Transport cost [$/kg H2]
    #[serde(default)]
    pub transport_cost_per_kg: f64,
}

impl Default for ProjectInputs {
    /// 10 MW reference plant
    fn default() -> Self {
        Self {
            capex_per_mw: 2_000_000.0,
            opex_per_mw: 90_000.0,
            plant_size_mw: 10.0,
            lifetime_years: 20,
            discount_rate_pct: 7.0,
            electricity_cost_per_mwh: 50.0,
            capacity_factor_pct: 50.0,
            efficiency_kwh_per_kg: 50.0,
            storage_cost_per_kg: 0.0,
            transport_cost_per_kg: 0.0,
        }
    }
}

impl ProjectInputs {
    /// Create and validate a plant description without storage or transport costs
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        capex_per_mw: f64,
        opex_per_mw: f64,
        plant_size_mw: f64,
        lifetime_years: u32,
        discount_rate_pct: f64,
        electricity_cost_per_mwh: f64,
        capacity_factor_pct: f64,
        efficiency_kwh_per_kg: f64,
    ) -> Result<Self, DomainError> {
        let inputs = Self {
            capex_per_mw,
            opex_per_mw,
            plant_size_mw,
            lifetime_years,
            discount_rate_pct,
            electricity_cost_per_mwh,
            capacity_factor_pct,
            efficiency_kwh_per_kg,
            storage_cost_per_kg: 0.0,
            transport_cost_per_kg: 0.0,
        };
        inputs.validate()?;
        Ok(inputs)
    }

    /// Add a per-kg storage cost
    pub fn with_storage_cost(mut self, cost_per_kg: f64) -> Self {
        self.storage_cost_per_kg = cost_per_kg;
        self
    }

    /// Add a per-kg transport cost
    pub fn with_transport_cost(mut self, cost_per_kg: f64) -> Self {
        self.transport_cost_per_kg = cost_per_kg;
        self
    }

    /// Check every field against its physical range
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_negative("capex_per_mw", self.capex_per_mw)?;
        require_non_negative("opex_per_mw", self.opex_per_mw)?;
        require_positive("plant_size_mw", self.plant_size_mw)?;
        if self.lifetime_years == 0 {
            return Err(DomainError::NonPositive {
                field: "lifetime_years",
                value: 0.0,
            });
        }
        require_non_negative("discount_rate_pct", self.discount_rate_pct)?;
        require_non_negative("electricity_cost_per_mwh", self.electricity_cost_per_mwh)?;
        require_positive("capacity_factor_pct", self.capacity_factor_pct)?;
        if self.capacity_factor_pct > 100.0 {
            return Err(DomainError::OutOfRange {
                field: "capacity_factor_pct",
                value: self.capacity_factor_pct,
                min: 0.0,
                max: 100.0,
            });
        }
        require_positive("efficiency_kwh_per_kg", self.efficiency_kwh_per_kg)?;
        require_non_negative("storage_cost_per_kg", self.storage_cost_per_kg)?;
        require_non_negative("transport_cost_per_kg", self.transport_cost_per_kg)?;
        Ok(())
    }

    /// Capacity factor as a fraction
    pub fn capacity_factor(&self) -> f64 {
        self.capacity_factor_pct / 100.0
    }

    /// Discount rate as a fraction
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate_pct / 100.0
    }

    /// Up-front investment [$] = capex per MW x plant size
    pub fn initial_investment(&self) -> f64 {
        self.capex_per_mw * self.plant_size_mw
    }
}

/// Incentive streams credited per kg of hydrogen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveInputs {
    /// Production credit paid per kg [$/kg]
    pub direct_credit_per_kg: f64,

    /// Credit paid per MWh of renewable electricity consumed [$/MWh]
    pub electricity_credit_per_mwh: f64,

    /// Carbon credit price [$/t CO2]
    pub carbon_credit_per_ton: f64,

    /// Emissions avoided [kg CO2 / kg H2]
    pub co2_avoided_kg_per_kg: f64,
}

impl Default for IncentiveInputs {
    fn default() -> Self {
        Self {
            direct_credit_per_kg: 3.0,
            electricity_credit_per_mwh: 20.0,
            carbon_credit_per_ton: 50.0,
            co2_avoided_kg_per_kg: 10.0,
        }
    }
}

impl IncentiveInputs {
    /// No incentives at all
    pub fn none() -> Self {
        Self {
            direct_credit_per_kg: 0.0,
            electricity_credit_per_mwh: 0.0,
            carbon_credit_per_ton: 0.0,
            co2_avoided_kg_per_kg: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_negative("direct_credit_per_kg", self.direct_credit_per_kg)?;
        require_non_negative("electricity_credit_per_mwh", self.electricity_credit_per_mwh)?;
        require_non_negative("carbon_credit_per_ton", self.carbon_credit_per_ton)?;
        require_non_negative("co2_avoided_kg_per_kg", self.co2_avoided_kg_per_kg)?;
        Ok(())
    }
}

/// One complete what-if: plant, incentives, and the price the hydrogen sells at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Optional label; not part of the evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub project: ProjectInputs,

    #[serde(default)]
    pub incentives: IncentiveInputs,

    /// Hydrogen selling price [$/kg]
    #[serde(default = "default_selling_price")]
    pub selling_price_per_kg: f64,
}

fn default_selling_price() -> f64 {
    DEFAULT_SELLING_PRICE_PER_KG
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: None,
            project: ProjectInputs::default(),
            incentives: IncentiveInputs::default(),
            selling_price_per_kg: DEFAULT_SELLING_PRICE_PER_KG,
        }
    }
}

impl Scenario {
    pub fn new(project: ProjectInputs, incentives: IncentiveInputs, selling_price_per_kg: f64) -> Self {
        Self {
            name: None,
            project,
            incentives,
            selling_price_per_kg,
        }
    }

    /// Attach a label
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.project.validate()?;
        self.incentives.validate()?;
        validate_selling_price(self.selling_price_per_kg)
    }
}

pub(crate) fn validate_selling_price(price: f64) -> Result<(), DomainError> {
    require_non_negative("selling_price_per_kg", price).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plant_is_valid() {
        assert!(ProjectInputs::default().validate().is_ok());
        assert!(IncentiveInputs::default().validate().is_ok());
        assert!(Scenario::default().validate().is_ok());
    }

    #[test]
    fn test_percent_conversions() {
        let inputs = ProjectInputs::default();
        assert!((inputs.capacity_factor() - 0.5).abs() < 1e-12);
        assert!((inputs.discount_rate() - 0.07).abs() < 1e-12);
        assert!((inputs.initial_investment() - 20_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let inputs = ProjectInputs {
            lifetime_years: 0,
            ..Default::default()
        };
        assert_eq!(inputs.validate().unwrap_err().field(), "lifetime_years");
    }

    #[test]
    fn test_capacity_factor_bounds() {
        let over = ProjectInputs {
            capacity_factor_pct: 100.5,
            ..Default::default()
        };
        assert!(matches!(
            over.validate(),
            Err(DomainError::OutOfRange { field: "capacity_factor_pct", .. })
        ));

        let zero = ProjectInputs {
            capacity_factor_pct: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(DomainError::NonPositive { field: "capacity_factor_pct", .. })
        ));

        let full = ProjectInputs {
            capacity_factor_pct: 100.0,
            ..Default::default()
        };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_negative_costs_rejected() {
        let inputs = ProjectInputs::default().with_storage_cost(-0.1);
        assert_eq!(inputs.validate().unwrap_err().field(), "storage_cost_per_kg");

        let incentives = IncentiveInputs {
            carbon_credit_per_ton: -5.0,
            ..Default::default()
        };
        assert_eq!(incentives.validate().unwrap_err().field(), "carbon_credit_per_ton");
    }

    #[test]
    fn test_constructor_validates() {
        let err = ProjectInputs::new(2e6, 9e4, 0.0, 20, 7.0, 50.0, 50.0, 50.0).unwrap_err();
        assert_eq!(err.field(), "plant_size_mw");
    }

    #[test]
    fn test_scenario_json_defaults() {
        let json = r#"{"project": {
            "capex_per_mw": 2000000, "opex_per_mw": 90000, "plant_size_mw": 10,
            "lifetime_years": 20, "discount_rate_pct": 7, "electricity_cost_per_mwh": 50,
            "capacity_factor_pct": 50, "efficiency_kwh_per_kg": 50
        }}"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario, Scenario::default());
    }
}
