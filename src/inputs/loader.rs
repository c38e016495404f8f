//! Load scenarios from CSV
//!
//! Required columns: capex_per_mw, opex_per_mw, plant_size_mw, lifetime_years,
//! discount_rate_pct, electricity_cost_per_mwh, capacity_factor_pct,
//! efficiency_kwh_per_kg. Everything else is optional and falls back to the
//! defaults of [`IncentiveInputs`] and [`DEFAULT_SELLING_PRICE_PER_KG`].

use super::{IncentiveInputs, ProjectInputs, Scenario, DEFAULT_SELLING_PRICE_PER_KG};
use crate::error::LoadError;
use csv::Reader;
use std::path::Path;

/// Raw CSV row; empty optional cells deserialize to `None`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    name: Option<String>,
    capex_per_mw: f64,
    opex_per_mw: f64,
    plant_size_mw: f64,
    lifetime_years: u32,
    discount_rate_pct: f64,
    electricity_cost_per_mwh: f64,
    capacity_factor_pct: f64,
    efficiency_kwh_per_kg: f64,
    #[serde(default)]
    storage_cost_per_kg: Option<f64>,
    #[serde(default)]
    transport_cost_per_kg: Option<f64>,
    #[serde(default)]
    direct_credit_per_kg: Option<f64>,
    #[serde(default)]
    electricity_credit_per_mwh: Option<f64>,
    #[serde(default)]
    carbon_credit_per_ton: Option<f64>,
    #[serde(default)]
    co2_avoided_kg_per_kg: Option<f64>,
    #[serde(default)]
    selling_price_per_kg: Option<f64>,
}

impl CsvRow {
    fn into_scenario(self) -> Scenario {
        let incentive_defaults = IncentiveInputs::default();

        Scenario {
            name: self.name.filter(|n| !n.trim().is_empty()),
            project: ProjectInputs {
                capex_per_mw: self.capex_per_mw,
                opex_per_mw: self.opex_per_mw,
                plant_size_mw: self.plant_size_mw,
                lifetime_years: self.lifetime_years,
                discount_rate_pct: self.discount_rate_pct,
                electricity_cost_per_mwh: self.electricity_cost_per_mwh,
                capacity_factor_pct: self.capacity_factor_pct,
                efficiency_kwh_per_kg: self.efficiency_kwh_per_kg,
                storage_cost_per_kg: self.storage_cost_per_kg.unwrap_or(0.0),
                transport_cost_per_kg: self.transport_cost_per_kg.unwrap_or(0.0),
            },
            incentives: IncentiveInputs {
                direct_credit_per_kg: self
                    .direct_credit_per_kg
                    .unwrap_or(incentive_defaults.direct_credit_per_kg),
                electricity_credit_per_mwh: self
                    .electricity_credit_per_mwh
                    .unwrap_or(incentive_defaults.electricity_credit_per_mwh),
                carbon_credit_per_ton: self
                    .carbon_credit_per_ton
                    .unwrap_or(incentive_defaults.carbon_credit_per_ton),
                co2_avoided_kg_per_kg: self
                    .co2_avoided_kg_per_kg
                    .unwrap_or(incentive_defaults.co2_avoided_kg_per_kg),
            },
            selling_price_per_kg: self
                .selling_price_per_kg
                .unwrap_or(DEFAULT_SELLING_PRICE_PER_KG),
        }
    }
}

/// Load all scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<Scenario>, LoadError> {
    let reader = Reader::from_path(path)?;
    collect_scenarios(reader)
}

/// Load scenarios from any reader (e.g., string buffer, request body)
pub fn load_scenarios_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Scenario>, LoadError> {
    collect_scenarios(Reader::from_reader(reader))
}

fn collect_scenarios<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Scenario>, LoadError> {
    let mut scenarios = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        let scenario = row.into_scenario();
        scenario
            .validate()
            .map_err(|source| LoadError::InvalidRow { row: idx + 1, source })?;
        scenarios.push(scenario);
    }

    log::info!("Loaded {} scenarios", scenarios.len());
    Ok(scenarios)
}
