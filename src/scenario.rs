//! Scenario runner: full pipeline from plant inputs to investment metrics
//!
//! Holds the engine configuration once, then evaluates any number of scenarios
//! against it, one at a time or as a parallel batch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::economics::{
    aggregate_incentives, calculate_lcoh, evaluate_financials, FinancialMetrics, IncentiveResult,
    LcohResult,
};
use crate::error::DomainError;
use crate::inputs::Scenario;

/// Everything computed for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub lcoh: LcohResult,
    pub incentives: IncentiveResult,
    pub metrics: FinancialMetrics,
}

impl Evaluation {
    /// Display copy rounded per `config`
    pub fn rounded(&self, config: &EngineConfig) -> Self {
        Self {
            lcoh: self.lcoh.rounded(config.display_decimals, config.crf_decimals),
            incentives: self.incentives.rounded(config.display_decimals),
            metrics: self.metrics.rounded(config.display_decimals),
        }
    }
}

/// Evaluates scenarios under a shared configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
///
/// for price in [6.0, 9.0, 12.0] {
///     let scenario = Scenario { selling_price_per_kg: price, ..Default::default() };
///     let evaluation = runner.evaluate(&scenario)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: EngineConfig,
}

impl ScenarioRunner {
    /// Create runner with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Create runner with configuration read from the environment
    pub fn from_env() -> Self {
        Self {
            config: EngineConfig::from_env(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// LCOH, then incentives, then financial metrics
    pub fn evaluate(&self, scenario: &Scenario) -> Result<Evaluation, DomainError> {
        scenario.validate()?;

        let project = &scenario.project;
        let lcoh = calculate_lcoh(project)?;
        let incentives = aggregate_incentives(&scenario.incentives, project.efficiency_kwh_per_kg)?;
        let metrics = evaluate_financials(&lcoh, &incentives, scenario.selling_price_per_kg, project)?;

        Ok(Evaluation {
            lcoh,
            incentives,
            metrics,
        })
    }

    /// Evaluate many scenarios in parallel.
    /// Output order matches input order; one invalid scenario does not stop the rest.
    pub fn run_batch(&self, scenarios: &[Scenario]) -> Vec<Result<Evaluation, DomainError>> {
        log::info!("Evaluating batch of {} scenarios", scenarios.len());

        let results: Vec<_> = scenarios.par_iter().map(|s| self.evaluate(s)).collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            log::warn!("{} of {} scenarios failed validation", failed, scenarios.len());
        }
        results
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{IncentiveInputs, ProjectInputs};

    #[test]
    fn test_evaluate_reference_scenario() {
        let runner = ScenarioRunner::new();
        let evaluation = runner.evaluate(&Scenario::default()).unwrap();

        assert!((evaluation.incentives.total_per_kg - 4.5).abs() < 1e-12);
        assert!(evaluation.metrics.is_profitable());
        assert_eq!(evaluation.metrics.unit_cost_per_kg, evaluation.lcoh.lcoh_per_kg);
    }

    #[test]
    fn test_batch_preserves_order_and_isolates_failures() {
        let runner = ScenarioRunner::new();

        let scenarios: Vec<Scenario> = [20.0, 50.0, -1.0, 80.0]
            .iter()
            .map(|&price| Scenario {
                project: ProjectInputs {
                    electricity_cost_per_mwh: price,
                    ..Default::default()
                },
                incentives: IncentiveInputs::none(),
                ..Default::default()
            })
            .collect();

        let results = runner.run_batch(&scenarios);
        assert_eq!(results.len(), 4);
        assert!(results[2].is_err());

        // Higher electricity price should result in higher LCOH
        let lcoh: Vec<f64> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|e| e.lcoh.lcoh_per_kg)
            .collect();
        assert!(lcoh[0] < lcoh[1] && lcoh[1] < lcoh[2]);
    }

    #[test]
    fn test_rounded_evaluation() {
        let runner = ScenarioRunner::new();
        let evaluation = runner.evaluate(&Scenario::default()).unwrap();
        let display = evaluation.rounded(runner.config());
        assert_eq!(display.lcoh.lcoh_per_kg, 5.68);
        assert_eq!(display.incentives.total_per_kg, 4.5);
    }
}
