//! Sensitivity sweeps
//!
//! Holds a base plant fixed, varies one quantity across a range, and
//! re-evaluates once per sample point. Three targets are supported:
//!
//! - [`SweepTarget::Lcoh`]: vary a plant input, report LCOH
//! - [`SweepTarget::Npv`]: vary a plant input, report NPV through the full pipeline
//! - [`SweepTarget::NpvAtSyntheticLcoh`]: what-if mode. The x values are
//!   unit costs substituted straight into the profit and NPV formulas; the
//!   plant's technical inputs only supply annual output and capex.
//!
//! Sample points are independent, so [`Sweep::run`] may evaluate them on the
//! rayon pool. Output order always follows sample order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::economics::{
    aggregate_incentives, annual_hydrogen_kg, calculate_lcoh, evaluate_financials,
    financials_at_unit_cost,
};
use crate::error::DomainError;
use crate::inputs::{validate_selling_price, IncentiveInputs, ProjectInputs, DEFAULT_SELLING_PRICE_PER_KG};

/// Plant input that a sweep can vary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAxis {
    ElectricityCost,
    CapacityFactor,
    Efficiency,
    DiscountRate,
    CapexPerMw,
    OpexPerMw,
    PlantSize,
    StorageCost,
    TransportCost,
}

impl InputAxis {
    pub const ALL: [InputAxis; 9] = [
        InputAxis::ElectricityCost,
        InputAxis::CapacityFactor,
        InputAxis::Efficiency,
        InputAxis::DiscountRate,
        InputAxis::CapexPerMw,
        InputAxis::OpexPerMw,
        InputAxis::PlantSize,
        InputAxis::StorageCost,
        InputAxis::TransportCost,
    ];

    /// Name of the [`ProjectInputs`] field this axis overrides
    pub fn field_name(&self) -> &'static str {
        match self {
            InputAxis::ElectricityCost => "electricity_cost_per_mwh",
            InputAxis::CapacityFactor => "capacity_factor_pct",
            InputAxis::Efficiency => "efficiency_kwh_per_kg",
            InputAxis::DiscountRate => "discount_rate_pct",
            InputAxis::CapexPerMw => "capex_per_mw",
            InputAxis::OpexPerMw => "opex_per_mw",
            InputAxis::PlantSize => "plant_size_mw",
            InputAxis::StorageCost => "storage_cost_per_kg",
            InputAxis::TransportCost => "transport_cost_per_kg",
        }
    }

    /// Copy of `base` with this axis set to `value`
    pub fn apply(&self, base: &ProjectInputs, value: f64) -> ProjectInputs {
        let mut inputs = base.clone();
        match self {
            InputAxis::ElectricityCost => inputs.electricity_cost_per_mwh = value,
            InputAxis::CapacityFactor => inputs.capacity_factor_pct = value,
            InputAxis::Efficiency => inputs.efficiency_kwh_per_kg = value,
            InputAxis::DiscountRate => inputs.discount_rate_pct = value,
            InputAxis::CapexPerMw => inputs.capex_per_mw = value,
            InputAxis::OpexPerMw => inputs.opex_per_mw = value,
            InputAxis::PlantSize => inputs.plant_size_mw = value,
            InputAxis::StorageCost => inputs.storage_cost_per_kg = value,
            InputAxis::TransportCost => inputs.transport_cost_per_kg = value,
        }
        inputs
    }

    fn cli_name(&self) -> &'static str {
        match self {
            InputAxis::ElectricityCost => "electricity-cost",
            InputAxis::CapacityFactor => "capacity-factor",
            InputAxis::Efficiency => "efficiency",
            InputAxis::DiscountRate => "discount-rate",
            InputAxis::CapexPerMw => "capex",
            InputAxis::OpexPerMw => "opex",
            InputAxis::PlantSize => "plant-size",
            InputAxis::StorageCost => "storage-cost",
            InputAxis::TransportCost => "transport-cost",
        }
    }
}

impl fmt::Display for InputAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for InputAxis {
    type Err = String;

    /// Accepts the kebab-case CLI name or the input field name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        InputAxis::ALL
            .iter()
            .find(|axis| axis.cli_name() == needle || axis.field_name() == needle)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = InputAxis::ALL.iter().map(|a| a.cli_name()).collect();
                format!("unknown axis '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Price and incentives held fixed during a financial sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTerms {
    #[serde(default)]
    pub incentives: IncentiveInputs,

    #[serde(default = "default_selling_price")]
    pub selling_price_per_kg: f64,
}

fn default_selling_price() -> f64 {
    DEFAULT_SELLING_PRICE_PER_KG
}

impl Default for MarketTerms {
    fn default() -> Self {
        Self {
            incentives: IncentiveInputs::default(),
            selling_price_per_kg: DEFAULT_SELLING_PRICE_PER_KG,
        }
    }
}

/// What a sweep varies and what it reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum SweepTarget {
    /// y = LCOH [$/kg] with `axis` overridden
    Lcoh { axis: InputAxis },

    /// y = NPV [$] through the full pipeline with `axis` overridden
    Npv { axis: InputAxis, market: MarketTerms },

    /// x = synthetic unit cost [$/kg], y = NPV [$]; LCOH is not re-derived
    NpvAtSyntheticLcoh { market: MarketTerms },
}

impl SweepTarget {
    pub fn x_label(&self) -> &'static str {
        match self {
            SweepTarget::Lcoh { axis } | SweepTarget::Npv { axis, .. } => axis.field_name(),
            SweepTarget::NpvAtSyntheticLcoh { .. } => "lcoh_per_kg",
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            SweepTarget::Lcoh { .. } => "lcoh_per_kg",
            SweepTarget::Npv { .. } | SweepTarget::NpvAtSyntheticLcoh { .. } => "npv",
        }
    }
}

/// Closed sample range; x values are evenly spaced and hit both ends exactly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub stop: f64,
    pub samples: usize,
}

impl SweepRange {
    pub fn new(start: f64, stop: f64, samples: usize) -> Self {
        Self { start, stop, samples }
    }

    fn validate(&self, max_samples: usize) -> Result<(), DomainError> {
        let invalid = DomainError::InvalidSweepRange {
            start: self.start,
            stop: self.stop,
        };
        if !(self.stop - self.start).is_finite() || self.start >= self.stop {
            return Err(invalid);
        }
        if self.samples < 2 {
            return Err(DomainError::TooFewSamples {
                requested: self.samples,
            });
        }
        if self.samples > max_samples {
            return Err(DomainError::TooManySamples {
                requested: self.samples,
                max: max_samples,
            });
        }
        // A span too narrow for the sample count would repeat x values
        let strictly_increasing = (1..self.samples).all(|i| self.x_at(i - 1) < self.x_at(i));
        if !strictly_increasing {
            return Err(invalid);
        }
        Ok(())
    }

    /// x value of sample `index`. Out-of-range indices clamp to `stop`.
    pub fn x_at(&self, index: usize) -> f64 {
        if index == 0 {
            return self.start;
        }
        let last = self.samples.saturating_sub(1);
        if index >= last {
            self.stop
        } else {
            self.start + (self.stop - self.start) * (index as f64 / last as f64)
        }
    }
}

/// One (x, y) pair. `y` is `None` when the reported metric is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub x: f64,
    pub y: Option<f64>,
}

/// Validates sweep requests against the engine limits
#[derive(Debug, Clone, Default)]
pub struct SensitivitySweepRunner {
    config: EngineConfig,
}

impl SensitivitySweepRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build a validated, re-runnable sweep
    pub fn sweep(
        &self,
        base: &ProjectInputs,
        target: SweepTarget,
        range: SweepRange,
    ) -> Result<Sweep, DomainError> {
        base.validate()?;
        range.validate(self.config.max_sweep_samples)?;

        let mode = match &target {
            SweepTarget::Lcoh { axis } => {
                check_axis_endpoints(base, *axis, &range)?;
                Mode::Lcoh { axis: *axis }
            }
            SweepTarget::Npv { axis, market } => {
                check_axis_endpoints(base, *axis, &range)?;
                market.incentives.validate()?;
                validate_selling_price(market.selling_price_per_kg)?;
                Mode::Npv {
                    axis: *axis,
                    market: market.clone(),
                }
            }
            SweepTarget::NpvAtSyntheticLcoh { market } => {
                if range.start < 0.0 {
                    return Err(DomainError::Negative {
                        field: "lcoh_per_kg",
                        value: range.start,
                    });
                }
                validate_selling_price(market.selling_price_per_kg)?;
                let incentives = aggregate_incentives(&market.incentives, base.efficiency_kwh_per_kg)?;
                Mode::SyntheticLcoh {
                    annual_h2_kg: annual_hydrogen_kg(base)?,
                    incentive_per_kg: incentives.total_per_kg,
                    selling_price_per_kg: market.selling_price_per_kg,
                }
            }
        };

        log::info!(
            "Sweep {} vs {} over [{}, {}] with {} samples",
            target.y_label(),
            target.x_label(),
            range.start,
            range.stop,
            range.samples
        );

        Ok(Sweep {
            base: base.clone(),
            target,
            range,
            mode,
            parallel_threshold: self.config.parallel_sweep_threshold,
        })
    }
}

/// Every sample on an axis sweep must be a valid plant. The constraints are
/// intervals, so checking both endpoints covers the whole range.
fn check_axis_endpoints(
    base: &ProjectInputs,
    axis: InputAxis,
    range: &SweepRange,
) -> Result<(), DomainError> {
    axis.apply(base, range.start).validate()?;
    axis.apply(base, range.stop).validate()
}

/// Resolved per-point evaluation strategy
#[derive(Debug, Clone)]
enum Mode {
    Lcoh {
        axis: InputAxis,
    },
    Npv {
        axis: InputAxis,
        market: MarketTerms,
    },
    SyntheticLcoh {
        annual_h2_kg: f64,
        incentive_per_kg: f64,
        selling_price_per_kg: f64,
    },
}

/// A validated sweep. Iterate it lazily with [`Sweep::points`] (as many times
/// as needed) or collect it with [`Sweep::run`].
#[derive(Debug, Clone)]
pub struct Sweep {
    base: ProjectInputs,
    target: SweepTarget,
    range: SweepRange,
    mode: Mode,
    parallel_threshold: usize,
}

impl Sweep {
    pub fn target(&self) -> &SweepTarget {
        &self.target
    }

    pub fn range(&self) -> &SweepRange {
        &self.range
    }

    pub fn len(&self) -> usize {
        self.range.samples
    }

    pub fn is_empty(&self) -> bool {
        self.range.samples == 0
    }

    /// Evaluate a single sample point
    pub fn evaluate_at(&self, index: usize) -> Result<SweepPoint, DomainError> {
        let x = self.range.x_at(index);

        let y = match &self.mode {
            Mode::Lcoh { axis } => {
                let inputs = axis.apply(&self.base, x);
                Some(calculate_lcoh(&inputs)?.lcoh_per_kg)
            }
            Mode::Npv { axis, market } => {
                let inputs = axis.apply(&self.base, x);
                let lcoh = calculate_lcoh(&inputs)?;
                let incentives =
                    aggregate_incentives(&market.incentives, inputs.efficiency_kwh_per_kg)?;
                evaluate_financials(&lcoh, &incentives, market.selling_price_per_kg, &inputs)?
                    .npv
                    .value()
            }
            Mode::SyntheticLcoh {
                annual_h2_kg,
                incentive_per_kg,
                selling_price_per_kg,
            } => financials_at_unit_cost(
                x,
                *annual_h2_kg,
                *incentive_per_kg,
                *selling_price_per_kg,
                &self.base,
            )?
            .npv
            .value(),
        };

        Ok(SweepPoint { x, y })
    }

    /// Lazy iterator over the sample points, in order
    pub fn points(&self) -> SweepPoints<'_> {
        SweepPoints {
            sweep: self,
            next: 0,
        }
    }

    /// Evaluate every sample point, in parallel for large sweeps
    pub fn run(&self) -> Result<Vec<SweepPoint>, DomainError> {
        let points = if self.range.samples >= self.parallel_threshold {
            log::debug!("Evaluating {} sweep points in parallel", self.range.samples);
            (0..self.range.samples)
                .into_par_iter()
                .map(|i| self.evaluate_at(i))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.points().collect::<Result<Vec<_>, _>>()?
        };

        log::info!("Sweep complete: {} points", points.len());
        Ok(points)
    }

    /// Write points as CSV with axis-named headers; undefined y values are left empty
    pub fn write_csv<W: std::io::Write>(&self, points: &[SweepPoint], writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([self.target.x_label(), self.target.y_label()])?;
        for point in points {
            let y = point.y.map(|v| v.to_string()).unwrap_or_default();
            csv_writer.write_record([point.x.to_string(), y])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Iterator returned by [`Sweep::points`]
#[derive(Debug, Clone)]
pub struct SweepPoints<'a> {
    sweep: &'a Sweep,
    next: usize,
}

impl Iterator for SweepPoints<'_> {
    type Item = Result<SweepPoint, DomainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.sweep.range.samples {
            return None;
        }
        let point = self.sweep.evaluate_at(self.next);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sweep.range.samples.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepPoints<'_> {}
