//! Hydrogen Economics - project economics engine for electrolytic hydrogen plants
//!
//! This library provides:
//! - Levelized cost of hydrogen (LCOH) with a per-kg cost breakdown
//! - Aggregation of production, electricity-linked and carbon incentives
//! - Investment metrics (annual profit, NPV, payback, ROI) with explicit undefined states
//! - Sensitivity sweeps over plant inputs, including a synthetic-LCOH what-if mode
//! - Batch scenario evaluation, CSV scenario loading and memoized evaluation

pub mod cache;
pub mod config;
pub mod economics;
pub mod error;
pub mod inputs;
pub mod scenario;
pub mod summary;
pub mod sweep;

// Re-export commonly used types
pub use cache::EvaluationCache;
pub use config::EngineConfig;
pub use economics::{FinancialMetrics, IncentiveResult, LcohResult, Metric, UndefinedMetric};
pub use error::{DomainError, LoadError};
pub use inputs::{IncentiveInputs, ProjectInputs, Scenario};
pub use scenario::{Evaluation, ScenarioRunner};
pub use sweep::{InputAxis, MarketTerms, SensitivitySweepRunner, SweepPoint, SweepRange, SweepTarget};
