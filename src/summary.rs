//! Narrative summaries of an evaluation
//!
//! The engine renders a plain-text [`ProjectDigest`]; turning it into prose is
//! left to a [`NarrativeSummarizer`], which may be a remote text service.
//! Summaries are best effort: a failing summarizer is logged and reported as
//! [`SummaryOutcome::Unavailable`], and never touches the numbers it describes.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::economics::{round_to, Metric};
use crate::inputs::Scenario;
use crate::scenario::Evaluation;

/// Failure reported by a summarizer
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary service unavailable: {0}")]
    Unavailable(String),

    #[error("summary request rejected: {0}")]
    Rejected(String),

    #[error("summary service returned an empty narrative")]
    Empty,
}

/// Key figures of one evaluation, ready to hand to a summarizer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDigest {
    pub lcoh_per_kg: f64,
    pub plant_size_mw: f64,
    pub electricity_cost_per_mwh: f64,
    pub incentive_per_kg: f64,
    pub npv: Metric,
    pub roi_pct: Metric,
    pub payback_years: Metric,
}

impl ProjectDigest {
    pub fn from_evaluation(scenario: &Scenario, evaluation: &Evaluation) -> Self {
        Self {
            lcoh_per_kg: evaluation.lcoh.lcoh_per_kg,
            plant_size_mw: scenario.project.plant_size_mw,
            electricity_cost_per_mwh: scenario.project.electricity_cost_per_mwh,
            incentive_per_kg: evaluation.incentives.total_per_kg,
            npv: evaluation.metrics.npv,
            roi_pct: evaluation.metrics.roi_pct,
            payback_years: evaluation.metrics.payback_years,
        }
    }
}

impl fmt::Display for ProjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hydrogen project:")?;
        writeln!(f, "- LCOH: ${:.2}/kg", self.lcoh_per_kg)?;
        writeln!(f, "- Plant size: {} MW", self.plant_size_mw)?;
        writeln!(f, "- Electricity cost: ${}/MWh", self.electricity_cost_per_mwh)?;
        writeln!(f, "- Incentives: ${:.2}/kg", self.incentive_per_kg)?;
        writeln!(f, "- NPV: {:.2}", self.npv)?;
        writeln!(f, "- ROI: {:.2}%", self.roi_pct)?;
        write!(f, "- Payback period: {:.2} years", self.payback_years)
    }
}

/// Turns a digest into a short narrative
pub trait NarrativeSummarizer: Send + Sync {
    fn summarize(&self, digest: &ProjectDigest) -> Result<String, SummaryError>;
}

/// Result of [`summarize_best_effort`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum SummaryOutcome {
    Narrative(String),
    Unavailable(String),
}

/// Ask `summarizer` for a narrative, absorbing any failure
pub fn summarize_best_effort(
    summarizer: &dyn NarrativeSummarizer,
    digest: &ProjectDigest,
) -> SummaryOutcome {
    match summarizer.summarize(digest) {
        Ok(text) if !text.trim().is_empty() => SummaryOutcome::Narrative(text),
        Ok(_) => {
            log::warn!("Summary unavailable: {}", SummaryError::Empty);
            SummaryOutcome::Unavailable(SummaryError::Empty.to_string())
        }
        Err(e) => {
            log::warn!("Summary unavailable: {}", e);
            SummaryOutcome::Unavailable(e.to_string())
        }
    }
}

/// Offline summarizer: a fixed template filled from the digest
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummarizer;

impl NarrativeSummarizer for TemplateSummarizer {
    fn summarize(&self, digest: &ProjectDigest) -> Result<String, SummaryError> {
        let verdict = match digest.npv.value() {
            Some(npv) if npv > 0.0 => format!(
                "The project looks financially attractive, with an NPV of ${:.2}M",
                round_to(npv / 1e6, 2)
            ),
            Some(npv) => format!(
                "The project does not recover its investment, with an NPV of ${:.2}M",
                round_to(npv / 1e6, 2)
            ),
            None => "The project NPV could not be determined".to_string(),
        };

        let returns = match (digest.roi_pct.value(), digest.payback_years.value()) {
            (Some(roi), Some(payback)) => format!(
                "It returns {:.1}% a year and pays back in {:.1} years.",
                roi, payback
            ),
            _ => "It does not generate a positive annual profit at the assumed price.".to_string(),
        };

        Ok(format!(
            "A {} MW electrolyzer buying power at ${}/MWh produces hydrogen at ${:.2}/kg \
             before ${:.2}/kg of incentives. {}. {}",
            digest.plant_size_mw,
            digest.electricity_cost_per_mwh,
            digest.lcoh_per_kg,
            digest.incentive_per_kg,
            verdict,
            returns
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioRunner;

    struct FailingSummarizer;

    impl NarrativeSummarizer for FailingSummarizer {
        fn summarize(&self, _digest: &ProjectDigest) -> Result<String, SummaryError> {
            Err(SummaryError::Unavailable("connection refused".to_string()))
        }
    }

    struct BlankSummarizer;

    impl NarrativeSummarizer for BlankSummarizer {
        fn summarize(&self, _digest: &ProjectDigest) -> Result<String, SummaryError> {
            Ok("   ".to_string())
        }
    }

    fn reference() -> (Scenario, Evaluation) {
        let scenario = Scenario::default();
        let evaluation = ScenarioRunner::new().evaluate(&scenario).unwrap();
        (scenario, evaluation)
    }

    #[test]
    fn test_digest_text() {
        let (scenario, evaluation) = reference();
        let text = ProjectDigest::from_evaluation(&scenario, &evaluation).to_string();
        assert!(text.contains("- LCOH: $5.68/kg"));
        assert!(text.contains("- Plant size: 10 MW"));
        assert!(text.contains("- Incentives: $4.50/kg"));
    }

    #[test]
    fn test_digest_marks_undefined_metrics() {
        let scenario = Scenario {
            selling_price_per_kg: 0.0,
            incentives: crate::inputs::IncentiveInputs::none(),
            ..Default::default()
        };
        let evaluation = ScenarioRunner::new().evaluate(&scenario).unwrap();
        let text = ProjectDigest::from_evaluation(&scenario, &evaluation).to_string();
        assert!(text.contains("- ROI: N/A%"));
        assert!(text.contains("- Payback period: N/A years"));
    }

    #[test]
    fn test_failure_is_isolated() {
        let (scenario, evaluation) = reference();
        let before = evaluation.clone();
        let digest = ProjectDigest::from_evaluation(&scenario, &evaluation);

        let outcome = summarize_best_effort(&FailingSummarizer, &digest);
        assert!(matches!(outcome, SummaryOutcome::Unavailable(ref msg) if msg.contains("connection refused")));
        assert_eq!(evaluation, before);

        let outcome = summarize_best_effort(&BlankSummarizer, &digest);
        assert!(matches!(outcome, SummaryOutcome::Unavailable(_)));
    }

    #[test]
    fn test_template_summary() {
        let (scenario, evaluation) = reference();
        let digest = ProjectDigest::from_evaluation(&scenario, &evaluation);
        match summarize_best_effort(&TemplateSummarizer, &digest) {
            SummaryOutcome::Narrative(text) => {
                assert!(text.contains("financially attractive"));
                assert!(text.contains("10 MW"));
            }
            other => panic!("expected narrative, got {:?}", other),
        }
    }
}
