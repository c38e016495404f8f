//! Memoized evaluations keyed by input content
//!
//! The key is built from the bit patterns of every numeric input, so two
//! scenarios hit the same entry exactly when they would produce the same
//! evaluation. The scenario label is not part of the key.

use std::collections::HashMap;

use crate::error::DomainError;
use crate::inputs::Scenario;
use crate::scenario::{Evaluation, ScenarioRunner};

/// Content hash of a scenario's numeric inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScenarioKey([u64; 15]);

impl ScenarioKey {
    pub fn of(scenario: &Scenario) -> Self {
        let p = &scenario.project;
        let i = &scenario.incentives;
        Self([
            key_bits(p.capex_per_mw),
            key_bits(p.opex_per_mw),
            key_bits(p.plant_size_mw),
            u64::from(p.lifetime_years),
            key_bits(p.discount_rate_pct),
            key_bits(p.electricity_cost_per_mwh),
            key_bits(p.capacity_factor_pct),
            key_bits(p.efficiency_kwh_per_kg),
            key_bits(p.storage_cost_per_kg),
            key_bits(p.transport_cost_per_kg),
            key_bits(i.direct_credit_per_kg),
            key_bits(i.electricity_credit_per_mwh),
            key_bits(i.carbon_credit_per_ton),
            key_bits(i.co2_avoided_kg_per_kg),
            key_bits(scenario.selling_price_per_kg),
        ])
    }
}

/// -0.0 and 0.0 evaluate identically, so they share a key
fn key_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

/// Bounded evaluation cache
#[derive(Debug)]
pub struct EvaluationCache {
    entries: HashMap<ScenarioKey, Evaluation>,

    /// Entry limit; the cache is cleared when an insert would exceed it
    capacity: usize,

    /// Statistics
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl EvaluationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// Cached evaluation for `scenario`, if present
    pub fn get(&self, scenario: &Scenario) -> Option<&Evaluation> {
        self.entries.get(&ScenarioKey::of(scenario))
    }

    /// Return the memoized evaluation or compute and store it.
    /// Failed evaluations are not cached.
    pub fn get_or_evaluate(
        &mut self,
        runner: &ScenarioRunner,
        scenario: &Scenario,
    ) -> Result<Evaluation, DomainError> {
        let key = ScenarioKey::of(scenario);

        if let Some(hit) = self.entries.get(&key) {
            self.cache_hits += 1;
            return Ok(hit.clone());
        }

        self.cache_misses += 1;
        let evaluation = runner.evaluate(scenario)?;

        if self.entries.len() >= self.capacity {
            log::warn!(
                "Evaluation cache full ({} entries), clearing",
                self.entries.len()
            );
            self.entries.clear();
        }
        self.entries.insert(key, evaluation.clone());

        Ok(evaluation)
    }

    /// Clear all cached data
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    /// Get number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().cache_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::ProjectInputs;

    #[test]
    fn test_equal_inputs_hit() {
        let runner = ScenarioRunner::new();
        let mut cache = EvaluationCache::new(8);

        let first = cache.get_or_evaluate(&runner, &Scenario::default()).unwrap();
        let second = cache
            .get_or_evaluate(&runner, &Scenario::default().named("same plant, new label"))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.cache_hits, 1);
        assert_eq!(cache.cache_misses, 1);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_changed_field_misses() {
        let runner = ScenarioRunner::new();
        let mut cache = EvaluationCache::new(8);

        cache.get_or_evaluate(&runner, &Scenario::default()).unwrap();
        let changed = Scenario {
            project: ProjectInputs {
                transport_cost_per_kg: 0.01,
                ..Default::default()
            },
            ..Default::default()
        };
        cache.get_or_evaluate(&runner, &changed).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.cache_hits, 0);
        assert!(cache.get(&changed).is_some());
    }

    #[test]
    fn test_negative_zero_shares_key() {
        let plus = Scenario::default();
        let minus = Scenario {
            project: ProjectInputs {
                storage_cost_per_kg: -0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ScenarioKey::of(&plus), ScenarioKey::of(&minus));
    }

    #[test]
    fn test_errors_not_cached() {
        let runner = ScenarioRunner::new();
        let mut cache = EvaluationCache::new(8);
        let bad = Scenario {
            selling_price_per_kg: -3.0,
            ..Default::default()
        };
        assert!(cache.get_or_evaluate(&runner, &bad).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_clears() {
        let runner = ScenarioRunner::new();
        let mut cache = EvaluationCache::new(2);

        for price in [5.0, 6.0, 7.0] {
            let scenario = Scenario {
                selling_price_per_kg: price,
                ..Default::default()
            };
            cache.get_or_evaluate(&runner, &scenario).unwrap();
        }
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hit_rate(), 0.0);
    }
}
