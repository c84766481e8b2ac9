// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Valence Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{ValenceError, ValenceResult};

/// Subject life stage, used to pick a plasticity-dependent damping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Childhood,
    Adolescence,
    Adulthood,
    EarlyAgeing,
    LateAgeing,
}

impl LifeStage {
    pub const ALL: [LifeStage; 5] = [
        LifeStage::Childhood,
        LifeStage::Adolescence,
        LifeStage::Adulthood,
        LifeStage::EarlyAgeing,
        LifeStage::LateAgeing,
    ];

    /// Pull-to-target strength for this stage. Plasticity falls with age,
    /// bottoming out at the engine's default propagation damping.
    ///
    /// Only the adulthood value (0.886) is the dashboard's fixed damping;
    /// the other stages are a chosen monotone mapping around it.
    pub fn damping(self) -> f64 {
        match self {
            LifeStage::Childhood => 0.95,
            LifeStage::Adolescence => 0.92,
            LifeStage::Adulthood => 0.886,
            LifeStage::EarlyAgeing => 0.75,
            LifeStage::LateAgeing => 0.62,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LifeStage::Childhood => "Childhood",
            LifeStage::Adolescence => "Adolescence",
            LifeStage::Adulthood => "Adulthood",
            LifeStage::EarlyAgeing => "Early Ageing",
            LifeStage::LateAgeing => "Late Ageing",
        }
    }

    /// Parse a dashboard label ("Early Ageing") or snake_case name.
    pub fn parse(label: &str) -> ValenceResult<Self> {
        let norm = label.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|s| s.label().to_lowercase().replace(' ', "_") == norm)
            .ok_or_else(|| ValenceError::Config(format!("unknown life stage: {label:?}")))
    }
}

/// Engine-wide defaults for simulation runs.
///
/// Per-run inputs (initial state, targets, steps) travel in a
/// caller-owned request; this struct only carries the fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Steps used when a caller does not choose.
    /// Default: 100.
    pub default_steps: u64,

    /// Pull-to-target strength when neither a damping value nor a
    /// life stage is supplied.
    /// Default: 0.62.
    pub default_damping: f64,

    /// Random initial components are drawn from [-init_spread, init_spread].
    /// Default: 0.3.
    pub init_spread: f64,

    /// Seed for simulators that own their random source.
    /// Default: 42.
    pub seed: u64,

    /// Number of impact states surfaced after a run.
    /// Default: 3.
    pub top_k: usize,

    /// Values at or above this read as the flow branch.
    /// Default: 0.4.
    pub flow_threshold: f64,

    /// Values at or below this read as the resistance branch.
    /// Default: -0.4.
    pub resistance_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_steps: 100,
            default_damping: 0.62,
            init_spread: 0.3,
            seed: 42,
            top_k: 3,
            flow_threshold: 0.4,
            resistance_threshold: -0.4,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> ValenceResult<()> {
        if !(0.0..=1.0).contains(&self.default_damping) {
            return Err(ValenceError::Config(format!(
                "default_damping must be in [0, 1], got {}",
                self.default_damping
            )));
        }
        if !(0.0..=1.0).contains(&self.init_spread) {
            return Err(ValenceError::Config(format!(
                "init_spread must be in [0, 1], got {}",
                self.init_spread
            )));
        }
        if self.top_k < 1 {
            return Err(ValenceError::Config(format!(
                "top_k must be >= 1, got {}",
                self.top_k
            )));
        }
        // NaN on either side compares as unordered and is rejected too.
        if self.resistance_threshold.partial_cmp(&self.flow_threshold) != Some(Ordering::Less) {
            return Err(ValenceError::Config(format!(
                "resistance_threshold ({}) must be below flow_threshold ({})",
                self.resistance_threshold, self.flow_threshold
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> ValenceResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValenceError::Config(format!("JSON parse error: {e}")))
    }

    /// Resolve the damping for one run: explicit value, then life stage,
    /// then the configured default.
    pub fn resolve_damping(
        &self,
        explicit: Option<f64>,
        stage: Option<LifeStage>,
    ) -> ValenceResult<f64> {
        let damping = explicit
            .or_else(|| stage.map(LifeStage::damping))
            .unwrap_or(self.default_damping);
        if !damping.is_finite() {
            return Err(ValenceError::Numerical(format!(
                "damping must be finite, got {damping}"
            )));
        }
        if !(0.0..=1.0).contains(&damping) {
            return Err(ValenceError::Validation(format!(
                "damping must be in [0, 1], got {damping}"
            )));
        }
        Ok(damping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_damping_out_of_range_rejected() {
        let cfg = SimulationConfig {
            default_damping: 1.5,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ValenceError::Config(_))));
    }

    #[test]
    fn test_thresholds_must_be_ordered() {
        let cfg = SimulationConfig {
            flow_threshold: -0.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = SimulationConfig {
            resistance_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ValenceError::Config(_))));
    }

    #[test]
    fn test_top_k_zero_rejected() {
        let cfg = SimulationConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let cfg = SimulationConfig::from_json(r#"{"default_steps": 10, "seed": 7}"#).unwrap();
        assert_eq!(cfg.default_steps, 10);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.default_damping, 0.62);
        assert_eq!(cfg.top_k, 3);
    }

    #[test]
    fn test_from_json_malformed() {
        let err = SimulationConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ValenceError::Config(_)));
    }

    #[test]
    fn test_resolve_damping_precedence() {
        let cfg = SimulationConfig::default();
        assert_eq!(
            cfg.resolve_damping(Some(0.5), Some(LifeStage::Childhood)).unwrap(),
            0.5
        );
        assert_eq!(
            cfg.resolve_damping(None, Some(LifeStage::Adulthood)).unwrap(),
            0.886
        );
        assert_eq!(cfg.resolve_damping(None, None).unwrap(), 0.62);
    }

    #[test]
    fn test_resolve_damping_rejects_bad_values() {
        let cfg = SimulationConfig::default();
        assert!(matches!(
            cfg.resolve_damping(Some(-0.1), None),
            Err(ValenceError::Validation(_))
        ));
        assert!(matches!(
            cfg.resolve_damping(Some(f64::NAN), None),
            Err(ValenceError::Numerical(_))
        ));
    }

    #[test]
    fn test_life_stage_damping_decreases_with_age() {
        let d: Vec<f64> = LifeStage::ALL.iter().map(|s| s.damping()).collect();
        assert!(d.windows(2).all(|w| w[0] > w[1]), "{d:?}");
        assert!(d.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(LifeStage::Adulthood.damping(), 0.886);
    }

    #[test]
    fn test_life_stage_parse() {
        assert_eq!(LifeStage::parse("Early Ageing").unwrap(), LifeStage::EarlyAgeing);
        assert_eq!(LifeStage::parse("late_ageing").unwrap(), LifeStage::LateAgeing);
        assert_eq!(LifeStage::parse(" adulthood ").unwrap(), LifeStage::Adulthood);
        assert!(LifeStage::parse("Infancy").is_err());
    }

    #[test]
    fn test_life_stage_serde_snake_case() {
        let json = serde_json::to_string(&LifeStage::EarlyAgeing).unwrap();
        assert_eq!(json, "\"early_ageing\"");
    }
}
