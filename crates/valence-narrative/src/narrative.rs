// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Narrative Engine
// ─────────────────────────────────────────────────────────────────────
//! Interprets a simulated value in [-1, 1] for one state and renders
//! one of three sentence frames from its guide record:
//!
//! - **Flow** (`value >= 0.4`): achievement, keywords 0 and 2
//! - **Resistance** (`value <= -0.4`): restriction, keyword 1
//! - **Stabilisation** (otherwise): balance, keywords 0 and 1

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use valence_types::SimulationConfig;

use crate::guide::{StateGuide, StateGuideStore};

const MISSING: &str = "N/A";

/// Which sentence frame a value selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeBranch {
    Flow,
    Resistance,
    Stabilization,
}

impl NarrativeBranch {
    /// Both thresholds are inclusive. NaN falls through to stabilisation.
    pub fn classify(value: f64, flow_threshold: f64, resistance_threshold: f64) -> Self {
        if value >= flow_threshold {
            NarrativeBranch::Flow
        } else if value <= resistance_threshold {
            NarrativeBranch::Resistance
        } else {
            NarrativeBranch::Stabilization
        }
    }
}

/// Deterministic template renderer over a guide store.
pub struct NarrativeEngine {
    guides: Arc<dyn StateGuideStore>,
    flow_threshold: f64,
    resistance_threshold: f64,
}

impl NarrativeEngine {
    /// Default thresholds ±0.4.
    pub fn new(guides: Arc<dyn StateGuideStore>) -> Self {
        Self::from_config(guides, &SimulationConfig::default())
    }

    pub fn from_config(guides: Arc<dyn StateGuideStore>, config: &SimulationConfig) -> Self {
        Self {
            guides,
            flow_threshold: config.flow_threshold,
            resistance_threshold: config.resistance_threshold,
        }
    }

    pub fn guides(&self) -> &dyn StateGuideStore {
        self.guides.as_ref()
    }

    pub fn branch(&self, value: f64) -> NarrativeBranch {
        NarrativeBranch::classify(value, self.flow_threshold, self.resistance_threshold)
    }

    /// Narrative sentence for `state_id` at `value`.
    pub fn narrative(&self, state_id: usize, value: f64) -> String {
        match self.guides.guide(state_id) {
            Some(guide) => render(guide, state_id, self.branch(value)),
            None => {
                log::debug!("no guide for state {state_id}, narrative unavailable");
                "State configuration missing.".to_string()
            }
        }
    }
}

fn render(guide: &StateGuide, state_id: usize, branch: NarrativeBranch) -> String {
    let name = guide
        .named_state_descriptor
        .clone()
        .unwrap_or_else(|| format!("State {state_id}"));
    let func = guide.physical_function.as_deref().unwrap_or(MISSING);
    let polarity = guide.primary_polarity().unwrap_or(MISSING);
    let kw = |i: usize| guide.keyword(i).unwrap_or(MISSING);

    match branch {
        NarrativeBranch::Flow => format!(
            "Your {name} indicates you have achieved a high level of {func}. \
             This maximizes your capacity for {polarity}, manifesting in a \
             sustained sense of {} and {}.",
            kw(0),
            kw(2)
        ),
        NarrativeBranch::Resistance => format!(
            "Your {name} indicates a restriction in your {func}. \
             This triggers an unmet requirement in your capacity for {polarity}, \
             manifesting primarily as {}.",
            kw(1)
        ),
        NarrativeBranch::Stabilization => format!(
            "Your {name} is currently stabilizing. You are navigating the \
             balance of {func}, resolving the tension between {} \
             and {}.",
            kw(0),
            kw(1)
        ),
    }
}
