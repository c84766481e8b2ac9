// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Impact Inspector
// ─────────────────────────────────────────────────────────────────────
//! Joins the top-impact states of a run with their guide records and
//! narratives, and renders the plain-text guidance report.

use serde::{Deserialize, Serialize};

use valence_physics::analysis::{impact_entries, ImpactEntry};
use valence_physics::params::baseline_state;
use valence_types::{Equilibrium, LifeStage, ValenceResult};

use crate::guide::StateGuideStore;
use crate::narrative::NarrativeEngine;

const MISSING: &str = "N/A";

/// One impact state with its human-facing descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactInsight {
    pub entry: ImpactEntry,
    /// False when no guide record exists; text fields are then "N/A".
    pub has_guide: bool,
    pub polarity: String,
    pub mood: String,
    pub keywords: Vec<String>,
    pub physical_function: String,
    pub manifestation: String,
    pub instantiation_effect: String,
    pub narrative: String,
}

fn or_missing(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| MISSING.to_string())
}

/// Top-`k` states by |final − baseline|, annotated from the engine's guides.
pub fn inspect(
    final_values: &[f64],
    baseline: &[f64],
    engine: &NarrativeEngine,
    k: usize,
) -> ValenceResult<Vec<ImpactInsight>> {
    let entries = impact_entries(final_values, baseline, k)?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let guide = engine.guides().guide(entry.state_id);
            let narrative = engine.narrative(entry.state_id, entry.final_value);
            match guide {
                Some(g) => ImpactInsight {
                    has_guide: true,
                    polarity: or_missing(g.polarity.as_ref()),
                    mood: or_missing(g.mood_description.as_ref()),
                    keywords: g.keywords.clone(),
                    physical_function: or_missing(g.physical_function.as_ref()),
                    manifestation: or_missing(g.manifestation.as_ref()),
                    instantiation_effect: or_missing(g.instantiation_effect.as_ref()),
                    narrative,
                    entry,
                },
                None => ImpactInsight {
                    has_guide: false,
                    polarity: MISSING.to_string(),
                    mood: MISSING.to_string(),
                    keywords: Vec::new(),
                    physical_function: MISSING.to_string(),
                    manifestation: MISSING.to_string(),
                    instantiation_effect: MISSING.to_string(),
                    narrative,
                    entry,
                },
            }
        })
        .collect())
}

/// Actionable guidance for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub intent: String,
    pub life_stage: Option<LifeStage>,
    pub insights: Vec<ImpactInsight>,
}

impl AlignmentReport {
    /// Inspect an equilibrium against the canonical baseline.
    pub fn build(
        intent: impl Into<String>,
        life_stage: Option<LifeStage>,
        equilibrium: &Equilibrium,
        engine: &NarrativeEngine,
        k: usize,
    ) -> ValenceResult<Self> {
        let insights = inspect(&equilibrium.final_state, &baseline_state(), engine, k)?;
        Ok(Self {
            intent: intent.into(),
            life_stage,
            insights,
        })
    }

    /// Plain-text report. States without a guide record are left out.
    pub fn render_text(&self) -> String {
        let mut out = String::from("Valence-Pi Structural Alignment Report\n");
        out.push_str(&format!("Intent: {}\n", self.intent));
        if let Some(stage) = self.life_stage {
            out.push_str(&format!("Life stage: {}\n", stage.label()));
        }
        for insight in self.insights.iter().filter(|i| i.has_guide) {
            out.push('\n');
            out.push_str(&format!(
                "Shift in {} ({})\n",
                insight.entry.label, insight.polarity
            ));
            out.push_str(&format!(
                "Value: {:.2} (delta {:+.3})\n",
                insight.entry.final_value, insight.entry.delta
            ));
            out.push_str(&format!("Keywords: {}\n", insight.keywords.join(", ")));
            out.push_str(&format!("Function: {}\n", insight.physical_function));
            out.push_str(&format!("Effect: {}\n", insight.instantiation_effect));
        }
        out
    }
}
