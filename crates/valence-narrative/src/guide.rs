// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — State Guide Store
// ─────────────────────────────────────────────────────────────────────
//! Descriptor records keyed by 1-based state id, loaded from a
//! `{"stateGuides": [...]}` JSON document.
//!
//! Every field other than `state` is optional so partially filled
//! guide files still load; consumers substitute placeholders.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use valence_physics::analysis::StateGroup;
use valence_types::{ValenceError, ValenceResult};

/// Descriptor for one state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateGuide {
    pub state: usize,
    /// "A / B" pair, e.g. "Unity / Division".
    pub polarity: Option<String>,
    pub keywords: Vec<String>,
    pub physical_function: Option<String>,
    pub instantiation_effect: Option<String>,
    pub mood_description: Option<String>,
    pub manifestation: Option<String>,
    pub named_state_descriptor: Option<String>,
}

impl StateGuide {
    /// First half of the polarity pair ("Unity" from "Unity / Division").
    pub fn primary_polarity(&self) -> Option<&str> {
        self.polarity
            .as_deref()
            .and_then(|p| p.split(" / ").next())
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Keyword at `index`, if present.
    pub fn keyword(&self, index: usize) -> Option<&str> {
        self.keywords.get(index).map(String::as_str)
    }
}

/// On-disk document wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideBook {
    #[serde(rename = "stateGuides")]
    pub state_guides: Vec<StateGuide>,
}

/// Trait for state-guide lookup backends.
pub trait StateGuideStore: Send + Sync {
    /// Descriptor for `state_id`, `None` when no record exists.
    fn guide(&self, state_id: usize) -> Option<&StateGuide>;

    /// Number of loaded records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory guide store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGuides {
    guides: HashMap<usize, StateGuide>,
}

impl InMemoryGuides {
    /// Empty store: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Later records with a duplicate id replace earlier ones.
    pub fn with_guides(guides: impl IntoIterator<Item = StateGuide>) -> Self {
        Self {
            guides: guides.into_iter().map(|g| (g.state, g)).collect(),
        }
    }

    /// Parse a `{"stateGuides": [...]}` document.
    pub fn from_json(json: &str) -> ValenceResult<Self> {
        let book: GuideBook = serde_json::from_str(json)
            .map_err(|e| ValenceError::DataLoad(format!("state guide parse error: {e}")))?;
        Ok(Self::with_guides(book.state_guides))
    }

    /// Read and parse a guide file.
    pub fn load(path: impl AsRef<Path>) -> ValenceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ValenceError::DataLoad(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Try each candidate path in order and keep the first that loads.
    ///
    /// Missing files are skipped silently, unreadable or malformed ones
    /// are logged and skipped. With no usable candidate the store is
    /// empty and labels fall back to generic text.
    pub fn load_first_available<P: AsRef<Path>>(paths: &[P]) -> Self {
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(store) => {
                    log::debug!("loaded {} state guides from {}", store.len(), path.display());
                    return store;
                }
                Err(e) => log::warn!("skipping state guide source: {e}"),
            }
        }
        log::warn!("no state guide source could be loaded; labels unavailable");
        Self::new()
    }

    pub fn insert(&mut self, guide: StateGuide) {
        self.guides.insert(guide.state, guide);
    }

    /// Slider-style label: `"C3: Unity / Division"`, or `"C3: Core"` /
    /// `"S9: Surface"` when no polarity is known.
    pub fn label_for(&self, state_id: usize) -> String {
        let group = StateGroup::of(state_id);
        let prefix = match group {
            Some(StateGroup::Core) => "C",
            _ => "S",
        };
        let polarity = self
            .guide(state_id)
            .and_then(|g| g.polarity.as_deref())
            .unwrap_or(match group {
                Some(StateGroup::Core) => "Core",
                _ => "Surface",
            });
        format!("{prefix}{state_id}: {polarity}")
    }
}

impl StateGuideStore for InMemoryGuides {
    fn guide(&self, state_id: usize) -> Option<&StateGuide> {
        self.guides.get(&state_id)
    }

    fn len(&self) -> usize {
        self.guides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "stateGuides": [
            {
                "state": 1,
                "polarity": "Unity / Division",
                "keywords": ["cohesion", "fracture", "belonging"],
                "physical_function": "structural integration",
                "instantiation_effect": "binds the backbone",
                "mood_description": "settled",
                "manifestation": "steady posture",
                "named_state_descriptor": "Unity Field"
            },
            { "state": 9, "polarity": "Clarity / Confusion", "keywords": ["signal"] }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let store = InMemoryGuides::from_json(SAMPLE).unwrap();
        assert_eq!(store.len(), 2);
        let g = store.guide(1).unwrap();
        assert_eq!(g.primary_polarity(), Some("Unity"));
        assert_eq!(g.keyword(2), Some("belonging"));
        assert_eq!(g.named_state_descriptor.as_deref(), Some("Unity Field"));
    }

    #[test]
    fn test_partial_record_defaults() {
        let store = InMemoryGuides::from_json(SAMPLE).unwrap();
        let g = store.guide(9).unwrap();
        assert!(g.physical_function.is_none());
        assert!(g.keyword(1).is_none());
    }

    #[test]
    fn test_missing_lookup_is_none() {
        let store = InMemoryGuides::from_json(SAMPLE).unwrap();
        assert!(store.guide(5).is_none());
        assert!(InMemoryGuides::new().is_empty());
    }

    #[test]
    fn test_malformed_json_is_data_load_error() {
        let err = InMemoryGuides::from_json(r#"{"guides": 3}"#).unwrap_err();
        assert!(matches!(err, ValenceError::DataLoad(_)));
    }

    #[test]
    fn test_label_for() {
        let store = InMemoryGuides::from_json(SAMPLE).unwrap();
        assert_eq!(store.label_for(1), "C1: Unity / Division");
        assert_eq!(store.label_for(2), "C2: Core");
        assert_eq!(store.label_for(9), "S9: Clarity / Confusion");
        assert_eq!(store.label_for(22), "S22: Surface");
    }

    #[test]
    fn test_insert_overwrites() {
        let mut store = InMemoryGuides::from_json(SAMPLE).unwrap();
        store.insert(StateGuide {
            state: 1,
            polarity: Some("Whole / Split".into()),
            ..Default::default()
        });
        assert_eq!(store.len(), 2);
        assert_eq!(store.guide(1).unwrap().primary_polarity(), Some("Whole"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let store = InMemoryGuides::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = InMemoryGuides::load("/nonexistent/stateGuides.json").unwrap_err();
        assert!(matches!(err, ValenceError::DataLoad(_)));
    }

    #[test]
    fn test_load_first_available_skips_bad_sources() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        let good = dir.path().join("stateGuides.json");
        std::fs::write(&good, SAMPLE).unwrap();
        let missing = dir.path().join("missing.json");

        let store = InMemoryGuides::load_first_available(&[missing, broken, good]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_first_available_none_usable() {
        let store = InMemoryGuides::load_first_available(&["/nonexistent/a.json"]);
        assert!(store.is_empty());
        assert_eq!(store.label_for(3), "C3: Core");
    }
}
