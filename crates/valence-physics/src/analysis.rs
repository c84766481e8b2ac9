// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Result Extraction
// ─────────────────────────────────────────────────────────────────────
//! Deltas against a baseline and top-impact selection over the
//! concatenated 22-state vector. Pure and stateless.

use serde::{Deserialize, Serialize};

use valence_types::{ValenceError, ValenceResult, N_CORE, N_STATES};

/// Which group a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateGroup {
    Core,
    Surface,
}

impl StateGroup {
    /// Group of a 1-based state id, `None` outside 1..=N_STATES.
    pub fn of(state_id: usize) -> Option<Self> {
        match state_id {
            1..=N_CORE => Some(StateGroup::Core),
            id if id > N_CORE && id <= N_STATES => Some(StateGroup::Surface),
            _ => None,
        }
    }
}

/// 1-based state id for a 0-based concatenated index.
pub fn state_id(index: usize) -> usize {
    index + 1
}

/// Display label for a 0-based concatenated index: `C1`..`C7`, `S8`..`S22`.
pub fn state_label(index: usize) -> String {
    let id = state_id(index);
    if index < N_CORE {
        format!("C{id}")
    } else {
        format!("S{id}")
    }
}

/// Labels for every state in concatenated order.
pub fn state_labels() -> Vec<String> {
    (0..N_STATES).map(state_label).collect()
}

/// Core followed by surface.
pub fn concat_state(core: &[f64], surface: &[f64]) -> Vec<f64> {
    core.iter().chain(surface).copied().collect()
}

/// Elementwise `final − baseline`.
pub fn deltas(final_values: &[f64], baseline: &[f64]) -> ValenceResult<Vec<f64>> {
    if final_values.len() != baseline.len() {
        return Err(ValenceError::shape(
            "baseline",
            final_values.len(),
            baseline.len(),
        ));
    }
    Ok(final_values
        .iter()
        .zip(baseline)
        .map(|(f, b)| f - b)
        .collect())
}

/// Indices of the `k` largest |delta|, largest first. Equal magnitudes
/// keep ascending index order; `k` beyond the length returns every index.
pub fn top_impact(deltas: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..deltas.len()).collect();
    order.sort_by(|&a, &b| deltas[b].abs().total_cmp(&deltas[a].abs()));
    order.truncate(k);
    order
}

/// One state surfaced by impact ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEntry {
    /// 0-based index into the concatenated vector.
    pub index: usize,
    /// 1-based state id (guide key).
    pub state_id: usize,
    pub label: String,
    pub final_value: f64,
    pub delta: f64,
}

/// Rank the change from `baseline` to `final_values` and return the top `k`.
pub fn impact_entries(
    final_values: &[f64],
    baseline: &[f64],
    k: usize,
) -> ValenceResult<Vec<ImpactEntry>> {
    let d = deltas(final_values, baseline)?;
    Ok(top_impact(&d, k)
        .into_iter()
        .map(|index| ImpactEntry {
            index,
            state_id: state_id(index),
            label: state_label(index),
            final_value: final_values[index],
            delta: d[index],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top1_by_absolute_delta() {
        let d = deltas(&[0.1, -0.9, 0.3], &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(top_impact(&d, 1), vec![1]);
        assert_eq!(top_impact(&d, 3), vec![1, 2, 0]);
    }

    #[test]
    fn test_top_k_larger_than_len() {
        assert_eq!(top_impact(&[0.2, -0.1], 5), vec![0, 1]);
        assert!(top_impact(&[], 3).is_empty());
    }

    #[test]
    fn test_ties_keep_lower_index_first() {
        assert_eq!(top_impact(&[0.5, -0.5, 0.1, 0.5], 3), vec![0, 1, 3]);
    }

    #[test]
    fn test_deltas_length_mismatch() {
        let err = deltas(&[0.0; 3], &[0.0; 2]).unwrap_err();
        assert!(matches!(err, ValenceError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_labels() {
        let labels = state_labels();
        assert_eq!(labels.len(), N_STATES);
        assert_eq!(labels[0], "C1");
        assert_eq!(labels[6], "C7");
        assert_eq!(labels[7], "S8");
        assert_eq!(labels[21], "S22");
    }

    #[test]
    fn test_state_group() {
        assert_eq!(StateGroup::of(0), None);
        assert_eq!(StateGroup::of(1), Some(StateGroup::Core));
        assert_eq!(StateGroup::of(7), Some(StateGroup::Core));
        assert_eq!(StateGroup::of(8), Some(StateGroup::Surface));
        assert_eq!(StateGroup::of(22), Some(StateGroup::Surface));
        assert_eq!(StateGroup::of(23), None);
    }

    #[test]
    fn test_impact_entries() {
        let mut final_values = vec![0.0; N_STATES];
        let baseline = vec![0.0; N_STATES];
        final_values[9] = -0.8;
        final_values[2] = 0.4;
        let entries = impact_entries(&final_values, &baseline, 2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 9);
        assert_eq!(entries[0].state_id, 10);
        assert_eq!(entries[0].label, "S10");
        assert_eq!(entries[0].delta, -0.8);
        assert_eq!(entries[1].label, "C3");
        assert_eq!(entries[1].final_value, 0.4);
    }

    #[test]
    fn test_concat_state() {
        assert_eq!(concat_state(&[1.0, 2.0], &[3.0]), vec![1.0, 2.0, 3.0]);
    }
}
