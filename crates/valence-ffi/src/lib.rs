// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Valence Kernel PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Valence Kernel, used by the
//! Streamlit dashboard.
//!
//! Exposes `SimulationConfig`, `RustSimulator`, `RustNarrativeEngine`
//! and the matrix/analysis helpers to Python via PyO3.
//!
//! # FFI Contract
//!
//! - Every `ValenceError` becomes a `ValueError` carrying its message.
//! - Vectors cross the boundary as plain lists; nothing is truncated or
//!   padded on either side.
//! - Each simulator owns its seeded RNG, so a dashboard session can
//!   replay a run by re-seeding.
//!
//! Usage from Python:
//! ```python
//! from valence_kernel import RustSimulator, RustNarrativeEngine
//!
//! sim = RustSimulator(seed=42)
//! eq = sim.compute_equilibrium(target_core=[0.7] * 7, steps=10, life_stage="Adulthood")
//! engine = RustNarrativeEngine.load(["radial_engine/stateGuides.json", "stateGuides.json"])
//! print(engine.narrative(eq["impact"][0]["state_id"], eq["impact"][0]["final_value"]))
//! ```

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use valence_narrative::{
    inspect, AlignmentReport, InMemoryGuides, NarrativeBranch, NarrativeEngine, StateGuideStore,
};
use valence_physics::{
    baseline_state, state_labels as labels, CouplingMatrices, SimulationRequest, Simulator,
};
use valence_types::{Equilibrium, LifeStage, SimulationConfig, Trajectory, ValenceError};

fn value_err(e: ValenceError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_stage(stage: Option<&str>) -> PyResult<Option<LifeStage>> {
    stage.map(LifeStage::parse).transpose().map_err(value_err)
}

fn rows<const N: usize>(history: &[[f64; N]]) -> Vec<Vec<f64>> {
    history.iter().map(|r| r.to_vec()).collect()
}

fn trajectory_dict<'py>(py: Python<'py>, traj: &Trajectory) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("core", rows(&traj.core))?;
    dict.set_item("surface", rows(&traj.surface))?;
    dict.set_item("steps", traj.steps())?;
    Ok(dict)
}

fn impact_dicts<'py>(
    py: Python<'py>,
    entries: &[valence_physics::ImpactEntry],
) -> PyResult<Vec<Bound<'py, PyDict>>> {
    entries
        .iter()
        .map(|e| {
            let dict = PyDict::new(py);
            dict.set_item("index", e.index)?;
            dict.set_item("state_id", e.state_id)?;
            dict.set_item("label", e.label.as_str())?;
            dict.set_item("final_value", e.final_value)?;
            dict.set_item("delta", e.delta)?;
            Ok(dict)
        })
        .collect()
}

// ─── PySimulationConfig ─────────────────────────────────────────────

/// Python-visible engine configuration.
#[pyclass(name = "SimulationConfig")]
#[derive(Clone)]
struct PySimulationConfig {
    inner: SimulationConfig,
}

#[pymethods]
impl PySimulationConfig {
    #[new]
    #[pyo3(signature = (
        default_steps = 100,
        default_damping = 0.62,
        init_spread = 0.3,
        seed = 42,
        top_k = 3,
        flow_threshold = 0.4,
        resistance_threshold = -0.4,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        default_steps: u64,
        default_damping: f64,
        init_spread: f64,
        seed: u64,
        top_k: usize,
        flow_threshold: f64,
        resistance_threshold: f64,
    ) -> PyResult<Self> {
        let config = SimulationConfig {
            default_steps,
            default_damping,
            init_spread,
            seed,
            top_k,
            flow_threshold,
            resistance_threshold,
        };
        config.validate().map_err(value_err)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = SimulationConfig::from_json(json).map_err(value_err)?;
        config.validate().map_err(value_err)?;
        Ok(Self { inner: config })
    }

    #[getter]
    fn default_steps(&self) -> u64 {
        self.inner.default_steps
    }

    #[getter]
    fn default_damping(&self) -> f64 {
        self.inner.default_damping
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.inner.seed
    }

    #[getter]
    fn top_k(&self) -> usize {
        self.inner.top_k
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationConfig(default_steps={}, default_damping={}, seed={}, top_k={})",
            self.inner.default_steps, self.inner.default_damping, self.inner.seed, self.inner.top_k
        )
    }
}

// ─── RustSimulator ──────────────────────────────────────────────────

/// Seeded simulation driver.
#[pyclass(name = "RustSimulator")]
struct PySimulator {
    inner: Simulator,
}

impl PySimulator {
    #[allow(clippy::too_many_arguments)]
    fn request(
        initial_core: Option<Vec<f64>>,
        initial_surface: Option<Vec<f64>>,
        target_core: Option<Vec<f64>>,
        target_surface: Option<Vec<f64>>,
        steps: Option<i64>,
        damping: Option<f64>,
        life_stage: Option<&str>,
    ) -> PyResult<SimulationRequest> {
        Ok(SimulationRequest {
            initial_core,
            initial_surface,
            target_core,
            target_surface,
            steps,
            damping,
            life_stage: parse_stage(life_stage)?,
        })
    }
}

#[pymethods]
impl PySimulator {
    #[new]
    #[pyo3(signature = (config = None, seed = None))]
    fn new(config: Option<PySimulationConfig>, seed: Option<u64>) -> PyResult<Self> {
        let mut config = config.map(|c| c.inner).unwrap_or_default();
        if let Some(seed) = seed {
            config.seed = seed;
        }
        let inner = Simulator::from_config(config).map_err(value_err)?;
        Ok(Self { inner })
    }

    /// Re-seed the random source used for omitted initial vectors.
    fn reseed(&mut self, seed: u64) {
        self.inner.reseed(seed);
    }

    /// Full trajectory. Returns dict with core, surface (lists of rows) and steps.
    #[pyo3(signature = (
        initial_core = None,
        initial_surface = None,
        target_core = None,
        target_surface = None,
        steps = None,
        damping = None,
        life_stage = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn compute_trajectory<'py>(
        &mut self,
        py: Python<'py>,
        initial_core: Option<Vec<f64>>,
        initial_surface: Option<Vec<f64>>,
        target_core: Option<Vec<f64>>,
        target_surface: Option<Vec<f64>>,
        steps: Option<i64>,
        damping: Option<f64>,
        life_stage: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let request = Self::request(
            initial_core,
            initial_surface,
            target_core,
            target_surface,
            steps,
            damping,
            life_stage,
        )?;
        let traj = self.inner.compute_trajectory(&request).map_err(value_err)?;
        trajectory_dict(py, &traj)
    }

    /// Final state plus histories and the top-k impact states.
    #[pyo3(signature = (
        initial_core = None,
        initial_surface = None,
        target_core = None,
        target_surface = None,
        steps = None,
        damping = None,
        life_stage = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn compute_equilibrium<'py>(
        &mut self,
        py: Python<'py>,
        initial_core: Option<Vec<f64>>,
        initial_surface: Option<Vec<f64>>,
        target_core: Option<Vec<f64>>,
        target_surface: Option<Vec<f64>>,
        steps: Option<i64>,
        damping: Option<f64>,
        life_stage: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let request = Self::request(
            initial_core,
            initial_surface,
            target_core,
            target_surface,
            steps,
            damping,
            life_stage,
        )?;
        let eq: Equilibrium = self.inner.compute_equilibrium(&request).map_err(value_err)?;
        let impact = self.inner.impact(&eq).map_err(value_err)?;
        let dict = trajectory_dict(py, &eq.trajectory)?;
        dict.set_item("final_state", eq.final_state.clone())?;
        dict.set_item("impact", impact_dicts(py, &impact)?)?;
        Ok(dict)
    }

    #[getter]
    fn config(&self) -> PySimulationConfig {
        PySimulationConfig {
            inner: self.inner.config().clone(),
        }
    }
}

// ─── RustNarrativeEngine ────────────────────────────────────────────

/// Guide-backed narrative renderer.
#[pyclass(name = "RustNarrativeEngine")]
struct PyNarrativeEngine {
    guides: Arc<InMemoryGuides>,
    inner: NarrativeEngine,
}

impl PyNarrativeEngine {
    fn from_guides(guides: InMemoryGuides, config: Option<&SimulationConfig>) -> Self {
        let guides = Arc::new(guides);
        let default_config = SimulationConfig::default();
        let config = config.unwrap_or(&default_config);
        Self {
            inner: NarrativeEngine::from_config(guides.clone(), config),
            guides,
        }
    }
}

#[pymethods]
impl PyNarrativeEngine {
    /// Engine with no guides: every narrative reports a missing state.
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PySimulationConfig>) -> Self {
        Self::from_guides(InMemoryGuides::new(), config.as_ref().map(|c| &c.inner))
    }

    /// Parse a `{"stateGuides": [...]}` document.
    #[staticmethod]
    #[pyo3(signature = (json, config = None))]
    fn from_json(json: &str, config: Option<PySimulationConfig>) -> PyResult<Self> {
        let guides = InMemoryGuides::from_json(json).map_err(value_err)?;
        Ok(Self::from_guides(guides, config.as_ref().map(|c| &c.inner)))
    }

    /// Load the first readable guide file; empty engine if none loads.
    #[staticmethod]
    #[pyo3(signature = (paths, config = None))]
    fn load(paths: Vec<String>, config: Option<PySimulationConfig>) -> Self {
        let guides = InMemoryGuides::load_first_available(&paths);
        Self::from_guides(guides, config.as_ref().map(|c| &c.inner))
    }

    fn guide_count(&self) -> usize {
        self.guides.len()
    }

    fn label_for(&self, state_id: usize) -> String {
        self.guides.label_for(state_id)
    }

    fn branch(&self, value: f64) -> &'static str {
        match self.inner.branch(value) {
            NarrativeBranch::Flow => "flow",
            NarrativeBranch::Resistance => "resistance",
            NarrativeBranch::Stabilization => "stabilization",
        }
    }

    fn narrative(&self, state_id: usize, value: f64) -> String {
        self.inner.narrative(state_id, value)
    }

    /// Top-k insights for a final state (baseline defaults to the canonical one).
    #[pyo3(signature = (final_values, baseline = None, k = 3))]
    fn inspect<'py>(
        &self,
        py: Python<'py>,
        final_values: Vec<f64>,
        baseline: Option<Vec<f64>>,
        k: usize,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let baseline = baseline.unwrap_or_else(baseline_state);
        let insights = inspect(&final_values, &baseline, &self.inner, k).map_err(value_err)?;
        insights
            .iter()
            .map(|i| {
                let dict = PyDict::new(py);
                dict.set_item("label", i.entry.label.as_str())?;
                dict.set_item("state_id", i.entry.state_id)?;
                dict.set_item("final_value", i.entry.final_value)?;
                dict.set_item("delta", i.entry.delta)?;
                dict.set_item("has_guide", i.has_guide)?;
                dict.set_item("polarity", i.polarity.as_str())?;
                dict.set_item("mood", i.mood.as_str())?;
                dict.set_item("keywords", i.keywords.clone())?;
                dict.set_item("physical_function", i.physical_function.as_str())?;
                dict.set_item("manifestation", i.manifestation.as_str())?;
                dict.set_item("instantiation_effect", i.instantiation_effect.as_str())?;
                dict.set_item("narrative", i.narrative.as_str())?;
                Ok(dict)
            })
            .collect()
    }

    /// Plain-text guidance report for a final state.
    #[pyo3(signature = (intent, final_values, life_stage = None, k = 3))]
    fn report_text(
        &self,
        intent: &str,
        final_values: Vec<f64>,
        life_stage: Option<&str>,
        k: usize,
    ) -> PyResult<String> {
        let insights =
            inspect(&final_values, &baseline_state(), &self.inner, k).map_err(value_err)?;
        let report = AlignmentReport {
            intent: intent.to_string(),
            life_stage: parse_stage(life_stage)?,
            insights,
        };
        Ok(report.render_text())
    }
}

// ─── Free functions ─────────────────────────────────────────────────

/// The four canonical coupling matrices as nested lists (C, L, R, F).
#[pyfunction]
fn build_matrices(py: Python<'_>) -> PyResult<Bound<'_, PyDict>> {
    let m = CouplingMatrices::canonical();
    let dict = PyDict::new(py);
    dict.set_item("core", rows(&m.core))?;
    dict.set_item("surface", rows(&m.surface))?;
    dict.set_item("projection", rows(&m.projection))?;
    dict.set_item("feedback", rows(&m.feedback))?;
    Ok(dict)
}

/// Top-k states by |final − baseline|.
#[pyfunction]
#[pyo3(signature = (final_values, baseline = None, k = 3))]
fn impact_entries(
    py: Python<'_>,
    final_values: Vec<f64>,
    baseline: Option<Vec<f64>>,
    k: usize,
) -> PyResult<Vec<Bound<'_, PyDict>>> {
    let baseline = baseline.unwrap_or_else(baseline_state);
    let entries =
        valence_physics::impact_entries(&final_values, &baseline, k).map_err(value_err)?;
    impact_dicts(py, &entries)
}

/// Closed polar trace `(r, theta)` for the radial surface plot.
#[pyfunction]
fn radial_trace(values: Vec<f64>) -> Vec<(f64, f64)> {
    valence_physics::geometry::radial_trace(&values)
}

/// `C1`..`C7`, `S8`..`S22`.
#[pyfunction]
fn state_labels() -> Vec<String> {
    labels()
}

// ─── Module Registration ────────────────────────────────────────────

/// Valence Kernel — Rust core/surface state-evolution engine for the
/// Valence-Pi dashboard.
#[pymodule]
fn valence_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulationConfig>()?;
    m.add_class::<PySimulator>()?;
    m.add_class::<PyNarrativeEngine>()?;
    m.add_function(wrap_pyfunction!(build_matrices, m)?)?;
    m.add_function(wrap_pyfunction!(impact_entries, m)?)?;
    m.add_function(wrap_pyfunction!(state_labels, m)?)?;
    m.add_function(wrap_pyfunction!(radial_trace, m)?)?;
    Ok(())
}
