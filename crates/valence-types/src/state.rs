// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Valence Kernel State Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{ValenceError, ValenceResult};

/// Number of core (backbone) states, ids 1..=7.
pub const N_CORE: usize = 7;
/// Number of surface (expressive) states, ids 8..=22.
pub const N_SURFACE: usize = 15;
/// Total state count across both groups.
pub const N_STATES: usize = N_CORE + N_SURFACE;

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_value(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_value: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_value: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Copy a slice into a fixed-size array, failing on length mismatch.
pub fn to_array<const N: usize>(what: &'static str, values: &[f64]) -> ValenceResult<[f64; N]> {
    <[f64; N]>::try_from(values).map_err(|_| ValenceError::shape(what, N, values.len()))
}

/// Reject NaN/Inf components.
pub fn ensure_finite(what: &str, values: &[f64]) -> ValenceResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(ValenceError::Numerical(format!(
            "{what}[{i}] is not finite ({})",
            values[i]
        ))),
        None => Ok(()),
    }
}

/// Reject components outside [-1, 1].
pub fn ensure_bounded(what: &str, values: &[f64]) -> ValenceResult<()> {
    match values.iter().position(|v| !(-1.0..=1.0).contains(v)) {
        Some(i) => Err(ValenceError::Validation(format!(
            "{what}[{i}] = {} lies outside [-1, 1]",
            values[i]
        ))),
        None => Ok(()),
    }
}

/// Snapshot of the full core + surface state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValenceState {
    pub core: [f64; N_CORE],
    pub surface: [f64; N_SURFACE],
}

impl ValenceState {
    /// Build a state from caller slices.
    ///
    /// Lengths must equal `N_CORE`/`N_SURFACE`, every component must be
    /// finite and within [-1, 1]. Nothing is truncated or padded.
    pub fn new(core: &[f64], surface: &[f64]) -> ValenceResult<Self> {
        let core = to_array::<N_CORE>("core", core)?;
        let surface = to_array::<N_SURFACE>("surface", surface)?;
        let state = Self { core, surface };
        state.validate()?;
        Ok(state)
    }

    pub fn zeros() -> Self {
        Self {
            core: [0.0; N_CORE],
            surface: [0.0; N_SURFACE],
        }
    }

    pub fn validate(&self) -> ValenceResult<()> {
        ensure_finite("core", &self.core)?;
        ensure_finite("surface", &self.surface)?;
        ensure_bounded("core", &self.core)?;
        ensure_bounded("surface", &self.surface)
    }

    /// All components within [-1, 1].
    pub fn is_bounded(&self) -> bool {
        self.core
            .iter()
            .chain(self.surface.iter())
            .all(|v| (-1.0..=1.0).contains(v))
    }

    /// Core followed by surface, length `N_STATES`.
    pub fn concat(&self) -> Vec<f64> {
        let mut all = Vec::with_capacity(N_STATES);
        all.extend_from_slice(&self.core);
        all.extend_from_slice(&self.surface);
        all
    }
}

fn too_long(steps: usize, reason: impl std::fmt::Display) -> ValenceError {
    ValenceError::Validation(format!(
        "cannot hold a history of {steps} steps: {reason}"
    ))
}

/// Per-step record of a run. Both histories have length `steps + 1`;
/// entry 0 is the unmodified initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub core: Vec<[f64; N_CORE]>,
    pub surface: Vec<[f64; N_SURFACE]>,
}

impl Trajectory {
    /// Empty trajectory with room for `steps + 1` entries.
    ///
    /// A history too large to allocate is a `Validation` error, never
    /// an abort.
    pub fn with_capacity(steps: usize) -> ValenceResult<Self> {
        let entries = steps.checked_add(1).ok_or_else(|| too_long(steps, "overflow"))?;
        let mut traj = Self {
            core: Vec::new(),
            surface: Vec::new(),
        };
        traj.core
            .try_reserve_exact(entries)
            .map_err(|e| too_long(steps, e))?;
        traj.surface
            .try_reserve_exact(entries)
            .map_err(|e| too_long(steps, e))?;
        Ok(traj)
    }

    pub fn push(&mut self, state: &ValenceState) {
        self.core.push(state.core);
        self.surface.push(state.surface);
    }

    /// Number of recorded entries (steps + 1).
    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Number of update steps taken.
    pub fn steps(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn state_at(&self, t: usize) -> Option<ValenceState> {
        Some(ValenceState {
            core: *self.core.get(t)?,
            surface: *self.surface.get(t)?,
        })
    }

    pub fn initial(&self) -> Option<ValenceState> {
        self.state_at(0)
    }

    pub fn final_state(&self) -> Option<ValenceState> {
        self.state_at(self.steps())
    }

    /// One concatenated row per time step, for plotting the whole field.
    pub fn combined(&self) -> Vec<Vec<f64>> {
        self.core
            .iter()
            .zip(&self.surface)
            .map(|(c, s)| c.iter().chain(s.iter()).copied().collect())
            .collect()
    }
}

/// Final-state view of a run alongside its raw histories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    /// Final core followed by final surface, length `N_STATES`.
    pub final_state: Vec<f64>,
    pub trajectory: Trajectory,
}

impl Equilibrium {
    /// `None` unless `final_state` holds exactly `N_STATES` values.
    pub fn final_core(&self) -> Option<&[f64]> {
        self.final_state
            .get(..N_CORE)
            .filter(|_| self.final_state.len() == N_STATES)
    }

    /// `None` unless `final_state` holds exactly `N_STATES` values.
    pub fn final_surface(&self) -> Option<&[f64]> {
        self.final_state
            .get(N_CORE..)
            .filter(|_| self.final_state.len() == N_STATES)
    }
}
