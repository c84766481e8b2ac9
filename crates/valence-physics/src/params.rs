// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Canonical Parameters
// ─────────────────────────────────────────────────────────────────────
//! Baseline vectors, default damping, and the four fixed coupling
//! matrices for the 7 core (backbone) and 15 surface (circumference)
//! states.
//!
//! Surface indices below are `state number - 8`; core indices are
//! `state number - 1`.

use serde::{Deserialize, Serialize};

use valence_types::{N_CORE, N_STATES, N_SURFACE};

/// Core self/cross coupling, N_CORE × N_CORE.
pub type CoreMatrix = [[f64; N_CORE]; N_CORE];
/// Surface lateral coupling, N_SURFACE × N_SURFACE.
pub type SurfaceMatrix = [[f64; N_SURFACE]; N_SURFACE];
/// Core → surface influence, N_SURFACE × N_CORE.
pub type ProjectionMatrix = [[f64; N_CORE]; N_SURFACE];
/// Surface self-persistence and feedback, N_SURFACE × N_SURFACE.
pub type FeedbackMatrix = [[f64; N_SURFACE]; N_SURFACE];

/// Default pull-to-target strength.
pub const PROPAGATION_DAMPING: f64 = 0.62;

/// Default core state (C1..C7).
pub const BASELINE_CORE: [f64; N_CORE] = [0.50, -0.60, 0.20, -0.30, -0.40, -0.50, -0.70];

/// Default surface state (S8..S22).
pub const BASELINE_SURFACE: [f64; N_SURFACE] = [
    -0.30, -0.50, -0.40, 0.30, 0.00, -0.20, 0.20, -0.30, -0.40, -0.50, -0.40, -0.60, 0.30, -0.20,
    -0.10,
];

const CORE_SELF: f64 = 0.85;
// Weakness in one backbone state destabilises the rest.
const CORE_CROSS: f64 = 0.12;

const SURFACE_SELF: f64 = 0.6;

/// Explicit surface couplings (row, col, value), 0-indexed.
pub const SURFACE_COUPLINGS: [(usize, usize, f64); 6] = [
    (7, 4, 0.35),   // Knowledge S12 → Strategy S15
    (1, 4, 0.45),   // Knowledge S12 → Clarity S9
    (7, 13, 0.50),  // Purpose S21 → Strategy S15
    (3, 9, 0.40),   // Abundance S17 → Expansion S11
    (13, 8, 0.25),  // Endurance S16 → Purpose S21
    (14, 5, -0.30), // Creation S13 ⊣ Void/Completion S22
];

const PROJECTION_BASE: f64 = 0.15;

/// Coherence (C7) gates Clarity (S9): (surface row, core col, value).
pub const PROJECTION_GATEKEEPER: (usize, usize, f64) = (1, 6, 0.55);

const FEEDBACK_SELF: f64 = 0.15;

/// Strategy (S15) feeds back onto Static/Dynamic (index 3).
pub const FEEDBACK_OVERRIDE: (usize, usize, f64) = (7, 3, 0.20);

/// Build the 7×7 core matrix: 0.85 on the diagonal, 0.12 elsewhere.
pub fn build_core_matrix() -> CoreMatrix {
    let mut c = [[CORE_CROSS; N_CORE]; N_CORE];
    for (i, row) in c.iter_mut().enumerate() {
        row[i] = CORE_SELF;
    }
    c
}

/// Build the 15×15 surface matrix: 0.6 self-persistence plus the
/// explicit coupling table.
pub fn build_surface_matrix() -> SurfaceMatrix {
    let mut l = [[0.0f64; N_SURFACE]; N_SURFACE];
    for (i, row) in l.iter_mut().enumerate() {
        row[i] = SURFACE_SELF;
    }
    for &(i, j, val) in &SURFACE_COUPLINGS {
        l[i][j] = val;
    }
    l
}

/// Build the 15×7 projection matrix: uniform 0.15 core → surface push
/// with the gatekeeper override.
pub fn build_projection_matrix() -> ProjectionMatrix {
    let mut r = [[PROJECTION_BASE; N_CORE]; N_SURFACE];
    let (i, j, val) = PROJECTION_GATEKEEPER;
    r[i][j] = val;
    r
}

/// Build the 15×15 feedback matrix: 0.15 identity baseline plus one
/// feedback entry.
pub fn build_feedback_matrix() -> FeedbackMatrix {
    let mut f = [[0.0f64; N_SURFACE]; N_SURFACE];
    for (i, row) in f.iter_mut().enumerate() {
        row[i] = FEEDBACK_SELF;
    }
    let (i, j, val) = FEEDBACK_OVERRIDE;
    f[i][j] = val;
    f
}

/// Baseline core followed by baseline surface.
pub fn baseline_state() -> Vec<f64> {
    let mut all = Vec::with_capacity(N_STATES);
    all.extend_from_slice(&BASELINE_CORE);
    all.extend_from_slice(&BASELINE_SURFACE);
    all
}

/// The four interaction matrices used by one run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingMatrices {
    /// C: core self/cross coupling.
    pub core: CoreMatrix,
    /// L: surface lateral coupling.
    pub surface: SurfaceMatrix,
    /// R: core → surface projection.
    pub projection: ProjectionMatrix,
    /// F: surface feedback.
    pub feedback: FeedbackMatrix,
}

impl CouplingMatrices {
    /// Canonical matrices, rebuilt fresh on each call.
    pub fn canonical() -> Self {
        Self {
            core: build_core_matrix(),
            surface: build_surface_matrix(),
            projection: build_projection_matrix(),
            feedback: build_feedback_matrix(),
        }
    }

    /// All-zero matrices: no internal dynamics at all.
    pub fn zeros() -> Self {
        Self {
            core: [[0.0; N_CORE]; N_CORE],
            surface: [[0.0; N_SURFACE]; N_SURFACE],
            projection: [[0.0; N_CORE]; N_SURFACE],
            feedback: [[0.0; N_SURFACE]; N_SURFACE],
        }
    }
}

impl Default for CouplingMatrices {
    fn default() -> Self {
        Self::canonical()
    }
}
