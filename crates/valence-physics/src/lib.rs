// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Structural Dynamics Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Core/surface state evolution: fixed coupling matrices, the
//! clipped linear update rule, the simulation driver, and result
//! extraction for the 22-state Valence-Pi field.

pub mod analysis;
pub mod dynamics;
pub mod geometry;
pub mod params;
pub mod simulation;

pub use analysis::{
    concat_state, deltas, impact_entries, state_id, state_label, state_labels, top_impact,
    ImpactEntry, StateGroup,
};
pub use dynamics::{evolve, Evolver, Targets};
pub use params::{
    baseline_state, build_core_matrix, build_feedback_matrix, build_projection_matrix,
    build_surface_matrix, CouplingMatrices, BASELINE_CORE, BASELINE_SURFACE, PROPAGATION_DAMPING,
};
pub use simulation::{
    checked_steps, compute_equilibrium, compute_trajectory, SimulationRequest, Simulator,
};
pub use valence_types::{N_CORE, N_STATES, N_SURFACE};
