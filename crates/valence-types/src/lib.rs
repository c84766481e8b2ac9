// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Valence Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Valence Kernel — the core/surface state-evolution engine behind
//! the Valence-Pi structural simulator.

pub mod config;
pub mod error;
pub mod state;

pub use config::{LifeStage, SimulationConfig};
pub use error::{ValenceError, ValenceResult};
pub use state::{
    clamp_value, ensure_bounded, ensure_finite, to_array, Equilibrium, Trajectory, ValenceState,
    N_CORE, N_STATES, N_SURFACE,
};
