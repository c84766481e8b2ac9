// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Core/Surface Evolution Step
// ─────────────────────────────────────────────────────────────────────
//! Discrete clipped linear update for the 22-state field:
//!
//!   Δc = d·(c* − c) + C·c
//!   Δs = d·(s* − s) + R·c + F·s + [no surface target] L·s
//!
//!   c ← clip(c + Δc, −1, 1),  s ← clip(s + Δs, −1, 1)
//!
//! The target terms only apply when a target is supplied. The core
//! coupling C·c is always on, while the surface lateral term L·s is
//! switched off whenever a surface target is present.

use serde::{Deserialize, Serialize};

use valence_types::{
    clamp_value, ensure_finite, to_array, Trajectory, ValenceError, ValenceResult, ValenceState,
    N_CORE, N_SURFACE,
};

use crate::params::CouplingMatrices;

/// Optional pull-to-target vectors for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    pub core: Option<[f64; N_CORE]>,
    pub surface: Option<[f64; N_SURFACE]>,
}

impl Targets {
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from caller slices; each supplied target must match its
    /// group's length and be finite.
    pub fn new(core: Option<&[f64]>, surface: Option<&[f64]>) -> ValenceResult<Self> {
        let core = core
            .map(|c| {
                ensure_finite("target_core", c)?;
                to_array::<N_CORE>("target_core", c)
            })
            .transpose()?;
        let surface = surface
            .map(|s| {
                ensure_finite("target_surface", s)?;
                to_array::<N_SURFACE>("target_surface", s)
            })
            .transpose()?;
        Ok(Self { core, surface })
    }
}

#[inline]
fn mat_vec<const R: usize, const C: usize>(m: &[[f64; C]; R], v: &[f64; C]) -> [f64; R] {
    let mut out = [0.0; R];
    for (o, row) in out.iter_mut().zip(m) {
        *o = row.iter().zip(v).map(|(a, b)| a * b).sum();
    }
    out
}

/// Single-step integrator over fixed matrices and damping.
#[derive(Debug, Clone)]
pub struct Evolver {
    matrices: CouplingMatrices,
    damping: f64,
}

impl Evolver {
    pub fn new(matrices: CouplingMatrices, damping: f64) -> ValenceResult<Self> {
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
        Ok(Self { matrices, damping })
    }

    /// Canonical matrices with the given damping.
    pub fn canonical(damping: f64) -> ValenceResult<Self> {
        Self::new(CouplingMatrices::canonical(), damping)
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn matrices(&self) -> &CouplingMatrices {
        &self.matrices
    }

    /// Advance the state by one step. Both deltas read the pre-step state.
    pub fn step(&self, state: &ValenceState, targets: &Targets) -> ValenceState {
        let m = &self.matrices;
        let d = self.damping;
        let core = &state.core;
        let surface = &state.surface;

        let mut core_delta = [0.0f64; N_CORE];
        if let Some(tc) = &targets.core {
            for i in 0..N_CORE {
                core_delta[i] += d * (tc[i] - core[i]);
            }
        }
        let c_core = mat_vec(&m.core, core);
        for (delta, c) in core_delta.iter_mut().zip(c_core) {
            *delta += c;
        }

        let mut surface_delta = [0.0f64; N_SURFACE];
        if let Some(ts) = &targets.surface {
            for i in 0..N_SURFACE {
                surface_delta[i] += d * (ts[i] - surface[i]);
            }
        }
        let projected = mat_vec(&m.projection, core);
        let fed_back = mat_vec(&m.feedback, surface);
        for i in 0..N_SURFACE {
            surface_delta[i] += projected[i];
            surface_delta[i] += fed_back[i];
        }
        // Lateral coupling and target pull are mutually exclusive.
        if targets.surface.is_none() {
            let lateral = mat_vec(&m.surface, surface);
            for (delta, l) in surface_delta.iter_mut().zip(lateral) {
                *delta += l;
            }
        }

        let mut next = ValenceState::zeros();
        for i in 0..N_CORE {
            next.core[i] = clamp_value(core[i] + core_delta[i], -1.0, 1.0);
        }
        for i in 0..N_SURFACE {
            next.surface[i] = clamp_value(surface[i] + surface_delta[i], -1.0, 1.0);
        }
        next
    }

    /// Run `steps` updates, recording the initial state and every step.
    pub fn run(
        &self,
        initial: &ValenceState,
        targets: &Targets,
        steps: usize,
    ) -> ValenceResult<Trajectory> {
        initial.validate()?;
        log::debug!(
            "evolve: steps={steps} damping={:.3} target_core={} target_surface={}",
            self.damping,
            targets.core.is_some(),
            targets.surface.is_some()
        );

        let mut history = Trajectory::with_capacity(steps)?;
        history.push(initial);
        let mut state = *initial;
        for _ in 0..steps {
            state = self.step(&state, targets);
            history.push(&state);
        }
        Ok(history)
    }
}

/// Evolve core and surface vectors for `steps` updates.
///
/// Returns both histories, each of length `steps + 1`.
pub fn evolve(
    core: &[f64],
    surface: &[f64],
    steps: usize,
    target_core: Option<&[f64]>,
    target_surface: Option<&[f64]>,
    matrices: &CouplingMatrices,
    damping: f64,
) -> ValenceResult<Trajectory> {
    let initial = ValenceState::new(core, surface)?;
    let targets = Targets::new(target_core, target_surface)?;
    Evolver::new(matrices.clone(), damping)?.run(&initial, &targets, steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{BASELINE_CORE, BASELINE_SURFACE};

    fn assert_bounded(traj: &Trajectory) {
        for (t, (c, s)) in traj.core.iter().zip(&traj.surface).enumerate() {
            for v in c.iter().chain(s.iter()) {
                assert!((-1.0..=1.0).contains(v), "t={t}: {v} out of [-1, 1]");
            }
        }
    }

    #[test]
    fn test_history_length() {
        let m = CouplingMatrices::canonical();
        for steps in [0usize, 1, 5, 37] {
            let traj = evolve(
                &BASELINE_CORE,
                &BASELINE_SURFACE,
                steps,
                None,
                None,
                &m,
                0.62,
            )
            .unwrap();
            assert_eq!(traj.core.len(), steps + 1);
            assert_eq!(traj.surface.len(), steps + 1);
        }
    }

    #[test]
    fn test_zero_steps_identity() {
        let traj = evolve(
            &BASELINE_CORE,
            &BASELINE_SURFACE,
            0,
            Some(&[1.0; N_CORE]),
            Some(&[1.0; N_SURFACE]),
            &CouplingMatrices::canonical(),
            0.9,
        )
        .unwrap();
        assert_eq!(traj.core, vec![BASELINE_CORE]);
        assert_eq!(traj.surface, vec![BASELINE_SURFACE]);
    }

    #[test]
    fn test_clamp_invariant_under_strong_targets() {
        let m = CouplingMatrices::canonical();
        let cases: [(Option<[f64; N_CORE]>, Option<[f64; N_SURFACE]>); 4] = [
            (None, None),
            (Some([1.0; N_CORE]), None),
            (None, Some([-1.0; N_SURFACE])),
            (Some([-1.0; N_CORE]), Some([1.0; N_SURFACE])),
        ];
        for (tc, ts) in cases {
            let traj = evolve(
                &[0.99; N_CORE],
                &[-0.99; N_SURFACE],
                50,
                tc.as_ref().map(|t| t.as_slice()),
                ts.as_ref().map(|t| t.as_slice()),
                &m,
                1.0,
            )
            .unwrap();
            assert_bounded(&traj);
        }
    }

    #[test]
    fn test_zero_matrices_fixed_point() {
        let traj = evolve(
            &BASELINE_CORE,
            &BASELINE_SURFACE,
            20,
            None,
            None,
            &CouplingMatrices::zeros(),
            0.62,
        )
        .unwrap();
        for t in 0..=20 {
            assert_eq!(traj.core[t], BASELINE_CORE, "core drifted at t={t}");
            assert_eq!(traj.surface[t], BASELINE_SURFACE, "surface drifted at t={t}");
        }
    }

    #[test]
    fn test_surface_target_disables_lateral_coupling() {
        // Only L is non-zero: with a surface target the step must be the
        // pure target pull d·(s* − s), computed here analytically.
        let mut m = CouplingMatrices::zeros();
        m.surface = crate::params::build_surface_matrix();
        let d = 0.25;
        let target = [0.5; N_SURFACE];
        let start = [0.1; N_SURFACE];

        let traj = evolve(&[0.0; N_CORE], &start, 3, None, Some(&target), &m, d).unwrap();

        let mut expected = start;
        for t in 1..=3 {
            for i in 0..N_SURFACE {
                let delta = 0.0 + d * (target[i] - expected[i]);
                expected[i] = (expected[i] + delta).clamp(-1.0, 1.0);
            }
            assert_eq!(traj.surface[t], expected, "mismatch at t={t}");
        }
    }

    #[test]
    fn test_lateral_coupling_applies_without_target() {
        let mut m = CouplingMatrices::zeros();
        m.surface = crate::params::build_surface_matrix();
        let start = [0.1; N_SURFACE];
        let traj = evolve(&[0.0; N_CORE], &start, 1, None, None, &m, 0.5).unwrap();
        // S9 (index 1): 0.1 + 0.6·0.1 + 0.45·0.1
        assert!((traj.surface[1][1] - (0.1 + 0.06 + 0.045)).abs() < 1e-12);
    }

    #[test]
    fn test_core_coupling_always_on() {
        let mut m = CouplingMatrices::zeros();
        m.core = crate::params::build_core_matrix();
        let traj = evolve(
            &[0.1; N_CORE],
            &[0.0; N_SURFACE],
            1,
            Some(&[0.1; N_CORE]),
            None,
            &m,
            0.5,
        )
        .unwrap();
        // Target equals state, so only C·c moves it: 0.1 + (0.85 + 6·0.12)·0.1
        let expected = 0.1 + (0.85 + 6.0 * 0.12) * 0.1;
        for v in traj.core[1] {
            assert!((v - expected).abs() < 1e-12, "{v} != {expected}");
        }
    }

    #[test]
    fn test_projection_uses_pre_step_core() {
        let mut m = CouplingMatrices::zeros();
        m.core = crate::params::build_core_matrix();
        m.projection = crate::params::build_projection_matrix();
        let core = [0.1; N_CORE];
        let traj = evolve(&core, &[0.0; N_SURFACE], 1, None, None, &m, 0.0).unwrap();
        // S8 (index 0): 7 × 0.15 × 0.1 from the old core, not the updated one.
        assert!((traj.surface[1][0] - 7.0 * 0.15 * 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let m = CouplingMatrices::canonical();
        let err = evolve(&[0.0; 6], &[0.0; N_SURFACE], 1, None, None, &m, 0.5).unwrap_err();
        assert_eq!(err, ValenceError::shape("core", N_CORE, 6));

        let err = evolve(
            &[0.0; N_CORE],
            &[0.0; N_SURFACE],
            1,
            None,
            Some(&[0.0; 14]),
            &m,
            0.5,
        )
        .unwrap_err();
        assert_eq!(err, ValenceError::shape("target_surface", N_SURFACE, 14));
    }

    #[test]
    fn test_nan_target_rejected() {
        let mut target = [0.0; N_CORE];
        target[2] = f64::NAN;
        let err = evolve(
            &[0.0; N_CORE],
            &[0.0; N_SURFACE],
            1,
            Some(&target),
            None,
            &CouplingMatrices::canonical(),
            0.5,
        )
        .unwrap_err();
        assert!(matches!(err, ValenceError::Numerical(_)));
    }

    #[test]
    fn test_damping_out_of_range_rejected() {
        assert!(Evolver::canonical(1.01).is_err());
        assert!(Evolver::canonical(-0.01).is_err());
        assert!(Evolver::canonical(f64::INFINITY).is_err());
        assert!(Evolver::canonical(0.0).is_ok());
    }

    #[test]
    fn test_run_rejects_unbounded_initial() {
        let evolver = Evolver::canonical(0.5).unwrap();
        let mut state = ValenceState::zeros();
        state.core[0] = 2.0;
        assert!(evolver.run(&state, &Targets::none(), 3).is_err());
    }

    #[test]
    fn test_run_huge_step_count_is_error() {
        let evolver = Evolver::canonical(0.5).unwrap();
        let state = ValenceState::zeros();
        assert!(matches!(
            evolver.run(&state, &Targets::none(), usize::MAX),
            Err(ValenceError::Validation(_))
        ));
    }

    #[test]
    fn test_step_matches_run() {
        let evolver = Evolver::canonical(0.62).unwrap();
        let initial = ValenceState::new(&BASELINE_CORE, &BASELINE_SURFACE).unwrap();
        let targets = Targets::new(Some(&[0.7; N_CORE]), None).unwrap();
        let traj = evolver.run(&initial, &targets, 2).unwrap();
        let s1 = evolver.step(&initial, &targets);
        let s2 = evolver.step(&s1, &targets);
        assert_eq!(traj.state_at(1), Some(s1));
        assert_eq!(traj.state_at(2), Some(s2));
    }
}
