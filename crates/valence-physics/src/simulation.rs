// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Simulation Driver
// ─────────────────────────────────────────────────────────────────────
//! Wires the matrix builders and the evolution step together:
//!
//!   1. Validate the configuration and the step count
//!   2. Resolve damping (explicit → life stage → config default)
//!   3. Build C, L, R, F fresh
//!   4. Seed missing initial vectors from the injected RNG
//!   5. Evolve and return the trajectory or the equilibrium
//!
//! Randomness is always supplied by the caller (or owned by a
//! `Simulator`); nothing here touches a global generator.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use valence_types::{
    Equilibrium, LifeStage, SimulationConfig, Trajectory, ValenceError, ValenceResult,
    ValenceState, N_CORE, N_SURFACE,
};

use crate::analysis::{impact_entries, ImpactEntry};
use crate::dynamics::{Evolver, Targets};
use crate::params::{baseline_state, CouplingMatrices};

/// Caller-owned inputs for one simulation run.
///
/// `None` fields fall back to the `SimulationConfig` defaults (or, for
/// the initial vectors, to a uniform random draw).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    pub initial_core: Option<Vec<f64>>,
    pub initial_surface: Option<Vec<f64>>,
    pub target_core: Option<Vec<f64>>,
    pub target_surface: Option<Vec<f64>>,
    pub steps: Option<i64>,
    pub damping: Option<f64>,
    pub life_stage: Option<LifeStage>,
}

impl SimulationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(mut self, core: &[f64], surface: &[f64]) -> Self {
        self.initial_core = Some(core.to_vec());
        self.initial_surface = Some(surface.to_vec());
        self
    }

    pub fn with_target_core(mut self, target: &[f64]) -> Self {
        self.target_core = Some(target.to_vec());
        self
    }

    pub fn with_target_surface(mut self, target: &[f64]) -> Self {
        self.target_surface = Some(target.to_vec());
        self
    }

    pub fn with_steps(mut self, steps: i64) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = Some(damping);
        self
    }

    pub fn with_life_stage(mut self, stage: LifeStage) -> Self {
        self.life_stage = Some(stage);
        self
    }
}

/// Convert a caller step count, rejecting negatives.
pub fn checked_steps(steps: i64) -> ValenceResult<usize> {
    usize::try_from(steps).map_err(|_| ValenceError::InvalidStepCount(steps))
}

fn random_vector<const N: usize, R: Rng + ?Sized>(rng: &mut R, spread: f64) -> [f64; N] {
    let dist = Uniform::new_inclusive(-spread, spread);
    let mut out = [0.0; N];
    for v in out.iter_mut() {
        *v = dist.sample(rng);
    }
    out
}

fn initial_state<R: Rng + ?Sized>(
    request: &SimulationRequest,
    spread: f64,
    rng: &mut R,
) -> ValenceResult<ValenceState> {
    let core = match &request.initial_core {
        Some(c) => c.clone(),
        None => {
            log::debug!("initial core omitted, sampling from [-{spread}, {spread}]");
            random_vector::<N_CORE, R>(rng, spread).to_vec()
        }
    };
    let surface = match &request.initial_surface {
        Some(s) => s.clone(),
        None => {
            log::debug!("initial surface omitted, sampling from [-{spread}, {spread}]");
            random_vector::<N_SURFACE, R>(rng, spread).to_vec()
        }
    };
    ValenceState::new(&core, &surface)
}

/// Run the engine and return the full trajectory.
pub fn compute_trajectory<R: Rng + ?Sized>(
    request: &SimulationRequest,
    config: &SimulationConfig,
    rng: &mut R,
) -> ValenceResult<Trajectory> {
    config.validate()?;
    let default_steps = i64::try_from(config.default_steps).unwrap_or(i64::MAX);
    let steps = checked_steps(request.steps.unwrap_or(default_steps))?;
    let damping = config.resolve_damping(request.damping, request.life_stage)?;

    let matrices = CouplingMatrices::canonical();
    let initial = initial_state(request, config.init_spread, rng)?;
    let targets = Targets::new(
        request.target_core.as_deref(),
        request.target_surface.as_deref(),
    )?;

    Evolver::new(matrices, damping)?.run(&initial, &targets, steps)
}

/// Run the engine and return the concatenated final state together
/// with the raw histories.
pub fn compute_equilibrium<R: Rng + ?Sized>(
    request: &SimulationRequest,
    config: &SimulationConfig,
    rng: &mut R,
) -> ValenceResult<Equilibrium> {
    let trajectory = compute_trajectory(request, config, rng)?;
    let last = trajectory
        .final_state()
        .ok_or_else(|| ValenceError::Validation("trajectory is empty".to_string()))?;
    Ok(Equilibrium {
        final_state: last.concat(),
        trajectory,
    })
}

/// Driver that owns its configuration and a seeded random source.
pub struct Simulator {
    config: SimulationConfig,
    rng: StdRng,
}

impl Simulator {
    /// Validate `config` and seed the RNG from `config.seed`.
    pub fn from_config(config: SimulationConfig) -> ValenceResult<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    /// Default configuration with an explicit seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: SimulationConfig {
                seed,
                ..SimulationConfig::default()
            },
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Re-seed the random source, e.g. to replay a run.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn compute_trajectory(&mut self, request: &SimulationRequest) -> ValenceResult<Trajectory> {
        compute_trajectory(request, &self.config, &mut self.rng)
    }

    pub fn compute_equilibrium(
        &mut self,
        request: &SimulationRequest,
    ) -> ValenceResult<Equilibrium> {
        compute_equilibrium(request, &self.config, &mut self.rng)
    }

    /// Top `config.top_k` states by change from the canonical baseline.
    pub fn impact(&self, equilibrium: &Equilibrium) -> ValenceResult<Vec<ImpactEntry>> {
        impact_entries(&equilibrium.final_state, &baseline_state(), self.config.top_k)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::with_seed(SimulationConfig::default().seed)
    }
}
