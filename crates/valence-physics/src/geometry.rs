// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Radial Geometry
// ─────────────────────────────────────────────────────────────────────
//! Helpers for laying states out on a circle: the core ring and the
//! surface circumference are each spaced evenly over [0, 2π).

use std::f64::consts::TAU;

use valence_types::N_SURFACE;

pub fn polar_to_cartesian(r: f64, theta: f64) -> (f64, f64) {
    (r * theta.cos(), r * theta.sin())
}

/// Evenly spaced angles in [0, 2π), endpoint excluded.
pub fn ring_angles(n: usize) -> Vec<f64> {
    (0..n).map(|i| TAU * i as f64 / n as f64).collect()
}

/// Shortest angular distance between every pair of surface states.
pub fn circular_distance_matrix() -> [[f64; N_SURFACE]; N_SURFACE] {
    let angles = ring_angles(N_SURFACE);
    let mut dist = [[0.0f64; N_SURFACE]; N_SURFACE];
    for (i, row) in dist.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let diff = (angles[i] - angles[j]).abs();
            *cell = diff.min(TAU - diff);
        }
    }
    dist
}

/// Closed `(r, theta)` polygon for a polar plot: one vertex per value,
/// with the first vertex repeated at the end. Empty input gives an
/// empty trace.
pub fn radial_trace(values: &[f64]) -> Vec<(f64, f64)> {
    let angles = ring_angles(values.len());
    let mut trace: Vec<(f64, f64)> = values.iter().copied().zip(angles).collect();
    if let Some(&first) = trace.first() {
        trace.push(first);
    }
    trace
}
