// src/dynamics.rs
//
// Parameterized dynamics for the rosace world.
//
// Latent state s ∈ R^3 evolves as
//     s' = A(θ)·s + B·a + ε
// and is observed through a fixed 2×3 projection
//     o = P·s.
//
// θ = (r, s, d) parameterizes A: the top-left 2×2 block is a rotation
// by angle r scaled by s, the bottom-right entry is 1 + 0.5·d. This
// module owns A(θ), its exact partial derivatives ∂A/∂θ_k, the fixed
// matrices P / B / P⁺, the reward function, and the candidate action
// menu. Everything here is pure and total.

use crate::types::{Action2, Mat2x3, Mat3, Mat3x2, Obs2, Vec3};

/// True dynamics parameters of the world. Diagnostic only: agents
/// estimate these and never read them.
pub const TRUE_THETA: Vec3 = [0.15, 0.98, 0.12];

/// Initial parameter estimate for both agents.
pub const THETA0: Vec3 = [0.0, 1.0, 0.0];

/// Initial latent state, shared by both agents' trajectories.
pub const S0: Vec3 = [1.0, 0.5, 0.0];

/// Projection matrix P (2×3): latent 3-D → observed 2-D.
pub const PROJECTION: Mat2x3 = [[1.0, 0.0, 0.3], [0.0, 1.0, 0.5]];

/// Action lift matrix B (3×2): 2-D action → 3-D latent increment.
pub const ACTION_LIFT: Mat3x2 = [[1.0, 0.0], [0.0, 1.0], [0.2, -0.1]];

/// Glyph labels for the 9 candidate actions (8 compass directions plus
/// "stay"), in the fixed menu order used everywhere.
pub const ACTION_LABELS: [&str; 9] = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖", "·"];

const DIAG: f64 = 0.707;

/// Unit-ish candidate actions before exploration scaling, in the same
/// order as `ACTION_LABELS`.
pub const BASE_ACTIONS: [Action2; 9] = [
    [0.0, -1.0],
    [DIAG, -DIAG],
    [1.0, 0.0],
    [DIAG, DIAG],
    [0.0, 1.0],
    [-DIAG, DIAG],
    [-1.0, 0.0],
    [-DIAG, -DIAG],
    [0.0, 0.0],
];

/// Build the 3×3 dynamics matrix A(θ) for θ = (r, s, d).
pub fn build_matrix(theta: &Vec3) -> Mat3 {
    let (r, s, d) = (theta[0], theta[1], theta[2]);
    let (sn, c) = r.sin_cos();
    [
        [s * c, -s * sn, 0.0],
        [s * sn, s * c, 0.0],
        [0.0, 0.0, 1.0 + 0.5 * d],
    ]
}

/// Exact partial derivatives [∂A/∂r, ∂A/∂s, ∂A/∂d] in closed form.
///
/// ∂A/∂r swaps the rotation block for its angle derivative (scaled by
/// s), ∂A/∂s drops the scale from the rotation block, and ∂A/∂d is
/// zero except for the 0.5 in the bottom-right entry.
pub fn derivatives(theta: &Vec3) -> [Mat3; 3] {
    let (r, s) = (theta[0], theta[1]);
    let (sn, c) = r.sin_cos();

    let d_dr: Mat3 = [
        [-s * sn, -s * c, 0.0],
        [s * c, -s * sn, 0.0],
        [0.0, 0.0, 0.0],
    ];
    let d_ds: Mat3 = [[c, -sn, 0.0], [sn, c, 0.0], [0.0, 0.0, 0.0]];
    let d_dd: Mat3 = [[0.0; 3], [0.0; 3], [0.0, 0.0, 0.5]];

    [d_dr, d_ds, d_dd]
}

/// Project a latent state to its observation: o = P·s.
pub fn observe(state: &Vec3) -> Obs2 {
    crate::types::mat2x3_mul_vec3(&PROJECTION, state)
}

/// Reward over the latent state.
pub fn reward(state: &Vec3) -> f64 {
    (5.0 * state[2] + state[0]).sin() * (3.0 * state[2] - state[1]).cos()
}

/// Candidate actions scaled by the exploration range.
pub fn scaled_actions(exploration_range: f64) -> [Action2; 9] {
    let k = 0.5 * exploration_range;
    let mut out = BASE_ACTIONS;
    for a in &mut out {
        a[0] *= k;
        a[1] *= k;
    }
    out
}

/// Moore–Penrose pseudo-inverse of the projection: P⁺ = Pᵀ(PPᵀ)⁻¹.
///
/// P has full row rank so the 2×2 Gram matrix PPᵀ is invertible and
/// the closed form is exact. `P⁺·e` is the minimum-norm latent
/// correction consistent with an observed residual e.
pub fn projection_pinv() -> Mat3x2 {
    let p = &PROJECTION;

    // Gram matrix G = P·Pᵀ (2×2).
    let mut g = [[0.0_f64; 2]; 2];
    for (i, gi) in g.iter_mut().enumerate() {
        for (j, gij) in gi.iter_mut().enumerate() {
            *gij = (0..3).map(|k| p[i][k] * p[j][k]).sum();
        }
    }

    let det = g[0][0] * g[1][1] - g[0][1] * g[1][0];
    let g_inv = [
        [g[1][1] / det, -g[0][1] / det],
        [-g[1][0] / det, g[0][0] / det],
    ];

    // P⁺ = Pᵀ · G⁻¹ (3×2).
    let mut pinv = [[0.0_f64; 2]; 3];
    for (k, row) in pinv.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = p[0][k] * g_inv[0][j] + p[1][k] * g_inv[1][j];
        }
    }
    pinv
}
