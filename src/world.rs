// src/world.rs
//
// True world process: stochastic transition under the (hidden) true
// dynamics parameters, plus the replayable noise stream that makes a
// two-agent comparison fair.
//
// Noise is keyed by step index rather than drawn from a shared mutable
// cursor: each step gets its own counter-derived ChaCha stream, so the
// two agents' transitions within one coordinator step consume the
// identical Gaussian draw regardless of evaluation order. This removes
// the save/restore ordering hazard a stateful generator would carry.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::config::WorldConfig;
use crate::dynamics::{build_matrix, observe, ACTION_LIFT, TRUE_THETA};
use crate::types::{add3, mat3_mul_vec3, mat3x2_mul_vec2, Action2, Vec3};

/// Replayable source of per-step Gaussian noise.
///
/// Deterministic given (seed, step): querying the same step twice
/// yields bit-identical draws, which is exactly the "same noise per
/// step across agents" guarantee the coordinator relies on.
#[derive(Debug, Clone)]
pub struct NoiseStream {
    seed: u64,
    std: f64,
}

impl NoiseStream {
    pub fn new(seed: u64, std: f64) -> Self {
        Self { seed, std }
    }

    /// Three independent N(0, std²) draws for the given step index.
    pub fn gaussian3(&self, step: u64) -> Vec3 {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(step);
        let mut out = [0.0; 3];
        for v in &mut out {
            let z: f64 = rng.sample(StandardNormal);
            *v = self.std * z;
        }
        out
    }
}

/// The true world: holds the true dynamics parameters (never visible
/// to the estimation logic) and the noise stream.
#[derive(Debug, Clone)]
pub struct WorldModel {
    true_theta: Vec3,
    noise: NoiseStream,
    obs_bound: f64,
}

impl WorldModel {
    pub fn new(cfg: &WorldConfig) -> Self {
        Self {
            true_theta: TRUE_THETA,
            noise: NoiseStream::new(cfg.seed, cfg.noise_std),
            obs_bound: cfg.obs_bound,
        }
    }

    /// True parameter vector, for diagnostics only.
    pub fn true_theta(&self) -> Vec3 {
        self.true_theta
    }

    /// Advance the latent state one step under the true dynamics:
    /// s' = A(θ*)·s + B·a + ε, with ε keyed by `step`.
    ///
    /// If either observed component of s' exceeds the bound, the whole
    /// 3-D state is rescaled by the single factor that brings the worst
    /// violator back to the bound. Note this also rescales the
    /// unobserved third component even though the bound is defined on
    /// the observed plane; that behavior is intentional and preserved.
    pub fn transition(&self, step: u64, state: &Vec3, action: &Action2) -> Vec3 {
        let a = build_matrix(&self.true_theta);
        let noise = self.noise.gaussian3(step);

        let drift = mat3_mul_vec3(&a, state);
        let lift = mat3x2_mul_vec2(&ACTION_LIFT, action);
        let mut next = add3(&add3(&drift, &lift), &noise);

        let obs = observe(&next);
        if obs[0].abs() > self.obs_bound || obs[1].abs() > self.obs_bound {
            let mut scale = 1.0_f64;
            if obs[0].abs() > self.obs_bound {
                scale = scale.min(self.obs_bound / obs[0].abs());
            }
            if obs[1].abs() > self.obs_bound {
                scale = scale.min(self.obs_bound / obs[1].abs());
            }
            for v in &mut next {
                *v *= scale;
            }
        }

        next
    }
}
