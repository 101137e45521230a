// src/agent.rs
//
// Shared agent lifecycle for the estimator comparison.
//
// An Agent owns a parameter estimate θ̂, a latent-state estimate ŝ, and
// a threat-adaptive learning rate. Every step it:
//   1. predicts the next latent state under its own belief,
//   2. measures the observation residual against the true outcome,
//   3. updates threat / effective learning rate from rolling windows,
//   4. delegates the θ̂ update to its gradient estimator,
//   5. corrects ŝ by the pseudo-inverse of the residual,
//   6. decays the base learning rate and records history.
//
// The gradient estimator is the single polymorphic seam: the lifecycle
// is identical for both agents, so any performance difference between
// them is attributable to the gradient computation alone.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{AgentConfig, LEARNING_RATE_DECAY, MIN_LEARNING_RATE, REWARD_WINDOW};
use crate::dynamics::{
    build_matrix, observe, reward, scaled_actions, ACTION_LABELS, ACTION_LIFT, S0, THETA0,
    TRUE_THETA,
};
use crate::types::{
    add3, mat3_mul_vec3, mat3x2_mul_vec2, norm2, norm3, sub2, sub3, Action2, Mat3x2, Obs2, Vec3,
};

/// Everything a gradient estimator may read when updating θ̂.
///
/// All fields are snapshots taken *before* the latent-state correction,
/// so both estimators differentiate the same prediction.
pub struct GradientContext<'a> {
    /// Action actually taken this step.
    pub action: &'a Action2,
    /// Observation of the true next state.
    pub observed: &'a Obs2,
    /// Latent-state estimate the prediction was made from.
    pub latent_estimate: &'a Vec3,
    /// Residual: observed − predicted observation.
    pub error: &'a Obs2,
    /// ‖error‖₂.
    pub error_magnitude: f64,
}

/// One interchangeable gradient-computation strategy.
///
/// Implementations mutate `theta` in place, one component-wise update
/// per call, scaled by the agent's current effective learning rate.
pub trait GradientEstimator {
    /// Stable display name, used in step records and run summaries.
    fn name(&self) -> &'static str;

    /// Apply one gradient-descent update to `theta`.
    fn update(&self, theta: &mut Vec3, ctx: &GradientContext<'_>, learning_rate: f64);
}

/// One scored entry of the candidate action menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAction {
    /// Glyph label from the fixed menu.
    pub label: String,
    /// The scaled action vector.
    pub action: Action2,
    /// Reward predicted at the belief-based next state.
    pub expected_reward: f64,
}

/// Per-step result handed back to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Observation residual (observed − predicted).
    pub error: Obs2,
    /// ‖error‖₂.
    pub error_magnitude: f64,
    /// Observation the agent predicted for this step.
    pub predicted_observation: Obs2,
    /// Reward actually collected at the true next state.
    pub actual_reward: f64,
    /// Diagnostic distance ‖θ̂ − θ*‖ (never fed back into learning).
    pub theta_error: f64,
}

/// Append-only per-step history, one record per completed step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentHistory {
    pub theta_errors: Vec<f64>,
    pub obs_errors: Vec<f64>,
    pub rewards: Vec<f64>,
    pub cumulative_reward: Vec<f64>,
}

impl AgentHistory {
    pub fn len(&self) -> usize {
        self.theta_errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta_errors.is_empty()
    }
}

/// A parameter-estimating agent: shared lifecycle, pluggable gradient.
pub struct Agent {
    estimator: Box<dyn GradientEstimator>,
    theta: Vec3,
    latent_estimate: Vec3,
    threat: f64,
    base_lr: f64,
    initial_lr: f64,
    effective_lr: f64,
    exploration_range: f64,
    recent_rewards: VecDeque<f64>,
    recent_pred_errors: VecDeque<f64>,
    history: AgentHistory,
    cumulative_reward: f64,
    pinv: Mat3x2,
}

impl Agent {
    pub fn new(estimator: Box<dyn GradientEstimator>, cfg: &AgentConfig) -> Self {
        let mut agent = Self {
            estimator,
            theta: THETA0,
            latent_estimate: S0,
            threat: 0.0,
            base_lr: cfg.learning_rate,
            initial_lr: cfg.learning_rate,
            effective_lr: cfg.learning_rate,
            exploration_range: cfg.exploration_range,
            recent_rewards: VecDeque::with_capacity(REWARD_WINDOW + 1),
            recent_pred_errors: VecDeque::with_capacity(REWARD_WINDOW + 1),
            history: AgentHistory::default(),
            cumulative_reward: 0.0,
            pinv: crate::dynamics::projection_pinv(),
        };
        agent.reset();
        agent
    }

    /// Return the agent to its initial, reproducible conditions and
    /// discard all history.
    pub fn reset(&mut self) {
        self.theta = THETA0;
        self.latent_estimate = S0;
        self.threat = 0.0;
        self.base_lr = self.initial_lr;
        self.effective_lr = self.initial_lr;
        self.recent_rewards.clear();
        self.recent_pred_errors.clear();
        self.history = AgentHistory::default();
        self.cumulative_reward = 0.0;
    }

    pub fn name(&self) -> &'static str {
        self.estimator.name()
    }

    pub fn theta(&self) -> Vec3 {
        self.theta
    }

    pub fn latent_estimate(&self) -> Vec3 {
        self.latent_estimate
    }

    pub fn threat(&self) -> f64 {
        self.threat
    }

    pub fn base_learning_rate(&self) -> f64 {
        self.base_lr
    }

    pub fn effective_learning_rate(&self) -> f64 {
        self.effective_lr
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn history(&self) -> &AgentHistory {
        &self.history
    }

    /// Predict the next latent state from the current belief, without
    /// noise or clamping: ŝ' = A(θ̂)·ŝ + B·a.
    pub fn predict(&self, action: &Action2) -> Vec3 {
        let a = build_matrix(&self.theta);
        add3(
            &mat3_mul_vec3(&a, &self.latent_estimate),
            &mat3x2_mul_vec2(&ACTION_LIFT, action),
        )
    }

    /// Score every candidate action by the reward predicted at the
    /// belief-based next state, and pick the best.
    ///
    /// One-step greedy under the current belief; ties go to the first
    /// candidate in menu order.
    pub fn select_action(&self) -> (usize, Action2, Vec<ScoredAction>) {
        let actions = scaled_actions(self.exploration_range);

        let scores: Vec<ScoredAction> = actions
            .iter()
            .zip(ACTION_LABELS.iter())
            .map(|(a, label)| ScoredAction {
                label: (*label).to_string(),
                action: *a,
                expected_reward: reward(&self.predict(a)),
            })
            .collect();

        let mut best_idx = 0;
        for (i, s) in scores.iter().enumerate() {
            if s.expected_reward > scores[best_idx].expected_reward {
                best_idx = i;
            }
        }

        (best_idx, scores[best_idx].action, scores)
    }

    /// One learning step, after the world has transitioned.
    ///
    /// `action` is the action actually taken; `new_state` is the true
    /// latent state the world produced (the agent only ever looks at
    /// its observation).
    pub fn step(&mut self, action: &Action2, new_state: &Vec3) -> StepOutcome {
        let new_obs = observe(new_state);

        // Belief-based re-prediction for the action actually taken.
        let predicted_state = self.predict(action);
        let predicted_obs = observe(&predicted_state);
        let error = sub2(&new_obs, &predicted_obs);
        let error_magnitude = norm2(&error);

        // Threat from rolling reward / predictability windows.
        let actual_reward = reward(new_state);
        let predicted_reward = reward(&predicted_state);
        let reward_pred_error = (actual_reward - predicted_reward).abs();

        push_bounded(&mut self.recent_rewards, actual_reward);
        push_bounded(&mut self.recent_pred_errors, reward_pred_error);

        let avg_reward = mean(&self.recent_rewards);
        let avg_pred_error = mean(&self.recent_pred_errors);

        let low_reward_threat = (0.3 - avg_reward).max(0.0) / 0.8;
        let pred_error_threat = (avg_pred_error / 0.8).min(1.0);
        self.threat = low_reward_threat.max(pred_error_threat).clamp(0.0, 1.0);
        self.effective_lr = self.base_lr * (1.0 + 4.0 * self.threat);

        // Gradient strategy mutates θ̂ in place.
        let ctx = GradientContext {
            action,
            observed: &new_obs,
            latent_estimate: &self.latent_estimate,
            error: &error,
            error_magnitude,
        };
        self.estimator.update(&mut self.theta, &ctx, self.effective_lr);

        // Minimum-norm latent correction consistent with the residual.
        let correction = mat3x2_mul_vec2(&self.pinv, &error);
        self.latent_estimate = add3(&predicted_state, &correction);

        // Decay the base rate, floored.
        self.base_lr = (self.base_lr * LEARNING_RATE_DECAY).max(MIN_LEARNING_RATE);

        // History bookkeeping.
        let theta_error = norm3(&sub3(&self.theta, &TRUE_THETA));
        self.cumulative_reward += actual_reward;
        self.history.theta_errors.push(theta_error);
        self.history.obs_errors.push(error_magnitude);
        self.history.rewards.push(actual_reward);
        self.history.cumulative_reward.push(self.cumulative_reward);

        StepOutcome {
            error,
            error_magnitude,
            predicted_observation: predicted_obs,
            actual_reward,
            theta_error,
        }
    }
}

/// Push onto a rolling window, evicting the oldest entry past the
/// fixed capacity.
fn push_bounded(window: &mut VecDeque<f64>, value: f64) {
    window.push_back(value);
    if window.len() > REWARD_WINDOW {
        window.pop_front();
    }
}

fn mean(window: &VecDeque<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    /// Estimator that leaves θ̂ untouched, for lifecycle-only tests.
    struct FrozenEstimator;

    impl GradientEstimator for FrozenEstimator {
        fn name(&self) -> &'static str {
            "Frozen"
        }

        fn update(&self, _theta: &mut Vec3, _ctx: &GradientContext<'_>, _lr: f64) {}
    }

    fn frozen_agent() -> Agent {
        Agent::new(Box::new(FrozenEstimator), &AgentConfig::default())
    }

    #[test]
    fn select_action_scores_full_menu() {
        let agent = frozen_agent();
        let (idx, action, scores) = agent.select_action();

        assert_eq!(scores.len(), 9);
        assert!(idx < 9);
        assert_eq!(action, scores[idx].action);
        for s in &scores {
            assert!(s.expected_reward >= -1.0 && s.expected_reward <= 1.0);
        }
        // Chosen score is maximal.
        for s in &scores {
            assert!(scores[idx].expected_reward >= s.expected_reward);
        }
    }

    #[test]
    fn ties_resolve_to_first_menu_entry() {
        let agent = frozen_agent();
        let (idx, _, scores) = agent.select_action();
        for (i, s) in scores.iter().enumerate() {
            if s.expected_reward == scores[idx].expected_reward {
                assert!(idx <= i);
                break;
            }
        }
    }

    #[test]
    fn threat_stays_in_unit_interval_and_lr_floors() {
        let mut agent = frozen_agent();
        // Drive the agent through wildly wrong outcomes; threat must
        // stay clipped and the base rate must decay monotonically to
        // the floor.
        let mut prev_base = agent.base_learning_rate();
        for i in 0..1500 {
            let bad_state = [2.0, -2.0, (i as f64 * 0.37).sin()];
            agent.step(&[0.1, 0.1], &bad_state);

            let threat = agent.threat();
            assert!((0.0..=1.0).contains(&threat), "threat {threat} out of range");

            let base = agent.base_learning_rate();
            assert!(base <= prev_base + 1e-15);
            assert!(base >= MIN_LEARNING_RATE - 1e-15);
            prev_base = base;
        }
        // After 1500 decays the floor is binding.
        assert!((agent.base_learning_rate() - MIN_LEARNING_RATE).abs() < 1e-12);
    }

    #[test]
    fn effective_rate_scales_with_threat() {
        let mut agent = frozen_agent();
        agent.step(&[0.0, 0.0], &[-2.0, 2.0, 1.0]);
        let expected = agent.base_learning_rate() / LEARNING_RATE_DECAY * (1.0 + 4.0 * agent.threat());
        // base_lr was decayed after the effective rate was computed.
        assert!((agent.effective_learning_rate() - expected).abs() < 1e-12);
    }

    #[test]
    fn cumulative_reward_is_exact_prefix_sum() {
        let mut agent = frozen_agent();
        let mut state = S0;
        for i in 0..60 {
            state[2] = (i as f64 * 0.1).sin();
            agent.step(&[0.05, -0.05], &state);
        }

        let h = agent.history();
        let mut acc = 0.0;
        for (r, c) in h.rewards.iter().zip(h.cumulative_reward.iter()) {
            acc += r;
            assert_eq!(acc, *c);
        }
    }

    #[test]
    fn rolling_windows_stay_bounded() {
        let mut agent = frozen_agent();
        for _ in 0..50 {
            agent.step(&[0.0, 0.0], &[1.0, 0.5, 0.0]);
        }
        assert!(agent.recent_rewards.len() <= REWARD_WINDOW);
        assert!(agent.recent_pred_errors.len() <= REWARD_WINDOW);
    }

    #[test]
    fn latent_correction_explains_residual() {
        // After a step, the estimate's observation must coincide with
        // the observed outcome: ŝ = ŝ_pred + P⁺e ⇒ P·ŝ = o_true.
        let mut agent = frozen_agent();
        let new_state = [0.9, 0.6, 0.1];
        agent.step(&[0.1, 0.0], &new_state);

        let est_obs = observe(&agent.latent_estimate());
        let true_obs = observe(&new_state);
        for i in 0..2 {
            assert!((est_obs[i] - true_obs[i]).abs() < 1e-10);
        }
    }

    #[test]
    fn reset_restores_initial_conditions() {
        let mut agent = frozen_agent();
        for _ in 0..25 {
            agent.step(&[0.2, 0.1], &[0.4, -0.3, 0.2]);
        }
        assert!(!agent.history().is_empty());

        agent.reset();
        assert_eq!(agent.theta(), THETA0);
        assert_eq!(agent.latent_estimate(), S0);
        assert_eq!(agent.threat(), 0.0);
        assert_eq!(agent.base_learning_rate(), AgentConfig::default().learning_rate);
        assert!(agent.history().is_empty());
        assert_eq!(agent.cumulative_reward(), 0.0);
    }
}
