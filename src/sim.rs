// src/sim.rs
//
// Simulation coordinator: one world, two agents, synchronized noise.
//
// Each agent keeps its own true latent trajectory (their actions
// differ, so the trajectories diverge), but within one coordinator
// step both transitions consume the identical step-keyed noise draw.
// That pins every difference between the two histories on the
// gradient-estimation method rather than on incidental noise.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentHistory, ScoredAction};
use crate::config::Config;
use crate::dynamics::{observe, reward, S0};
use crate::estimator::{Adjoint, FiniteDifference};
use crate::types::{Obs2, Vec3};
use crate::world::WorldModel;

/// Per-agent slice of one coordinator step, shaped for serialization
/// to an external presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    pub name: String,
    /// Observation of the new true state.
    pub obs: Obs2,
    /// Observation of the state before this step.
    pub prev_obs: Obs2,
    /// New true latent state.
    pub true_state: Vec3,
    /// Reward at the state before this step.
    pub reward: f64,
    /// Index of the chosen action in the fixed menu.
    pub action_idx: usize,
    /// Glyph label of the chosen action.
    pub action_label: String,
    /// Full scored candidate menu.
    pub scores: Vec<ScoredAction>,
    /// Updated parameter estimate.
    pub theta: Vec3,
    /// Diagnostic ‖θ̂ − θ*‖.
    pub theta_error: f64,
    /// Observation-error magnitude this step.
    pub obs_error: f64,
    pub threat: f64,
    pub cumulative_reward: f64,
}

/// One aggregated simulation step across both agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub agent_a: AgentReport,
    pub agent_b: AgentReport,
    /// Diagnostic only; never visible to the agents.
    pub true_theta: Vec3,
}

/// Both agents' full histories, keyed by display name order (A = finite
/// difference, B = adjoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHistory {
    pub agent_a: AgentHistory,
    pub agent_b: AgentHistory,
}

/// Drives one world against two independently-believing agents.
pub struct Simulation {
    config: Config,
    world: WorldModel,
    agent_a: Agent,
    agent_b: Agent,
    state_a: Vec3,
    state_b: Vec3,
    step_count: u64,
}

impl Simulation {
    /// Build the standard comparison: agent A estimates by central
    /// finite differences, agent B by the analytical adjoint.
    pub fn new(config: Config) -> Self {
        let agent_a = Agent::new(
            Box::new(FiniteDifference::new(config.agent.fd_epsilon)),
            &config.agent,
        );
        let agent_b = Agent::new(Box::new(Adjoint::new()), &config.agent);
        let world = WorldModel::new(&config.world);

        Self {
            config,
            world,
            agent_a,
            agent_b,
            state_a: S0,
            state_b: S0,
            step_count: 0,
        }
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn agent_a(&self) -> &Agent {
        &self.agent_a
    }

    pub fn agent_b(&self) -> &Agent {
        &self.agent_b
    }

    /// Reinitialize the world and both agents to reproducible initial
    /// conditions, discarding all history.
    pub fn reset(&mut self, seed: u64, window_size: usize) {
        self.config.world.seed = seed;
        self.config.agent.window_size = window_size;
        self.world = WorldModel::new(&self.config.world);
        self.agent_a.reset();
        self.agent_b.reset();
        self.state_a = S0;
        self.state_b = S0;
        self.step_count = 0;
    }

    /// Advance one step for both agents and aggregate the results.
    pub fn step(&mut self) -> StepRecord {
        // Both transitions below use the same step index, hence the
        // same noise draw.
        let noise_step = self.step_count;

        let report_a = run_agent_step(
            &mut self.agent_a,
            &self.world,
            &mut self.state_a,
            noise_step,
        );
        let report_b = run_agent_step(
            &mut self.agent_b,
            &self.world,
            &mut self.state_b,
            noise_step,
        );

        self.step_count += 1;

        StepRecord {
            step: self.step_count,
            agent_a: report_a,
            agent_b: report_b,
            true_theta: self.world.true_theta(),
        }
    }

    /// Full per-step histories for both agents.
    pub fn history(&self) -> RunHistory {
        RunHistory {
            agent_a: self.agent_a.history().clone(),
            agent_b: self.agent_b.history().clone(),
        }
    }
}

/// One agent's half of a coordinator step: observe, act, transition,
/// learn, report.
fn run_agent_step(
    agent: &mut Agent,
    world: &WorldModel,
    state: &mut Vec3,
    noise_step: u64,
) -> AgentReport {
    let prev_obs = observe(state);
    let prev_reward = reward(state);

    let (action_idx, action, scores) = agent.select_action();
    let new_state = world.transition(noise_step, state, &action);
    let outcome = agent.step(&action, &new_state);
    *state = new_state;

    AgentReport {
        name: agent.name().to_string(),
        obs: observe(state),
        prev_obs,
        true_state: *state,
        reward: prev_reward,
        action_idx,
        action_label: scores[action_idx].label.clone(),
        scores,
        theta: agent.theta(),
        theta_error: outcome.theta_error,
        obs_error: outcome.error_magnitude,
        threat: agent.threat(),
        cumulative_reward: agent.cumulative_reward(),
    }
}
