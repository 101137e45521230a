//! Rosace core library.
//!
//! Rosace simulates a stochastic, partially-observed linear dynamical
//! process and runs two online parameter estimators against it side by
//! side: one using a central finite-difference gradient of the
//! observation-prediction error, the other computing the same gradient
//! analytically by direct sensitivity (adjoint) differentiation of the
//! dynamics matrix. The binary (`src/main.rs`) is just a thin research
//! harness around these components.
//!
//! # Architecture
//!
//! - **Dynamics** (`dynamics`): the parametric transition matrix A(θ),
//!   its exact partial derivatives, the fixed projection / lift
//!   matrices, the reward function, and the candidate action menu.
//!   Pure functions, no state.
//!
//! - **World** (`world`): the true stochastic process, with a
//!   step-keyed replayable noise stream so two transitions within one
//!   coordinator step consume the identical Gaussian draw.
//!
//! - **Agent** (`agent`): shared estimation lifecycle — one-step greedy
//!   action selection, threat-adaptive learning rate, pseudo-inverse
//!   latent correction, history bookkeeping — polymorphic over a single
//!   `GradientEstimator` seam.
//!
//! - **Estimators** (`estimator`): the two interchangeable gradient
//!   strategies, `FiniteDifference` (O(2N) forward evaluations) and
//!   `Adjoint` (O(N), closed form).
//!
//! - **Coordinator** (`sim`): drives one world against both agents with
//!   synchronized noise and aggregates a serializable record per step.
//!
//! - **Logging** (`logging`): `StepSink` trait with no-op and JSONL
//!   implementations; the boundary a push transport would plug into.

pub mod agent;
pub mod config;
pub mod dynamics;
pub mod estimator;
pub mod logging;
pub mod sim;
pub mod types;
pub mod world;

// --- Re-exports for ergonomic external use ---------------------------------

pub use agent::{Agent, AgentHistory, GradientContext, GradientEstimator, ScoredAction};
pub use config::{AgentConfig, Config, WorldConfig};
pub use estimator::{Adjoint, FiniteDifference};
pub use logging::{FileSink, NoopSink, StepSink};
pub use sim::{AgentReport, RunHistory, Simulation, StepRecord};
pub use world::{NoiseStream, WorldModel};
