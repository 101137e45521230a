// tests/lifecycle_tests.rs
//
// Run-level invariants of the agent lifecycle, checked through the
// public coordinator API over a full simulation: threat clipping,
// learning-rate decay and floor, exact cumulative-reward bookkeeping,
// and reset reproducibility.

use rosace::config::{Config, MIN_LEARNING_RATE};
use rosace::sim::Simulation;

#[test]
fn threat_is_clipped_throughout_a_long_run() {
    let mut sim = Simulation::new(Config::default());
    for _ in 0..500 {
        let record = sim.step();
        for report in [&record.agent_a, &record.agent_b] {
            assert!(
                (0.0..=1.0).contains(&report.threat),
                "{}: threat {} outside [0,1] at step {}",
                report.name,
                report.threat,
                record.step
            );
        }
    }
}

#[test]
fn base_learning_rate_decays_to_its_floor() {
    let mut sim = Simulation::new(Config::default());

    let mut prev_a = sim.agent_a().base_learning_rate();
    let mut prev_b = sim.agent_b().base_learning_rate();

    // 0.02 · 0.998^n crosses the 0.003 floor near n = 950.
    for _ in 0..1200 {
        sim.step();

        let a = sim.agent_a().base_learning_rate();
        let b = sim.agent_b().base_learning_rate();
        assert!(a <= prev_a && a >= MIN_LEARNING_RATE);
        assert!(b <= prev_b && b >= MIN_LEARNING_RATE);
        prev_a = a;
        prev_b = b;
    }

    assert!((sim.agent_a().base_learning_rate() - MIN_LEARNING_RATE).abs() < 1e-12);
    assert!((sim.agent_b().base_learning_rate() - MIN_LEARNING_RATE).abs() < 1e-12);
}

#[test]
fn cumulative_reward_is_an_exact_prefix_sum() {
    let mut sim = Simulation::new(Config::default());
    for _ in 0..150 {
        sim.step();
    }

    let history = sim.history();
    for h in [&history.agent_a, &history.agent_b] {
        let mut acc = 0.0;
        for (r, c) in h.rewards.iter().zip(h.cumulative_reward.iter()) {
            acc += r;
            assert_eq!(acc, *c, "cumulative reward must be the exact running sum");
        }
    }
}

#[test]
fn reset_discards_history_and_reproduces_the_run() {
    let mut sim = Simulation::new(Config::default());
    let first: Vec<_> = (0..40).map(|_| sim.step()).collect();

    sim.reset(42, 10);
    assert_eq!(sim.history().agent_a.len(), 0);
    assert_eq!(sim.history().agent_b.len(), 0);

    let second: Vec<_> = (0..40).map(|_| sim.step()).collect();
    for (r1, r2) in first.iter().zip(second.iter()) {
        assert_eq!(r1.agent_a.true_state, r2.agent_a.true_state);
        assert_eq!(r1.agent_a.theta, r2.agent_a.theta);
        assert_eq!(r1.agent_b.true_state, r2.agent_b.true_state);
        assert_eq!(r1.agent_b.theta, r2.agent_b.theta);
    }
}

#[test]
fn observations_never_leave_the_bound() {
    let cfg = Config::default();
    let bound = cfg.world.obs_bound;

    let mut sim = Simulation::new(cfg);
    for _ in 0..300 {
        let record = sim.step();
        for report in [&record.agent_a, &record.agent_b] {
            assert!(report.obs[0].abs() <= bound + 1e-9);
            assert!(report.obs[1].abs() <= bound + 1e-9);
        }
    }
}
