// src/main.rs
//
// Research-harness CLI entrypoint for rosace.
//
// Runs the two-agent comparison for a fixed number of steps, prints a
// concise run header and a final summary, and can optionally dump one
// JSON line per step for offline analysis.

use anyhow::Result;
use clap::{ArgAction, Parser};

use rosace::config::Config;
use rosace::logging::{FileSink, NoopSink, StepSink};
use rosace::sim::Simulation;

#[derive(Debug, Parser)]
#[command(
    name = "rosace",
    about = "Adjoint vs finite-difference online parameter estimation, side by side",
    version
)]
struct Args {
    /// Number of simulation steps to run.
    #[arg(long, default_value_t = 200)]
    steps: u64,

    /// Deterministic seed for the world noise stream.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Initial base learning rate for both agents.
    #[arg(long, default_value_t = 0.02)]
    lr: f64,

    /// Central-difference epsilon for the finite-difference agent.
    #[arg(long, default_value_t = 0.001)]
    eps: f64,

    /// Exploration range scaling the candidate action menu.
    #[arg(long, default_value_t = 1.0)]
    exploration: f64,

    /// Rolling-window length knob (interface compatibility).
    #[arg(long, default_value_t = 10)]
    window: usize,

    /// Optional JSONL output path (one step record per line).
    #[arg(long)]
    jsonl: Option<String>,

    /// Verbosity: -v prints per-step progress every 20 steps, -vv
    /// every step.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = Config::default();
    cfg.world.seed = args.seed;
    cfg.agent.learning_rate = args.lr;
    cfg.agent.fd_epsilon = args.eps;
    cfg.agent.exploration_range = args.exploration;
    cfg.agent.window_size = args.window;

    println!(
        "rosace | steps={} | seed={} | lr={} | eps={} | exploration={}",
        args.steps, args.seed, args.lr, args.eps, args.exploration
    );

    let mut sink: Box<dyn StepSink> = match &args.jsonl {
        Some(path) => Box::new(FileSink::create(path)?),
        None => Box::new(NoopSink),
    };

    let mut sim = Simulation::new(cfg);
    let progress_every = match args.verbose {
        0 => u64::MAX,
        1 => 20,
        _ => 1,
    };

    for i in 0..args.steps {
        let record = sim.step();
        sink.log_step(&record)?;

        if progress_every != u64::MAX && (i + 1) % progress_every == 0 {
            println!(
                "step {:>5} | {}: theta_err={:.4} threat={:.2} | {}: theta_err={:.4} threat={:.2}",
                record.step,
                record.agent_a.name,
                record.agent_a.theta_error,
                record.agent_a.threat,
                record.agent_b.name,
                record.agent_b.theta_error,
                record.agent_b.threat,
            );
        }
    }
    sink.flush()?;

    let history = sim.history();
    print_summary("A", sim.agent_a().name(), &history.agent_a);
    print_summary("B", sim.agent_b().name(), &history.agent_b);

    Ok(())
}

fn print_summary(slot: &str, name: &str, history: &rosace::agent::AgentHistory) {
    let final_theta_err = history.theta_errors.last().copied().unwrap_or(f64::NAN);
    let final_cum_reward = history.cumulative_reward.last().copied().unwrap_or(0.0);
    println!(
        "agent {slot} ({name:>10}) | final_theta_err={final_theta_err:.5} | cumulative_reward={final_cum_reward:.3}"
    );
}
