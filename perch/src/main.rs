//! Trains a DQN agent on the flappy-bird game, or plays it with saved parameters.
//!
//! ```bash
//! perch train --config config.yaml --episodes 10000
//! perch play --params models/params_dqn_2021-03-04-05-06_100000steps.safetensors
//! ```
mod config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use config::PerchConfig;
use log::info;
use perch_candle_agent::{dqn::Dqn, Device};
use perch_core::{Env as _, Runner, TesterConfig};
use perch_flappy_env::FlappyEnv;
use perch_tensorboard::TensorboardRecorder;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// YAML file with the configurations of the environment, the agent and the trainer
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a GPU if one is available
    #[arg(long, default_value_t = false, global = true)]
    cuda: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the agent from scratch
    Train {
        /// Number of episodes
        #[arg(long, default_value_t = 100000)]
        episodes: usize,

        /// Directory of TensorBoard logs
        #[arg(long, default_value = "./runs")]
        logdir: PathBuf,

        /// Print the configuration and exit
        #[arg(long, default_value_t = false)]
        show_config: bool,
    },

    /// Play with saved parameters, without learning
    Play {
        /// Parameters written during training
        #[arg(long)]
        params: PathBuf,

        /// Number of episodes
        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// Exploration rate
        #[arg(long, default_value_t = 0.01)]
        eps: f64,
    },
}

fn load_config(args: &Args) -> Result<PerchConfig> {
    let config = match &args.config {
        Some(path) => PerchConfig::load(path)?,
        None => PerchConfig::default(),
    };
    let config = match args.cuda {
        true => PerchConfig {
            agent: config.agent.device(Device::cuda_if_available(0)),
            ..config
        },
        false => config,
    };
    Ok(config)
}

fn train(args: &Args, episodes: usize, logdir: &Path, show_config: bool) -> Result<()> {
    let config = load_config(args)?;
    let env = FlappyEnv::build(&config.env)?;
    let config = config.align_agent(env.action_set().len());

    if show_config {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    std::fs::create_dir_all(&config.trainer.model_dir)?;
    config.save(PathBuf::from(&config.trainer.model_dir).join("config.yaml"))?;

    let agent = Dqn::build(config.agent.clone())?;
    let recorder = TensorboardRecorder::new(logdir)?;
    let mut runner = Runner::trainer(env, agent, &config.trainer, recorder)?;
    let rewards = runner.run_experiment(episodes)?;

    let best = rewards.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    info!(
        "Trained for {} steps, best episode reward {:.2}",
        runner.total_steps(),
        best
    );
    Ok(())
}

fn play(args: &Args, params: &Path, episodes: usize, eps: f64) -> Result<()> {
    let config = load_config(args)?;
    let env = FlappyEnv::build(&config.env)?;
    let config = config.align_agent(env.action_set().len());
    let tester_config = TesterConfig::default()
        .eps(eps)
        .max_ep_steps(config.trainer.max_ep_steps)
        .frame_stack(config.trainer.frame_stack)
        .downscale(config.trainer.downscale);

    let agent = Dqn::build(config.agent)?;
    let mut runner = Runner::tester(env, agent, &tester_config, params)?;
    let rewards = runner.run_experiment(episodes)?;

    let mean = rewards.iter().sum::<f32>() / rewards.len().max(1) as f32;
    info!("Mean reward over {} episodes: {:.2}", rewards.len(), mean);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match &args.command {
        Command::Train {
            episodes,
            logdir,
            show_config,
        } => train(&args, *episodes, logdir, *show_config),
        Command::Play {
            params,
            episodes,
            eps,
        } => play(&args, params, *episodes, *eps),
    }
}
