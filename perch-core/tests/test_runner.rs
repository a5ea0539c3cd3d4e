use anyhow::{anyhow, Result};
use image::{DynamicImage, ImageBuffer, Luma};
use perch_core::{
    record::{BufferedRecorder, NullRecorder, Record, Recorder},
    Agent, Env, Mode, Policy, Runner, StackedFrames, TesterConfig, TrainerConfig, Transition,
};
use std::{
    cell::Cell,
    path::{Path, PathBuf},
};
use tempdir::TempDir;

const SIDE: u32 = 8;
const N_STACK: usize = 4;
const FRAME_LEN: usize = (SIDE * SIDE) as usize;

/// Ends after `episode_len` steps. The screen is filled with the step count.
struct StubEnv {
    episode_len: usize,
    reward: f32,
    steps: usize,
    n_noops: usize,
    n_acts: usize,
}

impl StubEnv {
    fn new(episode_len: usize, reward: f32) -> Self {
        Self {
            episode_len,
            reward,
            steps: 0,
            n_noops: 0,
            n_acts: 0,
        }
    }
}

impl Env for StubEnv {
    type Act = usize;

    fn reset(&mut self) -> Result<()> {
        self.steps = 0;
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.steps >= self.episode_len
    }

    fn act(&mut self, act: Option<&usize>) -> Result<f32> {
        match act {
            Some(_) => self.n_acts += 1,
            None => self.n_noops += 1,
        }
        self.steps += 1;
        Ok(self.reward)
    }

    fn frame(&self) -> Result<DynamicImage> {
        let img = ImageBuffer::from_pixel(SIDE, SIDE, Luma([self.steps as u8]));
        Ok(DynamicImage::ImageLuma8(img))
    }

    fn action_set(&self) -> Vec<usize> {
        vec![0, 1]
    }
}

#[derive(Default)]
struct StubAgent {
    eps_seen: Vec<f64>,
    batches: Vec<Vec<Transition>>,
    n_syncs: usize,
    save_failures: Cell<usize>,
    save_calls: Cell<usize>,
    loaded: Option<PathBuf>,
}

impl Policy for StubAgent {
    fn sample(&mut self, obs: &StackedFrames, eps: f64) -> Result<usize> {
        assert_eq!(obs.shape(), [N_STACK, SIDE as usize, SIDE as usize]);
        self.eps_seen.push(eps);
        Ok(1)
    }
}

impl Agent for StubAgent {
    fn n_actions(&self) -> usize {
        2
    }

    fn opt(&mut self, batch: &[&Transition]) -> Result<Record> {
        self.batches.push(batch.iter().map(|&t| t.clone()).collect());
        Ok(Record::from_scalar("loss", 0.5))
    }

    fn update_target(&mut self) -> Result<()> {
        self.n_syncs += 1;
        Ok(())
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.save_calls.set(self.save_calls.get() + 1);
        if self.save_failures.get() > 0 {
            self.save_failures.set(self.save_failures.get() - 1);
            return Err(anyhow!("disk full"));
        }
        std::fs::write(path, b"params")?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(anyhow!("{:?} not found", path));
        }
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }
}

struct FailingRecorder;

impl Recorder for FailingRecorder {
    fn write(&mut self, _record: Record) -> Result<()> {
        Err(anyhow!("broken pipe"))
    }
}

fn trainer_config(model_dir: &Path) -> TrainerConfig {
    TrainerConfig::default()
        .batch_size(2)
        .num_samples_pre(1000)
        .memory_size(1000)
        .reset_target(1000)
        .final_exp_frame(20)
        .save_freq(1000)
        .log_interval(1000)
        .frame_stack(N_STACK)
        .downscale(SIDE)
        .model_dir(model_dir.to_string_lossy())
}

#[test]
fn test_warm_up_records_no_transitions() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path());
    let mut runner = Runner::trainer(
        StubEnv::new(10, 0.0),
        StubAgent::default(),
        &config,
        NullRecorder {},
    )?;

    runner.episode()?;
    assert_eq!(runner.mode(), Mode::Train);
    assert_eq!(runner.total_steps(), 10);
    assert_eq!(runner.memory_len(), 6);
    assert_eq!(runner.agent().eps_seen.len(), 6);
    assert!(runner.agent().batches.is_empty());

    runner.episode()?;
    assert_eq!(runner.total_steps(), 20);
    assert_eq!(runner.memory_len(), 12);
    Ok(())
}

#[test]
fn test_noop_during_warm_up() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path());
    let mut runner = Runner::trainer(
        StubEnv::new(10, 0.0),
        StubAgent::default(),
        &config,
        NullRecorder {},
    )?;
    runner.episode()?;

    assert_eq!(runner.env().n_noops, N_STACK);
    assert_eq!(runner.env().n_acts, 10 - N_STACK);
    let agent = runner.into_agent();
    assert!(agent.eps_seen.iter().all(|&eps| eps == 1.0));
    Ok(())
}

#[test]
fn test_transitions_are_consecutive() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path())
        .batch_size(6)
        .num_samples_pre(6)
        .memory_size(6);
    let mut runner = Runner::trainer(
        StubEnv::new(10, 3.0),
        StubAgent::default(),
        &config,
        NullRecorder {},
    )?;
    runner.episode()?;

    let batches = &runner.agent().batches;
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 6);
    assert_eq!(batch.iter().filter(|t| t.done).count(), 1);

    for t in batch.iter() {
        assert_eq!(t.action, 1);
        assert_eq!(t.reward, 1.0);
        assert_eq!(
            &t.state.as_slice()[FRAME_LEN..],
            &t.next_state.as_slice()[..(N_STACK - 1) * FRAME_LEN]
        );
        let last = t.next_state.as_slice()[(N_STACK - 1) * FRAME_LEN];
        assert_eq!(t.done, last == 10);
    }
    Ok(())
}

#[test]
fn test_rewards_are_clipped() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path());
    let mut runner = Runner::trainer(
        StubEnv::new(10, -7.5),
        StubAgent::default(),
        &config,
        NullRecorder {},
    )?;
    let rewards = runner.run_experiment(2)?;
    assert_eq!(rewards, vec![-10.0, -10.0]);
    Ok(())
}

#[test]
fn test_max_ep_steps() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path()).max_ep_steps(7);
    let mut runner = Runner::trainer(
        StubEnv::new(100, 0.0),
        StubAgent::default(),
        &config,
        NullRecorder {},
    )?;
    runner.episode()?;
    assert_eq!(runner.total_steps(), 7);
    assert_eq!(runner.memory_len(), 3);
    Ok(())
}

#[test]
fn test_learning_gate_and_target_sync() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path())
        .num_samples_pre(3)
        .reset_target(2);
    let mut runner = Runner::trainer(
        StubEnv::new(10, 0.0),
        StubAgent::default(),
        &config,
        NullRecorder {},
    )?;
    runner.episode()?;

    // Learning steps happen at total steps 7, 8, 9 and 10.
    let agent = runner.agent();
    assert_eq!(agent.batches.len(), 4);
    assert!(agent.batches.iter().all(|b| b.len() == 2));
    assert_eq!(agent.n_syncs, 2);

    // Exploration decays only once learning has started.
    assert_eq!(&agent.eps_seen[..3], &[1.0, 1.0, 1.0]);
    assert!((runner.eps() - 0.505).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_metrics() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path()).num_samples_pre(3);
    let mut runner = Runner::trainer(
        StubEnv::new(10, 1.0),
        StubAgent::default(),
        &config,
        BufferedRecorder::new(),
    )?;
    runner.run_experiment(2)?;

    let records = runner.recorder().records();
    assert_eq!(records.len(), 10);
    for record in records.iter() {
        assert_eq!(record.get_scalar("DQN_Flappy/loss")?, 0.5);
        assert!(record.get_scalar("DQN_Flappy/epsilon")? < 1.0);
    }

    // The reward window is empty until the first episode ends.
    assert!(records[..4].iter().all(|r| r.get("DQN_Flappy/reward_per_ep").is_none()));
    assert_eq!(records[4].get_step("total_steps")?, 15);
    assert_eq!(records[4].get_scalar("DQN_Flappy/reward_per_ep")?, 10.0);
    Ok(())
}

#[test]
fn test_recorder_failure_is_ignored() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path()).num_samples_pre(3);
    let mut runner = Runner::trainer(
        StubEnv::new(10, 0.0),
        StubAgent::default(),
        &config,
        FailingRecorder,
    )?;
    runner.run_experiment(3)?;
    assert_eq!(runner.agent().batches.len(), 16);
    Ok(())
}

#[test]
fn test_checkpoint_retry() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path()).num_samples_pre(3).save_freq(5);
    let agent = StubAgent::default();
    agent.save_failures.set(1);
    let mut runner = Runner::trainer(StubEnv::new(10, 0.0), agent, &config, NullRecorder {})?;
    runner.episode()?;

    assert_eq!(runner.agent().save_calls.get(), 2);
    let files = std::fs::read_dir(dir.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("params_dqn_"));
    assert!(files[0].ends_with("_10steps.safetensors"));
    Ok(())
}

#[test]
fn test_checkpoint_failure_does_not_abort() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path()).num_samples_pre(3).save_freq(5);
    let agent = StubAgent::default();
    agent.save_failures.set(100);
    let mut runner = Runner::trainer(StubEnv::new(10, 0.0), agent, &config, NullRecorder {})?;
    runner.run_experiment(2)?;

    // Saves at 10, 15 and 20 steps, two attempts each.
    assert_eq!(runner.agent().save_calls.get(), 6);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_periodic_events_on_warm_up_steps() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path())
        .num_samples_pre(2)
        .reset_target(11)
        .save_freq(11)
        .log_interval(11);
    let mut runner = Runner::trainer(
        StubEnv::new(10, 1.0),
        StubAgent::default(),
        &config,
        BufferedRecorder::new(),
    )?;
    runner.run_experiment(4)?;

    // Total steps 11, 22 and 33 are warm-up steps of episodes 2, 3 and 4.
    assert_eq!(runner.total_steps(), 40);
    assert_eq!(runner.agent().batches.len(), 23);
    assert_eq!(runner.agent().n_syncs, 3);
    assert_eq!(runner.agent().save_calls.get(), 3);

    let files = std::fs::read_dir(dir.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(files.len(), 3);
    for steps in [11, 22, 33] {
        let suffix = format!("_{}steps.safetensors", steps);
        assert!(files.iter().any(|f| f.ends_with(&suffix)));
    }

    // Each summary empties the reward window before the next learning step.
    let records = runner.recorder().records();
    assert_eq!(records.len(), 23);
    assert_eq!(records[4].get_step("total_steps")?, 10);
    assert_eq!(records[5].get_step("total_steps")?, 15);
    assert!(records.iter().all(|r| r.get("DQN_Flappy/reward_per_ep").is_none()));
    Ok(())
}

#[test]
fn test_invalid_trainer_config() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = trainer_config(dir.path()).num_samples_pre(1);
    let runner = Runner::trainer(
        StubEnv::new(10, 0.0),
        StubAgent::default(),
        &config,
        NullRecorder {},
    );
    assert!(runner.is_err());
    Ok(())
}

#[test]
fn test_tester() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let params = dir.path().join("params.safetensors");
    std::fs::write(&params, b"params")?;

    let config = TesterConfig::default().frame_stack(N_STACK).downscale(SIDE);
    let mut runner = Runner::tester(StubEnv::new(10, 2.0), StubAgent::default(), &config, &params)?;
    let rewards = runner.run_experiment(3)?;

    assert_eq!(runner.mode(), Mode::Eval);
    assert_eq!(rewards, vec![10.0, 10.0, 10.0]);
    assert_eq!(runner.memory_len(), 0);

    let agent = runner.agent();
    assert_eq!(agent.loaded.as_deref(), Some(params.as_path()));
    assert_eq!(agent.eps_seen.len(), 18);
    assert!(agent.eps_seen.iter().all(|&eps| eps == 0.01));
    assert!(agent.batches.is_empty());
    assert_eq!(agent.n_syncs, 0);
    assert_eq!(agent.save_calls.get(), 0);
    Ok(())
}

#[test]
fn test_tester_requires_params() -> Result<()> {
    let dir = TempDir::new("perch_runner")?;
    let config = TesterConfig::default().frame_stack(N_STACK).downscale(SIDE);
    let runner = Runner::tester(
        StubEnv::new(10, 0.0),
        StubAgent::default(),
        &config,
        &dir.path().join("missing.safetensors"),
    );
    assert!(runner.is_err());
    Ok(())
}
