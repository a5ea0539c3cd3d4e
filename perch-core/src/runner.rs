//! Train and evaluate [`Agent`].
mod checkpoint;
mod config;
use crate::{
    record::{NullRecorder, Record, RecordValue::Scalar, Recorder},
    replay_buffer::{ReplayMemory, ReplayMemoryConfig, Transition},
    util::clip_reward,
    Agent, Env, FramePreprocessor, FrameStack,
};
use anyhow::{anyhow, Result};
pub use checkpoint::CheckpointWriter;
pub use config::{TesterConfig, TrainerConfig};
use log::{debug, info, warn};
use std::path::Path;

/// What a run does besides acting in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Records transitions, learns from them, decays exploration, syncs the
    /// target network and writes checkpoints.
    Train,

    /// Acts with a fixed exploration rate and changes nothing.
    Eval,
}

/// State of a training run that an evaluation run does not have.
struct Learner {
    memory: ReplayMemory<Transition>,
    batch_size: usize,
    num_samples_pre: usize,
    reset_target: usize,
    final_exp_frame: usize,
    log_interval: usize,
    save_freq: usize,
    metrics_prefix: String,
    checkpoint: CheckpointWriter,

    /// Cumulative rewards of the episodes finished since the last summary.
    reward_window: Vec<f32>,

    /// Loss of the latest learning step.
    last_loss: Option<f32>,
}

impl Learner {
    /// Learning starts, and stays on, once the memory holds `num_samples_pre` transitions.
    fn is_warm(&self) -> bool {
        self.memory.len() >= self.num_samples_pre
    }

    fn mean_reward(&self) -> Option<f32> {
        match self.reward_window.is_empty() {
            true => None,
            false => {
                Some(self.reward_window.iter().sum::<f32>() / self.reward_window.len() as f32)
            }
        }
    }
}

/// Runs episodes of an agent in an environment.
///
/// An episode goes as follows:
///
/// 1. Reset the environment and the frame stack, then push the first frame.
/// 2. While the stack is warming up (fewer than `n_stack` environment steps
///    in this episode), step the environment with the no-op action. No
///    transition is formed.
/// 3. Afterwards, on every step, take the observation `s` from the stack,
///    sample an action with the current exploration rate, step the
///    environment, clip the reward to `[-1, 1]` and push the new frame.
///    In [`Mode::Train`], the transition `(s, a, s', r, done)` is pushed to
///    the replay memory and, once the memory holds `num_samples_pre`
///    transitions, a learning step follows.
/// 4. The episode ends when the environment is terminal or after
///    `max_ep_steps` steps.
///
/// A learning step sets the exploration rate to
/// [`decay_schedule`](crate::decay_schedule) of the total step count,
/// optimizes the agent on a batch sampled from the replay memory and writes
/// metrics to the recorder.
///
/// Once the memory is warm, every environment step, warm-up steps included,
/// also syncs the target network every `reset_target` total steps, prints a
/// summary every `log_interval` total steps and saves the online network
/// every `save_freq` total steps.
///
/// Use [`Runner::trainer`] or [`Runner::tester`] to construct a runner.
pub struct Runner<E: Env, A: Agent, R: Recorder = NullRecorder> {
    env: E,
    agent: A,
    recorder: R,
    actions: Vec<E::Act>,
    preprocessor: FramePreprocessor,
    frames: FrameStack,
    max_ep_steps: usize,
    mode: Mode,
    learner: Option<Learner>,

    /// Exploration rate.
    eps: f64,

    /// Environment steps over all episodes, including warm-up steps.
    total_steps: usize,
}

impl<E, A, R> Runner<E, A, R>
where
    E: Env,
    A: Agent,
    R: Recorder,
{
    /// Constructs a runner in [`Mode::Train`].
    ///
    /// The exploration rate starts at [`EPS_START`](crate::explorer::EPS_START).
    pub fn trainer(env: E, agent: A, config: &TrainerConfig, recorder: R) -> Result<Self> {
        config.validate()?;
        let actions = Self::action_set(&env, &agent)?;
        let memory = ReplayMemory::build(
            &ReplayMemoryConfig::default()
                .capacity(config.memory_size)
                .seed(config.seed),
        );
        let learner = Learner {
            memory,
            batch_size: config.batch_size,
            num_samples_pre: config.num_samples_pre,
            reset_target: config.reset_target,
            final_exp_frame: config.final_exp_frame,
            log_interval: config.log_interval,
            save_freq: config.save_freq,
            metrics_prefix: config.metrics_prefix.clone(),
            checkpoint: CheckpointWriter::new(&config.model_dir),
            reward_window: vec![],
            last_loss: None,
        };

        Ok(Self {
            env,
            agent,
            recorder,
            actions,
            preprocessor: FramePreprocessor::square(config.downscale),
            frames: FrameStack::new(config.frame_stack),
            max_ep_steps: config.max_ep_steps,
            mode: Mode::Train,
            learner: Some(learner),
            eps: crate::explorer::EPS_START,
            total_steps: 0,
        })
    }

    fn action_set(env: &E, agent: &A) -> Result<Vec<E::Act>> {
        let actions = env.action_set();
        if actions.len() != agent.n_actions() {
            return Err(anyhow!(
                "The environment has {} actions, the agent has {} outputs",
                actions.len(),
                agent.n_actions()
            ));
        }
        Ok(actions)
    }

    /// Runs `num_episodes` episodes and returns their cumulative rewards.
    pub fn run_experiment(&mut self, num_episodes: usize) -> Result<Vec<f32>> {
        match self.mode {
            Mode::Train => info!("Beginning Training..."),
            Mode::Eval => info!("Beginning Testing..."),
        }

        let mut rewards = Vec::with_capacity(num_episodes);
        for ix in 0..num_episodes {
            let reward = self.episode()?;
            match self.mode {
                Mode::Train => debug!("Episode {} finished with reward {:.2}", ix, reward),
                Mode::Eval => info!("This episode had {:.2} reward", reward),
            }
            rewards.push(reward);
        }

        if let Err(e) = self.recorder.flush() {
            warn!("Failed to flush the recorder: {}", e);
        }

        Ok(rewards)
    }

    /// Runs a single episode and returns its cumulative clipped reward.
    pub fn episode(&mut self) -> Result<f32> {
        self.env.reset()?;
        self.frames.reset();
        self.push_frame()?;

        let n_stack = self.frames.n_stack();
        let mut ep_steps = 0;
        let mut ep_reward = 0f32;

        while !self.env.is_terminal() && ep_steps < self.max_ep_steps {
            let (state, action) = match ep_steps < n_stack {
                true => (None, None),
                false => {
                    let state = self.frames.snapshot()?;
                    let action = self.agent.sample(&state, self.eps)?;
                    (Some(state), Some(action))
                }
            };

            let act = match action {
                Some(ix) => Some(
                    self.actions
                        .get(ix)
                        .ok_or_else(|| anyhow!("Action index {} out of range", ix))?,
                ),
                None => None,
            };
            let reward = clip_reward(self.env.act(act)?);
            self.push_frame()?;
            self.total_steps += 1;
            ep_steps += 1;
            ep_reward += reward;

            if let (Some(state), Some(action), Mode::Train) = (state, action, self.mode) {
                let next_state = self.frames.snapshot()?;
                let done = self.env.is_terminal();
                self.learn(Transition::new(state, action, next_state, reward, done))?;
            }
            self.periodic()?;
        }

        if let Some(learner) = self.learner.as_mut() {
            learner.reward_window.push(ep_reward);
        }

        Ok(ep_reward)
    }

    fn push_frame(&mut self) -> Result<()> {
        let frame = self.env.frame()?;
        self.frames.push(self.preprocessor.process(&frame));
        Ok(())
    }

    /// Records a transition and, once the replay memory is warm, performs a
    /// learning step.
    fn learn(&mut self, transition: Transition) -> Result<()> {
        let learner = match self.learner.as_mut() {
            Some(learner) => learner,
            None => return Ok(()),
        };

        learner.memory.push(transition);
        if !learner.is_warm() {
            return Ok(());
        }

        self.eps = crate::decay_schedule(self.total_steps, learner.final_exp_frame);
        let batch = learner.memory.sample(learner.batch_size)?;
        let record = self.agent.opt(&batch)?;
        let loss = record.get_scalar("loss")?;
        learner.last_loss = Some(loss);

        let prefix = &learner.metrics_prefix;
        let mut metrics = Record::from_step("total_steps", self.total_steps);
        metrics.insert(format!("{}/loss", prefix), Scalar(loss));
        metrics.insert(format!("{}/epsilon", prefix), Scalar(self.eps as f32));
        if let Some(mean_reward) = learner.mean_reward() {
            metrics.insert(format!("{}/reward_per_ep", prefix), Scalar(mean_reward));
        }
        if let Err(e) = self.recorder.write(metrics) {
            warn!("Failed to record metrics at {} steps: {}", self.total_steps, e);
        }

        Ok(())
    }

    /// Target sync, console summary and checkpoint, keyed on the total step count.
    fn periodic(&mut self) -> Result<()> {
        let learner = match self.learner.as_mut() {
            Some(learner) if learner.is_warm() => learner,
            _ => return Ok(()),
        };

        if self.total_steps % learner.reset_target == 0 {
            info!("Updating target network at {} steps", self.total_steps);
            self.agent.update_target()?;
        }

        if self.total_steps % learner.log_interval == 0 {
            let fmt = |v: Option<f32>, prec: usize| match v {
                Some(v) => format!("{:.*}", prec, v),
                None => "n/a".to_string(),
            };
            info!(
                "Total Steps: {}, Mean Reward: {}, Loss: {}, Epsilon: {:.4}",
                self.total_steps,
                fmt(learner.mean_reward(), 3),
                fmt(learner.last_loss, 5),
                self.eps
            );
            learner.reward_window.clear();
        }

        if self.total_steps % learner.save_freq == 0 {
            learner.checkpoint.save(&self.agent, self.total_steps);
        }

        Ok(())
    }

    /// Mode of the run.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current exploration rate.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Environment steps taken over all episodes.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Number of transitions in the replay memory. Always zero in [`Mode::Eval`].
    pub fn memory_len(&self) -> usize {
        self.learner.as_ref().map_or(0, |l| l.memory.len())
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The agent.
    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// The recorder.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Returns the agent, consuming the runner.
    pub fn into_agent(self) -> A {
        self.agent
    }
}

impl<E, A> Runner<E, A, NullRecorder>
where
    E: Env,
    A: Agent,
{
    /// Constructs a runner in [`Mode::Eval`].
    ///
    /// Parameters of the online network are loaded from `params` before
    /// anything runs.
    pub fn tester(env: E, mut agent: A, config: &TesterConfig, params: &Path) -> Result<Self> {
        config.validate()?;
        let actions = Self::action_set(&env, &agent)?;
        agent.load_params(params)?;
        info!("Loaded parameters from {:?}", params);

        Ok(Self {
            env,
            agent,
            recorder: NullRecorder {},
            actions,
            preprocessor: FramePreprocessor::square(config.downscale),
            frames: FrameStack::new(config.frame_stack),
            max_ep_steps: config.max_ep_steps,
            mode: Mode::Eval,
            learner: None,
            eps: config.eps,
            total_steps: 0,
        })
    }
}
