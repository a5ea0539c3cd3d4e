//! DQN agent implemented with candle.
use super::{config::DqnConfig, model::DqnModel};
use crate::{
    opt::Optimizer,
    util::{smooth_l1_loss, td_target},
};
use anyhow::{anyhow, Result};
use candle_core::{shape::D, DType, Device, Tensor};
use perch_core::{record::Record, Agent, EpsilonGreedy, Policy, StackedFrames, Transition};
use std::path::Path;

/// DQN agent implemented with candle.
///
/// Holds the online network, which is updated by gradient steps, and the
/// target network, which only changes through [`Agent::update_target`].
pub struct Dqn {
    qnet: DqnModel,
    qnet_tgt: DqnModel,
    opt: Optimizer,
    explorer: EpsilonGreedy,
    discount_factor: f64,
    obs_shape: [usize; 3],
    device: Device,
    n_opts: usize,
}

impl Dqn {
    /// Constructs DQN agent.
    ///
    /// Both networks start with the same parameters.
    pub fn build(config: DqnConfig) -> Result<Self> {
        let device: Device = config.device.try_into()?;
        let q_config = &config.model_config.q_config;
        let qnet = DqnModel::build(q_config, &device)?;
        let mut qnet_tgt = DqnModel::build(q_config, &device)?;
        qnet_tgt.clone_params_from(&qnet)?;
        let opt = config.model_config.opt_config.build(qnet.vars())?;

        Ok(Self {
            explorer: EpsilonGreedy::new(q_config.out_dim, config.seed),
            obs_shape: [q_config.n_stack, q_config.height, q_config.width],
            qnet,
            qnet_tgt,
            opt,
            discount_factor: config.discount_factor,
            device,
            n_opts: 0,
        })
    }

    /// The online network.
    pub fn qnet(&self) -> &DqnModel {
        &self.qnet
    }

    /// The target network.
    pub fn qnet_tgt(&self) -> &DqnModel {
        &self.qnet_tgt
    }

    /// Number of optimization steps done so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Stacks observations into a batch scaled to `[0, 1]`.
    fn obs_batch<'a>(&self, obs: impl Iterator<Item = &'a StackedFrames>) -> Result<Tensor> {
        let mut data = vec![];
        let mut n = 0;
        for o in obs {
            if o.shape() != self.obs_shape {
                return Err(anyhow!(
                    "Observation of shape {:?} given to a network expecting {:?}",
                    o.shape(),
                    self.obs_shape
                ));
            }
            data.extend_from_slice(o.as_slice());
            n += 1;
        }
        let [c, h, w] = self.obs_shape;
        let obs = Tensor::from_vec(data, (n, c, h, w), &self.device)?;
        Ok((obs.to_dtype(DType::F32)? / 255.0)?)
    }

    fn update_critic(&mut self, batch: &[&Transition]) -> Result<f32> {
        let n = batch.len();
        let obs = self.obs_batch(batch.iter().map(|t| &t.state))?;
        let next_obs = self.obs_batch(batch.iter().map(|t| &t.next_state))?;
        let act = {
            let act = batch.iter().map(|t| t.action as u32).collect::<Vec<_>>();
            Tensor::from_vec(act, (n, 1), &self.device)?
        };
        let reward = {
            let reward = batch.iter().map(|t| t.reward).collect::<Vec<_>>();
            Tensor::from_vec(reward, (n,), &self.device)?
        };
        let not_done = {
            let not_done = batch
                .iter()
                .map(|t| if t.done { 0f32 } else { 1f32 })
                .collect::<Vec<_>>();
            Tensor::from_vec(not_done, (n,), &self.device)?
        };

        let pred = self
            .qnet
            .forward(&obs)?
            .gather(&act, D::Minus1)?
            .squeeze(D::Minus1)?;

        let tgt = {
            let q = self.qnet_tgt.forward(&next_obs)?.max(D::Minus1)?;
            td_target(&reward, &not_done, &q, self.discount_factor)?
        }
        .detach();

        let loss = smooth_l1_loss(&pred, &tgt)?;
        self.opt.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }
}

impl Policy for Dqn {
    fn sample(&mut self, obs: &StackedFrames, eps: f64) -> Result<usize> {
        self.explorer.action(&self.qnet, obs, eps)
    }
}

impl Agent for Dqn {
    fn n_actions(&self) -> usize {
        self.qnet.config().out_dim
    }

    fn opt(&mut self, batch: &[&Transition]) -> Result<Record> {
        if batch.is_empty() {
            return Err(anyhow!("Optimization step on an empty batch"));
        }
        let loss = self.update_critic(batch)?;
        self.n_opts += 1;

        Ok(Record::from_scalar("loss", loss))
    }

    fn update_target(&mut self) -> Result<()> {
        self.qnet_tgt.clone_params_from(&self.qnet)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.qnet.save(path)
    }

    /// Loads the online network and copies it into the target network.
    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path)?;
        self.qnet_tgt.clone_params_from(&self.qnet)
    }
}
