use crate::{
    cnn::{Cnn, CnnConfig},
    opt::OptimizerConfig,
};
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use perch_core::{error::PerchError, ValueFunction};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
/// Configuration of [`DqnModel`] and the optimizer of the online network.
pub struct DqnModelConfig {
    /// Architecture of the action-value function.
    pub q_config: CnnConfig,

    /// Optimizer of the online network.
    pub opt_config: OptimizerConfig,
}

impl DqnModelConfig {
    /// Sets the architecture.
    pub fn q_config(mut self, v: CnnConfig) -> Self {
        self.q_config = v;
        self
    }

    /// Sets the number of actions.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.q_config.out_dim = v;
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Action-value network owning its parameters.
///
/// The online and the target network of [`Dqn`](super::Dqn) are two
/// instances of this type. They never share parameter storage; parameters
/// move between them only through [`DqnModel::clone_params_from`].
pub struct DqnModel {
    device: Device,
    varmap: VarMap,
    config: CnnConfig,
    q: Cnn,
}

impl DqnModel {
    /// Constructs [`DqnModel`] with freshly initialized parameters.
    pub fn build(config: &CnnConfig, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
            Cnn::build(vb, config)?
        };

        Ok(Self {
            device: device.clone(),
            varmap,
            config: config.clone(),
            q,
        })
    }

    /// Outputs the action values of a batch of scaled observations.
    pub fn forward(&self, obs: &Tensor) -> Result<Tensor> {
        self.q.forward(obs)
    }

    /// Learnable parameters, to be handed to an optimizer.
    pub fn vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    /// Configuration of the network.
    pub fn config(&self) -> &CnnConfig {
        &self.config
    }

    /// Overwrites every parameter with a deep copy of the same parameter of `src`.
    pub fn clone_params_from(&mut self, src: &DqnModel) -> Result<()> {
        let dest = self
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("parameters of the destination are poisoned"))?;
        let src = src
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("parameters of the source are poisoned"))?;

        for (name, v_dest) in dest.iter() {
            let v_src = src.get(name).ok_or_else(|| PerchError::CheckpointFormat {
                name: name.clone(),
                expected: format!("{:?}", v_dest.dims()),
                actual: "missing".to_string(),
            })?;
            v_dest.set(v_src.as_tensor())?;
        }

        Ok(())
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Saved parameters of the action-value network to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads parameters saved by [`DqnModel::save`].
    ///
    /// Every parameter of the network must be present in the file with the
    /// same shape, and the file must not hold other parameters. Otherwise
    /// [`PerchError::CheckpointFormat`] is returned and the network is left
    /// untouched.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        let tensors = candle_core::safetensors::load(&path, &self.device)?;
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("parameters are poisoned"))?;
        Self::check_shapes(&data, &tensors)?;

        for (name, var) in data.iter() {
            if let Some(t) = tensors.get(name) {
                var.set(&t.to_dtype(var.dtype())?)?;
            }
        }
        info!("Loaded parameters of the action-value network from {:?}", path.as_ref());
        Ok(())
    }

    fn check_shapes(
        vars: &HashMap<String, Var>,
        tensors: &HashMap<String, Tensor>,
    ) -> Result<(), PerchError> {
        let mut names = vars.keys().collect::<Vec<_>>();
        names.sort();
        for name in names {
            let expected = vars[name].dims();
            match tensors.get(name) {
                None => {
                    return Err(PerchError::CheckpointFormat {
                        name: name.clone(),
                        expected: format!("{:?}", expected),
                        actual: "missing".to_string(),
                    })
                }
                Some(t) if t.dims() != expected => {
                    return Err(PerchError::CheckpointFormat {
                        name: name.clone(),
                        expected: format!("{:?}", expected),
                        actual: format!("{:?}", t.dims()),
                    })
                }
                _ => {}
            }
        }

        let mut extra = tensors
            .keys()
            .filter(|name| !vars.contains_key(*name))
            .collect::<Vec<_>>();
        extra.sort();
        if let Some(name) = extra.first() {
            return Err(PerchError::CheckpointFormat {
                name: name.to_string(),
                expected: "unexpected".to_string(),
                actual: format!("{:?}", tensors[*name].dims()),
            });
        }

        Ok(())
    }
}

impl ValueFunction for DqnModel {
    fn evaluate(&self, input: &[f32]) -> Result<Vec<f32>> {
        let CnnConfig {
            n_stack,
            height,
            width,
            ..
        } = self.config;
        if input.len() != n_stack * height * width {
            return Err(anyhow!(
                "Input of {} values does not match observation shape {:?}",
                input.len(),
                [n_stack, height, width]
            ));
        }
        let obs = Tensor::from_slice(input, (1, n_stack, height, width), &self.device)?;
        Ok(self.forward(&obs)?.squeeze(0)?.to_vec1::<f32>()?)
    }
}
