//! Optimizer of the online network.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Which optimizer to build and its learning rate.
///
/// In YAML the variant is a map key, e.g. `Adam: {lr: 0.0001}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam with default moment decay rates.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,

        /// Weight decay, 0.01 when omitted.
        #[serde(default = "default_weight_decay")]
        weight_decay: f64,
    },
}

fn default_weight_decay() -> f64 {
    ParamsAdamW::default().weight_decay
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 1e-4 }
    }
}

impl OptimizerConfig {
    /// Constructs an optimizer updating `vars` and nothing else.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let opt = match *self {
            Self::Adam { lr } => {
                let params = ParamsAdam {
                    lr,
                    ..Default::default()
                };
                Optimizer::Adam(Adam::new(vars, params)?)
            }
            Self::AdamW { lr, weight_decay } => {
                let params = ParamsAdamW {
                    lr,
                    weight_decay,
                    ..Default::default()
                };
                Optimizer::AdamW(AdamW::new(vars, params)?)
            }
        };
        Ok(opt)
    }

    /// Sets the learning rate, keeping the variant.
    pub fn learning_rate(mut self, v: f64) -> Self {
        match &mut self {
            Self::Adam { lr } | Self::AdamW { lr, .. } => *lr = v,
        }
        self
    }
}

/// Optimizer built by [`OptimizerConfig::build`].
///
/// Moment estimates persist across steps.
pub enum Optimizer {
    /// Adam.
    Adam(Adam),
    /// AdamW.
    AdamW(AdamW),
}

impl Optimizer {
    /// Backpropagates `loss` and updates the parameters.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => opt.backward_step(loss)?,
            Self::AdamW(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}
