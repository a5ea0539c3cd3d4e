use super::CnnConfig;
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d, linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};
use perch_core::error::PerchError;

/// `(kernel, stride)` of the convolution layers.
const CONVS: [(usize, usize); 3] = [(8, 4), (4, 2), (3, 1)];

/// Convolutional neural network, which has the same architecture of the DQN paper.
///
/// The input is a batch of stacked frames scaled to `[0, 1]`, with shape
/// `[batch, n_stack, height, width]`. The output has shape `[batch, out_dim]`.
pub struct Cnn {
    device: Device,
    seq: Sequential,
}

impl Cnn {
    fn stride(s: usize) -> Conv2dConfig {
        Conv2dConfig {
            stride: s,
            ..Default::default()
        }
    }

    /// Side length after a convolution without padding.
    ///
    /// Fails unless the kernel tiles the input exactly.
    fn conv_out(size: usize, kernel: usize, stride: usize) -> Result<usize, PerchError> {
        if size < kernel || (size - kernel) % stride != 0 {
            return Err(PerchError::InvalidConfig(format!(
                "convolution with kernel {} and stride {} does not tile an input of size {}",
                kernel, stride, size
            )));
        }
        Ok((size - kernel) / stride + 1)
    }

    /// Number of features entering the first linear layer.
    pub fn flatten_dim(config: &CnnConfig) -> Result<usize, PerchError> {
        let (mut h, mut w) = (config.height, config.width);
        for (kernel, stride) in CONVS {
            h = Self::conv_out(h, kernel, stride)?;
            w = Self::conv_out(w, kernel, stride)?;
        }
        Ok(64 * h * w)
    }

    fn create_net(vb: &VarBuilder, config: &CnnConfig) -> Result<Sequential> {
        let flatten_dim = Self::flatten_dim(config)?;
        let [(k1, s1), (k2, s2), (k3, s3)] = CONVS;
        let seq = seq()
            .add(conv2d(config.n_stack, 32, k1, Self::stride(s1), vb.pp("c1"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(32, 64, k2, Self::stride(s2), vb.pp("c2"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(64, 64, k3, Self::stride(s3), vb.pp("c3"))?)
            .add_fn(|xs| xs.relu()?.flatten_from(1))
            .add(linear(flatten_dim, 512, vb.pp("l1"))?)
            .add_fn(|xs| xs.relu())
            .add(linear(512, config.out_dim, vb.pp("l2"))?);

        Ok(seq)
    }

    /// Builds the network, registering its parameters in `vb`.
    pub fn build(vb: VarBuilder, config: &CnnConfig) -> Result<Self> {
        if config.n_stack == 0 || config.out_dim == 0 {
            return Err(PerchError::InvalidConfig(
                "n_stack and out_dim must be positive".to_string(),
            )
            .into());
        }
        let device = vb.device().clone();
        let seq = Self::create_net(&vb, config)?;

        Ok(Self { device, seq })
    }

    /// Action values of a batch of observations.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(self.seq.forward(&xs.to_device(&self.device)?)?)
    }
}
