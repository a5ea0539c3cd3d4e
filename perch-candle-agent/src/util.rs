//! Utilities.
use candle_core::{DType, Tensor};

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
///
/// `beta` is 1 and the result is the mean over all elements.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?;
    let m2 = m1.affine(-1.0, 1.0)?;
    let quadratic = (d.sqr()? * 0.5)?.mul(&m1)?;
    let linear = d.affine(1.0, -0.5)?.mul(&m2)?;
    (quadratic + linear)?.mean_all()
}

/// One-step bootstrapped target `reward + gamma * q_next * not_done`.
///
/// `q_next` is the maximum action value of the next observation under the
/// target network. The result is not detached.
pub fn td_target(
    reward: &Tensor,
    not_done: &Tensor,
    q_next: &Tensor,
    gamma: f64,
) -> Result<Tensor, candle_core::Error> {
    let discounted = (not_done.mul(q_next)? * gamma)?;
    reward.add(&discounted)
}
