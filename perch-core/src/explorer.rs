//! Epsilon-greedy exploration.
use crate::{StackedFrames, ValueFunction};
use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Exploration rate at the start of training.
pub const EPS_START: f64 = 1.0;

/// Exploration rate after `final_exp_frame` environment steps.
pub const EPS_FINAL: f64 = 0.01;

/// Linear decay of the exploration rate.
///
/// Goes from [`EPS_START`] at step 0 to [`EPS_FINAL`] at `final_exp_frame`
/// and stays at [`EPS_FINAL`] afterwards.
pub fn decay_schedule(total_steps: usize, final_exp_frame: usize) -> f64 {
    let progress = total_steps as f64 / final_exp_frame as f64;
    (EPS_FINAL + (EPS_START - EPS_FINAL) * (1.0 - progress)).max(EPS_FINAL)
}

/// Index of the largest value. Ties go to the smallest index.
pub fn greedy(values: &[f32]) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (ix, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((ix, v)),
        }
    }
    best.map(|(ix, _)| ix)
        .ok_or_else(|| anyhow!("No action values to choose from"))
}

/// Epsilon-greedy action selection.
///
/// With probability `eps` an action is drawn uniformly from the action set,
/// otherwise the action with the largest estimated value is taken.
/// The explorer holds no state other than its random number generator;
/// the exploration rate is owned by the caller.
pub struct EpsilonGreedy {
    n_actions: usize,
    rng: SmallRng,
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new(n_actions: usize, seed: u64) -> Self {
        Self {
            n_actions,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Takes an action based on the values estimated by `qnet`.
    pub fn action<Q>(&mut self, qnet: &Q, obs: &StackedFrames, eps: f64) -> Result<usize>
    where
        Q: ValueFunction + ?Sized,
    {
        if self.rng.gen::<f64>() < eps {
            Ok(self.rng.gen_range(0..self.n_actions))
        } else {
            let values = qnet.evaluate(&obs.scaled())?;
            greedy(&values)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct FixedValues(Vec<f32>);

    impl ValueFunction for FixedValues {
        fn evaluate(&self, _input: &[f32]) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn obs() -> StackedFrames {
        StackedFrames::from_raw(vec![0; 4 * 2 * 2], [4, 2, 2]).unwrap()
    }

    #[test]
    fn test_decay_schedule() {
        let final_exp_frame = 1000;
        assert!((decay_schedule(0, final_exp_frame) - 1.0).abs() < 1e-12);
        assert!((decay_schedule(final_exp_frame, final_exp_frame) - 0.01).abs() < 1e-12);
        assert!((decay_schedule(500, final_exp_frame) - 0.505).abs() < 1e-12);

        let mut prev = decay_schedule(0, final_exp_frame);
        for t in 1..3000 {
            let eps = decay_schedule(t, final_exp_frame);
            assert!(eps <= prev);
            if t >= final_exp_frame {
                assert_eq!(eps, EPS_FINAL);
            }
            prev = eps;
        }
    }

    #[test]
    fn test_greedy_first_index_tie_break() -> Result<()> {
        assert_eq!(greedy(&[1.0, 3.0, 3.0, 2.0])?, 1);
        assert_eq!(greedy(&[-1.0, -1.0])?, 0);
        assert_eq!(greedy(&[0.0, 0.5, 0.25])?, 1);
        assert!(greedy(&[]).is_err());
        Ok(())
    }

    #[test]
    fn test_eps_zero_is_deterministic() -> Result<()> {
        let qnet = FixedValues(vec![0.1, 0.7, 0.7, -0.2]);
        let mut explorer = EpsilonGreedy::new(4, 0);
        for _ in 0..100 {
            assert_eq!(explorer.action(&qnet, &obs(), 0.0)?, 1);
        }
        Ok(())
    }

    #[test]
    fn test_eps_one_explores_every_action() -> Result<()> {
        let qnet = FixedValues(vec![0.0, 1.0, 0.0]);
        let mut explorer = EpsilonGreedy::new(3, 7);
        let mut counts = [0usize; 3];
        for _ in 0..300 {
            counts[explorer.action(&qnet, &obs(), 1.0)?] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0));
        Ok(())
    }
}
