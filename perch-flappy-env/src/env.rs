mod config;
use crate::{game::FlappyGame, FlappyAct};
use anyhow::Result;
pub use config::FlappyEnvConfig;
use image::DynamicImage;
use log::trace;
use perch_core::Env;

/// Flappy-bird game exposed as [`Env`].
///
/// Every action is repeated for `frame_skip` game frames and the rewards of
/// those frames are summed. The no-op action is [`FlappyAct::Idle`].
pub struct FlappyEnv {
    game: FlappyGame,
    frame_skip: usize,
}

impl FlappyEnv {
    /// Constructs the environment.
    pub fn build(config: &FlappyEnvConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            game: FlappyGame::new(config.width, config.height, config.pipe_gap, config.seed),
            frame_skip: config.frame_skip,
        })
    }

    /// Pipes passed in the current episode.
    pub fn score(&self) -> usize {
        self.game.score()
    }
}

impl Env for FlappyEnv {
    type Act = FlappyAct;

    fn reset(&mut self) -> Result<()> {
        self.game.reset();
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.game.game_over()
    }

    fn act(&mut self, act: Option<&FlappyAct>) -> Result<f32> {
        let flap = act.map_or(false, |a| a.is_flap());
        let mut reward = 0.0;
        for _ in 0..self.frame_skip {
            reward += self.game.tick(flap);
            if self.game.game_over() {
                trace!("Game over with score {}", self.game.score());
                break;
            }
        }
        Ok(reward)
    }

    fn frame(&self) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgb8(self.game.render()))
    }

    fn action_set(&self) -> Vec<FlappyAct> {
        FlappyAct::ALL.to_vec()
    }
}
