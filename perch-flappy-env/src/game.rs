//! Game logic and rendering.
use image::{Rgb, RgbImage};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const BIRD_W: f32 = 34.0;
const BIRD_H: f32 = 24.0;
const GRAVITY: f32 = 1.0;
const MAX_DROP_SPEED: f32 = 10.0;
const FLAP_SPEED: f32 = -9.0;
const PIPE_W: f32 = 52.0;
const PIPE_SPEED: f32 = 4.0;

/// Reward for passing a pipe.
pub const REWARD_PIPE: f32 = 1.0;

/// Reward for crashing.
pub const REWARD_LOSS: f32 = -5.0;

const SKY: Rgb<u8> = Rgb([78, 192, 202]);
const PIPE: Rgb<u8> = Rgb([84, 168, 44]);
const GROUND: Rgb<u8> = Rgb([222, 216, 149]);
const BIRD: Rgb<u8> = Rgb([250, 200, 40]);

#[derive(Debug, Clone, PartialEq)]
struct Pipe {
    x: f32,
    gap_top: f32,
    passed: bool,
}

/// A side-scrolling game: the bird falls under gravity, flapping pushes it
/// up, and pipes scroll in from the right with a random gap to fly through.
pub struct FlappyGame {
    width: f32,
    height: f32,
    pipe_gap: f32,
    rng: SmallRng,
    bird_y: f32,
    bird_vel: f32,
    pipes: Vec<Pipe>,
    score: usize,
    game_over: bool,
}

impl FlappyGame {
    /// Constructs a game on a `width` x `height` screen.
    pub fn new(width: u32, height: u32, pipe_gap: u32, seed: u64) -> Self {
        let mut game = Self {
            width: width as f32,
            height: height as f32,
            pipe_gap: pipe_gap as f32,
            rng: SmallRng::seed_from_u64(seed),
            bird_y: 0.0,
            bird_vel: 0.0,
            pipes: vec![],
            score: 0,
            game_over: false,
        };
        game.reset();
        game
    }

    /// Starts a new round. The random number generator is not reseeded.
    pub fn reset(&mut self) {
        self.bird_y = (self.height - BIRD_H) / 2.0;
        self.bird_vel = 0.0;
        self.score = 0;
        self.game_over = false;
        self.pipes.clear();
        let pipe = self.new_pipe(self.width);
        self.pipes.push(pipe);
    }

    fn ground_y(&self) -> f32 {
        (self.height * 0.79).floor()
    }

    fn bird_x(&self) -> f32 {
        (self.width * 0.2).floor()
    }

    fn pipe_spacing(&self) -> f32 {
        (self.width * 0.6).floor()
    }

    fn new_pipe(&mut self, x: f32) -> Pipe {
        let margin = self.ground_y() * 0.1;
        let lo = margin;
        let hi = (self.ground_y() - self.pipe_gap - margin).max(lo + 1.0);
        Pipe {
            x,
            gap_top: self.rng.gen_range(lo..hi).floor(),
            passed: false,
        }
    }

    /// Advances the game by one frame and returns the reward of the frame.
    ///
    /// Does nothing once the game is over.
    pub fn tick(&mut self, flap: bool) -> f32 {
        if self.game_over {
            return 0.0;
        }

        self.bird_vel = match flap {
            true => FLAP_SPEED,
            false => (self.bird_vel + GRAVITY).min(MAX_DROP_SPEED),
        };
        self.bird_y += self.bird_vel;

        let mut reward = 0.0;
        let bird_x = self.bird_x();
        for pipe in self.pipes.iter_mut() {
            pipe.x -= PIPE_SPEED;
            if !pipe.passed && pipe.x + PIPE_W < bird_x {
                pipe.passed = true;
                self.score += 1;
                reward += REWARD_PIPE;
            }
        }
        self.pipes.retain(|p| p.x + PIPE_W > 0.0);
        let spawn = self
            .pipes
            .last()
            .map_or(true, |p| p.x <= self.width - self.pipe_spacing());
        if spawn {
            let pipe = self.new_pipe(self.width);
            self.pipes.push(pipe);
        }

        if self.collides() {
            self.game_over = true;
            reward += REWARD_LOSS;
        }

        reward
    }

    fn collides(&self) -> bool {
        let (top, bottom) = (self.bird_y, self.bird_y + BIRD_H);
        if top < 0.0 || bottom >= self.ground_y() {
            return true;
        }

        let (left, right) = (self.bird_x(), self.bird_x() + BIRD_W);
        self.pipes.iter().any(|p| {
            let overlap_x = right > p.x && left < p.x + PIPE_W;
            overlap_x && (top < p.gap_top || bottom > p.gap_top + self.pipe_gap)
        })
    }

    /// Returns `true` if the bird has crashed.
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Pipes passed in this round.
    pub fn score(&self) -> usize {
        self.score
    }

    /// Draws the current screen.
    pub fn render(&self) -> RgbImage {
        let (w, h) = (self.width as u32, self.height as u32);
        let mut img = RgbImage::from_pixel(w, h, SKY);
        let ground_y = self.ground_y();

        for p in self.pipes.iter() {
            fill_rect(&mut img, p.x, 0.0, PIPE_W, p.gap_top, PIPE);
            let bottom = p.gap_top + self.pipe_gap;
            fill_rect(&mut img, p.x, bottom, PIPE_W, ground_y - bottom, PIPE);
        }
        fill_rect(&mut img, 0.0, ground_y, self.width, self.height - ground_y, GROUND);
        fill_rect(&mut img, self.bird_x(), self.bird_y, BIRD_W, BIRD_H, BIRD);

        img
    }
}

/// Fills a rectangle, clipped to the image.
fn fill_rect(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: Rgb<u8>) {
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).max(0.0) as u32).min(img.width());
    let y1 = ((y + h).max(0.0) as u32).min(img.height());
    for yy in y0..y1 {
        for xx in x0..x1 {
            img.put_pixel(xx, yy, color);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn game() -> FlappyGame {
        FlappyGame::new(288, 512, 100, 42)
    }

    #[test]
    fn test_falls_to_the_ground() {
        let mut game = game();
        let mut last = 0.0;
        for _ in 0..100 {
            last = game.tick(false);
            if game.game_over() {
                break;
            }
        }
        assert!(game.game_over());
        assert_eq!(last, REWARD_LOSS);
        assert_eq!(game.tick(false), 0.0);

        game.reset();
        assert!(!game.game_over());
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_flapping_keeps_the_bird_up() {
        let mut game = game();
        let start = game.bird_y;
        for _ in 0..40 {
            let flap = game.bird_y > start;
            game.tick(flap);
            assert!(!game.game_over());
        }
    }

    #[test]
    fn test_pass_pipe() {
        let mut game = game();
        let bird_x = game.bird_x();
        game.pipes = vec![Pipe {
            x: bird_x - PIPE_W + 2.0,
            gap_top: game.bird_y - 30.0,
            passed: false,
        }];
        game.bird_vel = 0.0;

        assert_eq!(game.tick(false), REWARD_PIPE);
        assert_eq!(game.score(), 1);
        assert_eq!(game.tick(false), 0.0);
    }

    #[test]
    fn test_hit_pipe() {
        let mut game = game();
        game.pipes = vec![Pipe {
            x: game.bird_x() + 4.0,
            gap_top: game.bird_y + 60.0,
            passed: false,
        }];
        assert_eq!(game.tick(false), REWARD_LOSS);
        assert!(game.game_over());
    }

    #[test]
    fn test_render() {
        let game = game();
        let img = game.render();
        assert_eq!(img.dimensions(), (288, 512));
        assert_eq!(*img.get_pixel(0, 0), SKY);
        assert_eq!(*img.get_pixel(0, 511), GROUND);
        let (x, y) = (game.bird_x() as u32 + 1, game.bird_y as u32 + 1);
        assert_eq!(*img.get_pixel(x, y), BIRD);
    }

    #[test]
    fn test_seeded() {
        let mut g1 = game();
        let mut g2 = game();
        for t in 0..60 {
            let flap = t % 7 == 0;
            assert_eq!(g1.tick(flap), g2.tick(flap));
        }
        assert_eq!(g1.pipes, g2.pipes);
        assert_eq!(g1.render(), g2.render());
    }
}
