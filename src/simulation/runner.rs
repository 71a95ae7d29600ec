//! Headless side-scrolling runner game.
//!
//! Every agent controls one runner standing at the same horizontal position.
//! Obstacles scroll in from the right at an increasing speed; a runner that
//! touches one dies. The game implements [`Environment`] so it can drive a
//! training [`Session`](super::session::Session).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::environment::{Action, Environment};
use super::error::Result;
use super::obstacle::Obstacle;
use super::params::Params;

/// Number of sensor values produced per runner.
pub const INPUT_SIZE: usize = 5;

/// Vertical state of one runner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    /// Height of the runner's feet above the ground.
    pub altitude: f32,
    /// Vertical velocity, positive upward.
    pub velocity: f32,
    /// Whether the runner is still in the episode.
    pub alive: bool,
}

impl Runner {
    fn new() -> Self {
        Self {
            altitude: 0.0,
            velocity: 0.0,
            alive: true,
        }
    }

    /// Checks if the runner is standing on the ground.
    pub fn is_grounded(&self) -> bool {
        self.altitude <= 0.0 && self.velocity <= 0.0
    }

    fn fall(&mut self, gravity: f32, dt: f32) {
        if self.is_grounded() {
            return;
        }
        self.velocity -= gravity * dt;
        self.altitude += self.velocity * dt;
        if self.altitude <= 0.0 {
            self.altitude = 0.0;
            self.velocity = 0.0;
        }
    }
}

/// The runner game world.
#[derive(Debug, Clone)]
pub struct RunnerGame {
    params: Params,
    runners: Vec<Runner>,
    /// Obstacles ordered by `x`.
    obstacles: Vec<Obstacle>,
    speed: f32,
    distance: f32,
    elapsed: f32,
    /// Screen position at which the next obstacle appears.
    next_spawn_x: f32,
    rng: ChaCha8Rng,
}

impl RunnerGame {
    /// Creates a game whose obstacle course is seeded from the thread-local RNG.
    pub fn new(params: Params) -> Result<Self> {
        Self::with_rng(params, ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Creates a game with a deterministic obstacle course.
    pub fn with_seed(params: Params, seed: u64) -> Result<Self> {
        Self::with_rng(params, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(params: Params, rng: ChaCha8Rng) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            speed: params.initial_speed,
            next_spawn_x: params.view_distance,
            params,
            runners: Vec::new(),
            obstacles: Vec::new(),
            distance: 0.0,
            elapsed: 0.0,
            rng,
        })
    }

    /// Game parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// All runners, dead or alive.
    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    /// Obstacles currently on screen, left to right.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Current scroll speed.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Distance scrolled since the last reset.
    pub fn score(&self) -> f32 {
        self.distance
    }

    /// Seconds simulated since the last reset.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of runners still alive.
    pub fn alive_count(&self) -> usize {
        self.runners.iter().filter(|r| r.alive).count()
    }

    /// Places an obstacle by hand, keeping the list ordered.
    pub fn insert_obstacle(&mut self, obstacle: Obstacle) {
        let at = self.obstacles.partition_point(|o| o.x <= obstacle.x);
        self.obstacles.insert(at, obstacle);
        self.next_spawn_x = self.next_spawn_x.max(obstacle.right());
    }

    /// First obstacle whose right edge is still ahead of the runners.
    fn next_obstacle(&self) -> Option<&Obstacle> {
        let runner_x = self.params.runner_x;
        self.obstacles.iter().find(|o| o.right() > runner_x)
    }

    /// Free space to leave after an obstacle, widened as the game speeds up
    /// so a single jump never lands inside the following obstacle.
    fn sample_gap(&mut self) -> f32 {
        let scale = self.speed / self.params.initial_speed;
        self.rng.random_range(self.params.min_gap..=self.params.max_gap) * scale
    }

    fn spawn_obstacles(&mut self) {
        while self.next_spawn_x <= self.params.view_distance {
            let obstacle = Obstacle::new_random(self.next_spawn_x, &self.params, &mut self.rng);
            self.next_spawn_x = obstacle.right() + self.sample_gap();
            self.obstacles.push(obstacle);
        }
    }

    fn collides(&self, runner: &Runner) -> bool {
        let left = self.params.runner_x;
        let right = left + self.params.runner_width;
        let bottom = runner.altitude;
        let top = bottom + self.params.runner_height;
        self.obstacles
            .iter()
            .any(|o| o.overlaps(left, right, bottom, top))
    }
}

impl Environment for RunnerGame {
    fn input_size(&self) -> usize {
        INPUT_SIZE
    }

    fn reset(&mut self, agent_count: usize) {
        self.runners = vec![Runner::new(); agent_count];
        self.obstacles.clear();
        self.speed = self.params.initial_speed;
        self.distance = 0.0;
        self.elapsed = 0.0;
        self.next_spawn_x = self.params.view_distance;
        tracing::debug!(agent_count, "runner game reset");
    }

    /// Sensor layout: gap to the next obstacle, its height, its width, the
    /// current speed and the runner's altitude, each scaled to `[0, 1]`.
    fn sense(&self, agent: usize) -> Vec<f32> {
        let params = &self.params;
        let (gap, height, width) = match self.next_obstacle() {
            Some(obstacle) => {
                let front = params.runner_x + params.runner_width;
                (
                    (obstacle.x - front).max(0.0) / params.view_distance,
                    obstacle.height / params.max_obstacle_height,
                    obstacle.width / params.max_obstacle_width,
                )
            }
            None => (1.0, 0.0, 0.0),
        };
        let altitude = self
            .runners
            .get(agent)
            .map_or(0.0, |runner| runner.altitude / params.max_jump_height());

        [gap, height, width, self.speed / params.max_speed, altitude]
            .into_iter()
            .map(|value| value.clamp(0.0, 1.0))
            .collect()
    }

    fn apply(&mut self, agent: usize, action: Action) {
        let jump_velocity = self.params.jump_velocity;
        if action != Action::Jump {
            return;
        }
        if let Some(runner) = self.runners.get_mut(agent) {
            if runner.alive && runner.is_grounded() {
                runner.velocity = jump_velocity;
            }
        }
    }

    fn advance(&mut self, dt: f32) -> Vec<usize> {
        self.elapsed += dt;
        self.speed = (self.speed + self.params.speed_increment * dt).min(self.params.max_speed);

        let dx = self.speed * dt;
        self.distance += dx;
        self.next_spawn_x -= dx;
        for obstacle in &mut self.obstacles {
            obstacle.scroll(dx);
        }
        self.obstacles.retain(|o| !o.is_offscreen());
        self.spawn_obstacles();

        let gravity = self.params.gravity;
        for runner in self.runners.iter_mut().filter(|r| r.alive) {
            runner.fall(gravity, dt);
        }

        let died: Vec<usize> = self
            .runners
            .iter()
            .enumerate()
            .filter(|(_, runner)| runner.alive && self.collides(runner))
            .map(|(index, _)| index)
            .collect();
        for &index in &died {
            self.runners[index].alive = false;
        }
        died
    }
}
