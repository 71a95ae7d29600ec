use serde::{Deserialize, Serialize};

use super::error::{EvoError, Result};

/// Physics and course parameters of the runner game.
///
/// Distances are in pixels, times in seconds, with altitude measured upward
/// from the ground line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Horizontal position of every runner's left edge.
    pub runner_x: f32,
    /// Runner collision box width.
    pub runner_width: f32,
    /// Runner collision box height.
    pub runner_height: f32,
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Upward velocity applied by a jump.
    pub jump_velocity: f32,
    /// How far ahead runners can sense; also where obstacles spawn.
    pub view_distance: f32,
    /// Scroll speed at the start of an episode.
    pub initial_speed: f32,
    /// Scroll speed cap.
    pub max_speed: f32,
    /// Scroll speed gained per second.
    pub speed_increment: f32,
    /// Minimum free space after an obstacle, at the initial speed.
    pub min_gap: f32,
    /// Maximum free space after an obstacle, at the initial speed.
    pub max_gap: f32,
    /// Narrowest obstacle.
    pub min_obstacle_width: f32,
    /// Widest obstacle.
    pub max_obstacle_width: f32,
    /// Lowest obstacle.
    pub min_obstacle_height: f32,
    /// Tallest obstacle.
    pub max_obstacle_height: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            runner_x: 50.0,
            runner_width: 20.0,
            runner_height: 40.0,
            gravity: 2000.0,
            jump_velocity: 700.0,
            view_distance: 600.0,
            initial_speed: 300.0,
            max_speed: 800.0,
            speed_increment: 10.0,
            min_gap: 250.0,
            max_gap: 600.0,
            min_obstacle_width: 15.0,
            max_obstacle_width: 40.0,
            min_obstacle_height: 20.0,
            max_obstacle_height: 60.0,
        }
    }
}

impl Params {
    /// Peak altitude of a jump from the ground.
    pub fn max_jump_height(&self) -> f32 {
        self.jump_velocity * self.jump_velocity / (2.0 * self.gravity)
    }

    /// Rejects non-finite values, non-positive sizes and inverted ranges.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("runner_width", self.runner_width),
            ("runner_height", self.runner_height),
            ("gravity", self.gravity),
            ("jump_velocity", self.jump_velocity),
            ("view_distance", self.view_distance),
            ("initial_speed", self.initial_speed),
            ("max_speed", self.max_speed),
            ("min_gap", self.min_gap),
            ("max_gap", self.max_gap),
            ("min_obstacle_width", self.min_obstacle_width),
            ("max_obstacle_width", self.max_obstacle_width),
            ("min_obstacle_height", self.min_obstacle_height),
            ("max_obstacle_height", self.max_obstacle_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EvoError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        for (name, value) in [("runner_x", self.runner_x), ("speed_increment", self.speed_increment)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EvoError::InvalidConfig(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        let ranges = [
            ("speed", self.initial_speed, self.max_speed),
            ("gap", self.min_gap, self.max_gap),
            ("obstacle width", self.min_obstacle_width, self.max_obstacle_width),
            ("obstacle height", self.min_obstacle_height, self.max_obstacle_height),
        ];
        for (name, min, max) in ranges {
            if min > max {
                return Err(EvoError::InvalidConfig(format!(
                    "{name} range is inverted: {min} > {max}"
                )));
            }
        }
        if self.runner_x + self.runner_width >= self.view_distance {
            return Err(EvoError::InvalidConfig(
                "runner must start inside the view distance".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the training loop that drives agents through an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// An agent acts when its first output exceeds this value.
    pub jump_threshold: f32,
    /// Simulated seconds per step.
    pub dt: f32,
    /// Steps after which a generation is cut off.
    pub max_steps: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            jump_threshold: 0.5,
            dt: 1.0 / 60.0,
            max_steps: 36_000,
        }
    }
}

impl TrainingParams {
    /// Rejects thresholds outside `[0, 1]`, non-positive timesteps and a zero step cap.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.jump_threshold) {
            return Err(EvoError::InvalidConfig(format!(
                "jump threshold must be within [0, 1], got {}",
                self.jump_threshold
            )));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(EvoError::InvalidConfig(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if self.max_steps == 0 {
            return Err(EvoError::InvalidConfig(
                "max_steps must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
