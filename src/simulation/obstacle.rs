//! Obstacles that scroll toward the runners.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::params::Params;

/// A ground-standing block runners must jump over.
///
/// The block spans `[x, x + width]` horizontally and `[0, height]` vertically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge in screen coordinates.
    pub x: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent above the ground.
    pub height: f32,
}

impl Obstacle {
    /// Creates an obstacle of random size at `x`.
    ///
    /// # Arguments
    ///
    /// * `x` - Left edge of the new obstacle
    /// * `params` - Supplies the width and height ranges
    /// * `rng` - Random source for the size
    ///
    /// # Returns
    ///
    /// A new `Obstacle` sized uniformly within the configured ranges.
    pub fn new_random<R: Rng + ?Sized>(x: f32, params: &Params, rng: &mut R) -> Self {
        Self {
            x,
            width: rng.random_range(params.min_obstacle_width..=params.max_obstacle_width),
            height: rng.random_range(params.min_obstacle_height..=params.max_obstacle_height),
        }
    }

    /// Right edge in screen coordinates.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Moves the obstacle left by `dx`.
    pub fn scroll(&mut self, dx: f32) {
        self.x -= dx;
    }

    /// Checks if the obstacle has fully left the screen.
    pub fn is_offscreen(&self) -> bool {
        self.right() < 0.0
    }

    /// Checks whether a box `[left, right] x [bottom, top]` overlaps this obstacle.
    ///
    /// Touching edges do not count as a collision.
    pub fn overlaps(&self, left: f32, right: f32, bottom: f32, top: f32) -> bool {
        left < self.right() && right > self.x && bottom < self.height && top > 0.0
    }
}
