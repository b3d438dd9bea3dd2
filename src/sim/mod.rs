//! Pond simulation: weather, lightning, lily pads, fish and raindrops.
//!
//! Nothing in here draws or plays anything. Every update takes the tick's
//! `now` (seconds of simulated time) and the scene's seedable generator, so a
//! run is fully reproducible from its seed.

pub mod clock;
pub mod fish;
pub mod lightning;
pub mod lily_pad;
pub mod raindrop;
pub mod scene;
pub mod weather;

pub use clock::SimClock;
pub use scene::{Scene, SceneSettings};

/// Generator threaded through every constructor and update.
pub type SimRng = rand::rngs::StdRng;

/// 8-bit RGB triple.
pub type Rgb = (u8, u8, u8);

/// A point in world units (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Logical scene geometry. The renderer scales this onto whatever canvas it has.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub width: f64,
    pub height: f64,
    /// Height of the pond band at the bottom of the scene.
    pub pond_height: f64,
}

impl Default for Stage {
    fn default() -> Self {
        Stage {
            width: 1000.0,
            height: 700.0,
            pond_height: 150.0,
        }
    }
}

impl Stage {
    /// The pond surface line; unbound raindrops land here.
    pub fn pond_top(&self) -> f64 {
        self.height - self.pond_height
    }

    pub fn pond_bottom(&self) -> f64 {
        self.height
    }
}

/// Sound requests produced by a tick. Playing them is the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A drop hit open water.
    RainSplash,
    /// Delayed thunder after a lightning strike.
    Thunder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_puts_pond_surface_at_550() {
        let stage = Stage::default();
        assert_eq!(stage.pond_top(), 550.0);
        assert_eq!(stage.pond_bottom(), 700.0);
    }

    #[test]
    fn point_distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }
}
