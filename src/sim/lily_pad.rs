use std::collections::VecDeque;

use rand::RngExt;

use super::{Point, Rgb, SimRng, Stage};

/// Most water drops a pad keeps; the oldest is evicted first.
pub const WATER_DROP_CAPACITY: usize = 10;

const WATER_DROP_START_RADIUS: f64 = 3.0;
const WATER_DROP_MIN_RADIUS: f64 = 1.0;
const WATER_DROP_SHRINK: f64 = 0.1;
const WATER_DROP_RISE: f64 = 0.5;

const PAD_COLOR: Rgb = (30, 100, 30);

/// Index of a pad in the scene's pad list. Pads are never removed, so a key
/// handed out once stays valid for the life of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PadId(pub usize);

/// Bead of water left behind where a drop hit the pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterDrop {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// A lily pad floating on the pond
#[derive(Debug, Clone)]
pub struct LilyPad {
    pub center: Point,
    pub radius: f64,
    pub color: Rgb,
    water_drops: VecDeque<WaterDrop>,
}

impl LilyPad {
    pub fn new(center: Point, radius: f64) -> Self {
        LilyPad {
            center,
            radius,
            color: PAD_COLOR,
            water_drops: VecDeque::with_capacity(WATER_DROP_CAPACITY + 1),
        }
    }

    /// Pad of radius 30..=50 placed fully inside the pond band.
    pub fn random(stage: &Stage, rng: &mut SimRng) -> Self {
        let radius = rng.random_range(30..=50) as f64;
        let x = rng.random_range(radius..=(stage.width - radius).max(radius));
        let top = stage.pond_top() + radius;
        let y = rng.random_range(top..=(stage.pond_bottom() - radius).max(top));
        LilyPad::new(Point::new(x, y), radius)
    }

    /// Strictly inside the pad's disc.
    pub fn contains(&self, p: Point) -> bool {
        self.center.distance(p) < self.radius
    }

    pub fn add_water_drop(&mut self, x: f64, y: f64) {
        self.water_drops.push_back(WaterDrop {
            x,
            y,
            radius: WATER_DROP_START_RADIUS,
        });
        while self.water_drops.len() > WATER_DROP_CAPACITY {
            self.water_drops.pop_front();
        }
    }

    /// Beads drift upward and shrink towards a one-unit speck.
    pub fn update_water_drops(&mut self) {
        for drop in &mut self.water_drops {
            drop.y -= WATER_DROP_RISE;
            drop.radius = (drop.radius - WATER_DROP_SHRINK).max(WATER_DROP_MIN_RADIUS);
        }
    }

    /// Oldest first.
    pub fn water_drops(&self) -> impl ExactSizeIterator<Item = &WaterDrop> {
        self.water_drops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn keeps_only_the_ten_most_recent_drops_in_order() {
        let mut pad = LilyPad::new(Point::new(100.0, 600.0), 40.0);
        for i in 0..15 {
            pad.add_water_drop(i as f64, 600.0);
            assert!(pad.water_drops().len() <= WATER_DROP_CAPACITY);
        }
        let xs: Vec<f64> = pad.water_drops().map(|d| d.x).collect();
        let expected: Vec<f64> = (5..15).map(|i| i as f64).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn water_drops_rise_and_shrink_to_a_floor() {
        let mut pad = LilyPad::new(Point::new(100.0, 600.0), 40.0);
        pad.add_water_drop(100.0, 600.0);
        pad.update_water_drops();
        let drop = *pad.water_drops().next().unwrap();
        assert_eq!(drop.y, 599.5);
        assert!((drop.radius - 2.9).abs() < 1e-9);

        for _ in 0..100 {
            pad.update_water_drops();
        }
        let drop = *pad.water_drops().next().unwrap();
        assert_eq!(drop.radius, 1.0);
        assert_eq!(pad.water_drops().len(), 1);
    }

    #[test]
    fn contains_is_strict() {
        let pad = LilyPad::new(Point::new(0.0, 0.0), 10.0);
        assert!(pad.contains(Point::new(9.9, 0.0)));
        assert!(!pad.contains(Point::new(10.0, 0.0)));
    }

    #[test]
    fn random_pads_sit_inside_the_pond() {
        let stage = Stage::default();
        let mut rng = SimRng::seed_from_u64(3);
        for _ in 0..200 {
            let pad = LilyPad::random(&stage, &mut rng);
            assert!((30.0..=50.0).contains(&pad.radius));
            assert!(pad.center.x - pad.radius >= 0.0);
            assert!(pad.center.x + pad.radius <= stage.width);
            assert!(pad.center.y - pad.radius >= stage.pond_top());
            assert!(pad.center.y + pad.radius <= stage.pond_bottom());
        }
    }
}
