use std::f64::consts::{PI, TAU};

use rand::RngExt;

use super::{Point, Rgb, SimRng, Stage};

/// Distance fish keep from the pond edges.
const EDGE_MARGIN: f64 = 20.0;
const TURN_CHANCE: f64 = 0.02;
const MAX_TURN: f64 = 0.5;

const FISH_COLOR: Rgb = (255, 150, 50);

/// Rectangle a fish is confined to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// The pond band inset by the edge margin.
    pub fn pond(stage: &Stage) -> Self {
        Bounds {
            min_x: EDGE_MARGIN,
            max_x: stage.width - EDGE_MARGIN,
            min_y: stage.pond_top() + EDGE_MARGIN,
            max_y: stage.pond_bottom() - EDGE_MARGIN,
        }
    }

    #[allow(dead_code)]
    pub fn contains(&self, p: Point) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

/// Koi wandering around the pond. Purely decorative.
#[derive(Debug, Clone)]
pub struct Fish {
    pub position: Point,
    /// Radians, 0 = facing right.
    pub heading: f64,
    pub speed: f64,
    pub length: f64,
    pub tail_phase: f64,
    pub tail_speed: f64,
    pub color: Rgb,
    bounds: Bounds,
}

impl Fish {
    pub fn new(position: Point, heading: f64, speed: f64, bounds: Bounds) -> Self {
        Fish {
            position,
            heading,
            speed,
            length: 30.0,
            tail_phase: 0.0,
            tail_speed: 0.2,
            color: FISH_COLOR,
            bounds,
        }
    }

    pub fn random(stage: &Stage, rng: &mut SimRng) -> Self {
        let bounds = Bounds::pond(stage);
        let x = rng.random_range(50.0..=(stage.width - 50.0).max(50.0));
        let y = rng.random_range(bounds.min_y..=bounds.max_y.max(bounds.min_y));
        let heading = rng.random_range(0.0..TAU);
        let speed = rng.random_range(0.5..2.0);
        Fish {
            length: rng.random_range(20..=40) as f64,
            tail_phase: rng.random_range(0.0..TAU),
            tail_speed: rng.random_range(0.1..0.3),
            ..Fish::new(Point::new(x, y), heading, speed, bounds)
        }
    }

    #[allow(dead_code)]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn update(&mut self, rng: &mut SimRng) {
        if rng.random_range(0.0..1.0) < TURN_CHANCE {
            self.heading += rng.random_range(-MAX_TURN..MAX_TURN);
        }

        self.position.x += self.heading.cos() * self.speed;
        self.position.y += self.heading.sin() * self.speed;

        let b = self.bounds;
        if self.position.x < b.min_x || self.position.x > b.max_x {
            self.heading = PI - self.heading;
        }
        if self.position.y < b.min_y || self.position.y > b.max_y {
            self.heading = -self.heading;
        }
        self.position.x = self.position.x.clamp(b.min_x, b.max_x);
        self.position.y = self.position.y.clamp(b.min_y, b.max_y);

        self.tail_phase += self.tail_speed;
    }

    /// Head and tail ends of the body line.
    pub fn spine(&self) -> (Point, Point) {
        let (sin, cos) = self.heading.sin_cos();
        let half = self.length / 2.0;
        (
            Point::new(self.position.x + cos * half, self.position.y + sin * half),
            Point::new(self.position.x - cos * half, self.position.y - sin * half),
        )
    }
}
