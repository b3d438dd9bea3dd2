use rand::RngExt;

use super::{Point, SimRng, Stage};

/// How long a bolt stays on screen.
const BOLT_DURATION: f64 = 0.2;
/// Thunder follows the flash after this delay.
const THUNDER_DELAY: f64 = 0.1;
const PRIMARY_SEGMENTS: usize = 5;
const SECONDARY_SEGMENTS: usize = 3;

/// Rate limit and background strike odds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightningSettings {
    /// Seconds between accepted strikes.
    pub min_interval: f64,
    /// Chance per tick that the scene attempts a strike on its own.
    pub random_strike_chance: f64,
}

impl Default for LightningSettings {
    fn default() -> Self {
        LightningSettings {
            min_interval: 15.0,
            random_strike_chance: 0.002,
        }
    }
}

/// A jagged polyline.
pub type Branch = Vec<Point>;

/// The most recent bolt. Kept after it fades so the rate limit has something
/// to compare against; `active` says whether it is on screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightningEvent {
    pub active: bool,
    pub start_time: f64,
    pub duration: f64,
    pub branches: Vec<Branch>,
    pub thunder_played: bool,
}

/// Rate-limited bolt generator with delayed thunder
#[derive(Debug, Clone)]
pub struct LightningController {
    stage: Stage,
    min_interval: f64,
    last_strike: Option<f64>,
    event: LightningEvent,
}

impl LightningController {
    pub fn new(stage: Stage, min_interval: f64) -> Self {
        LightningController {
            stage,
            min_interval: min_interval.max(0.0),
            last_strike: None,
            event: LightningEvent::default(),
        }
    }

    pub fn event(&self) -> &LightningEvent {
        &self.event
    }

    pub fn is_active(&self) -> bool {
        self.event.active
    }

    /// Seconds until another strike would be accepted.
    pub fn cooldown(&self, now: f64) -> f64 {
        self.last_strike
            .map_or(0.0, |last| (self.min_interval - (now - last)).max(0.0))
    }

    /// Try to start a new bolt. Returns `false` (and changes nothing) when the
    /// previous accepted strike was less than `min_interval` seconds ago.
    pub fn strike(&mut self, now: f64, rng: &mut SimRng) -> bool {
        if let Some(last) = self.last_strike
            && now - last < self.min_interval
        {
            return false;
        }

        let width = self.stage.width;
        let start_x = rng.random_range(100.0..=(width - 100.0).max(100.0)).round();
        let end_x = start_x + rng.random_range(-100..=100) as f64;
        let primary = jagged_branch(
            Point::new(start_x, 0.0),
            Point::new(end_x, (self.stage.height / 3.0).floor()),
            PRIMARY_SEGMENTS,
            rng,
        );

        let mut branches = Vec::with_capacity(9);
        let forks = rng.random_range(3..=8);
        for _ in 0..forks {
            let from = primary[rng.random_range(0..primary.len())];
            let to = Point::new(
                from.x + rng.random_range(-80..=80) as f64,
                from.y + rng.random_range(20..=100) as f64,
            );
            branches.push(jagged_branch(from, to, SECONDARY_SEGMENTS, rng));
        }
        branches.insert(0, primary);

        self.event = LightningEvent {
            active: true,
            start_time: now,
            duration: BOLT_DURATION,
            branches,
            thunder_played: false,
        };
        self.last_strike = Some(now);
        true
    }

    /// Advance timers. Returns `true` on the single tick thunder is due.
    pub fn update(&mut self, now: f64) -> bool {
        if !self.event.active {
            return false;
        }
        let elapsed = now - self.event.start_time;

        let thunder = !self.event.thunder_played && elapsed > THUNDER_DELAY;
        if thunder {
            self.event.thunder_played = true;
        }
        if elapsed > self.event.duration {
            self.event.active = false;
        }
        thunder
    }
}

/// Straight line from `start` to `end` split into `segments`, with every
/// interior point knocked sideways by up to 20 and vertically by up to 10.
fn jagged_branch(start: Point, end: Point, segments: usize, rng: &mut SimRng) -> Branch {
    let mut points = Vec::with_capacity(segments + 1);
    points.push(start);
    for i in 1..segments {
        let t = i as f64 / segments as f64;
        points.push(Point::new(
            start.x + (end.x - start.x) * t + rng.random_range(-20..=20) as f64,
            start.y + (end.y - start.y) * t + rng.random_range(-10..=10) as f64,
        ));
    }
    points.push(end);
    points
}
