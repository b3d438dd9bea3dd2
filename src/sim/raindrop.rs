use std::f64::consts::TAU;

use rand::RngExt;

use super::lily_pad::{LilyPad, PadId};
use super::{Point, Rgb, SimRng, Stage};

/// Open-water splash shows for this long before the ripple starts.
const SPLASH_DURATION: f64 = 0.1;
const LEAF_SPLASH_PARTICLES: usize = 8;
const PARTICLE_GRAVITY: f64 = 0.2;
const PARTICLE_DECAY: f64 = 0.05;
/// Ripple radius gained per tick.
pub const RIPPLE_GROWTH: f64 = 0.8;
const RIPPLE_THINNING: f64 = 0.03;
const RIPPLE_START_WIDTH: f64 = 3.0;

/// Lifecycle of a drop. Only ever moves forward:
/// `Falling -> (Splash | LeafSplash) -> Ripple`, then the drop is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropState {
    Falling,
    /// Hit open water.
    Splash,
    /// Hit a lily pad.
    LeafSplash,
    Ripple,
}

impl DropState {
    /// Position in the lifecycle; the two impact states share a step.
    #[allow(dead_code)]
    pub fn step(self) -> u8 {
        match self {
            DropState::Falling => 0,
            DropState::Splash | DropState::LeafSplash => 1,
            DropState::Ripple => 2,
        }
    }
}

/// Spray thrown up when a drop hits a pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplashParticle {
    pub position: Point,
    pub vx: f64,
    pub vy: f64,
    /// 1.0 at birth, pruned at 0.
    pub life: f64,
}

impl SplashParticle {
    fn advanced(self) -> Self {
        SplashParticle {
            position: Point::new(self.position.x + self.vx, self.position.y + self.vy),
            vx: self.vx,
            vy: self.vy + PARTICLE_GRAVITY,
            life: self.life - PARTICLE_DECAY,
        }
    }
}

/// The pad a drop will land on, resolved once at spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadBinding {
    pub pad: PadId,
    /// The pad's center line; the drop lands when it reaches this y.
    pub landing_y: f64,
}

/// Where a drop hit, reported back to the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Impact {
    Pond(Point),
    Pad { pad: PadId, at: Point },
}

/// Everything random about a new drop, drawn up front so tests can pin it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropSpawn {
    pub x: f64,
    pub y: f64,
    pub fall_speed: f64,
    pub color: Rgb,
    pub ripple_color: Rgb,
    pub max_ripple_radius: f64,
}

impl DropSpawn {
    pub fn random(stage: &Stage, rng: &mut SimRng) -> Self {
        DropSpawn {
            x: rng.random_range(0..=stage.width as i32) as f64,
            y: rng.random_range(-100..=0) as f64,
            fall_speed: rng.random_range(5.0..15.0),
            color: random_color(100, rng),
            ripple_color: random_color(50, rng),
            max_ripple_radius: rng.random_range(20..=50) as f64,
        }
    }
}

fn random_color(floor: u8, rng: &mut SimRng) -> Rgb {
    (
        rng.random_range(floor..=255),
        rng.random_range(floor..=255),
        rng.random_range(floor..=255),
    )
}

/// A colored raindrop: falls, splashes, ripples, disappears.
#[derive(Debug, Clone)]
pub struct Raindrop {
    position: Point,
    fall_speed: f64,
    color: Rgb,
    ripple_color: Rgb,
    state: DropState,
    surface_y: f64,
    binding: Option<PadBinding>,

    // flicker while falling
    visible: bool,
    next_flicker: f64,
    wind_drift: f64,

    impact_time: f64,
    particles: Vec<SplashParticle>,

    ripple_ticks: u32,
    ripple_radius: f64,
    ripple_width: f64,
    max_ripple_radius: f64,
}

impl Raindrop {
    /// Random drop above the stage.
    pub fn spawn(now: f64, stage: &Stage, pads: &[LilyPad], rng: &mut SimRng) -> Self {
        let spawn = DropSpawn::random(stage, rng);
        Raindrop::new(spawn, now, stage, pads, rng)
    }

    /// Build a drop and bind it to the first pad whose disc its column crosses.
    ///
    /// The overlap test uses the point where the drop's column meets the
    /// pad's center line, since the drop itself starts above the stage. The
    /// binding is never revisited.
    pub fn new(spawn: DropSpawn, now: f64, stage: &Stage, pads: &[LilyPad], rng: &mut SimRng) -> Self {
        let binding = pads
            .iter()
            .enumerate()
            .find(|(_, pad)| pad.contains(Point::new(spawn.x, pad.center.y)))
            .map(|(i, pad)| PadBinding {
                pad: PadId(i),
                landing_y: pad.center.y,
            });

        Raindrop {
            position: Point::new(spawn.x, spawn.y),
            fall_speed: spawn.fall_speed,
            color: spawn.color,
            ripple_color: spawn.ripple_color,
            state: DropState::Falling,
            surface_y: stage.pond_top(),
            binding,
            visible: true,
            next_flicker: now + rng.random_range(0.05..0.2),
            wind_drift: 0.0,
            impact_time: 0.0,
            particles: Vec::new(),
            ripple_ticks: 0,
            ripple_radius: 0.0,
            ripple_width: RIPPLE_START_WIDTH,
            max_ripple_radius: spawn.max_ripple_radius,
        }
    }

    /// Advance one tick. Returns `false` once the drop is finished and
    /// should be removed. Impacts are appended to `impacts`.
    pub fn update(
        &mut self,
        now: f64,
        wind_strength: i32,
        rng: &mut SimRng,
        impacts: &mut Vec<Impact>,
    ) -> bool {
        match self.state {
            DropState::Falling => self.fall(now, wind_strength, rng, impacts),
            DropState::Splash => {
                if now - self.impact_time > SPLASH_DURATION {
                    self.state = DropState::Ripple;
                }
            }
            DropState::LeafSplash => self.spray(rng),
            DropState::Ripple => return self.spread(),
        }
        true
    }

    fn fall(&mut self, now: f64, wind_strength: i32, rng: &mut SimRng, impacts: &mut Vec<Impact>) {
        self.wind_drift = wind_strength as f64 * rng.random_range(0.5..1.5);
        self.position.y += self.fall_speed;
        self.position.x += self.wind_drift;

        if now > self.next_flicker {
            self.visible = !self.visible;
            self.next_flicker = now + rng.random_range(0.05..0.2);
        }

        let landing_y = self.binding.map_or(self.surface_y, |b| b.landing_y);
        if self.position.y < landing_y {
            return;
        }

        self.impact_time = now;
        match self.binding {
            Some(binding) => {
                self.state = DropState::LeafSplash;
                impacts.push(Impact::Pad {
                    pad: binding.pad,
                    at: self.position,
                });
            }
            None => {
                self.state = DropState::Splash;
                impacts.push(Impact::Pond(self.position));
            }
        }
    }

    fn spray(&mut self, rng: &mut SimRng) {
        if self.particles.is_empty() {
            self.particles = (0..LEAF_SPLASH_PARTICLES)
                .map(|_| {
                    let angle = rng.random_range(0.0..TAU);
                    let speed = rng.random_range(2.0..8.0);
                    SplashParticle {
                        position: self.position,
                        vx: speed * angle.cos(),
                        vy: speed * angle.sin(),
                        life: 1.0,
                    }
                })
                .collect();
        }

        self.particles = self
            .particles
            .iter()
            .map(|p| p.advanced())
            .filter(|p| p.life > 0.0)
            .collect();

        if self.particles.is_empty() {
            self.state = DropState::Ripple;
        }
    }

    fn spread(&mut self) -> bool {
        self.ripple_ticks += 1;
        // Derived from the tick count so the radius doesn't accumulate error.
        self.ripple_radius = self.ripple_ticks as f64 * RIPPLE_GROWTH;
        self.ripple_width = (RIPPLE_START_WIDTH - self.ripple_ticks as f64 * RIPPLE_THINNING).max(0.0);
        self.ripple_radius < self.max_ripple_radius && self.ripple_width > 0.0
    }

    pub fn state(&self) -> DropState {
        self.state
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn ripple_color(&self) -> Rgb {
        self.ripple_color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[allow(dead_code)]
    pub fn binding(&self) -> Option<PadBinding> {
        self.binding
    }

    pub fn particles(&self) -> &[SplashParticle] {
        &self.particles
    }

    pub fn ripple_radius(&self) -> f64 {
        self.ripple_radius
    }

    pub fn ripple_width(&self) -> f64 {
        self.ripple_width
    }

    pub fn max_ripple_radius(&self) -> f64 {
        self.max_ripple_radius
    }

    /// Horizontal drift applied on the last falling tick.
    pub fn wind_drift(&self) -> f64 {
        self.wind_drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn spawn_at(x: f64, y: f64, fall_speed: f64) -> DropSpawn {
        DropSpawn {
            x,
            y,
            fall_speed,
            color: (200, 200, 255),
            ripple_color: (120, 160, 255),
            max_ripple_radius: 30.0,
        }
    }

    /// Run until the drop dies, recording every state it was in after each tick.
    fn run_to_end(drop: &mut Raindrop, rng: &mut SimRng, dt: f64) -> Vec<DropState> {
        let mut impacts = Vec::new();
        let mut states = vec![drop.state()];
        for tick in 1..10_000 {
            let alive = drop.update(tick as f64 * dt, 0, rng, &mut impacts);
            if !alive {
                return states;
            }
            states.push(drop.state());
        }
        panic!("drop never expired");
    }

    #[test]
    fn falls_splashes_and_ripples_on_schedule() {
        let stage = Stage::default();
        let mut rng = SimRng::seed_from_u64(7);
        let mut drop = Raindrop::new(spawn_at(500.0, -10.0, 10.0), 0.0, &stage, &[], &mut rng);
        let mut impacts = Vec::new();

        for tick in 1..=55 {
            drop.update(tick as f64 * 0.1, 0, &mut rng, &mut impacts);
            assert_eq!(drop.state(), DropState::Falling, "tick {tick}");
        }
        drop.update(5.6, 0, &mut rng, &mut impacts);
        assert!(drop.position().y >= 550.0);
        assert_ne!(drop.state(), DropState::Falling);
        assert_eq!(drop.position().x, 500.0);
        assert_eq!(impacts, vec![Impact::Pond(Point::new(500.0, 550.0))]);

        drop.update(5.7, 0, &mut rng, &mut impacts);
        drop.update(5.8, 0, &mut rng, &mut impacts);
        assert_eq!(drop.state(), DropState::Ripple);
    }

    #[test]
    fn states_only_move_forward() {
        let stage = Stage::default();
        let pads = [LilyPad::new(Point::new(300.0, 620.0), 40.0)];
        let mut rng = SimRng::seed_from_u64(8);
        for _ in 0..200 {
            let mut drop = Raindrop::spawn(0.0, &stage, &pads, &mut rng);
            let states = run_to_end(&mut drop, &mut rng, 1.0 / 60.0);
            assert!(states.windows(2).all(|w| w[0].step() <= w[1].step()), "{states:?}");
            assert!(!states.contains(&DropState::Splash) || !states.contains(&DropState::LeafSplash));
            assert_eq!(states.last(), Some(&DropState::Ripple));
        }
    }

    #[test]
    fn ripple_ends_within_max_radius_over_growth_ticks() {
        let stage = Stage::default();
        let mut rng = SimRng::seed_from_u64(9);
        let mut spawn = spawn_at(500.0, 545.0, 10.0);
        spawn.max_ripple_radius = 20.0;
        let mut drop = Raindrop::new(spawn, 0.0, &stage, &[], &mut rng);
        let mut impacts = Vec::new();

        let mut now = 0.0;
        while drop.state() != DropState::Ripple {
            now += 0.1;
            assert!(drop.update(now, 0, &mut rng, &mut impacts));
        }

        let mut ripple_ticks = 0;
        loop {
            now += 0.1;
            ripple_ticks += 1;
            if !drop.update(now, 0, &mut rng, &mut impacts) {
                break;
            }
        }
        assert!(ripple_ticks <= 25, "took {ripple_ticks} ticks");
        assert!(drop.ripple_radius() >= 20.0);
    }

    #[test]
    fn ripple_ends_when_its_width_runs_out() {
        let stage = Stage::default();
        let mut rng = SimRng::seed_from_u64(14);
        let mut spawn = spawn_at(500.0, 545.0, 10.0);
        spawn.max_ripple_radius = 100.0;
        let mut drop = Raindrop::new(spawn, 0.0, &stage, &[], &mut rng);
        let mut impacts = Vec::new();

        let mut now = 0.0;
        while drop.state() != DropState::Ripple {
            now += 0.1;
            assert!(drop.update(now, 0, &mut rng, &mut impacts));
        }

        for tick in 1..100 {
            now += 0.1;
            assert!(drop.update(now, 0, &mut rng, &mut impacts), "died early on tick {tick}");
            assert!(drop.ripple_width() > 0.0);
        }
        assert!(!drop.update(now + 0.1, 0, &mut rng, &mut impacts));
        assert_eq!(drop.ripple_width(), 0.0);
        assert!(drop.ripple_radius() < drop.max_ripple_radius());
    }

    #[test]
    fn falling_drop_flickers_after_its_deadline() {
        let stage = Stage::default();
        let mut rng = SimRng::seed_from_u64(15);
        let mut drop = Raindrop::new(spawn_at(500.0, -1000.0, 1.0), 0.0, &stage, &[], &mut rng);
        let mut impacts = Vec::new();
        assert!(drop.is_visible());
        assert!((0.05..0.2).contains(&drop.next_flicker));

        drop.update(0.01, 0, &mut rng, &mut impacts);
        assert!(drop.is_visible());

        drop.update(0.21, 0, &mut rng, &mut impacts);
        assert!(!drop.is_visible());
        assert!((0.259..0.411).contains(&drop.next_flicker), "{}", drop.next_flicker);

        let deadline = drop.next_flicker;
        drop.update(deadline, 0, &mut rng, &mut impacts);
        assert!(!drop.is_visible());
        drop.update(deadline + 0.001, 0, &mut rng, &mut impacts);
        assert!(drop.is_visible());
        assert_eq!(drop.state(), DropState::Falling);
    }

    #[test]
    fn binds_to_the_pad_below_and_lands_on_it() {
        let stage = Stage::default();
        let pads = [
            LilyPad::new(Point::new(100.0, 600.0), 40.0),
            LilyPad::new(Point::new(400.0, 640.0), 40.0),
        ];
        let mut rng = SimRng::seed_from_u64(10);
        let mut drop = Raindrop::new(spawn_at(410.0, -5.0, 10.0), 0.0, &stage, &pads, &mut rng);
        assert_eq!(
            drop.binding(),
            Some(PadBinding {
                pad: PadId(1),
                landing_y: 640.0
            })
        );

        let mut impacts = Vec::new();
        let mut tick = 0;
        while drop.state() == DropState::Falling {
            tick += 1;
            drop.update(tick as f64 / 60.0, 0, &mut rng, &mut impacts);
        }
        assert_eq!(drop.state(), DropState::LeafSplash);
        assert!(drop.position().y >= 640.0);
        assert!(matches!(impacts.as_slice(), [Impact::Pad { pad: PadId(1), .. }]));
    }

    #[test]
    fn leaf_splash_bursts_eight_particles_then_ripples() {
        let stage = Stage::default();
        let pads = [LilyPad::new(Point::new(500.0, 600.0), 40.0)];
        let mut rng = SimRng::seed_from_u64(11);
        let mut drop = Raindrop::new(spawn_at(500.0, 595.0, 10.0), 0.0, &stage, &pads, &mut rng);
        let mut impacts = Vec::new();

        drop.update(0.1, 0, &mut rng, &mut impacts);
        assert_eq!(drop.state(), DropState::LeafSplash);
        assert!(drop.particles().is_empty());

        drop.update(0.2, 0, &mut rng, &mut impacts);
        assert_eq!(drop.particles().len(), LEAF_SPLASH_PARTICLES);
        assert!(drop.particles().iter().all(|p| (p.life - 0.95).abs() < 1e-9));

        let mut ticks = 1;
        while drop.state() == DropState::LeafSplash {
            drop.update(0.2 + ticks as f64 * 0.1, 0, &mut rng, &mut impacts);
            ticks += 1;
            assert!(ticks <= 21, "spray outlived its particles");
        }
        assert_eq!(drop.state(), DropState::Ripple);
        assert!(drop.particles().is_empty());
    }

    #[test]
    fn particles_fall_under_gravity() {
        let p = SplashParticle {
            position: Point::new(0.0, 0.0),
            vx: 1.0,
            vy: -2.0,
            life: 1.0,
        };
        let next = p.advanced();
        assert_eq!(next.position, Point::new(1.0, -2.0));
        assert!((next.vy - -1.8).abs() < 1e-12);
        assert!((next.life - 0.95).abs() < 1e-12);
    }

    #[test]
    fn wind_drift_is_redrawn_each_tick_within_bounds() {
        let stage = Stage::default();
        let mut rng = SimRng::seed_from_u64(12);
        let mut drop = Raindrop::new(spawn_at(500.0, -100.0, 5.0), 0.0, &stage, &[], &mut rng);
        let mut impacts = Vec::new();
        let mut drifts = Vec::new();
        for tick in 1..=20 {
            drop.update(tick as f64 / 60.0, 4, &mut rng, &mut impacts);
            drifts.push(drop.wind_drift());
        }
        assert!(drifts.iter().all(|d| (2.0..6.0).contains(d)));
        assert!(drifts.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn random_spawns_start_above_the_stage() {
        let stage = Stage::default();
        let mut rng = SimRng::seed_from_u64(13);
        for _ in 0..500 {
            let spawn = DropSpawn::random(&stage, &mut rng);
            assert!((0.0..=stage.width).contains(&spawn.x));
            assert!((-100.0..=0.0).contains(&spawn.y));
            assert!((5.0..15.0).contains(&spawn.fall_speed));
            assert!((20.0..=50.0).contains(&spawn.max_ripple_radius));
            assert!(spawn.color.0 >= 100 && spawn.ripple_color.0 >= 50);
        }
    }
}
