use std::f64::consts::{FRAC_PI_4, TAU};

use noise::{NoiseFn, Perlin};
use rand::RngExt;

use super::canvas::{Canvas, mix};
use super::raster::{Painter, Viewport};
use crate::sim::fish::Fish;
use crate::sim::lily_pad::LilyPad;
use crate::sim::raindrop::{DropState, Raindrop};
use crate::sim::{Point, Rgb, Scene, Stage};

const SKY_TOP: Rgb = (10, 10, 30);
const SKY_FLASH: Rgb = (90, 90, 120);
const POND_BLUE: Rgb = (20, 40, 100);
const POND_DEEP: Rgb = (8, 16, 50);
const PAD_EDGE: Rgb = (50, 150, 50);
const PAD_WATER: Rgb = (100, 100, 200);
const BOLT: Rgb = (255, 255, 255);
const EYE: Rgb = (255, 255, 255);

const DROP_STREAK: f64 = 10.0;
const SPLASH_RAYS: usize = 5;
const PAD_VEINS: usize = 8;

/// Draws a [`Scene`] onto a [`Canvas`], scaled to fit.
pub struct ScenePainter {
    noise: Perlin,
    rng: rand::rngs::ThreadRng,
}

impl ScenePainter {
    pub fn new(seed: u32) -> Self {
        ScenePainter {
            noise: Perlin::new(seed),
            rng: rand::rng(),
        }
    }

    /// Paint one full frame. Back to front: sky, pond, pads, fish, drops, bolt.
    pub fn paint(&mut self, canvas: &mut Canvas, scene: &Scene, now: f64) {
        let stage = *scene.stage();
        let view = Viewport::fit(&stage, canvas);
        let flash = scene.lightning().is_active();

        self.backdrop(canvas, view, &stage, flash, now);

        let mut p = Painter::new(canvas, view);
        for pad in scene.pads() {
            draw_pad(&mut p, pad);
        }
        for fish in scene.fish() {
            draw_fish(&mut p, fish);
        }
        for drop in scene.drops() {
            self.draw_drop(&mut p, drop);
        }
        if flash {
            for branch in &scene.lightning().event().branches {
                p.polyline(branch, BOLT, 1.0);
            }
        }
    }

    fn backdrop(&self, canvas: &mut Canvas, view: Viewport, stage: &Stage, flash: bool, now: f64) {
        let pond_top = stage.pond_top();
        let sky_top = if flash { SKY_FLASH } else { SKY_TOP };
        let sky_px = (pond_top * view.sy).round().max(1.0) as usize;
        let t = now * 0.5;

        for y in 0..canvas.height {
            let world_y = view.to_world(0, y as i64).y;
            if y < sky_px {
                let sky = mix(sky_top, (0, 0, 0), y as f64 / sky_px as f64);
                canvas.pixels[y * canvas.width..(y + 1) * canvas.width].fill(sky);
                continue;
            }
            let depth = ((world_y - pond_top) / stage.pond_height).clamp(0.0, 1.0);
            let base = mix(POND_BLUE, POND_DEEP, depth);
            for x in 0..canvas.width {
                let world = view.to_world(x as i64, y as i64);
                let n = self.noise.get([world.x * 0.02, world.y * 0.05, t]);
                let shimmer = (n * 0.5 + 0.5).clamp(0.0, 1.0) * 0.25;
                let mut px = mix(base, (60, 90, 160), shimmer);
                if flash {
                    px = mix(px, SKY_FLASH, 0.3);
                }
                canvas.pixels[y * canvas.width + x] = px;
            }
        }
    }

    fn draw_drop(&mut self, p: &mut Painter, drop: &Raindrop) {
        let pos = drop.position();
        match drop.state() {
            DropState::Falling => {
                if drop.is_visible() {
                    let tail = Point::new(pos.x - drop.wind_drift(), pos.y - DROP_STREAK);
                    p.line(tail, pos, drop.color(), 1.0);
                }
            }
            DropState::Splash => {
                for _ in 0..SPLASH_RAYS {
                    let angle = self.rng.random_range(0.0..TAU);
                    let len = self.rng.random_range(5.0..15.0);
                    let end = Point::new(pos.x + angle.cos() * len, pos.y + angle.sin() * len);
                    p.line(pos, end, drop.ripple_color(), 1.0);
                }
            }
            DropState::LeafSplash => {
                let (r, g, b) = drop.ripple_color();
                for particle in drop.particles() {
                    let lift = (particle.life * 255.0 / 3.0) as u8;
                    let rgb = (r.saturating_add(lift), g.saturating_add(lift), b.saturating_add(lift));
                    p.fill_circle(particle.position, 3.0, rgb, particle.life.clamp(0.2, 1.0));
                }
            }
            DropState::Ripple => {
                let fade = 1.0 - drop.ripple_radius() / drop.max_ripple_radius();
                p.ring(pos, drop.ripple_radius(), drop.ripple_width(), drop.ripple_color(), fade);
            }
        }
    }
}

fn draw_pad(p: &mut Painter, pad: &LilyPad) {
    p.fill_circle(pad.center, pad.radius, pad.color, 1.0);
    p.ring(pad.center, pad.radius, 2.0, PAD_EDGE, 1.0);
    for i in 0..PAD_VEINS {
        let angle = i as f64 * FRAC_PI_4;
        let end = Point::new(
            pad.center.x + angle.cos() * pad.radius * 0.8,
            pad.center.y + angle.sin() * pad.radius * 0.8,
        );
        p.line(pad.center, end, PAD_EDGE, 0.6);
    }
    for drop in pad.water_drops() {
        p.fill_circle(Point::new(drop.x, drop.y), drop.radius, PAD_WATER, 0.9);
    }
}

fn draw_fish(p: &mut Painter, fish: &Fish) {
    let (head, tail) = fish.spine();
    let (dir_y, dir_x) = fish.heading.sin_cos();
    p.line(head, tail, fish.color, 1.0);
    p.fill_circle(fish.position, fish.length / 6.0, fish.color, 1.0);

    // Tail fin swings side to side with the phase.
    let swing = fish.tail_phase.sin() * 5.0;
    let (nx, ny) = (-dir_y, dir_x);
    let fin_tip = Point::new(tail.x - dir_x * 10.0, tail.y - dir_y * 10.0);
    let fin = [
        tail,
        Point::new(fin_tip.x + nx * (5.0 + swing), fin_tip.y + ny * (5.0 + swing)),
        Point::new(fin_tip.x - nx * (5.0 - swing), fin_tip.y - ny * (5.0 - swing)),
    ];
    p.polygon(&fin, fish.color);

    let eye = Point::new(head.x - dir_x * 5.0, head.y - dir_y * 5.0);
    p.fill_circle(eye, 3.0, EYE, 1.0);
}
