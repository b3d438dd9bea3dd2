use rand::RngExt;
use tracing::{debug, info};

use super::fish::Fish;
use super::lightning::{LightningController, LightningSettings};
use super::lily_pad::{LilyPad, PadId};
use super::raindrop::{DropSpawn, Impact, Raindrop};
use super::weather::{WeatherController, WeatherSettings, WeatherState};
use super::{Cue, SimRng, Stage};

/// Knobs for building a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub weather: WeatherSettings,
    pub lightning: LightningSettings,
    pub lily_pads: usize,
    pub fish: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        SceneSettings {
            weather: WeatherSettings::default(),
            lightning: LightningSettings::default(),
            lily_pads: 6,
            fish: 2,
        }
    }
}

/// Owns every entity and runs the per-tick schedule.
pub struct Scene {
    stage: Stage,
    weather: WeatherController,
    lightning: LightningController,
    random_strike_chance: f64,
    pads: Vec<LilyPad>,
    fish: Vec<Fish>,
    drops: Vec<Raindrop>,
    impacts: Vec<Impact>,
    rng: SimRng,
}

impl Scene {
    /// Scene with randomly placed pads and fish.
    pub fn new(stage: Stage, settings: SceneSettings, mut rng: SimRng) -> Self {
        let pads = (0..settings.lily_pads)
            .map(|_| LilyPad::random(&stage, &mut rng))
            .collect();
        let fish = (0..settings.fish)
            .map(|_| Fish::random(&stage, &mut rng))
            .collect();
        Scene::with_entities(stage, settings, pads, fish, rng)
    }

    pub fn with_entities(
        stage: Stage,
        settings: SceneSettings,
        pads: Vec<LilyPad>,
        fish: Vec<Fish>,
        rng: SimRng,
    ) -> Self {
        Scene {
            stage,
            weather: WeatherController::new(settings.weather),
            lightning: LightningController::new(stage, settings.lightning.min_interval),
            random_strike_chance: settings.lightning.random_strike_chance.clamp(0.0, 1.0),
            pads,
            fish,
            drops: Vec::new(),
            impacts: Vec::new(),
            rng,
        }
    }

    /// Run one tick at time `now`; sound requests are appended to `cues`.
    pub fn tick(&mut self, now: f64, cues: &mut Vec<Cue>) {
        if let Some(state) = self.weather.update(&mut self.rng) {
            info!(
                weather = %state,
                density = self.weather.rain_density(),
                wind = self.weather.wind_strength(),
                "weather changed"
            );
        }

        if self.rng.random_range(0.0..1.0) < self.random_strike_chance
            && self.lightning.strike(now, &mut self.rng)
        {
            info!(now, "lightning strike");
        }

        if self.rng.random_range(0.0..1.0) < self.weather.rain_density() {
            let drop = Raindrop::spawn(now, &self.stage, &self.pads, &mut self.rng);
            self.drops.push(drop);
        }

        self.advance_drops(now, cues);

        for pad in &mut self.pads {
            pad.update_water_drops();
        }
        for fish in &mut self.fish {
            fish.update(&mut self.rng);
        }

        if self.lightning.update(now) {
            cues.push(Cue::Thunder);
        }
    }

    fn advance_drops(&mut self, now: f64, cues: &mut Vec<Cue>) {
        let wind = self.weather.wind_strength();
        let rng = &mut self.rng;
        let impacts = &mut self.impacts;
        self.drops.retain_mut(|drop| drop.update(now, wind, rng, impacts));

        for impact in self.impacts.drain(..) {
            match impact {
                Impact::Pond(_) => cues.push(Cue::RainSplash),
                Impact::Pad { pad, at } => {
                    if let Some(pad) = self.pads.get_mut(pad.0) {
                        pad.add_water_drop(at.x, at.y);
                    }
                }
            }
        }
    }

    /// Manual strike; still subject to the rate limit.
    pub fn request_strike(&mut self, now: f64) -> bool {
        let accepted = self.lightning.strike(now, &mut self.rng);
        if accepted {
            info!(now, "lightning strike (requested)");
        } else {
            debug!(cooldown = self.lightning.cooldown(now), "strike rejected");
        }
        accepted
    }

    /// Add a drop with fixed parameters, bound against the current pads.
    #[allow(dead_code)]
    pub fn spawn_drop(&mut self, now: f64, spawn: DropSpawn) {
        let drop = Raindrop::new(spawn, now, &self.stage, &self.pads, &mut self.rng);
        self.drops.push(drop);
    }

    #[allow(dead_code)]
    pub fn add_pad(&mut self, pad: LilyPad) -> PadId {
        self.pads.push(pad);
        PadId(self.pads.len() - 1)
    }

    pub fn force_weather(&mut self, state: WeatherState) {
        self.weather.force(state, &mut self.rng);
        info!(weather = %state, "weather forced");
    }

    pub fn override_rain_density(&mut self, density: f64) {
        self.weather.override_rain_density(density);
    }

    pub fn override_wind(&mut self, wind: i32) {
        self.weather.override_wind(wind);
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn weather(&self) -> &WeatherController {
        &self.weather
    }

    pub fn lightning(&self) -> &LightningController {
        &self.lightning
    }

    pub fn pads(&self) -> &[LilyPad] {
        &self.pads
    }

    pub fn fish(&self) -> &[Fish] {
        &self.fish
    }

    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }
}
