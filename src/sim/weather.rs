use std::fmt;
use std::ops::RangeInclusive;

use rand::RngExt;
use serde::Deserialize;

use super::SimRng;

/// Named rain presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherState {
    Normal,
    Heavy,
    Light,
}

impl WeatherState {
    /// Chance per tick that a new drop spawns.
    pub fn rain_density(self) -> f64 {
        match self {
            WeatherState::Normal => 0.5,
            WeatherState::Heavy => 0.9,
            WeatherState::Light => 0.2,
        }
    }

    /// Wind magnitude range; the sign is drawn separately.
    fn wind_magnitude(self) -> RangeInclusive<i32> {
        match self {
            WeatherState::Normal => 0..=2,
            WeatherState::Heavy => 2..=5,
            WeatherState::Light => 0..=1,
        }
    }
}

impl fmt::Display for WeatherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherState::Normal => "normal",
            WeatherState::Heavy => "heavy",
            WeatherState::Light => "light",
        };
        f.write_str(name)
    }
}

/// How often the weather gets a chance to change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSettings {
    pub interval_ticks: u32,
    pub change_probability: f64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        WeatherSettings {
            interval_ticks: 300,
            change_probability: 0.3,
        }
    }
}

/// Owns rain density and wind; cycles Normal <-> Heavy/Light on its own timer.
#[derive(Debug, Clone)]
pub struct WeatherController {
    state: WeatherState,
    rain_density: f64,
    wind_strength: i32,
    ticks: u32,
    settings: WeatherSettings,
}

impl WeatherController {
    pub fn new(settings: WeatherSettings) -> Self {
        WeatherController {
            state: WeatherState::Normal,
            rain_density: WeatherState::Normal.rain_density(),
            wind_strength: 0,
            ticks: 0,
            settings: WeatherSettings {
                interval_ticks: settings.interval_ticks.max(1),
                change_probability: settings.change_probability.clamp(0.0, 1.0),
            },
        }
    }

    pub fn state(&self) -> WeatherState {
        self.state
    }

    pub fn rain_density(&self) -> f64 {
        self.rain_density
    }

    pub fn wind_strength(&self) -> i32 {
        self.wind_strength
    }

    /// Advance one tick. Returns the new state when the weather changed.
    pub fn update(&mut self, rng: &mut SimRng) -> Option<WeatherState> {
        self.ticks += 1;
        if self.ticks < self.settings.interval_ticks {
            return None;
        }
        self.ticks = 0;

        if rng.random_range(0.0..1.0) >= self.settings.change_probability {
            return None;
        }

        let next = match self.state {
            WeatherState::Normal => {
                if rng.random_range(0..2) == 0 {
                    WeatherState::Heavy
                } else {
                    WeatherState::Light
                }
            }
            WeatherState::Heavy | WeatherState::Light => WeatherState::Normal,
        };
        self.enter(next, rng);
        Some(next)
    }

    /// Jump straight to `state`, sampling fresh parameters. The tick window is
    /// left alone so forced changes don't shift the regular schedule.
    pub fn force(&mut self, state: WeatherState, rng: &mut SimRng) {
        self.enter(state, rng);
    }

    /// Held until the next transition. Clamped into (0, 1].
    pub fn override_rain_density(&mut self, density: f64) {
        self.rain_density = density.clamp(0.01, 1.0);
    }

    /// Held until the next transition.
    pub fn override_wind(&mut self, wind: i32) {
        self.wind_strength = wind;
    }

    fn enter(&mut self, state: WeatherState, rng: &mut SimRng) {
        self.state = state;
        self.rain_density = state.rain_density();
        let magnitude = rng.random_range(state.wind_magnitude());
        let sign = if rng.random_range(0..2) == 0 { -1 } else { 1 };
        self.wind_strength = magnitude * sign;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn starts_calm() {
        let weather = WeatherController::new(WeatherSettings::default());
        assert_eq!(weather.state(), WeatherState::Normal);
        assert_eq!(weather.rain_density(), 0.5);
        assert_eq!(weather.wind_strength(), 0);
    }

    #[test]
    fn only_changes_on_window_boundaries() {
        let mut weather = WeatherController::new(WeatherSettings {
            interval_ticks: 300,
            change_probability: 1.0,
        });
        let mut rng = SimRng::seed_from_u64(1);
        for _ in 0..299 {
            assert_eq!(weather.update(&mut rng), None);
        }
        let changed = weather.update(&mut rng).expect("certain change at tick 300");
        assert_ne!(changed, WeatherState::Normal);
        assert_eq!(weather.update(&mut rng), None);
    }

    #[test]
    fn toggles_through_normal() {
        let mut weather = WeatherController::new(WeatherSettings {
            interval_ticks: 1,
            change_probability: 1.0,
        });
        let mut rng = SimRng::seed_from_u64(2);
        let mut previous = weather.state();
        for _ in 0..100 {
            let next = weather.update(&mut rng).unwrap();
            if previous == WeatherState::Normal {
                assert!(matches!(next, WeatherState::Heavy | WeatherState::Light));
            } else {
                assert_eq!(next, WeatherState::Normal);
            }
            previous = next;
        }
    }

    #[test]
    fn parameters_match_the_state() {
        let mut weather = WeatherController::new(WeatherSettings {
            interval_ticks: 1,
            change_probability: 1.0,
        });
        let mut rng = SimRng::seed_from_u64(3);
        for _ in 0..500 {
            let state = weather.update(&mut rng).unwrap();
            let wind = weather.wind_strength().abs();
            assert_eq!(weather.rain_density(), state.rain_density());
            assert!(state.wind_magnitude().contains(&wind), "{state}: wind {wind}");
        }
    }

    #[test]
    fn transition_rate_tracks_probability() {
        let mut weather = WeatherController::new(WeatherSettings::default());
        let mut rng = SimRng::seed_from_u64(42);
        let windows = 10_000;
        let mut transitions = 0;
        for _ in 0..windows * 300 {
            if weather.update(&mut rng).is_some() {
                transitions += 1;
            }
        }
        let rate = transitions as f64 / windows as f64;
        assert!((rate - 0.3).abs() < 0.02, "observed rate {rate}");
    }

    #[test]
    fn overrides_hold_until_next_transition() {
        let mut weather = WeatherController::new(WeatherSettings {
            interval_ticks: 10,
            change_probability: 1.0,
        });
        let mut rng = SimRng::seed_from_u64(4);
        weather.override_rain_density(0.0);
        weather.override_wind(-7);
        assert_eq!(weather.rain_density(), 0.01);
        assert_eq!(weather.wind_strength(), -7);
        for _ in 0..10 {
            weather.update(&mut rng);
        }
        assert!(weather.wind_strength().abs() <= 5);
    }

    #[test]
    fn force_samples_fresh_parameters() {
        let mut weather = WeatherController::new(WeatherSettings::default());
        let mut rng = SimRng::seed_from_u64(5);
        weather.force(WeatherState::Heavy, &mut rng);
        assert_eq!(weather.state(), WeatherState::Heavy);
        assert_eq!(weather.rain_density(), 0.9);
        assert!((2..=5).contains(&weather.wind_strength().abs()));
    }
}
