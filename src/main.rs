mod audio;
mod config;
mod control;
mod logging;
mod render;
mod sim;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, terminal,
};
use rand::{RngExt, SeedableRng};
use tracing::{debug, info};

use audio::{AudioOutput, Mixer, NullOutput, SoundBank};
use control::{ControlMessage, ControlSource};
use render::{Canvas, ColorMode, RenderMode, ScenePainter};
use sim::{Scene, SceneSettings, SimClock, SimRng, Stage};

#[derive(Parser)]
#[command(name = "nightpond", version, about = "Rain, ripples, lily pads and lightning over a night pond")]
struct Cli {
    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120); also the simulation tick rate
    #[arg(short, long)]
    fps: Option<u32>,

    /// Seed for the simulation (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Directory containing rain.wav and thunder.wav
    #[arg(long, value_name = "DIR")]
    sounds: Option<PathBuf>,

    /// JSON-lines control feed: a file to watch, or - for stdin
    #[arg(long, value_name = "PATH|-")]
    control: Option<String>,

    /// Log file (default: <data dir>/nightpond/nightpond.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable logging
    #[arg(long)]
    no_log: bool,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Print a commented default config and exit
    #[arg(long)]
    default_config: bool,
}

/// Display options resolved from CLI, config file and defaults.
struct DisplayOptions {
    render_mode: RenderMode,
    color_mode: ColorMode,
    fps: u32,
    hide_status: bool,
}

const DEFAULT_FPS: u32 = 60;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        match config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("no config directory on this platform"),
        }
        return Ok(());
    }
    if cli.default_config {
        print!("{}", config::default_config_string());
        return Ok(());
    }

    let _log_guard = if cli.no_log {
        None
    } else {
        match cli.log_file.clone().or_else(logging::default_log_path) {
            Some(path) => match logging::init(&path) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    eprintln!("Warning: logging disabled: {e:#}");
                    None
                }
            },
            None => None,
        }
    };
    info!("starting nightpond v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config();
    let display = DisplayOptions {
        render_mode: cli
            .render
            .or(config.render.map(Into::into))
            .unwrap_or(RenderMode::HalfBlock),
        color_mode: cli
            .color
            .or(config.color.map(Into::into))
            .unwrap_or(ColorMode::TrueColor),
        fps: cli.fps.or(config.fps).unwrap_or(DEFAULT_FPS).clamp(1, 120),
        hide_status: cli.clean || config.clean.unwrap_or(false),
    };

    let seed = cli.seed.or(config.seed).unwrap_or_else(|| rand::rng().random());
    info!(seed, "simulation seed");

    let settings = SceneSettings {
        weather: config.weather_settings(),
        lightning: config.lightning_settings(),
        ..SceneSettings::default()
    };
    let scene = Scene::new(Stage::default(), settings, SimRng::seed_from_u64(seed));

    let mixer_settings = config.mixer_settings();
    let sounds_dir = cli.sounds.clone().or_else(|| config.audio.sounds_dir.clone());
    let bank = SoundBank::load(sounds_dir.as_deref());
    let output = open_output(mixer_settings.channels.max(audio::MIN_CHANNELS));
    let mixer = Mixer::new(output, bank, mixer_settings);

    let control_rx = cli
        .control
        .as_deref()
        .map(|arg| control::spawn_reader(ControlSource::parse(arg)));

    // Setup terminal
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)
        .context("failed to enter alternate screen")?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(&mut writer, display, scene, mixer, control_rx, seed);

    // Cleanup
    let restored = restore_terminal(&mut writer);
    info!("exiting");

    result?;
    Ok(restored?)
}

#[cfg(feature = "rodio_backend")]
fn open_output(channels: usize) -> Box<dyn AudioOutput> {
    match audio::RodioOutput::new(channels) {
        Ok(output) => Box::new(output),
        Err(e) => {
            tracing::warn!("{e}; continuing without sound");
            Box::new(NullOutput)
        }
    }
}

#[cfg(not(feature = "rodio_backend"))]
fn open_output(channels: usize) -> Box<dyn AudioOutput> {
    debug!(channels, "built without an audio backend, sound is muted");
    Box::new(NullOutput)
}

const RENDER_MODES: [RenderMode; 2] = [RenderMode::HalfBlock, RenderMode::Ascii];
const COLOR_MODES: [ColorMode; 3] = [ColorMode::TrueColor, ColorMode::Ansi256, ColorMode::Ansi16];

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    display: DisplayOptions,
    mut scene: Scene,
    mut mixer: Mixer,
    control_rx: Option<Receiver<ControlMessage>>,
    seed: u64,
) -> io::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let DisplayOptions {
        mut render_mode,
        mut color_mode,
        fps,
        mut hide_status,
    } = display;
    let frame_dur = Duration::from_secs_f64(1.0 / fps as f64);

    let display_rows = if hide_status { rows as usize } else { (rows as usize).saturating_sub(1) };
    let mut canvas = Canvas::new(cols as usize, display_rows, render_mode, color_mode);
    // Perlin only takes a u32 seed; fold the high half in.
    let mut painter = ScenePainter::new((seed ^ (seed >> 32)) as u32);
    let mut clock = SimClock::new(fps);
    let mut cues = Vec::new();

    let mut last_frame = Instant::now();
    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();

    // Track if we need to rebuild canvas
    let mut rebuild_canvas = false;

    mixer.start_ambient();

    'frames: loop {
        // Handle input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        rebuild_canvas = true;
                    }
                }
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) => match code {
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break 'frames,
                    KeyCode::Char('q') | KeyCode::Esc => break 'frames,
                    KeyCode::Char('t') => {
                        scene.request_strike(clock.now());
                    }
                    // Cycle render mode
                    KeyCode::Char('r') => {
                        let idx = RENDER_MODES.iter().position(|&m| m == render_mode).unwrap_or(0);
                        render_mode = RENDER_MODES[(idx + 1) % RENDER_MODES.len()];
                        rebuild_canvas = true;
                    }
                    // Cycle color mode
                    KeyCode::Char('c') => {
                        let idx = COLOR_MODES.iter().position(|&m| m == color_mode).unwrap_or(0);
                        color_mode = COLOR_MODES[(idx + 1) % COLOR_MODES.len()];
                        rebuild_canvas = true;
                    }
                    // Toggle status bar
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        rebuild_canvas = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Rebuild canvas if mode changed or terminal resized
        if rebuild_canvas && cols >= 10 && rows >= 5 {
            // Re-read size to get the settled value
            let (settled_cols, settled_rows) = terminal::size()?;
            if settled_cols >= 10 && settled_rows >= 5 {
                cols = settled_cols;
                rows = settled_rows;
            }
            let display_rows = if hide_status { rows as usize } else { (rows as usize).saturating_sub(1) };
            canvas = Canvas::new(cols as usize, display_rows, render_mode, color_mode);
            debug!(cols, rows, ?render_mode, ?color_mode, "canvas rebuilt");
            // Reset terminal state completely
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        let now = clock.advance();

        if let Some(rx) = &control_rx {
            while let Ok(msg) = rx.try_recv() {
                debug!(?msg, "control message");
                control::apply(&msg, &mut scene, now);
            }
        }

        // Update & render
        scene.tick(now, &mut cues);
        for cue in cues.drain(..) {
            mixer.play(cue, now);
        }
        painter.paint(&mut canvas, &scene, now);
        let frame = canvas.render();

        // Verify terminal size hasn't changed before writing
        // If it changed, skip this frame to avoid writing wrong-sized data
        let (check_cols, check_rows) = terminal::size()?;
        if check_cols != cols || check_rows != rows {
            cols = check_cols;
            rows = check_rows;
            rebuild_canvas = true;
            // Sleep briefly to let terminal settle
            std::thread::sleep(Duration::from_millis(50));
            continue;
        }

        // Build entire frame into buffer before flushing
        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(frame.as_bytes())?;

        // Status bar
        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
        }
        if !hide_status {
            let status = status_line(&scene, now, actual_fps);
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        // Single flush per frame
        stdout.flush()?;

        // Sleep to target FPS
        let elapsed = last_frame.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
        last_frame = Instant::now();
    }

    info!(ticks = clock.tick(), "quit");
    mixer.stop_ambient();
    Ok(())
}

/// Leave the alternate screen and raw mode. Both steps always run; the first
/// failure is returned.
fn restore_terminal(writer: &mut impl Write) -> io::Result<()> {
    let screen = execute!(writer, cursor::Show, terminal::LeaveAlternateScreen);
    let raw = terminal::disable_raw_mode();
    first_error([screen, raw])
}

fn first_error(results: impl IntoIterator<Item = io::Result<()>>) -> io::Result<()> {
    results.into_iter().collect()
}

fn status_line(scene: &Scene, now: f64, fps: f64) -> String {
    let weather = scene.weather();
    let cooldown = scene.lightning().cooldown(now);
    let bolt = if cooldown > 0.0 {
        format!("{:.0}s", cooldown.ceil())
    } else {
        "ready".to_string()
    };
    format!(
        " {} | rain {:.2} | wind {:+} | drops {} | bolt {} | {:.0} fps | [t] strike  [r] render  [c] color  [h] hide  [q] quit ",
        weather.state(),
        weather.rain_density(),
        weather.wind_strength(),
        scene.drops().len(),
        bolt,
        fps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_wins_after_every_step_ran() {
        let mut ran = Vec::new();
        let mut step = |n: u32, ok: bool| {
            ran.push(n);
            if ok { Ok(()) } else { Err(io::Error::other(format!("step {n}"))) }
        };
        let results = [step(1, false), step(2, false), step(3, true)];
        let err = first_error(results).unwrap_err();

        assert_eq!(err.to_string(), "step 1");
        assert_eq!(ran, vec![1, 2, 3]);
        assert!(first_error([Ok(()), Ok(())]).is_ok());
    }

    #[test]
    fn status_line_reports_weather_and_cooldown() {
        let mut scene = Scene::new(Stage::default(), SceneSettings::default(), SimRng::seed_from_u64(9));
        assert!(status_line(&scene, 0.0, 60.0).contains("bolt ready"));

        scene.request_strike(0.0);
        let line = status_line(&scene, 5.0, 60.0);
        assert!(line.starts_with(" normal | rain 0.50 | wind +0"));
        assert!(line.contains("bolt 10s"));
    }
}
