use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::sim::Scene;
use crate::sim::weather::WeatherState;

/// One line of the control feed. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct ControlMessage {
    pub weather: Option<WeatherState>,
    pub rain_density: Option<f64>,
    pub wind: Option<i32>,
    #[serde(default)]
    pub strike: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlSource {
    Stdin,
    File(PathBuf),
}

impl ControlSource {
    /// `-` means stdin, anything else is a file path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            ControlSource::Stdin
        } else {
            ControlSource::File(PathBuf::from(arg))
        }
    }
}

pub fn parse_line(line: &str) -> Option<ControlMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(msg) => Some(msg),
        Err(e) => {
            debug!("ignoring control line: {e}");
            None
        }
    }
}

/// Apply a message to the scene. Forced weather goes first so explicit
/// density and wind in the same message win over the freshly drawn ones.
pub fn apply(msg: &ControlMessage, scene: &mut Scene, now: f64) {
    if let Some(state) = msg.weather {
        scene.force_weather(state);
    }
    if let Some(density) = msg.rain_density {
        scene.override_rain_density(density);
    }
    if let Some(wind) = msg.wind {
        scene.override_wind(wind);
    }
    if msg.strike {
        scene.request_strike(now);
    }
}

/// Start a reader thread for `source`. The receiver yields parsed messages;
/// it disconnects when the source ends or fails.
pub fn spawn_reader(source: ControlSource) -> Receiver<ControlMessage> {
    let (tx, rx) = mpsc::channel::<ControlMessage>();

    match source {
        ControlSource::Stdin => {
            std::thread::spawn(move || {
                use std::io::BufRead;
                let stdin = std::io::BufReader::new(std::io::stdin());
                for line in stdin.lines() {
                    match line {
                        Ok(l) => {
                            if let Some(msg) = parse_line(&l)
                                && tx.send(msg).is_err()
                            {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("control stdin closed: {e}");
                            break;
                        }
                    }
                }
            });
        }
        ControlSource::File(path) => {
            std::thread::spawn(move || watch_file(&path, &tx));
        }
    }

    rx
}

/// Re-reads the file on every change and sends its last non-empty line.
fn watch_file(path: &Path, tx: &Sender<ControlMessage>) {
    // Read the file once on startup if it already exists
    if send_last_line(path, tx).is_err() {
        return;
    }

    let (file_tx, file_rx) = mpsc::channel();
    let mut watcher = match notify::recommended_watcher(move |res| {
        let _ = file_tx.send(res);
    }) {
        Ok(w) => w,
        Err(e) => {
            warn!("control file watcher unavailable: {e}");
            return;
        }
    };
    if let Err(e) = notify::Watcher::watch(&mut watcher, path, notify::RecursiveMode::NonRecursive) {
        warn!(path = %path.display(), "cannot watch control file: {e}");
        return;
    }
    info!(path = %path.display(), "watching control file");

    while let Ok(Ok(_event)) = file_rx.recv() {
        if send_last_line(path, tx).is_err() {
            break;
        }
    }
}

/// `Err` only when the receiving side is gone.
fn send_last_line(path: &Path, tx: &Sender<ControlMessage>) -> Result<(), ()> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Ok(());
    };
    match last_message(&contents) {
        Some(msg) => tx.send(msg).map_err(|_| ()),
        None => Ok(()),
    }
}

fn last_message(contents: &str) -> Option<ControlMessage> {
    contents
        .lines()
        .rfind(|l| !l.trim().is_empty())
        .and_then(parse_line)
}
